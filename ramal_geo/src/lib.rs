use ordered_float::OrderedFloat;

/// Mean earth radius used for all distances, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the earth in decimal degrees. Values are not range checked.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Anything that sits at a fixed coordinate.
pub trait Located {
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn coordinate(&self) -> Coordinate {
        (**self).coordinate()
    }
}

/// The winner of a [nearest] scan together with its distance to the query.
#[derive(Clone, Debug)]
pub struct Nearest<T> {
    pub item: T,
    pub distance_km: f64,
}

/// Great-circle distance between two coordinates using the haversine formula.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    // rounding can push `a` just past 1 for nearly antipodal points
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Scans all items and returns the one closest to `query`.
///
/// This is a plain linear scan. If multiple items share the minimal distance,
/// the first one in iteration order is returned. Returns `None` for an empty input.
pub fn nearest<T, I>(query: Coordinate, items: I) -> Option<Nearest<T>>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .map(|item| {
            let distance_km = haversine_km(query, item.coordinate());
            Nearest { item, distance_km }
        })
        // min_by_key keeps the first of several equal minimums
        .min_by_key(|candidate| OrderedFloat(candidate.distance_km))
}
