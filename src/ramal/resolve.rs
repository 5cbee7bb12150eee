use std::sync::Arc;

use ramal_geo::{nearest, Coordinate, Nearest};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::ramal::dataset::Dataset;
use crate::ramal::{AdministrativeUnit, MalformedIdentifier, RegionCode};

/// The unit closest to a query point.
#[derive(Clone, Debug)]
pub struct Match {
    pub unit: AdministrativeUnit,
    pub distance_km: f64,
    pub code: RegionCode,
}

/// Outcome of a resolution. An empty dataset is not an error, it simply has no match.
#[derive(Clone, Debug)]
pub enum Resolution {
    Found(Match),
    NotFound,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("reference dataset is not available: {0}")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    MalformedIdentifier(#[from] MalformedIdentifier),
}

/// Finds the unit nearest to a coordinate and renders its region code.
#[derive(Clone)]
pub struct Resolver {
    dataset: Arc<dyn Dataset>,
}

impl Resolver {
    pub fn new(dataset: Arc<dyn Dataset>) -> Self {
        Self { dataset }
    }

    #[instrument(skip_all, fields(latitude = query.latitude, longitude = query.longitude))]
    pub async fn resolve(&self, query: Coordinate) -> Result<Resolution, ResolveError> {
        let units = self.dataset.units().await.map_err(|err| {
            warn!("Failed to load reference dataset: {:?}", err);
            ResolveError::StoreUnavailable(err.into())
        })?;

        let resolution = resolve_in(query, units)?;

        match &resolution {
            Resolution::Found(found) => {
                debug!("Resolved to {} ({}) at {:.3}km", found.code, found.unit.name, found.distance_km)
            }
            Resolution::NotFound => debug!("No units in reference dataset"),
        }

        Ok(resolution)
    }
}

/// Resolves against an already loaded list of units. The first unit wins if
/// several share the minimal distance.
pub fn resolve_in<I>(query: Coordinate, units: I) -> Result<Resolution, MalformedIdentifier>
where
    I: IntoIterator<Item = AdministrativeUnit>,
{
    let Some(Nearest { item: unit, distance_km }) = nearest(query, units) else {
        return Ok(Resolution::NotFound);
    };

    let code = unit.region_code()?;
    Ok(Resolution::Found(Match { unit, distance_km, code }))
}
