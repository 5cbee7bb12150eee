use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ramal_geo::Coordinate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::ramal::resolve::{Match, Resolution};
use crate::ramal::{RegionCode, UnitId};
use crate::ramal_web::handlers::{error_response, WebError};
use crate::ramal_web::AppState;

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegionView<'a> {
    code: &'a RegionCode,
    id: &'a UnitId,
    name: &'a str,
    latitude: f64,
    longitude: f64,
    distance_km: f64,
    forecast_url: String,
}

impl<'a> RegionView<'a> {
    fn new(found: &'a Match, forecast_url: String) -> Self {
        Self {
            code: &found.code,
            id: &found.unit.id,
            name: &found.unit.name,
            latitude: found.unit.latitude,
            longitude: found.unit.longitude,
            distance_km: found.distance_km,
            forecast_url,
        }
    }
}

#[instrument(skip_all, fields(? query))]
pub async fn handle_region_get(
    state: State<AppState>,
    Query(query): Query<RegionQuery>,
) -> Result<Response, WebError> {
    if !query.lat.is_finite() || !query.lon.is_finite() {
        let message = format!("coordinates must be finite numbers, got {}, {}", query.lat, query.lon);
        return Ok(error_response(StatusCode::BAD_REQUEST, message));
    }

    let coordinate = Coordinate::new(query.lat, query.lon);

    let found = match state.resolver.resolve(coordinate).await? {
        Resolution::Found(found) => found,
        Resolution::NotFound => {
            let message = format!("no kelurahan found near {}, {}", query.lat, query.lon);
            return Ok(error_response(StatusCode::NOT_FOUND, message));
        }
    };

    let forecast_url = state.forecast_url.for_region(&found.code);
    Ok(Json(RegionView::new(&found, forecast_url)).into_response())
}
