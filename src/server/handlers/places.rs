use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::time::{sleep, Duration};

use crate::error::StratusError;
use crate::places::BoundingBox;
use crate::server::handlers::ApiError;
use crate::server::AppState;

/// Caching directive attached to every map response.
const CACHE_CONTROL: &str = "public, max-age=30, s-maxage=120, stale-while-revalidate=60";

/// Query string for `GET /v1/places/map`.
#[derive(Debug, Deserialize)]
pub struct MapParams {
    /// Viewport as `west,south,east,north`.
    pub bbox: Option<String>,
    /// Zoom level; selects clusters, markers or polygons.
    pub zoom: Option<String>,
    /// Artificial response delay in milliseconds (alias `delay`); an
    /// unparsable value reads as 0.
    pub delay_ms: Option<String>,
    pub delay: Option<String>,
}

/// Tiles the place catalog for a viewport.
pub async fn map_data(
    State(state): State<AppState>,
    Query(params): Query<MapParams>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();

    let bbox = params
        .bbox
        .as_deref()
        .and_then(parse_bbox)
        .ok_or_else(|| {
            StratusError::Validation(
                "Invalid bbox parameter. Expected format: west,south,east,north".to_string(),
            )
        })?;
    let zoom = params
        .zoom
        .as_deref()
        .and_then(|raw| raw.parse::<u32>().ok())
        .ok_or_else(|| {
            StratusError::Validation(
                "Invalid zoom parameter. Must be a positive integer.".to_string(),
            )
        })?;
    let delay_ms = params
        .delay_ms
        .or(params.delay)
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(0);
    if !(0..=60_000).contains(&delay_ms) {
        return Err(ApiError(StratusError::Validation(
            "delay_ms must be between 0 and 60000 milliseconds.".to_string(),
        )));
    }

    let map = state.backends.places.get_map_data(&bbox, zoom);
    if delay_ms > 0 {
        sleep(Duration::from_millis(delay_ms as u64)).await;
    }

    let body = json!({
        "request": {
            "bbox": bbox,
            "zoom": zoom,
            "delay_ms": delay_ms,
        },
        "meta": {
            "cache_key": map.cache_key,
            "processing_time_ms": started.elapsed().as_millis() as u64,
            "generated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        "data": {
            "clusters": map.clusters,
            "markers": map.markers,
            "polygons": map.polygons,
            "total": map.total,
        },
    });
    Ok(([(header::CACHE_CONTROL, CACHE_CONTROL)], Json(body)))
}

/// Lists the region tags known to the catalog.
pub async fn regions(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "regions": state.backends.places.available_regions() }))
}

/// Parses `west,south,east,north`, rejecting wrong arity, non-numeric
/// parts, and boxes where west/east or south/north are inverted or equal.
fn parse_bbox(raw: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;
    let &[west, south, east, north] = parts.as_slice() else {
        return None;
    };
    if [west, south, east, north].iter().any(|v| v.is_nan()) || west >= east || south >= north {
        return None;
    }
    Some(BoundingBox {
        west,
        south,
        east,
        north,
    })
}
