//! Same-origin relay to Nominatim for browsers that cannot call it directly.
//!
//! Both handlers always answer with JSON of the right shape (`[]` for
//! search, `{}` for reverse) so the client never has to special-case errors.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use geofinder_core::Coordinate;
use geofinder_provider::GeocodeError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::RequestId;
use crate::upstream::Forwarded;

use super::AppState;

/// Queries shorter than this are answered locally with `[]`.
const MIN_QUERY_CHARS: usize = 2;
const DEFAULT_LIMIT: u32 = 8;
const MAX_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    q: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReverseParams {
    lat: Option<String>,
    lon: Option<String>,
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<Value>) {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.chars().count() < MIN_QUERY_CHARS {
        return (StatusCode::OK, Json(json!([])));
    }
    let limit = normalize_limit(params.limit.as_deref());

    let result = state.upstream.search(query, limit).await;
    relay(&req_id, "search", result, json!([]))
}

pub(super) async fn reverse(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ReverseParams>,
) -> (StatusCode, Json<Value>) {
    let Some(coordinate) = parse_coordinate(params.lat.as_deref(), params.lon.as_deref()) else {
        tracing::debug!(
            request_id = %req_id.0,
            lat = ?params.lat,
            lon = ?params.lon,
            "reverse request without a usable coordinate"
        );
        return (StatusCode::BAD_REQUEST, Json(json!({})));
    };

    let result = state.upstream.reverse(coordinate).await;
    relay(&req_id, "reverse", result, json!({}))
}

/// Missing or unparsable limits fall back to the default; the rest are
/// clamped to `1..=MAX_LIMIT`.
fn normalize_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map_or(DEFAULT_LIMIT, |n| {
            u32::try_from(n.clamp(1, i64::from(MAX_LIMIT))).unwrap_or(DEFAULT_LIMIT)
        })
}

fn parse_coordinate(lat: Option<&str>, lon: Option<&str>) -> Option<Coordinate> {
    let lat = lat?.trim().parse::<f64>().ok()?;
    let lon = lon?.trim().parse::<f64>().ok()?;
    Coordinate::new(lat, lon).ok()
}

fn relay(
    req_id: &RequestId,
    route: &'static str,
    result: Result<Forwarded, GeocodeError>,
    empty: Value,
) -> (StatusCode, Json<Value>) {
    match result {
        Ok(Forwarded::Body(body)) => (StatusCode::OK, Json(body)),
        Ok(Forwarded::Status(code)) => {
            tracing::warn!(
                request_id = %req_id.0,
                route,
                status = code,
                "upstream rejected request"
            );
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(empty))
        }
        Err(error) => {
            tracing::warn!(request_id = %req_id.0, route, error = %error, "upstream unreachable");
            (StatusCode::BAD_GATEWAY, Json(empty))
        }
    }
}
