//! JSON HTTP API over [`Lookup`].

use crate::error::BilregError;
use crate::lookup::Lookup;
use crate::tools::fetch::FetchError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3456;

type Shared = Arc<Lookup>;

/// Build the router with all endpoints.
pub fn router(lookup: Shared) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/vehicle/:regnr", get(vehicle))
        .route("/api/owner/:regnr", get(owner))
        .route("/api/profile/:profile_id", get(profile))
        .route("/api/address/:regnr", get(address))
        .layer(cors)
        .with_state(lookup)
}

pub async fn serve(addr: SocketAddr, lookup: Shared) -> anyhow::Result<()> {
    let app = router(lookup);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// HTTP status for a lookup error.
pub fn status_for(err: &BilregError) -> StatusCode {
    match err {
        BilregError::Fetch(FetchError::Forbidden) => StatusCode::FORBIDDEN,
        BilregError::Fetch(_) => StatusCode::BAD_GATEWAY,
        BilregError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error body: `{"detail": "..."}`.
pub struct ApiError(BilregError);

impl From<BilregError> for ApiError {
    fn from(err: BilregError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request failed");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn reply<T: Serialize>(result: crate::Result<T>) -> ApiResult<T> {
    result.map(Json).map_err(ApiError::from)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn vehicle(
    State(lookup): State<Shared>,
    Path(regnr): Path<String>,
) -> ApiResult<crate::lookup::VehicleReport> {
    reply(lookup.vehicle(&regnr).await)
}

async fn owner(
    State(lookup): State<Shared>,
    Path(regnr): Path<String>,
) -> ApiResult<crate::lookup::OwnerReport> {
    reply(lookup.owner_by_regnr(&regnr).await)
}

async fn profile(
    State(lookup): State<Shared>,
    Path(profile_id): Path<String>,
) -> ApiResult<crate::tools::scrape::OwnerProfile> {
    reply(lookup.owner_profile(&profile_id).await)
}

async fn address(
    State(lookup): State<Shared>,
    Path(regnr): Path<String>,
) -> ApiResult<crate::lookup::AddressReport> {
    reply(lookup.address_vehicles(&regnr).await)
}
