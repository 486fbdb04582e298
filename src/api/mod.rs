pub mod error;

use axum::{extract::State, http::Uri, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::gateway::GatewayError;
use crate::AppState;
use error::ApiError;

/// Local JSON routes. The browser only ever talks to this origin; the
/// appointments upstream is proxied so its shape is normalized here.
pub fn create_router() -> Router<Arc<AppState>> {
    let api_routes = Router::new()
        .route("/appointments", get(appointments))
        .fallback(api_not_found);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Always answers 200: upstream failures and unknown shapes read as no
/// appointments.
async fn appointments(State(state): State<Arc<AppState>>) -> Json<Value> {
    let scope = state.view_scope();
    let appointments = scope
        .run(async { Ok::<_, GatewayError>(state.gateways.appointments.list_or_empty().await) })
        .await
        .unwrap_or_default();
    Json(json!({ "appointments": appointments }))
}

async fn api_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
