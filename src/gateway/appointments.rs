//! Upstream appointments feed.
//!
//! The upstream answers either `{"appointments": [...]}` or a bare array;
//! anything else is treated as "no appointments".

use serde_json::Value;

use super::{GatewayError, RestClient};
use crate::models::Appointment;

#[derive(Debug, Clone)]
pub struct AppointmentsApi {
    client: RestClient,
}

impl AppointmentsApi {
    /// `url` is the full listing URL, not a base.
    pub fn new(http: reqwest::Client, url: &str) -> Self {
        Self {
            client: RestClient::new(url, http),
        }
    }

    /// Raw upstream fetch, errors included.
    pub async fn fetch(&self) -> Result<Vec<Appointment>, GatewayError> {
        let body: Value = self.client.get_json("").await?;
        Ok(normalize(body))
    }

    /// Fetch that never fails: upstream errors read as an empty list.
    pub async fn list_or_empty(&self) -> Vec<Appointment> {
        match self.fetch().await {
            Ok(appointments) => appointments,
            Err(e) => {
                tracing::warn!(error = %e, "Appointments upstream unavailable, using empty list");
                Vec::new()
            }
        }
    }
}

/// Extract the appointment list from either accepted upstream shape.
pub fn normalize(body: Value) -> Vec<Appointment> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("appointments") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubBackend;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    #[test]
    fn test_normalize_shapes() {
        assert_eq!(normalize(json!({"appointments": [1, 2, 3]})), vec![json!(1), json!(2), json!(3)]);
        assert_eq!(normalize(json!([1, 2, 3])).len(), 3);
        assert!(normalize(json!({"appointments": "soon"})).is_empty());
        assert!(normalize(json!({"data": []})).is_empty());
        assert!(normalize(json!("nope")).is_empty());
        assert!(normalize(Value::Null).is_empty());
    }

    #[tokio::test]
    async fn test_list_or_empty_swallows_upstream_errors() {
        let stub = StubBackend::spawn(
            Router::new()
                .route("/all", get(|| async { Json(json!([{"id": 1}, {"id": 2}])) }))
                .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
                .route("/garbage", get(|| async { "<html>" })),
        )
        .await;
        let http = reqwest::Client::new();

        let ok = AppointmentsApi::new(http.clone(), &format!("{}/all", stub.base_url));
        assert_eq!(ok.list_or_empty().await.len(), 2);

        let broken = AppointmentsApi::new(http.clone(), &format!("{}/broken", stub.base_url));
        assert!(broken.fetch().await.is_err());
        assert!(broken.list_or_empty().await.is_empty());

        let garbage = AppointmentsApi::new(http, &format!("{}/garbage", stub.base_url));
        assert!(garbage.list_or_empty().await.is_empty());
    }
}
