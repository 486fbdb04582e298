//! Adapters for the REST backends.
//!
//! Each backend gets a thin typed wrapper around a shared [`RestClient`].
//! Responses are mapped into [`GatewayError`] so every view reports
//! transport failures, bad statuses and malformed bodies the same way.

pub mod appointments;
pub mod products;
pub mod services;
pub mod users;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

use crate::config::BackendConfig;
use crate::models::EntityId;

pub use appointments::AppointmentsApi;
pub use products::ProductsApi;
pub use services::ServicesApi;
pub use users::UsersApi;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status {
        url: String,
        status: StatusCode,
        /// `message` (or `error`) field of the response body, when present
        message: Option<String>,
    },

    #[error("malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("request cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Text shown to the user. Backend-provided messages win over generic ones.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Transport { .. } => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            GatewayError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            GatewayError::Status { status, .. } => format!("Request failed ({})", status),
            GatewayError::Decode { .. } => "Server returned invalid JSON.".to_string(),
            GatewayError::Cancelled => "Request cancelled.".to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }
}

/// Pull a human-readable message out of an error body.
pub fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    http: reqwest::Client,
    bearer: Option<String>,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http,
            bearer: None,
        }
    }

    /// Same backend, with `Authorization: Bearer <token>` on every request.
    pub fn with_bearer(&self, token: &str) -> Self {
        Self {
            bearer: Some(token.to_string()),
            ..self.clone()
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String, GatewayError> {
        let url = self.url(path);
        let mut builder = self.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|source| {
            tracing::warn!(%method, url = %url, error = %source, "Backend request failed");
            GatewayError::Transport {
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| GatewayError::Transport {
            url: url.clone(),
            source,
        })?;

        if !status.is_success() {
            tracing::warn!(%method, url = %url, %status, "Backend rejected request");
            return Err(GatewayError::Status {
                url,
                status,
                message: extract_message(&text),
            });
        }

        tracing::debug!(%method, url = %url, %status, "Backend request completed");
        Ok(text)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let text = self.execute(Method::GET, path, None).await?;
        decode(&self.url(path), &text)
    }

    /// Send a JSON body and ignore whatever the backend answers with.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), GatewayError> {
        let body = serde_json::to_value(body).map_err(|e| GatewayError::Decode {
            url: self.url(path),
            reason: format!("could not encode request body: {}", e),
        })?;
        self.execute(method, path, Some(body)).await.map(|_| ())
    }

    /// Send a JSON body and decode the JSON answer.
    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let value = serde_json::to_value(body).map_err(|e| GatewayError::Decode {
            url: self.url(path),
            reason: format!("could not encode request body: {}", e),
        })?;
        let text = self.execute(method, path, Some(value)).await?;
        decode(&self.url(path), &text)
    }

    pub async fn delete(&self, path: &str) -> Result<(), GatewayError> {
        self.execute(Method::DELETE, path, None).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, GatewayError> {
    serde_json::from_str(text).map_err(|e| GatewayError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// A REST collection with the usual list/create/update/delete verbs.
pub struct Resource<T> {
    client: RestClient,
    path: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn new(client: RestClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub async fn list(&self) -> Result<Vec<T>, GatewayError> {
        self.client.get_json(self.path).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<(), GatewayError> {
        self.client.send(Method::POST, self.path, body).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &EntityId,
        body: &B,
    ) -> Result<(), GatewayError> {
        self.client
            .send(Method::PUT, &format!("{}/{}", self.path, id), body)
            .await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), GatewayError> {
        self.client.delete(&format!("{}/{}", self.path, id)).await
    }
}

/// All backend adapters, shared by every request.
#[derive(Debug, Clone)]
pub struct Gateways {
    pub products: ProductsApi,
    pub services: ServicesApi,
    pub users: UsersApi,
    pub appointments: AppointmentsApi,
}

impl Gateways {
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("carwash-admin/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            products: ProductsApi::new(RestClient::new(&config.products_url, http.clone())),
            services: ServicesApi::new(RestClient::new(&config.services_url, http.clone())),
            users: UsersApi::new(RestClient::new(&config.users_url, http.clone())),
            appointments: AppointmentsApi::new(http, &config.appointments_url),
        })
    }
}
