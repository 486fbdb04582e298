//! Users backend: login and bearer-authorized account management.

use reqwest::Method;

use super::{GatewayError, Resource, RestClient};
use crate::models::{Account, LoginRequest, LoginResponse};

#[derive(Debug, Clone)]
pub struct UsersApi {
    client: RestClient,
}

impl UsersApi {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// `POST /login`. Presence of token and user is checked by the caller.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, GatewayError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.client.send_json(Method::POST, "/login", &request).await
    }

    /// Account collection, authorized with the session token.
    pub fn accounts(&self, token: &str) -> Resource<Account> {
        Resource::new(self.client.with_bearer(token), "/users")
    }
}
