//! Sign-in flow.
//!
//! A submission goes Idle → Submitting → Success | Failed. While one is
//! submitting, another submission for the same e-mail is refused without
//! reaching the users backend.

use dashmap::DashSet;
use serde::Deserialize;

use crate::gateway::{GatewayError, UsersApi};
use crate::session::{Role, Session};

pub const BUSY_MESSAGE: &str = "Sign-in already in progress.";
pub const MISSING_FIELDS_MESSAGE: &str = "Login succeeded but no token or user returned.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success { session: Session, redirect: &'static str },
    Failed(String),
    /// Same e-mail already submitting
    Busy,
}

impl LoginOutcome {
    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success { .. } => None,
            LoginOutcome::Failed(message) => Some(message),
            LoginOutcome::Busy => Some(BUSY_MESSAGE),
        }
    }
}

/// E-mail addresses with a sign-in currently submitting.
#[derive(Debug, Default)]
pub struct LoginGate {
    in_flight: DashSet<String>,
}

/// Marks an e-mail as submitting until dropped.
pub struct InFlight<'a> {
    gate: &'a LoginGate,
    key: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.remove(&self.key);
    }
}

impl LoginGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self, email: &str) -> Option<InFlight<'_>> {
        let key = email.trim().to_lowercase();
        if self.in_flight.insert(key.clone()) {
            Some(InFlight { gate: self, key })
        } else {
            None
        }
    }

    pub fn is_submitting(&self, email: &str) -> bool {
        self.in_flight.contains(&email.trim().to_lowercase())
    }
}

fn failure_message(error: &GatewayError) -> String {
    match error {
        GatewayError::Status {
            message: Some(message),
            ..
        } => message.clone(),
        GatewayError::Status { status, .. } => format!("Login failed ({})", status.as_u16()),
        GatewayError::Decode { .. } => "Server returned invalid JSON.".to_string(),
        GatewayError::Transport { source, .. } => source.to_string(),
        GatewayError::Cancelled => error.user_message(),
    }
}

/// Authenticate against the users backend and decide where to go next.
/// No session exists unless the outcome is `Success`.
pub async fn submit(users: &UsersApi, gate: &LoginGate, form: &LoginForm) -> LoginOutcome {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return LoginOutcome::Failed("Email and password are required.".to_string());
    }

    let Some(_in_flight) = gate.try_begin(email) else {
        tracing::debug!(email, "Duplicate sign-in submission ignored");
        return LoginOutcome::Busy;
    };

    let response = match users.authenticate(email, &form.password).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(email, error = %e, "Sign-in rejected");
            return LoginOutcome::Failed(failure_message(&e));
        }
    };

    let (token, backend_role) = match (response.token, response.user.and_then(|u| u.role)) {
        (Some(token), Some(role)) if !token.is_empty() => (token, role),
        _ => {
            tracing::warn!(email, "Sign-in response missing token or user");
            return LoginOutcome::Failed(MISSING_FIELDS_MESSAGE.to_string());
        }
    };

    match Role::from_backend(&backend_role) {
        Some(role) => {
            tracing::info!(email, %role, "Signed in");
            LoginOutcome::Success {
                session: Session::new(token, role),
                redirect: role.home_path(),
            }
        }
        None => {
            tracing::warn!(email, role = %backend_role, "Sign-in with unsupported role");
            LoginOutcome::Failed(format!("Unsupported role \"{}\".", backend_role))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RestClient;
    use crate::test_support::StubBackend;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    async fn users_stub(reply: Value) -> (StubBackend, UsersApi) {
        let stub = StubBackend::spawn(Router::new().route(
            "/login",
            post(move || {
                let reply = reply.clone();
                async move { Json(reply) }
            }),
        ))
        .await;
        let api = UsersApi::new(RestClient::new(&stub.base_url, reqwest::Client::new()));
        (stub, api)
    }

    fn form() -> LoginForm {
        LoginForm {
            email: "ana@wash.io".to_string(),
            password: "pw".to_string(),
        }
    }

    #[tokio::test]
    async fn test_roles_redirect_to_their_area() {
        for (backend_role, role, redirect) in [
            ("admin", Role::Admin, "/admin"),
            ("employee", Role::Employee, "/user"),
            ("user", Role::Employee, "/user"),
        ] {
            let (_stub, api) = users_stub(json!({"token": "t1", "user": {"role": backend_role}})).await;
            let outcome = submit(&api, &LoginGate::new(), &form()).await;
            assert_eq!(
                outcome,
                LoginOutcome::Success {
                    session: Session::new("t1", role),
                    redirect,
                }
            );
        }
    }

    #[tokio::test]
    async fn test_missing_token_or_user_fails() {
        for reply in [
            json!({"user": {"role": "admin"}}),
            json!({"token": "t1"}),
            json!({"token": "", "user": {"role": "admin"}}),
        ] {
            let (_stub, api) = users_stub(reply).await;
            let outcome = submit(&api, &LoginGate::new(), &form()).await;
            assert_eq!(outcome, LoginOutcome::Failed(MISSING_FIELDS_MESSAGE.to_string()));
        }
    }

    #[tokio::test]
    async fn test_unknown_role_fails() {
        let (_stub, api) = users_stub(json!({"token": "t1", "user": {"role": "owner"}})).await;
        let outcome = submit(&api, &LoginGate::new(), &form()).await;
        assert_eq!(outcome, LoginOutcome::Failed("Unsupported role \"owner\".".to_string()));
    }

    #[tokio::test]
    async fn test_status_failures() {
        let stub = StubBackend::spawn(Router::new().route(
            "/login",
            post(|Json(body): Json<Value>| async move {
                if body["email"] == "ana@wash.io" {
                    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid credentials"})))
                } else {
                    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
                }
            }),
        ))
        .await;
        let api = UsersApi::new(RestClient::new(&stub.base_url, reqwest::Client::new()));
        let gate = LoginGate::new();

        let outcome = submit(&api, &gate, &form()).await;
        assert_eq!(outcome, LoginOutcome::Failed("Invalid credentials".to_string()));

        let other = LoginForm {
            email: "ben@wash.io".to_string(),
            password: "pw".to_string(),
        };
        let outcome = submit(&api, &gate, &other).await;
        assert_eq!(outcome, LoginOutcome::Failed("Login failed (503)".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_json_reply() {
        let stub = StubBackend::spawn(
            Router::new().route("/login", post(|| async { "<html>oops</html>" })),
        )
        .await;
        let api = UsersApi::new(RestClient::new(&stub.base_url, reqwest::Client::new()));
        let outcome = submit(&api, &LoginGate::new(), &form()).await;
        assert_eq!(outcome, LoginOutcome::Failed("Server returned invalid JSON.".to_string()));
    }

    #[tokio::test]
    async fn test_blank_fields_never_reach_backend() {
        let (stub, api) = users_stub(json!({})).await;
        let outcome = submit(&api, &LoginGate::new(), &LoginForm::default()).await;
        assert!(matches!(outcome, LoginOutcome::Failed(_)));
        assert_eq!(stub.total(), 0);
    }

    #[tokio::test]
    async fn test_double_submit_is_refused() {
        let stub = StubBackend::spawn(Router::new().route(
            "/login",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Json(json!({"token": "t1", "user": {"role": "admin"}}))
            }),
        ))
        .await;
        let api = Arc::new(UsersApi::new(RestClient::new(&stub.base_url, reqwest::Client::new())));
        let gate = Arc::new(LoginGate::new());

        let first = tokio::spawn({
            let (api, gate) = (api.clone(), gate.clone());
            async move { submit(&api, &gate, &form()).await }
        });
        // let the first submission register before the second arrives
        for _ in 0..100 {
            if gate.is_submitting("ana@wash.io") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let second = submit(&api, &gate, &form()).await;
        assert_eq!(second, LoginOutcome::Busy);
        assert!(matches!(first.await.unwrap(), LoginOutcome::Success { .. }));
        assert_eq!(stub.count("POST", "/login"), 1);
        assert!(!gate.is_submitting("ana@wash.io"), "released after completion");
    }

    #[test]
    fn test_gate_is_case_insensitive() {
        let gate = LoginGate::new();
        let held = gate.try_begin("Ana@Wash.io");
        assert!(held.is_some());
        assert!(gate.try_begin(" ana@wash.io ").is_none());
        drop(held);
        assert!(gate.try_begin("ana@wash.io").is_some());
    }
}
