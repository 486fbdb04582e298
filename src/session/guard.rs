//! Route guard for the two protected areas.
//!
//! `/admin` requires the admin role and `/user` requires the employee role.
//! The decision only looks at the role cookie; the token is never checked here.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::{get_role, Role, Session};

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Admin,
    User,
}

impl Area {
    pub fn prefix(&self) -> &'static str {
        match self {
            Area::Admin => "/admin",
            Area::User => "/user",
        }
    }

    pub fn required_role(&self) -> Role {
        match self {
            Area::Admin => Role::Admin,
            Area::User => Role::Employee,
        }
    }

    /// The protected area a path belongs to, matching whole segments only.
    pub fn of(path: &str) -> Option<Self> {
        [Area::Admin, Area::User].into_iter().find(|area| {
            path.strip_prefix(area.prefix())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
}

/// Decide whether `role` may render `path`.
pub fn authorize(path: &str, role: Option<Role>) -> GuardDecision {
    match Area::of(path) {
        Some(area) if role != Some(area.required_role()) => GuardDecision::RedirectToLogin,
        _ => GuardDecision::Allow,
    }
}

/// Middleware applying [`authorize`] to every request and injecting the
/// session into request extensions for the handlers downstream.
pub async fn route_guard(jar: CookieJar, mut request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let role = get_role(&jar);

    match authorize(&path, role) {
        GuardDecision::RedirectToLogin => {
            tracing::info!(path = %path, role = ?role, "Redirecting unauthorized request to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
        GuardDecision::Allow => {
            if let Some(session) = Session::from_jar(&jar) {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
    }
}
