//! Session store backed by the `token` and `role` cookies.
//!
//! The role is parsed into a closed [`Role`] once, when the cookie is read.
//! Everything downstream receives a typed [`Session`] and asks it for
//! [`Capabilities`] instead of comparing role strings.

pub mod guard;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::SessionConfig;

pub const TOKEN_COOKIE: &str = "token";
pub const ROLE_COOKIE: &str = "role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    /// Map the role reported by the users backend onto a session role.
    ///
    /// The backend calls operational accounts either `employee` or `user`.
    pub fn from_backend(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "employee" | "user" => Some(Role::Employee),
            _ => None,
        }
    }

    /// Landing path of this role's shell.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Employee => "/user",
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Admin => Capabilities {
                manage_inventory: true,
                manage_services: true,
                manage_users: true,
                view_reports: true,
            },
            Role::Employee => Capabilities::default(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role cookie holds an unknown value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Strict parse of the persisted cookie value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// What a role may do. Every view and every write action checks one of these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub manage_inventory: bool,
    pub manage_services: bool,
    pub manage_users: bool,
    pub view_reports: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageInventory,
    ManageServices,
    ManageUsers,
    ViewReports,
}

impl Capabilities {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageInventory => self.manage_inventory,
            Capability::ManageServices => self.manage_services,
            Capability::ManageUsers => self.manage_users,
            Capability::ViewReports => self.view_reports,
        }
    }
}

/// The authenticated session handed to every protected handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }

    /// Reject the request with 403 unless the role carries `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), StatusCode> {
        if self.capabilities().allows(capability) {
            Ok(())
        } else {
            tracing::warn!(role = %self.role, ?capability, "Capability denied");
            Err(StatusCode::FORBIDDEN)
        }
    }

    /// Read the session from cookies. Both cookies must be present and the
    /// role must be a known value.
    pub fn from_jar(jar: &CookieJar) -> Option<Self> {
        let role = get_role(jar)?;
        let token = get_token(jar)?;
        Some(Self { token, role })
    }
}

/// Persist token and role with the configured expiry.
pub fn set_session(jar: CookieJar, token: &str, role: Role, config: &SessionConfig) -> CookieJar {
    jar.add(session_cookie(TOKEN_COOKIE, token.to_string(), config))
        .add(session_cookie(ROLE_COOKIE, role.as_str().to_string(), config))
}

pub fn get_role(jar: &CookieJar) -> Option<Role> {
    jar.get(ROLE_COOKIE).and_then(|c| c.value().parse().ok())
}

pub fn get_token(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(ROLE_COOKIE).path("/"))
}

fn session_cookie(name: &'static str, value: String, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(time::Duration::hours(config.ttl_hours))
        .build()
}

/// Extractor for the session injected by [`guard::route_guard`].
///
/// Falls back to the cookies when the guard did not run (public routes).
/// Without a complete session the request is sent back to the login page.
#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }
        let jar = CookieJar::from_headers(&parts.headers);
        Session::from_jar(&jar).ok_or_else(|| Redirect::to(guard::LOGIN_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    fn jar_with(cookies: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookies).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn test_role_from_backend_maps_user_to_employee() {
        assert_eq!(Role::from_backend("admin"), Some(Role::Admin));
        assert_eq!(Role::from_backend("employee"), Some(Role::Employee));
        assert_eq!(Role::from_backend("user"), Some(Role::Employee));
        assert_eq!(Role::from_backend("Admin "), Some(Role::Admin));
        assert_eq!(Role::from_backend("manager"), None);
    }

    #[test]
    fn test_cookie_role_parse_is_strict() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("user".parse::<Role>().is_err());
        assert!("ADMIN".parse::<Role>().is_err());
    }

    #[test]
    fn test_capabilities_by_role() {
        let admin = Role::Admin.capabilities();
        assert!(admin.allows(Capability::ManageUsers));
        assert!(admin.allows(Capability::ViewReports));

        let employee = Role::Employee.capabilities();
        assert!(!employee.allows(Capability::ManageInventory));
        assert!(!employee.allows(Capability::ManageUsers));
    }

    #[test]
    fn test_set_session_writes_both_cookies_with_expiry() {
        let config = SessionConfig::default();
        let jar = set_session(CookieJar::new(), "abc123", Role::Admin, &config);

        let token = jar.get(TOKEN_COOKIE).unwrap();
        assert_eq!(token.value(), "abc123");
        assert_eq!(token.max_age(), Some(time::Duration::hours(24)));
        assert_eq!(token.http_only(), Some(true));

        let role = jar.get(ROLE_COOKIE).unwrap();
        assert_eq!(role.value(), "admin");
        assert_eq!(role.path(), Some("/"));
    }

    #[test]
    fn test_get_session_from_request_cookies() {
        let jar = jar_with("token=t-1; role=employee");
        assert_eq!(get_role(&jar), Some(Role::Employee));
        assert_eq!(get_token(&jar).as_deref(), Some("t-1"));
        assert_eq!(Session::from_jar(&jar), Some(Session::new("t-1", Role::Employee)));
    }

    #[test]
    fn test_unknown_role_reads_as_absent() {
        let jar = jar_with("token=t-1; role=superuser");
        assert_eq!(get_role(&jar), None);
        assert_eq!(Session::from_jar(&jar), None);
    }

    #[test]
    fn test_missing_token_means_no_session() {
        let jar = jar_with("role=admin");
        assert_eq!(get_role(&jar), Some(Role::Admin));
        assert!(Session::from_jar(&jar).is_none());
    }

    #[test]
    fn test_clear_session_removes_both() {
        let jar = jar_with("token=t-1; role=admin");
        let jar = clear_session(jar);
        assert!(jar.get(TOKEN_COOKIE).is_none());
        assert!(jar.get(ROLE_COOKIE).is_none());
    }
}
