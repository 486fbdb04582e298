//! Staff accounts and login payloads of the users backend.

use serde::{Deserialize, Serialize};

use super::common::EntityId;

pub const ADMIN_ROLE_ID: &str = "1";
pub const USER_ROLE_ID: &str = "2";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: EntityId,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub role_id: Option<EntityId>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Account {
    pub fn role_id_str(&self) -> &str {
        self.role_id.as_ref().map(|r| r.as_str()).unwrap_or(USER_ROLE_ID)
    }

    pub fn status_label(&self) -> &'static str {
        if self.active {
            "Active"
        } else {
            "Inactive"
        }
    }

    pub fn role_label(&self) -> &'static str {
        if self.role_id_str() == ADMIN_ROLE_ID {
            "Admin"
        } else {
            "User"
        }
    }
}

/// Body of `POST /users`. The password is only ever sent here.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAccountPayload {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role_id: EntityId,
    pub active: bool,
}

/// Body of `PUT /users/:id`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccountUpdatePayload {
    pub full_name: String,
    pub role_id: EntityId,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /login`. Both fields are optional on the wire so a
/// half-populated response can be told apart from malformed JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_role_label() {
        let a: Account =
            serde_json::from_str(r#"{"id": 1, "full_name": "Ana", "email": "a@x.io", "role_id": 1}"#)
                .unwrap();
        assert_eq!(a.role_label(), "Admin");
        assert!(a.active);

        let b: Account = serde_json::from_str(
            r#"{"id": 2, "full_name": "Ben", "email": "b@x.io", "role_id": "2", "active": false}"#,
        )
        .unwrap();
        assert_eq!(b.role_label(), "User");
        assert!(!b.active);
    }

    #[test]
    fn test_login_response_tolerates_missing_fields() {
        let r: LoginResponse = serde_json::from_str(r#"{"message": "ok"}"#).unwrap();
        assert!(r.token.is_none());
        assert!(r.user.is_none());
    }
}
