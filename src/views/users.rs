//! User accounts. Every call carries the session token as a bearer.

use serde::Deserialize;

use super::listing::{matches_search, ListQuery, Listing};
use super::validation::{self, FieldErrors};
use super::{save_record, Notice, Submission, ViewScope};
use crate::gateway::{GatewayError, UsersApi};
use crate::models::{
    Account, AccountUpdatePayload, EntityId, NewAccountPayload, ADMIN_ROLE_ID, USER_ROLE_ID,
};

#[derive(Debug, Clone)]
pub struct UsersPage {
    pub listing: Listing<Account>,
    pub all: Vec<Account>,
}

impl UsersPage {
    pub fn find(&self, id: &EntityId) -> Option<&Account> {
        super::find_by_id(&self.all, id, |a| &a.id)
    }
}

pub async fn load(
    api: &UsersApi,
    token: &str,
    scope: &ViewScope,
    query: &ListQuery,
    page_size: usize,
) -> Result<UsersPage, GatewayError> {
    let accounts = scope.run(api.accounts(token).list()).await?;
    Ok(UsersPage {
        listing: Listing::build(&accounts, query, page_size, |a, term| {
            matches_search(term, &[a.full_name.as_str(), a.email.as_str()])
        }),
        all: accounts,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role_id: String,
    /// Checkbox: present when ticked
    #[serde(default)]
    pub active: Option<String>,
}

/// What a valid form turns into: creation and update send different bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountChange {
    Create(NewAccountPayload),
    Update(EntityId, AccountUpdatePayload),
}

impl AccountForm {
    /// Blank form for a new account: active, plain user role.
    pub fn new_account() -> Self {
        Self {
            role_id: USER_ROLE_ID.to_string(),
            active: Some("on".to_string()),
            ..Default::default()
        }
    }

    pub fn edit(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            password: String::new(),
            role_id: account.role_id_str().to_string(),
            active: account.active.then(|| "on".to_string()),
        }
    }

    pub fn is_edit(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_admin_role(&self) -> bool {
        self.role_id == ADMIN_ROLE_ID
    }

    pub fn validate(&self) -> Result<AccountChange, FieldErrors> {
        let mut errors = FieldErrors::new();
        let full_name = errors.check(
            "full_name",
            validation::required_text(&self.full_name, "Full name", 120),
        );
        let role_id = match self.role_id.trim() {
            ADMIN_ROLE_ID | USER_ROLE_ID => Some(EntityId::from(self.role_id.trim())),
            _ => {
                errors.add("role_id", "Choose a role");
                None
            }
        };

        match EntityId::from_form(&self.id) {
            Some(id) => match (full_name, role_id) {
                (Some(full_name), Some(role_id)) if errors.is_empty() => Ok(AccountChange::Update(
                    id,
                    AccountUpdatePayload {
                        full_name,
                        role_id,
                        active: self.is_active(),
                    },
                )),
                _ => Err(errors),
            },
            None => {
                let email = errors.check("email", validation::validate_email(&self.email));
                let password =
                    errors.check("password", validation::validate_password(&self.password));
                match (full_name, email, password, role_id) {
                    (Some(full_name), Some(email), Some(password), Some(role_id)) => {
                        Ok(AccountChange::Create(NewAccountPayload {
                            full_name,
                            email,
                            password,
                            role_id,
                            active: self.is_active(),
                        }))
                    }
                    _ => Err(errors),
                }
            }
        }
    }
}

pub async fn save(
    api: &UsersApi,
    token: &str,
    scope: &ViewScope,
    form: AccountForm,
) -> Submission<AccountForm> {
    let change = match form.validate() {
        Ok(change) => change,
        Err(errors) => return Submission::rejected(form, errors.messages()),
    };

    let accounts = api.accounts(token);
    let result: Result<Notice, GatewayError> = match &change {
        AccountChange::Create(payload) => save_record(scope, &accounts, None, payload, "User").await,
        AccountChange::Update(id, payload) => {
            save_record(scope, &accounts, Some(id), payload, "User").await
        }
    };

    match result {
        Ok(notice) => Submission::Saved(notice),
        Err(e) => {
            // never echo the password back into the form
            let form = AccountForm {
                password: String::new(),
                ..form
            };
            Submission::rejected(form, vec![e.user_message()])
        }
    }
}
