//! View modules: fetch, validate and write logic behind every screen.
//!
//! A view never renders HTML itself. It loads what its screen needs through
//! the gateway adapters inside a [`ViewScope`] and hands plain data to the
//! `ui` module, which owns the templates.

pub mod categories;
pub mod dashboard;
pub mod listing;
pub mod products;
pub mod reports;
pub mod scope;
pub mod services;
pub mod suppliers;
pub mod users;
pub mod validation;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::gateway::{GatewayError, Resource};
use crate::models::EntityId;

pub use listing::{ListQuery, Listing, PageLink, Pager};
pub use scope::ViewScope;

/// Banner shown above a view after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice::Success(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Error(m) => m,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Notice::Success(_) => "notice-success",
            Notice::Error(_) => "notice-error",
        }
    }
}

/// Body of a delete confirmation dialog. Only `confirm=yes` deletes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirm: String,
}

impl ConfirmForm {
    pub fn confirmed(&self) -> bool {
        self.confirm == "yes"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Not confirmed; nothing was sent.
    NeedsConfirmation,
    Deleted(Notice),
    Failed(Notice),
}

impl DeleteOutcome {
    pub fn notice(&self) -> Option<Notice> {
        match self {
            DeleteOutcome::NeedsConfirmation => None,
            DeleteOutcome::Deleted(n) | DeleteOutcome::Failed(n) => Some(n.clone()),
        }
    }
}

/// Delete one record if, and only if, the dialog was confirmed.
pub async fn delete_record<T: DeserializeOwned>(
    scope: &ViewScope,
    resource: &Resource<T>,
    id: &EntityId,
    confirm: &ConfirmForm,
    label: &str,
) -> DeleteOutcome {
    if !confirm.confirmed() {
        return DeleteOutcome::NeedsConfirmation;
    }

    match scope.run(resource.delete(id)).await {
        Ok(()) => {
            tracing::info!(resource = resource.path(), %id, "Record deleted");
            DeleteOutcome::Deleted(Notice::success(format!("{} deleted.", label)))
        }
        Err(e) => DeleteOutcome::Failed(Notice::error(e.user_message())),
    }
}

/// POST when `id` is absent, PUT to `…/{id}` otherwise.
pub async fn save_record<T, B>(
    scope: &ViewScope,
    resource: &Resource<T>,
    id: Option<&EntityId>,
    payload: &B,
    label: &str,
) -> Result<Notice, GatewayError>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    match id {
        Some(id) => {
            scope.run(resource.update(id, payload)).await?;
            tracing::info!(resource = resource.path(), %id, "Record updated");
            Ok(Notice::success(format!("{} updated.", label)))
        }
        None => {
            scope.run(resource.create(payload)).await?;
            tracing::info!(resource = resource.path(), "Record created");
            Ok(Notice::success(format!("{} created.", label)))
        }
    }
}

/// Result of submitting a create/update form.
#[derive(Debug, Clone)]
pub enum Submission<F> {
    Saved(Notice),
    /// Form goes back to the user, still open, with these messages.
    Rejected { form: F, errors: Vec<String> },
}

impl<F> Submission<F> {
    pub fn rejected(form: F, errors: Vec<String>) -> Self {
        Submission::Rejected { form, errors }
    }
}

/// Run a validated save and turn a backend failure back into a rejection.
pub(crate) async fn submit<F, T, B>(
    scope: &ViewScope,
    resource: &Resource<T>,
    form: F,
    id: Option<EntityId>,
    payload: Result<B, validation::FieldErrors>,
    label: &str,
) -> Submission<F>
where
    T: DeserializeOwned,
    B: Serialize,
{
    let payload = match payload {
        Ok(payload) => payload,
        Err(errors) => return Submission::rejected(form, errors.messages()),
    };

    match save_record(scope, resource, id.as_ref(), &payload, label).await {
        Ok(notice) => Submission::Saved(notice),
        Err(e) => Submission::rejected(form, vec![e.user_message()]),
    }
}

/// Find a record by id in an already fetched list.
pub fn find_by_id<'a, T>(
    items: &'a [T],
    id: &EntityId,
    key: impl Fn(&T) -> &EntityId,
) -> Option<&'a T> {
    items.iter().find(|item| key(item) == id)
}
