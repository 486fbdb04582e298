// Admin user accounts screen. Every backend call carries the session token.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use std::sync::Arc;

use super::templates::{AccountFormView, UsersTemplate};
use super::{confirm_page, render_template, ConfirmQuery, FormState, Page, Shell, Tab};
use crate::models::EntityId;
use crate::session::{Capability, Session};
use crate::views::users::{self, AccountForm};
use crate::views::{delete_record, ConfirmForm, DeleteOutcome, ListQuery, Notice, Submission};
use crate::AppState;

async fn render_users(
    state: &AppState,
    session: &Session,
    query: &ListQuery,
    mut notice: Option<Notice>,
    form: FormState<AccountForm>,
) -> Response {
    let shell = Shell::new(session.role, Tab::Users);
    let scope = state.view_scope();

    match users::load(&state.gateways.users, &session.token, &scope, query, state.page_size()).await {
        Ok(page) => {
            let form = form
                .resolve(
                    AccountForm::new_account,
                    |id| page.find(id).map(AccountForm::edit),
                    &mut notice,
                    "User",
                )
                .map(|(form, errors)| AccountFormView::new(form, errors));
            render_template(UsersTemplate {
                shell,
                page: Some(page),
                error: None,
                notice,
                form,
            })
        }
        Err(e) => render_template(UsersTemplate {
            shell,
            page: None,
            error: Some(e.user_message()),
            notice,
            form: None,
        }),
    }
}

pub async fn users_list(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Page {
    session.require(Capability::ManageUsers)?;
    Ok(render_users(&state, &session, &query, None, FormState::Closed).await)
}

pub async fn user_new(State(state): State<Arc<AppState>>, session: Session) -> Page {
    session.require(Capability::ManageUsers)?;
    Ok(render_users(&state, &session, &ListQuery::default(), None, FormState::New).await)
}

pub async fn user_edit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Page {
    session.require(Capability::ManageUsers)?;
    let form = FormState::Edit(EntityId::new(id));
    Ok(render_users(&state, &session, &ListQuery::default(), None, form).await)
}

pub async fn user_save(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<AccountForm>,
) -> Page {
    session.require(Capability::ManageUsers)?;
    let scope = state.view_scope();
    let (notice, form) = match users::save(&state.gateways.users, &session.token, &scope, form).await {
        Submission::Saved(notice) => (Some(notice), FormState::Closed),
        Submission::Rejected { form, errors } => (None, FormState::Rejected(form, errors)),
    };
    Ok(render_users(&state, &session, &ListQuery::default(), notice, form).await)
}

pub async fn user_delete_confirm(
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Page {
    session.require(Capability::ManageUsers)?;
    let shell = Shell::new(session.role, Tab::Users);
    let action = shell.href(&format!("users/{}/delete", id));
    let cancel = shell.href("users");
    Ok(confirm_page(shell, "user", &query.name, action, cancel))
}

pub async fn user_delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Form(confirm): Form<ConfirmForm>,
) -> Page {
    session.require(Capability::ManageUsers)?;
    let id = EntityId::new(id);
    let scope = state.view_scope();
    let resource = state.gateways.users.accounts(&session.token);

    match delete_record(&scope, &resource, &id, &confirm, "User").await {
        DeleteOutcome::NeedsConfirmation => {
            let shell = Shell::new(session.role, Tab::Users);
            let action = shell.href(&format!("users/{}/delete", id));
            let cancel = shell.href("users");
            Ok(confirm_page(shell, "user", "", action, cancel))
        }
        outcome => Ok(render_users(
            &state,
            &session,
            &ListQuery::default(),
            outcome.notice(),
            FormState::Closed,
        )
        .await),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::test_support::StubBackend;
    use crate::AppState;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::get,
        Json, Router,
    };
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_users_list_forwards_session_token() {
        let stub = StubBackend::spawn(Router::new().route(
            "/users",
            get(|headers: axum::http::HeaderMap| async move {
                let authorized = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer t-admin");
                if authorized {
                    Json(json!([{"id": 1, "full_name": "Ana Admin", "email": "ana@wash.io", "role_id": 1}]))
                } else {
                    Json(json!([]))
                }
            }),
        ))
        .await;
        let mut config = Config::default();
        config.backends.users_url = stub.base_url.clone();
        let app = crate::create_app(Arc::new(AppState::new(config).unwrap()));

        let request = Request::builder()
            .uri("/admin/users")
            .header(header::COOKIE, "token=t-admin; role=admin")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Ana Admin"));
        assert!(html.contains("Active"));
    }
}
