// Server-rendered front end.
// Uses Askama templates; every screen is a full page and every action a form post.

mod inventory;
mod overview;
mod services;
pub mod shell;
mod templates;
mod users;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::login::{self, LoginForm, LoginOutcome};
use crate::models::EntityId;
use crate::session::{self, guard::LOGIN_PATH, Session};
use crate::views::Notice;
use crate::AppState;

pub use shell::{Shell, Tab};
pub use templates::*;

/// Handler result: a rendered page, or the status a capability check failed with.
type Page = Result<Response, StatusCode>;

// Helper to render templates and handle errors
fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response()
        }
    }
}

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/", get(landing))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout).post(logout))
        // Admin area
        .route("/admin", get(overview::admin_dashboard))
        .route("/admin/dashboard", get(overview::admin_dashboard))
        .route(
            "/admin/products",
            get(inventory::products_list).post(inventory::product_save),
        )
        .route("/admin/products/new", get(inventory::product_new))
        .route("/admin/products/:id/edit", get(inventory::product_edit))
        .route(
            "/admin/products/:id/delete",
            get(inventory::product_delete_confirm).post(inventory::product_delete),
        )
        .route(
            "/admin/categories",
            get(inventory::categories_list).post(inventory::category_save),
        )
        .route("/admin/categories/:id/edit", get(inventory::category_edit))
        .route(
            "/admin/categories/:id/delete",
            get(inventory::category_delete_confirm).post(inventory::category_delete),
        )
        .route(
            "/admin/suppliers",
            get(inventory::suppliers_list).post(inventory::supplier_save),
        )
        .route("/admin/suppliers/new", get(inventory::supplier_new))
        .route("/admin/suppliers/:id/edit", get(inventory::supplier_edit))
        .route(
            "/admin/suppliers/:id/delete",
            get(inventory::supplier_delete_confirm).post(inventory::supplier_delete),
        )
        .route(
            "/admin/services",
            get(services::services_page).post(services::service_save),
        )
        .route("/admin/services/new", get(services::service_new))
        .route("/admin/services/:id/edit", get(services::service_edit))
        .route(
            "/admin/services/:id/delete",
            get(services::service_delete_confirm).post(services::service_delete),
        )
        .route(
            "/admin/services/assign",
            get(services::assign_form).post(services::assign_submit),
        )
        .route("/admin/service-categories", axum::routing::post(services::category_save))
        .route("/admin/service-categories/new", get(services::category_new))
        .route("/admin/service-categories/:id/edit", get(services::category_edit))
        .route(
            "/admin/service-categories/:id/delete",
            get(services::category_delete_confirm).post(services::category_delete),
        )
        .route("/admin/users", get(users::users_list).post(users::user_save))
        .route("/admin/users/new", get(users::user_new))
        .route("/admin/users/:id/edit", get(users::user_edit))
        .route(
            "/admin/users/:id/delete",
            get(users::user_delete_confirm).post(users::user_delete),
        )
        .route("/admin/reports", get(overview::reports_preview))
        .route("/admin/reports/download", get(overview::reports_download))
        // Employee area
        .route("/user", get(overview::employee_dashboard))
        .route("/user/dashboard", get(overview::employee_dashboard))
        .route("/user/products", get(overview::employee_products))
        .route("/user/services", get(services::employee_services))
}

/// What the create/edit modal of a list view shows.
enum FormState<F> {
    Closed,
    New,
    Edit(EntityId),
    /// Submitted but not saved, with the reasons
    Rejected(F, Vec<String>),
}

impl<F> FormState<F> {
    /// Resolve against the freshly loaded list. An edit of a record that no
    /// longer exists closes the form and says so.
    fn resolve(
        self,
        blank: impl FnOnce() -> F,
        find: impl FnOnce(&EntityId) -> Option<F>,
        notice: &mut Option<Notice>,
        label: &str,
    ) -> Option<(F, Vec<String>)> {
        match self {
            FormState::Closed => None,
            FormState::New => Some((blank(), Vec::new())),
            FormState::Edit(id) => match find(&id) {
                Some(form) => Some((form, Vec::new())),
                None => {
                    *notice = Some(Notice::error(format!("{} not found.", label)));
                    None
                }
            },
            FormState::Rejected(form, errors) => Some((form, errors)),
        }
    }
}

/// `?name=` carried by delete links so the dialog can name the record
/// without asking the backend.
#[derive(Debug, Default, Deserialize)]
struct ConfirmQuery {
    #[serde(default)]
    name: String,
}

fn confirm_page(shell: Shell, noun: &str, name: &str, action: String, cancel_href: String) -> Response {
    let message = if name.trim().is_empty() {
        format!("Delete this {}? This cannot be undone.", noun)
    } else {
        format!("Delete {} \"{}\"? This cannot be undone.", noun, name.trim())
    };
    render_template(ConfirmTemplate {
        shell,
        message,
        action,
        cancel_href,
    })
}

// Landing page
async fn landing(jar: CookieJar) -> Response {
    let home = session::get_role(&jar).map(|role| role.home_path());
    render_template(LandingTemplate {
        home,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// Login page
async fn login_page() -> Response {
    render_template(LoginTemplate {
        error: None,
        email: String::new(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// Login submit
async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let outcome = login::submit(&state.gateways.users, &state.login_gate, &form).await;
    match outcome {
        LoginOutcome::Success { session, redirect } => {
            let jar = session::set_session(jar, &session.token, session.role, &state.config.session);
            (jar, Redirect::to(redirect)).into_response()
        }
        failed => {
            let status = match failed {
                LoginOutcome::Busy => StatusCode::CONFLICT,
                _ => StatusCode::UNAUTHORIZED,
            };
            let template = LoginTemplate {
                error: failed.error_message().map(str::to_string),
                email: form.email.trim().to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            };
            let html = template.render().unwrap_or_else(|e| format!("Error: {}", e));
            (status, Html(html)).into_response()
        }
    }
}

// Logout
async fn logout(jar: CookieJar, session: Option<Session>) -> impl IntoResponse {
    if let Some(session) = session {
        tracing::info!(role = %session.role, "Signed out");
    }
    (session::clear_session(jar), Redirect::to(LOGIN_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_support::StubBackend;
    use axum::{
        body::Body,
        http::{header, Request},
        routing::{delete, get as stub_get, post},
        Json,
    };
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn config_for(stub: &StubBackend) -> Config {
        let mut config = Config::default();
        config.backends.products_url = stub.base_url.clone();
        config.backends.services_url = stub.base_url.clone();
        config.backends.users_url = stub.base_url.clone();
        config.backends.appointments_url = format!("{}/appointments", stub.base_url);
        config
    }

    fn app(config: Config) -> Router {
        crate::create_app(Arc::new(AppState::new(config).unwrap()))
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>, form: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        match form {
            Some(form) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const ADMIN: &str = "token=t-admin; role=admin";
    const EMPLOYEE: &str = "token=t-emp; role=employee";

    #[tokio::test]
    async fn test_guard_redirects_wrong_roles() {
        let app = app(Config::default());
        let cases = [
            ("/admin/products", None),
            ("/admin/users", Some(EMPLOYEE)),
            ("/admin", Some("token=x; role=superuser")),
            ("/user/products", Some(ADMIN)),
            ("/user", None),
        ];
        for (path, cookie) in cases {
            let response = app.clone().oneshot(request("GET", path, cookie, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert_eq!(response.headers()[header::LOCATION], "/login", "{path}");
        }
    }

    #[tokio::test]
    async fn test_public_pages_render() {
        let app = app(Config::default());
        for path in ["/", "/login"] {
            let response = app.clone().oneshot(request("GET", path, None, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn test_login_sets_cookies_and_redirects_by_role() {
        let stub = StubBackend::spawn(Router::new().route(
            "/login",
            post(|| async { Json(json!({"token": "t-9", "user": {"role": "user"}})) }),
        ))
        .await;
        let app = app(config_for(&stub));

        let response = app
            .oneshot(request("POST", "/login", None, Some("email=ben%40wash.io&password=pw")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/user");

        let cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cookies.iter().any(|c| c.starts_with("token=t-9") && c.contains("Max-Age=86400")));
        assert!(cookies.iter().any(|c| c.starts_with("role=employee")));
    }

    #[tokio::test]
    async fn test_failed_login_sets_no_cookie() {
        let stub = StubBackend::spawn(Router::new().route(
            "/login",
            post(|| async { Json(json!({"message": "ok"})) }),
        ))
        .await;
        let app = app(config_for(&stub));

        let response = app
            .oneshot(request("POST", "/login", None, Some("email=a%40wash.io&password=pw")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(response)
            .await
            .contains("Login succeeded but no token or user returned."));
    }

    #[tokio::test]
    async fn test_logout_clears_both_cookies() {
        let app = app(Config::default());
        let response = app
            .oneshot(request("POST", "/logout", Some(ADMIN), Some("")))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/login");
        let cleared = response.headers().get_all(header::SET_COOKIE).iter().count();
        assert_eq!(cleared, 2);
    }

    fn category_backend() -> Router {
        Router::new()
            .route(
                "/api/categories",
                stub_get(|| async { Json(json!([{"id": 3, "name": "Wax"}])) }),
            )
            .route(
                "/api/categories/:id",
                delete(|| async { StatusCode::NO_CONTENT }),
            )
    }

    #[tokio::test]
    async fn test_delete_dialog_issues_no_requests() {
        let stub = StubBackend::spawn(category_backend()).await;
        let app = app(config_for(&stub));

        let response = app
            .clone()
            .oneshot(request("GET", "/admin/categories/3/delete?name=Wax", Some(ADMIN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Delete category &quot;Wax&quot;?"));

        let response = app
            .oneshot(request("POST", "/admin/categories/3/delete", Some(ADMIN), Some("")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stub.total(), 0);
    }

    #[tokio::test]
    async fn test_confirmed_delete_then_single_refetch() {
        let stub = StubBackend::spawn(category_backend()).await;
        let app = app(config_for(&stub));

        let response = app
            .oneshot(request(
                "POST",
                "/admin/categories/3/delete",
                Some(ADMIN),
                Some("confirm=yes"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Category deleted."));

        let calls: Vec<(String, String)> = stub
            .requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect();
        assert_eq!(
            calls,
            vec![
                ("DELETE".to_string(), "/api/categories/3".to_string()),
                ("GET".to_string(), "/api/categories".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_failure_renders_inline_error() {
        let stub = StubBackend::spawn(Router::new().route(
            "/api/suppliers",
            stub_get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;
        let app = app(config_for(&stub));

        let response = app
            .oneshot(request("GET", "/admin/suppliers", Some(ADMIN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Request failed (500 Internal Server Error)"));
    }

    fn twelve_suppliers() -> Router {
        Router::new().route(
            "/api/suppliers",
            stub_get(|| async {
                let rows: Vec<_> = (1..=12)
                    .map(|n| json!({"id": n, "name": format!("Supplier {n:02}")}))
                    .collect();
                Json(json!(rows))
            }),
        )
    }

    #[tokio::test]
    async fn test_next_on_last_page_links_back_to_it() {
        let stub = StubBackend::spawn(twelve_suppliers()).await;
        let app = app(config_for(&stub));

        let response = app
            .clone()
            .oneshot(request("GET", "/admin/suppliers?page=3", Some(ADMIN), None))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Supplier 11"));
        assert!(!html.contains("Supplier 10"));
        assert!(html.contains(
            r#"<a href="/admin/suppliers?q=&amp;page=3" class="disabled" aria-disabled="true">Next</a>"#
        ));
        assert!(html.contains(r#"<a href="/admin/suppliers?q=&amp;page=2">Prev</a>"#));

        let response = app
            .oneshot(request("GET", "/admin/suppliers?page=1", Some(ADMIN), None))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains(r#"<a href="/admin/suppliers?q=&amp;page=2">Next</a>"#));
        assert!(html.contains(
            r#"<a href="/admin/suppliers?q=&amp;page=1" class="disabled" aria-disabled="true">Prev</a>"#
        ));
    }

    #[tokio::test]
    async fn test_garbled_page_falls_back_to_first() {
        let stub = StubBackend::spawn(twelve_suppliers()).await;
        let app = app(config_for(&stub));

        for uri in ["/admin/suppliers?page=abc", "/admin/suppliers?page="] {
            let response = app
                .clone()
                .oneshot(request("GET", uri, Some(ADMIN), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let html = body_text(response).await;
            assert!(html.contains("Supplier 01"), "{uri}");
            assert!(!html.contains("Supplier 06"), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_employee_catalog_hides_prices() {
        let stub = StubBackend::spawn(Router::new().route(
            "/api/products",
            stub_get(|| async {
                Json(json!([{"product_id": 1, "name": "Foam", "price": 99.5, "stock": 4,
                             "categories": {"name": "Washing"}}]))
            }),
        ))
        .await;
        let app = app(config_for(&stub));

        let response = app
            .oneshot(request("GET", "/user/products", Some(EMPLOYEE), None))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Foam"));
        assert!(html.contains("Washing"));
        assert!(!html.contains("99.50"));
        assert!(!html.contains("/delete"));
    }

    #[tokio::test]
    async fn test_reports_download_is_csv_attachment() {
        let stub = StubBackend::spawn(
            Router::new()
                .route(
                    "/api/reports/products",
                    stub_get(|| async { Json(json!([{"product_id": 1, "name": "Foam"}])) }),
                )
                .route("/api/reports/suppliers", stub_get(|| async { Json(json!([])) })),
        )
        .await;
        let app = app(config_for(&stub));

        let response = app
            .oneshot(request("GET", "/admin/reports/download", Some(ADMIN), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Carwash_Reports.csv\""
        );
        assert!(body_text(response).await.contains("Foam"));
    }
}
