// Dashboards, the employee product catalog and the inventory report.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::templates::{
    CatalogTemplate, DashboardTemplate, EmployeeDashboardTemplate, ReportsTemplate,
};
use super::{render_template, Page, Shell, Tab};
use crate::api::error::ApiError;
use crate::session::{Capability, Session};
use crate::views::{dashboard, products, reports, ListQuery};
use crate::AppState;

/// The admin area guard already restricted this to admins.
pub async fn admin_dashboard(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let scope = state.view_scope();
    let gateways = &state.gateways;

    let result = dashboard::load_admin(
        &gateways.products,
        &gateways.services,
        &gateways.appointments,
        &scope,
    )
    .await;
    let (summary, error) = match result {
        Ok(summary) => (Some(summary), None),
        Err(message) => (None, Some(message)),
    };

    render_template(DashboardTemplate {
        shell: Shell::new(session.role, Tab::Dashboard),
        summary,
        error,
    })
}

pub async fn employee_dashboard(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let scope = state.view_scope();
    let (total_products, error) = match dashboard::load_employee(&state.gateways.products, &scope).await {
        Ok(count) => (Some(count), None),
        Err(e) => (None, Some(e.user_message())),
    };

    render_template(EmployeeDashboardTemplate {
        shell: Shell::new(session.role, Tab::Dashboard),
        total_products,
        error,
    })
}

pub async fn employee_products(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Response {
    let scope = state.view_scope();
    let result = products::load_catalog(&state.gateways.products, &scope, &query, state.page_size()).await;
    let (listing, error) = match result {
        Ok(listing) => (Some(listing), None),
        Err(e) => (None, Some(e.user_message())),
    };

    render_template(CatalogTemplate {
        shell: Shell::new(session.role, Tab::Products),
        listing,
        error,
    })
}

pub async fn reports_preview(State(state): State<Arc<AppState>>, session: Session) -> Page {
    session.require(Capability::ViewReports)?;
    let scope = state.view_scope();
    let (document, error) = match reports::load(&state.gateways.products, &scope).await {
        Ok(document) => (Some(document), None),
        Err(e) => (None, Some(e.user_message())),
    };

    Ok(render_template(ReportsTemplate {
        shell: Shell::new(session.role, Tab::Reports),
        document,
        error,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
    }))
}

/// The same document as the preview, as a CSV attachment.
pub async fn reports_download(State(state): State<Arc<AppState>>, session: Session) -> Page {
    session.require(Capability::ViewReports)?;
    let scope = state.view_scope();

    let document = match reports::load(&state.gateways.products, &scope).await {
        Ok(document) => document,
        Err(e) => {
            return Ok(ApiError::from(e).into_response());
        }
    };

    match reports::to_csv(&document) {
        Ok(bytes) => {
            let disposition = format!("attachment; filename=\"{}\"", reports::REPORT_FILENAME);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "CSV export failed");
            Ok(ApiError::internal("Failed to build report").into_response())
        }
    }
}
