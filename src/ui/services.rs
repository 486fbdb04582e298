// Services screens: categories and services tables, assignment flow, and the
// employee read-only listing.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use std::sync::Arc;

use super::templates::{AssignTemplate, ServiceCategoryFormView, ServiceFormView, ServicesTemplate};
use super::{confirm_page, render_template, ConfirmQuery, FormState, Page, Shell, Tab};
use crate::models::EntityId;
use crate::session::{Capability, Session};
use crate::views::services::{
    self, AssignmentForm, ServiceCategoryForm, ServiceForm, ServicesQuery,
};
use crate::views::{delete_record, ConfirmForm, DeleteOutcome, Notice, Submission};
use crate::AppState;

/// Which of the two forms is open.
enum OpenForm {
    None,
    Category(FormState<ServiceCategoryForm>),
    Service(FormState<ServiceForm>),
}

async fn render_services(
    state: &AppState,
    session: &Session,
    query: &ServicesQuery,
    mut notice: Option<Notice>,
    open: OpenForm,
    read_only: bool,
) -> Response {
    let shell = Shell::new(session.role, Tab::Services);
    let scope = state.view_scope();

    match services::load(&state.gateways.services, &scope, query, state.page_size()).await {
        Ok(page) => {
            let mut category_form = None;
            let mut service_form = None;
            match open {
                OpenForm::None => {}
                OpenForm::Category(form) => {
                    category_form = form
                        .resolve(
                            ServiceCategoryForm::default,
                            |id| page.find_category(id).map(ServiceCategoryForm::edit),
                            &mut notice,
                            "Service category",
                        )
                        .map(|(form, errors)| ServiceCategoryFormView { form, errors });
                }
                OpenForm::Service(form) => {
                    service_form = form
                        .resolve(
                            ServiceForm::default,
                            |id| page.find_service(id).map(ServiceForm::edit),
                            &mut notice,
                            "Service",
                        )
                        .map(|(form, errors)| {
                            ServiceFormView::new(form, errors, &page.all_categories)
                        });
                }
            }
            render_template(ServicesTemplate {
                shell,
                page: Some(page),
                error: None,
                notice,
                category_form,
                service_form,
                read_only,
            })
        }
        Err(e) => render_template(ServicesTemplate {
            shell,
            page: None,
            error: Some(e.user_message()),
            notice,
            category_form: None,
            service_form: None,
            read_only,
        }),
    }
}

async fn render_admin(
    state: &AppState,
    session: &Session,
    notice: Option<Notice>,
    open: OpenForm,
) -> Response {
    render_services(state, session, &ServicesQuery::default(), notice, open, false).await
}

pub async fn services_page(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<ServicesQuery>,
) -> Page {
    session.require(Capability::ManageServices)?;
    Ok(render_services(&state, &session, &query, None, OpenForm::None, false).await)
}

pub async fn employee_services(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<ServicesQuery>,
) -> Response {
    render_services(&state, &session, &query, None, OpenForm::None, true).await
}

// --- Services ---------------------------------------------------------------

pub async fn service_new(State(state): State<Arc<AppState>>, session: Session) -> Page {
    session.require(Capability::ManageServices)?;
    Ok(render_admin(&state, &session, None, OpenForm::Service(FormState::New)).await)
}

pub async fn service_edit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Page {
    session.require(Capability::ManageServices)?;
    let open = OpenForm::Service(FormState::Edit(EntityId::new(id)));
    Ok(render_admin(&state, &session, None, open).await)
}

pub async fn service_save(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<ServiceForm>,
) -> Page {
    session.require(Capability::ManageServices)?;
    let scope = state.view_scope();
    let (notice, open) = match services::save_service(&state.gateways.services, &scope, form).await {
        Submission::Saved(notice) => (Some(notice), OpenForm::None),
        Submission::Rejected { form, errors } => {
            (None, OpenForm::Service(FormState::Rejected(form, errors)))
        }
    };
    Ok(render_admin(&state, &session, notice, open).await)
}

pub async fn service_delete_confirm(
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Page {
    session.require(Capability::ManageServices)?;
    let shell = Shell::new(session.role, Tab::Services);
    let action = shell.href(&format!("services/{}/delete", id));
    let cancel = shell.href("services");
    Ok(confirm_page(shell, "service", &query.name, action, cancel))
}

pub async fn service_delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Form(confirm): Form<ConfirmForm>,
) -> Page {
    session.require(Capability::ManageServices)?;
    let id = EntityId::new(id);
    let scope = state.view_scope();
    let resource = state.gateways.services.services();

    match delete_record(&scope, &resource, &id, &confirm, "Service").await {
        DeleteOutcome::NeedsConfirmation => {
            let shell = Shell::new(session.role, Tab::Services);
            let action = shell.href(&format!("services/{}/delete", id));
            let cancel = shell.href("services");
            Ok(confirm_page(shell, "service", "", action, cancel))
        }
        outcome => Ok(render_admin(&state, &session, outcome.notice(), OpenForm::None).await),
    }
}

// --- Service categories -----------------------------------------------------

pub async fn category_new(State(state): State<Arc<AppState>>, session: Session) -> Page {
    session.require(Capability::ManageServices)?;
    Ok(render_admin(&state, &session, None, OpenForm::Category(FormState::New)).await)
}

pub async fn category_edit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Page {
    session.require(Capability::ManageServices)?;
    let open = OpenForm::Category(FormState::Edit(EntityId::new(id)));
    Ok(render_admin(&state, &session, None, open).await)
}

pub async fn category_save(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<ServiceCategoryForm>,
) -> Page {
    session.require(Capability::ManageServices)?;
    let scope = state.view_scope();
    let (notice, open) = match services::save_category(&state.gateways.services, &scope, form).await
    {
        Submission::Saved(notice) => (Some(notice), OpenForm::None),
        Submission::Rejected { form, errors } => {
            (None, OpenForm::Category(FormState::Rejected(form, errors)))
        }
    };
    Ok(render_admin(&state, &session, notice, open).await)
}

pub async fn category_delete_confirm(
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Page {
    session.require(Capability::ManageServices)?;
    let shell = Shell::new(session.role, Tab::Services);
    let action = format!("/admin/service-categories/{}/delete", id);
    let cancel = shell.href("services");
    Ok(confirm_page(shell, "service category", &query.name, action, cancel))
}

pub async fn category_delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Form(confirm): Form<ConfirmForm>,
) -> Page {
    session.require(Capability::ManageServices)?;
    let id = EntityId::new(id);
    let scope = state.view_scope();
    let resource = state.gateways.services.categories();

    match delete_record(&scope, &resource, &id, &confirm, "Service category").await {
        DeleteOutcome::NeedsConfirmation => {
            let shell = Shell::new(session.role, Tab::Services);
            let action = format!("/admin/service-categories/{}/delete", id);
            let cancel = shell.href("services");
            Ok(confirm_page(shell, "service category", "", action, cancel))
        }
        outcome => Ok(render_admin(&state, &session, outcome.notice(), OpenForm::None).await),
    }
}

// --- Assignment -------------------------------------------------------------

const DEFAULT_ASSIGN_ROWS: usize = 3;
const MAX_ASSIGN_ROWS: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct AssignQuery {
    #[serde(default)]
    rows: Option<usize>,
}

async fn render_assign(
    state: &AppState,
    session: &Session,
    form: &AssignmentForm,
    min_rows: usize,
    form_errors: Vec<String>,
    report: Option<services::AssignmentReport>,
) -> Response {
    let shell = Shell::new(session.role, Tab::Services);
    let scope = state.view_scope();
    let options = services::load_assignment_options(
        &state.gateways.services,
        &state.gateways.products,
        &scope,
        &state.config.views.service_product_category_id,
    )
    .await;

    match options {
        Ok(options) => render_template(AssignTemplate::new(
            shell,
            &options,
            form,
            min_rows,
            form_errors,
            report,
        )),
        Err(e) => render_template(AssignTemplate::failed(shell, e.user_message())),
    }
}

pub async fn assign_form(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<AssignQuery>,
) -> Page {
    session.require(Capability::ManageServices)?;
    let rows = query
        .rows
        .unwrap_or(DEFAULT_ASSIGN_ROWS)
        .clamp(1, MAX_ASSIGN_ROWS);
    Ok(render_assign(&state, &session, &AssignmentForm::default(), rows, Vec::new(), None).await)
}

/// Rows repeat `product_id` / `quantity`, hence the multi-value form extractor.
pub async fn assign_submit(
    State(state): State<Arc<AppState>>,
    session: Session,
    axum_extra::extract::Form(form): axum_extra::extract::Form<AssignmentForm>,
) -> Page {
    session.require(Capability::ManageServices)?;

    let batch = match form.validate() {
        Ok(batch) => batch,
        Err(errors) => {
            let page = render_assign(
                &state,
                &session,
                &form,
                DEFAULT_ASSIGN_ROWS,
                errors.messages(),
                None,
            )
            .await;
            return Ok(page);
        }
    };

    let scope = state.view_scope();
    let options = match services::load_assignment_options(
        &state.gateways.services,
        &state.gateways.products,
        &scope,
        &state.config.views.service_product_category_id,
    )
    .await
    {
        Ok(options) => options,
        Err(e) => {
            let shell = Shell::new(session.role, Tab::Services);
            return Ok(render_template(AssignTemplate::failed(shell, e.user_message())));
        }
    };

    let report = services::assign(&state.gateways.services, &scope, &options, &batch).await;
    // a fully assigned batch starts a fresh form; otherwise keep what was typed
    let form = if report.all_assigned() {
        AssignmentForm::default()
    } else {
        form
    };
    let shell = Shell::new(session.role, Tab::Services);
    Ok(render_template(AssignTemplate::new(
        shell,
        &options,
        &form,
        DEFAULT_ASSIGN_ROWS,
        Vec::new(),
        Some(report),
    )))
}
