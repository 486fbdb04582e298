// Admin inventory screens: products, categories and suppliers.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use std::sync::Arc;

use super::{confirm_page, render_template, ConfirmQuery, FormState, Page, Shell, Tab};
use super::templates::{CategoriesTemplate, ProductFormView, ProductsTemplate, SuppliersTemplate};
use crate::models::EntityId;
use crate::session::{Capability, Session};
use crate::views::categories::{self, CategoryForm};
use crate::views::products::{self, ProductForm};
use crate::views::suppliers::{self, SupplierForm};
use crate::views::{delete_record, ConfirmForm, DeleteOutcome, ListQuery, Notice, Submission};
use crate::AppState;

// --- Products ---------------------------------------------------------------

async fn render_products(
    state: &AppState,
    session: &Session,
    query: &ListQuery,
    mut notice: Option<Notice>,
    form: FormState<ProductForm>,
) -> Response {
    let shell = Shell::new(session.role, Tab::Products);
    let scope = state.view_scope();

    match products::load(&state.gateways.products, &scope, query, state.page_size()).await {
        Ok(page) => {
            let form = form
                .resolve(
                    ProductForm::default,
                    |id| page.find(id).map(ProductForm::edit),
                    &mut notice,
                    "Product",
                )
                .map(|(form, errors)| {
                    ProductFormView::new(form, errors, &page.categories, &page.suppliers)
                });
            render_template(ProductsTemplate {
                shell,
                page: Some(page),
                error: None,
                notice,
                form,
            })
        }
        Err(e) => render_template(ProductsTemplate {
            shell,
            page: None,
            error: Some(e.user_message()),
            notice,
            form: None,
        }),
    }
}

pub async fn products_list(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    Ok(render_products(&state, &session, &query, None, FormState::Closed).await)
}

pub async fn product_new(State(state): State<Arc<AppState>>, session: Session) -> Page {
    session.require(Capability::ManageInventory)?;
    Ok(render_products(&state, &session, &ListQuery::default(), None, FormState::New).await)
}

pub async fn product_edit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let form = FormState::Edit(EntityId::new(id));
    Ok(render_products(&state, &session, &ListQuery::default(), None, form).await)
}

pub async fn product_save(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let scope = state.view_scope();
    let (notice, form) = match products::save(&state.gateways.products, &scope, form).await {
        Submission::Saved(notice) => (Some(notice), FormState::Closed),
        Submission::Rejected { form, errors } => (None, FormState::Rejected(form, errors)),
    };
    Ok(render_products(&state, &session, &ListQuery::default(), notice, form).await)
}

pub async fn product_delete_confirm(
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let shell = Shell::new(session.role, Tab::Products);
    let action = shell.href(&format!("products/{}/delete", id));
    let cancel = shell.href("products");
    Ok(confirm_page(shell, "product", &query.name, action, cancel))
}

pub async fn product_delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Form(confirm): Form<ConfirmForm>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let id = EntityId::new(id);
    let scope = state.view_scope();
    let resource = state.gateways.products.products();

    match delete_record(&scope, &resource, &id, &confirm, "Product").await {
        DeleteOutcome::NeedsConfirmation => {
            let shell = Shell::new(session.role, Tab::Products);
            let action = shell.href(&format!("products/{}/delete", id));
            let cancel = shell.href("products");
            Ok(confirm_page(shell, "product", "", action, cancel))
        }
        outcome => Ok(render_products(
            &state,
            &session,
            &ListQuery::default(),
            outcome.notice(),
            FormState::Closed,
        )
        .await),
    }
}

// --- Categories -------------------------------------------------------------

async fn render_categories(
    state: &AppState,
    session: &Session,
    query: &ListQuery,
    mut notice: Option<Notice>,
    form: FormState<CategoryForm>,
) -> Response {
    let shell = Shell::new(session.role, Tab::Categories);
    let scope = state.view_scope();

    match categories::load(&state.gateways.products, &scope, query, state.page_size()).await {
        Ok(page) => {
            let (form, form_errors) = form
                .resolve(
                    CategoryForm::default,
                    |id| page.find(id).map(CategoryForm::edit),
                    &mut notice,
                    "Category",
                )
                .unwrap_or_default();
            render_template(CategoriesTemplate {
                shell,
                page: Some(page),
                error: None,
                notice,
                form,
                form_errors,
            })
        }
        Err(e) => render_template(CategoriesTemplate {
            shell,
            page: None,
            error: Some(e.user_message()),
            notice,
            form: CategoryForm::default(),
            form_errors: Vec::new(),
        }),
    }
}

pub async fn categories_list(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    Ok(render_categories(&state, &session, &query, None, FormState::Closed).await)
}

pub async fn category_edit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let form = FormState::Edit(EntityId::new(id));
    Ok(render_categories(&state, &session, &ListQuery::default(), None, form).await)
}

pub async fn category_save(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let scope = state.view_scope();
    let (notice, form) = match categories::save(&state.gateways.products, &scope, form).await {
        Submission::Saved(notice) => (Some(notice), FormState::Closed),
        Submission::Rejected { form, errors } => (None, FormState::Rejected(form, errors)),
    };
    Ok(render_categories(&state, &session, &ListQuery::default(), notice, form).await)
}

pub async fn category_delete_confirm(
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let shell = Shell::new(session.role, Tab::Categories);
    let action = shell.href(&format!("categories/{}/delete", id));
    let cancel = shell.href("categories");
    Ok(confirm_page(shell, "category", &query.name, action, cancel))
}

pub async fn category_delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Form(confirm): Form<ConfirmForm>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let id = EntityId::new(id);
    let scope = state.view_scope();
    let resource = state.gateways.products.categories();

    match delete_record(&scope, &resource, &id, &confirm, "Category").await {
        DeleteOutcome::NeedsConfirmation => {
            let shell = Shell::new(session.role, Tab::Categories);
            let action = shell.href(&format!("categories/{}/delete", id));
            let cancel = shell.href("categories");
            Ok(confirm_page(shell, "category", "", action, cancel))
        }
        outcome => Ok(render_categories(
            &state,
            &session,
            &ListQuery::default(),
            outcome.notice(),
            FormState::Closed,
        )
        .await),
    }
}

// --- Suppliers --------------------------------------------------------------

async fn render_suppliers(
    state: &AppState,
    session: &Session,
    query: &ListQuery,
    mut notice: Option<Notice>,
    form: FormState<SupplierForm>,
) -> Response {
    let shell = Shell::new(session.role, Tab::Suppliers);
    let scope = state.view_scope();

    match suppliers::load(&state.gateways.products, &scope, query, state.page_size()).await {
        Ok(page) => {
            let resolved = form.resolve(
                SupplierForm::default,
                |id| page.find(id).map(SupplierForm::edit),
                &mut notice,
                "Supplier",
            );
            let (form, form_errors) = match resolved {
                Some((form, errors)) => (Some(form), errors),
                None => (None, Vec::new()),
            };
            render_template(SuppliersTemplate {
                shell,
                page: Some(page),
                error: None,
                notice,
                form,
                form_errors,
            })
        }
        Err(e) => render_template(SuppliersTemplate {
            shell,
            page: None,
            error: Some(e.user_message()),
            notice,
            form: None,
            form_errors: Vec::new(),
        }),
    }
}

pub async fn suppliers_list(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    Ok(render_suppliers(&state, &session, &query, None, FormState::Closed).await)
}

pub async fn supplier_new(State(state): State<Arc<AppState>>, session: Session) -> Page {
    session.require(Capability::ManageInventory)?;
    Ok(render_suppliers(&state, &session, &ListQuery::default(), None, FormState::New).await)
}

pub async fn supplier_edit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let form = FormState::Edit(EntityId::new(id));
    Ok(render_suppliers(&state, &session, &ListQuery::default(), None, form).await)
}

pub async fn supplier_save(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<SupplierForm>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let scope = state.view_scope();
    let (notice, form) = match suppliers::save(&state.gateways.products, &scope, form).await {
        Submission::Saved(notice) => (Some(notice), FormState::Closed),
        Submission::Rejected { form, errors } => (None, FormState::Rejected(form, errors)),
    };
    Ok(render_suppliers(&state, &session, &ListQuery::default(), notice, form).await)
}

pub async fn supplier_delete_confirm(
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let shell = Shell::new(session.role, Tab::Suppliers);
    let action = shell.href(&format!("suppliers/{}/delete", id));
    let cancel = shell.href("suppliers");
    Ok(confirm_page(shell, "supplier", &query.name, action, cancel))
}

pub async fn supplier_delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Form(confirm): Form<ConfirmForm>,
) -> Page {
    session.require(Capability::ManageInventory)?;
    let id = EntityId::new(id);
    let scope = state.view_scope();
    let resource = state.gateways.products.suppliers();

    match delete_record(&scope, &resource, &id, &confirm, "Supplier").await {
        DeleteOutcome::NeedsConfirmation => {
            let shell = Shell::new(session.role, Tab::Suppliers);
            let action = shell.href(&format!("suppliers/{}/delete", id));
            let cancel = shell.href("suppliers");
            Ok(confirm_page(shell, "supplier", "", action, cancel))
        }
        outcome => Ok(render_suppliers(
            &state,
            &session,
            &ListQuery::default(),
            outcome.notice(),
            FormState::Closed,
        )
        .await),
    }
}
