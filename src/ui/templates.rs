// Askama template definitions

use askama::Template;

use super::shell::Shell;
use crate::models::{Category, EntityId, Product, Service, ServiceCategory, Supplier, Variant};
use crate::views::categories::{CategoriesPage, CategoryForm};
use crate::views::dashboard::AdminSummary;
use crate::views::products::{CatalogRow, ProductForm, ProductsPage};
use crate::views::reports::ReportDocument;
use crate::views::services::{
    AssignmentForm, AssignmentOptions, AssignmentReport, ServiceCategoryForm, ServiceForm,
    ServicesPage,
};
use crate::views::suppliers::{SupplierForm, SuppliersPage};
use crate::views::users::{AccountForm, UsersPage};
use crate::views::{Listing, Notice};

/// Custom filters for Askama templates
mod filters {
    /// Shorten to `len` characters, marking the cut with an ellipsis.
    pub fn excerpt(s: &str, len: usize) -> ::askama::Result<String> {
        if s.chars().count() <= len {
            Ok(s.to_string())
        } else {
            let cut: String = s.chars().take(len).collect();
            Ok(format!("{}...", cut))
        }
    }
}

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn list<'a, T: 'a>(
        items: impl IntoIterator<Item = &'a T>,
        selected: &str,
        value: impl Fn(&T) -> &EntityId,
        label: impl Fn(&T) -> &str,
    ) -> Vec<Self> {
        items
            .into_iter()
            .map(|item| {
                let value = value(item).to_string();
                SelectOption {
                    selected: value == selected.trim(),
                    label: label(item).to_string(),
                    value,
                }
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    /// Home of the signed-in role, if any
    pub home: Option<&'static str>,
    pub version: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
    pub version: String,
}

#[derive(Template)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub shell: Shell,
    pub message: String,
    /// POST target of the confirm button
    pub action: String,
    pub cancel_href: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub shell: Shell,
    pub summary: Option<AdminSummary>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "employee_dashboard.html")]
pub struct EmployeeDashboardTemplate {
    pub shell: Shell,
    pub total_products: Option<usize>,
    pub error: Option<String>,
}

/// Product form with its select boxes resolved.
pub struct ProductFormView {
    pub form: ProductForm,
    pub categories: Vec<SelectOption>,
    pub suppliers: Vec<SelectOption>,
    pub errors: Vec<String>,
}

impl ProductFormView {
    pub fn new(form: ProductForm, errors: Vec<String>, categories: &[Category], suppliers: &[Supplier]) -> Self {
        Self {
            categories: SelectOption::list(categories, &form.category_id, |c| &c.id, |c| c.name.as_str()),
            suppliers: SelectOption::list(suppliers, &form.supplier_id, |s| &s.id, |s| s.name.as_str()),
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub shell: Shell,
    pub page: Option<ProductsPage>,
    pub error: Option<String>,
    pub notice: Option<Notice>,
    pub form: Option<ProductFormView>,
}

#[derive(Template)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub shell: Shell,
    pub listing: Option<Listing<CatalogRow>>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub shell: Shell,
    pub page: Option<CategoriesPage>,
    pub error: Option<String>,
    pub notice: Option<Notice>,
    /// Inline form, always shown
    pub form: CategoryForm,
    pub form_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "suppliers.html")]
pub struct SuppliersTemplate {
    pub shell: Shell,
    pub page: Option<SuppliersPage>,
    pub error: Option<String>,
    pub notice: Option<Notice>,
    pub form: Option<SupplierForm>,
    pub form_errors: Vec<String>,
}

pub struct ServiceFormView {
    pub form: ServiceForm,
    pub categories: Vec<SelectOption>,
    pub errors: Vec<String>,
}

impl ServiceFormView {
    pub fn new(form: ServiceForm, errors: Vec<String>, categories: &[ServiceCategory]) -> Self {
        Self {
            categories: SelectOption::list(
                categories,
                &form.services_category_id,
                |c| &c.services_category_id,
                |c| c.category_name.as_str(),
            ),
            form,
            errors,
        }
    }
}

pub struct ServiceCategoryFormView {
    pub form: ServiceCategoryForm,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "services.html")]
pub struct ServicesTemplate {
    pub shell: Shell,
    pub page: Option<ServicesPage>,
    pub error: Option<String>,
    pub notice: Option<Notice>,
    pub category_form: Option<ServiceCategoryFormView>,
    pub service_form: Option<ServiceFormView>,
    /// Employee variant: no forms, no actions
    pub read_only: bool,
}

/// One product line of the assignment form.
pub struct AssignmentRowView {
    pub products: Vec<SelectOption>,
    pub quantity: String,
}

#[derive(Template)]
#[template(path = "assign.html")]
pub struct AssignTemplate {
    pub shell: Shell,
    pub error: Option<String>,
    pub services: Vec<SelectOption>,
    pub variants: Vec<SelectOption>,
    pub rows: Vec<AssignmentRowView>,
    pub form_errors: Vec<String>,
    pub report: Option<AssignmentReport>,
    /// Row count after "add row"
    pub more_rows: usize,
}

impl AssignTemplate {
    pub fn new(
        shell: Shell,
        options: &AssignmentOptions,
        form: &AssignmentForm,
        min_rows: usize,
        form_errors: Vec<String>,
        report: Option<AssignmentReport>,
    ) -> Self {
        let rows: Vec<AssignmentRowView> = form
            .rows(min_rows)
            .into_iter()
            .map(|row| AssignmentRowView {
                products: SelectOption::list(
                    &options.products,
                    &row.product_id,
                    |p: &Product| &p.product_id,
                    |p: &Product| p.name.as_str(),
                ),
                quantity: row.quantity,
            })
            .collect();
        Self {
            shell,
            error: None,
            services: SelectOption::list(
                &options.services,
                &form.service_id,
                |s: &Service| &s.service_id,
                |s: &Service| s.service_name.as_str(),
            ),
            variants: SelectOption::list(
                &options.variants,
                &form.variant_id,
                |v: &Variant| &v.id,
                |v: &Variant| v.name.as_str(),
            ),
            more_rows: rows.len() + 1,
            rows,
            form_errors,
            report,
        }
    }

    /// The options could not be loaded; only the error is shown.
    pub fn failed(shell: Shell, error: String) -> Self {
        Self {
            shell,
            error: Some(error),
            services: Vec::new(),
            variants: Vec::new(),
            rows: Vec::new(),
            form_errors: Vec::new(),
            report: None,
            more_rows: 1,
        }
    }
}

pub struct AccountFormView {
    pub form: AccountForm,
    pub roles: Vec<SelectOption>,
    pub errors: Vec<String>,
}

impl AccountFormView {
    pub fn new(form: AccountForm, errors: Vec<String>) -> Self {
        let roles = [
            (crate::models::ADMIN_ROLE_ID, "Admin"),
            (crate::models::USER_ROLE_ID, "User"),
        ]
        .into_iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            selected: form.role_id.trim() == value,
        })
        .collect();
        Self { form, roles, errors }
    }
}

#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub shell: Shell,
    pub page: Option<UsersPage>,
    pub error: Option<String>,
    pub notice: Option<Notice>,
    pub form: Option<AccountFormView>,
}

#[derive(Template)]
#[template(path = "reports.html")]
pub struct ReportsTemplate {
    pub shell: Shell,
    pub document: Option<ReportDocument>,
    pub error: Option<String>,
    pub generated_at: String,
}
