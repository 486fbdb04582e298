//! Services screen: service categories, services and the product
//! assignment sub-flow.
//!
//! The two tables page independently (`cat_page`, `srv_page`) and have no
//! search box.

use serde::Deserialize;

use super::listing::Listing;
use super::validation::{self, FieldErrors};
use super::{submit, Submission, ViewScope};
use crate::gateway::{GatewayError, ProductsApi, ServicesApi};
use crate::models::{
    AssignmentPayload, EntityId, Product, Service, ServiceCategory, ServiceCategoryPayload,
    ServicePayload, TierQuantities, Variant,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicesQuery {
    #[serde(default, deserialize_with = "super::listing::lenient_page")]
    pub cat_page: Option<usize>,
    #[serde(default, deserialize_with = "super::listing::lenient_page")]
    pub srv_page: Option<usize>,
}

/// A service with its category name resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRow {
    pub service: Service,
    pub category_name: String,
}

#[derive(Debug, Clone)]
pub struct ServicesPage {
    pub categories: Listing<ServiceCategory>,
    pub services: Listing<ServiceRow>,
    pub all_categories: Vec<ServiceCategory>,
    pub all_services: Vec<Service>,
}

impl ServicesPage {
    pub fn find_category(&self, id: &EntityId) -> Option<&ServiceCategory> {
        super::find_by_id(&self.all_categories, id, |c| &c.services_category_id)
    }

    pub fn find_service(&self, id: &EntityId) -> Option<&Service> {
        super::find_by_id(&self.all_services, id, |s| &s.service_id)
    }
}

fn category_name(categories: &[ServiceCategory], service: &Service) -> String {
    service
        .services_category_id
        .as_ref()
        .and_then(|id| super::find_by_id(categories, id, |c| &c.services_category_id))
        .map(|c| c.category_name.clone())
        .unwrap_or_else(|| "-".to_string())
}

pub async fn load(
    api: &ServicesApi,
    scope: &ViewScope,
    query: &ServicesQuery,
    page_size: usize,
) -> Result<ServicesPage, GatewayError> {
    let (category_res, service_res) = (api.categories(), api.services());
    let (categories, services) = scope
        .run(async { tokio::try_join!(category_res.list(), service_res.list()) })
        .await?;

    let rows: Vec<ServiceRow> = services
        .iter()
        .map(|service| ServiceRow {
            service: service.clone(),
            category_name: category_name(&categories, service),
        })
        .collect();

    Ok(ServicesPage {
        categories: Listing::unfiltered(&categories, page_size, query.cat_page),
        services: Listing::unfiltered(&rows, page_size, query.srv_page),
        all_categories: categories,
        all_services: services,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceCategoryForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category_name: String,
}

impl ServiceCategoryForm {
    pub fn edit(category: &ServiceCategory) -> Self {
        Self {
            id: category.services_category_id.to_string(),
            category_name: category.category_name.clone(),
        }
    }

    pub fn is_edit(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn validate(&self) -> Result<ServiceCategoryPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        match errors.check(
            "category_name",
            validation::required_text(&self.category_name, "Category name", 80),
        ) {
            Some(category_name) => Ok(ServiceCategoryPayload { category_name }),
            None => Err(errors),
        }
    }
}

pub async fn save_category(
    api: &ServicesApi,
    scope: &ViewScope,
    form: ServiceCategoryForm,
) -> Submission<ServiceCategoryForm> {
    let payload = form.validate();
    let id = EntityId::from_form(&form.id);
    submit(scope, &api.categories(), form, id, payload, "Service category").await
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub services_category_id: String,
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub medium: String,
    #[serde(default)]
    pub large: String,
    #[serde(default)]
    pub xlarge: String,
    #[serde(default)]
    pub xxlarge: String,
}

impl ServiceForm {
    pub fn edit(service: &Service) -> Self {
        Self {
            id: service.service_id.to_string(),
            service_name: service.service_name.clone(),
            services_category_id: service.category_id_str().to_string(),
            small: service.tiers.small.to_string(),
            medium: service.tiers.medium.to_string(),
            large: service.tiers.large.to_string(),
            xlarge: service.tiers.xlarge.to_string(),
            xxlarge: service.tiers.xxlarge.to_string(),
        }
    }

    pub fn is_edit(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn validate(&self) -> Result<ServicePayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check(
            "service_name",
            validation::required_text(&self.service_name, "Service name", 120),
        );
        let category = EntityId::from_form(&self.services_category_id);
        if category.is_none() {
            errors.add("services_category_id", "Category is required");
        }

        let mut tier = |field: &str, value: &str, label: &str| {
            errors
                .check(field, validation::count(value, label, true))
                .unwrap_or_default()
        };
        let tiers = TierQuantities {
            small: tier("small", &self.small, "Small"),
            medium: tier("medium", &self.medium, "Medium"),
            large: tier("large", &self.large, "Large"),
            xlarge: tier("xlarge", &self.xlarge, "XLarge"),
            xxlarge: tier("xxlarge", &self.xxlarge, "XXLarge"),
        };

        match (name, category) {
            (Some(service_name), Some(services_category_id)) if errors.is_empty() => {
                Ok(ServicePayload {
                    service_name,
                    services_category_id,
                    tiers,
                })
            }
            _ => Err(errors),
        }
    }
}

pub async fn save_service(
    api: &ServicesApi,
    scope: &ViewScope,
    form: ServiceForm,
) -> Submission<ServiceForm> {
    let payload = form.validate();
    let id = EntityId::from_form(&form.id);
    submit(scope, &api.services(), form, id, payload, "Service").await
}

/// Choices offered by the assignment form.
#[derive(Debug, Clone)]
pub struct AssignmentOptions {
    pub services: Vec<Service>,
    pub variants: Vec<Variant>,
    /// Only products of the service-product category
    pub products: Vec<Product>,
}

impl AssignmentOptions {
    fn product_name(&self, id: &EntityId) -> String {
        super::find_by_id(&self.products, id, |p| &p.product_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Product #{}", id))
    }
}

pub async fn load_assignment_options(
    services: &ServicesApi,
    products: &ProductsApi,
    scope: &ViewScope,
    product_category: &str,
) -> Result<AssignmentOptions, GatewayError> {
    let (service_res, product_res) = (services.services(), products.products());
    let (service_list, variants, product_list) = scope
        .run(async {
            tokio::try_join!(service_res.list(), services.variants(), product_res.list())
        })
        .await?;

    let products = product_list
        .into_iter()
        .filter(|p| p.category_id_str() == product_category)
        .collect();

    Ok(AssignmentOptions {
        services: service_list,
        variants,
        products,
    })
}

/// Assignment form. `product_id` and `quantity` repeat once per row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentForm {
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub variant_id: String,
    #[serde(default)]
    pub product_id: Vec<String>,
    #[serde(default)]
    pub quantity: Vec<String>,
}

/// One product row as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentRow {
    pub product_id: String,
    pub quantity: String,
}

impl AssignmentRow {
    fn is_blank(&self) -> bool {
        self.product_id.trim().is_empty() && self.quantity.trim().is_empty()
    }
}

/// A validated batch: one request per line.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentBatch {
    pub service_id: EntityId,
    pub variant_id: EntityId,
    pub lines: Vec<(EntityId, i64)>,
}

impl AssignmentForm {
    /// Rows padded to at least `min_rows`, for rendering.
    pub fn rows(&self, min_rows: usize) -> Vec<AssignmentRow> {
        let len = self.product_id.len().max(self.quantity.len()).max(min_rows);
        (0..len)
            .map(|i| AssignmentRow {
                product_id: self.product_id.get(i).cloned().unwrap_or_default(),
                quantity: self.quantity.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }

    pub fn validate(&self) -> Result<AssignmentBatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        let service_id = EntityId::from_form(&self.service_id);
        if service_id.is_none() {
            errors.add("service_id", "Service is required");
        }
        let variant_id = EntityId::from_form(&self.variant_id);
        if variant_id.is_none() {
            errors.add("variant_id", "Variant is required");
        }

        let mut lines = Vec::new();
        for (index, row) in self.rows(0).iter().enumerate() {
            if row.is_blank() {
                continue;
            }
            let number = index + 1;
            let product = EntityId::from_form(&row.product_id);
            let quantity = row.quantity.trim();
            match (product, quantity.is_empty()) {
                (None, _) => {
                    errors.add("rows", format!("Row {}: choose a product", number));
                }
                (Some(_), true) => {
                    errors.add("rows", format!("Row {}: quantity is required", number));
                }
                (Some(product), false) => match quantity.parse::<i64>() {
                    Ok(q) if q > 0 => lines.push((product, q)),
                    Ok(_) => {
                        errors.add("rows", format!("Row {}: quantity must be greater than 0", number));
                    }
                    Err(_) => {
                        errors.add("rows", format!("Row {}: quantity must be a whole number", number));
                    }
                },
            }
        }

        if lines.is_empty() && !errors.has("rows") {
            errors.add("rows", "Add at least one product");
        }

        match (service_id, variant_id) {
            (Some(service_id), Some(variant_id)) if errors.is_empty() => Ok(AssignmentBatch {
                service_id,
                variant_id,
                lines,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub product_id: EntityId,
    pub product_name: String,
    pub quantity: i64,
    /// `None` when assigned, the failure message otherwise
    pub error: Option<String>,
}

impl RowOutcome {
    pub fn assigned(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }
}

/// Per-row results of one assignment batch. Successful rows stay assigned
/// even when later rows fail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentReport {
    pub rows: Vec<RowOutcome>,
}

impl AssignmentReport {
    pub fn assigned_count(&self) -> usize {
        self.rows.iter().filter(|r| r.assigned()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.rows.len() - self.assigned_count()
    }

    pub fn all_assigned(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn summary(&self) -> String {
        if self.all_assigned() {
            format!("Assigned {} product(s).", self.assigned_count())
        } else {
            format!(
                "Assigned {} of {} product(s); {} failed.",
                self.assigned_count(),
                self.rows.len(),
                self.failed_count()
            )
        }
    }
}

/// Send every line of `batch`, one request each, in form order.
pub async fn assign(
    api: &ServicesApi,
    scope: &ViewScope,
    options: &AssignmentOptions,
    batch: &AssignmentBatch,
) -> AssignmentReport {
    let mut report = AssignmentReport::default();
    for (product_id, quantity) in &batch.lines {
        let payload = AssignmentPayload {
            service_id: batch.service_id.clone(),
            variant_id: batch.variant_id.clone(),
            product_id: product_id.clone(),
            quantity: *quantity,
        };
        let error = match scope.run(api.assign(&payload)).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(product = %product_id, error = %e, "Assignment row failed");
                Some(e.user_message())
            }
        };
        report.rows.push(RowOutcome {
            product_id: product_id.clone(),
            product_name: options.product_name(product_id),
            quantity: *quantity,
            error,
        });
    }

    tracing::info!(
        service = %batch.service_id,
        variant = %batch.variant_id,
        assigned = report.assigned_count(),
        failed = report.failed_count(),
        "Assignment batch finished"
    );
    report
}
