//! Suppliers screen.

use serde::Deserialize;

use super::listing::{matches_search, ListQuery, Listing};
use super::validation::{self, FieldErrors};
use super::{submit, Submission, ViewScope};
use crate::gateway::{GatewayError, ProductsApi};
use crate::models::{EntityId, Supplier, SupplierPayload};

#[derive(Debug, Clone)]
pub struct SuppliersPage {
    pub listing: Listing<Supplier>,
    pub all: Vec<Supplier>,
}

impl SuppliersPage {
    pub fn find(&self, id: &EntityId) -> Option<&Supplier> {
        super::find_by_id(&self.all, id, |s| &s.id)
    }
}

pub async fn load(
    api: &ProductsApi,
    scope: &ViewScope,
    query: &ListQuery,
    page_size: usize,
) -> Result<SuppliersPage, GatewayError> {
    let suppliers = scope.run(api.suppliers().list()).await?;
    Ok(SuppliersPage {
        listing: Listing::build(&suppliers, query, page_size, |s, term| {
            matches_search(term, &[s.name.as_str()])
        }),
        all: suppliers,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
}

impl SupplierForm {
    pub fn edit(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id.to_string(),
            name: supplier.name.clone(),
            contact_person: supplier.contact_person_text().to_string(),
            phone: supplier.phone_text().to_string(),
            email: supplier.email_text().to_string(),
            address: supplier.address_text().to_string(),
            notes: supplier.notes_text().to_string(),
        }
    }

    pub fn is_edit(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn validate(&self) -> Result<SupplierPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", validation::required_text(&self.name, "Name", 120));
        let phone = errors.check("phone", validation::optional_phone(&self.phone));
        let email = errors.check("email", validation::optional_email(&self.email));

        match (name, phone, email) {
            (Some(name), Some(phone), Some(email)) => Ok(SupplierPayload {
                name,
                contact_person: self.contact_person.trim().to_string(),
                phone,
                email,
                address: self.address.trim().to_string(),
                notes: self.notes.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

pub async fn save(api: &ProductsApi, scope: &ViewScope, form: SupplierForm) -> Submission<SupplierForm> {
    let payload = form.validate();
    let id = EntityId::from_form(&form.id);
    submit(scope, &api.suppliers(), form, id, payload, "Supplier").await
}
