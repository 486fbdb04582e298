//! Product categories: inline form above a searchable table.

use serde::Deserialize;

use super::listing::{matches_search, ListQuery, Listing};
use super::validation::{self, FieldErrors};
use super::{submit, Submission, ViewScope};
use crate::gateway::{GatewayError, ProductsApi};
use crate::models::{Category, CategoryPayload, EntityId};

#[derive(Debug, Clone)]
pub struct CategoriesPage {
    pub listing: Listing<Category>,
    pub all: Vec<Category>,
}

impl CategoriesPage {
    pub fn find(&self, id: &EntityId) -> Option<&Category> {
        super::find_by_id(&self.all, id, |c| &c.id)
    }
}

pub async fn load(
    api: &ProductsApi,
    scope: &ViewScope,
    query: &ListQuery,
    page_size: usize,
) -> Result<CategoriesPage, GatewayError> {
    let categories = scope.run(api.categories().list()).await?;
    Ok(CategoriesPage {
        listing: Listing::build(&categories, query, page_size, |c, term| {
            matches_search(term, &[c.name.as_str()])
        }),
        all: categories,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryForm {
    pub fn edit(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description_text().to_string(),
        }
    }

    pub fn is_edit(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn validate(&self) -> Result<CategoryPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", validation::required_text(&self.name, "Name", 80));
        match name {
            Some(name) => Ok(CategoryPayload {
                name,
                description: self.description.trim().to_string(),
            }),
            None => Err(errors),
        }
    }
}

pub async fn save(api: &ProductsApi, scope: &ViewScope, form: CategoryForm) -> Submission<CategoryForm> {
    let payload = form.validate();
    let id = EntityId::from_form(&form.id);
    submit(scope, &api.categories(), form, id, payload, "Category").await
}
