//! Products, categories and suppliers (all served by the products backend).

use serde::{Deserialize, Serialize};

use super::common::{flexible_f64, flexible_i64, format_amount, EntityId, JoinedName};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub product_id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<EntityId>,
    #[serde(default)]
    pub supplier_id: Option<EntityId>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub cost: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub stock: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub reorder_level: i64,
    /// Joined category, present on list and report endpoints
    #[serde(default)]
    pub categories: Option<JoinedName>,
    /// Joined supplier, present on report endpoints
    #[serde(default)]
    pub suppliers: Option<JoinedName>,
}

impl Product {
    /// Low stock is inclusive: a product sitting exactly at its reorder level
    /// already needs reordering.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_level
    }

    pub fn category_name(&self) -> &str {
        self.categories.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }

    pub fn supplier_name(&self) -> &str {
        self.suppliers.as_ref().map(|s| s.name.as_str()).unwrap_or("")
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn price_display(&self) -> String {
        format_amount(self.price)
    }

    pub fn cost_display(&self) -> String {
        format_amount(self.cost)
    }

    pub fn category_id_str(&self) -> &str {
        self.category_id.as_ref().map(|c| c.as_str()).unwrap_or("")
    }

    pub fn supplier_id_str(&self) -> &str {
        self.supplier_id.as_ref().map(|s| s.as_str()).unwrap_or("")
    }
}

/// Body of `POST /api/products` and `PUT /api/products/:id`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub category_id: EntityId,
    pub supplier_id: EntityId,
    pub cost: f64,
    pub price: f64,
    pub stock: i64,
    pub reorder_level: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Category {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryPayload {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Supplier {
    pub fn contact_person_text(&self) -> &str {
        self.contact_person.as_deref().unwrap_or("")
    }

    pub fn phone_text(&self) -> &str {
        self.phone.as_deref().unwrap_or("")
    }

    pub fn email_text(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }

    pub fn address_text(&self) -> &str {
        self.address.as_deref().unwrap_or("")
    }

    pub fn notes_text(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SupplierPayload {
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub notes: String,
}
