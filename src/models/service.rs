//! Wash services, their categories, size variants and product assignments.

use serde::{Deserialize, Serialize};

use super::common::{flexible_i64, EntityId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceCategory {
    pub services_category_id: EntityId,
    pub category_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceCategoryPayload {
    pub category_name: String,
}

/// Per-size-tier quantities of a service, smallest vehicle first.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierQuantities {
    #[serde(default, deserialize_with = "flexible_i64")]
    pub small: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub medium: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub large: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub xlarge: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub xxlarge: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub service_id: EntityId,
    pub service_name: String,
    #[serde(default)]
    pub services_category_id: Option<EntityId>,
    #[serde(flatten)]
    pub tiers: TierQuantities,
}

impl Service {
    pub fn category_id_str(&self) -> &str {
        self.services_category_id
            .as_ref()
            .map(|c| c.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServicePayload {
    pub service_name: String,
    pub services_category_id: EntityId,
    #[serde(flatten)]
    pub tiers: TierQuantities,
}

/// A service size tier (small … xxlarge)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    pub id: EntityId,
    pub name: String,
}

/// Body of `POST /api/service-products/assign` (one product per request)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssignmentPayload {
    pub service_id: EntityId,
    pub variant_id: EntityId,
    pub product_id: EntityId,
    pub quantity: i64,
}
