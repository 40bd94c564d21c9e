//! Catalog entities and the form payloads used to create or update them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Tenant;

/// Sellable catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Numeric identifier.
    pub id: i64,
    /// Product name.
    pub name: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Units in stock.
    #[serde(default)]
    pub stock: i64,
    /// Optional image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Whether the product is visible to shoppers.
    #[serde(default)]
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Editable product fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductFormData {
    /// Product name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Units in stock.
    pub stock: i64,
    /// Optional image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Grouping of products under a navigable name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Numeric identifier.
    pub id: i64,
    /// Category name.
    pub name: String,
    /// Owning tenant identifier.
    #[serde(default)]
    pub tenant_id: String,
    /// Owning tenant, when expanded by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
    /// Whether the category is visible to shoppers.
    #[serde(default)]
    pub is_active: bool,
    /// Optional image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Products assigned to the category.
    #[serde(default)]
    pub products: Vec<Product>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Editable category fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryFormData {
    /// Category name.
    pub name: String,
    /// Whether the category is visible to shoppers.
    #[serde(rename = "isActive")]
    pub is_active: bool,
    /// Identifiers of the products assigned to the category.
    pub products_ids: Vec<i64>,
}

impl Default for CategoryFormData {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_active: true,
            products_ids: Vec::new(),
        }
    }
}

/// Ordered storefront shelf showing a curated product selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    /// Numeric identifier.
    pub id: i64,
    /// Shelf title.
    pub title: String,
    /// Display position on the storefront.
    #[serde(default)]
    pub position: i64,
    /// Owning tenant identifier.
    #[serde(default)]
    pub tenant_id: String,
    /// Owning tenant, when expanded by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
    /// Whether the shelf is visible to shoppers.
    #[serde(default)]
    pub is_active: bool,
    /// Optional image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Products placed on the shelf.
    #[serde(default)]
    pub products: Vec<Product>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Editable shelf fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShelfFormData {
    /// Shelf title.
    pub title: String,
    /// Display position on the storefront.
    pub position: i64,
    /// Whether the shelf is visible to shoppers.
    #[serde(rename = "isActive")]
    pub is_active: bool,
    /// Identifiers of the products placed on the shelf.
    pub products_ids: Vec<i64>,
}

impl Default for ShelfFormData {
    fn default() -> Self {
        Self {
            title: String::new(),
            position: 0,
            is_active: true,
            products_ids: Vec::new(),
        }
    }
}

/// Promotional image slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    /// Numeric identifier.
    pub id: i64,
    /// Banner title.
    pub title: String,
    /// Display position in the carousel.
    #[serde(default)]
    pub position: i64,
    /// Owning tenant identifier.
    #[serde(default)]
    pub tenant_id: String,
    /// Owning tenant, when expanded by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
    /// Whether the banner is shown.
    #[serde(default)]
    pub is_active: bool,
    /// Image location; the backend returns it relative to its own origin.
    #[serde(default)]
    pub image_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Editable banner fields, submitted as multipart text parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BannerFormData {
    /// Banner title.
    pub title: String,
    /// Display position in the carousel.
    pub position: i64,
    /// Whether the banner is shown.
    pub is_active: bool,
}

impl BannerFormData {
    /// Text parts in submission order, with every value rendered as a string.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("position", self.position.to_string()),
            ("isActive", self.is_active.to_string()),
        ]
    }
}
