//! Catalog product entries.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as delivered by the remote catalog.
///
/// Products are immutable once fetched: the storefront only changes which
/// products are visible, never their fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog-assigned identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Category name. Open set, discovered from catalog contents.
    pub category: String,
}
