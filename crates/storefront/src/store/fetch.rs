//! Pending-request tickets for the two catalog fetches.
//!
//! A fetch is issued with `Store::begin_*`, which hands back a ticket, and
//! completed with `Store::settle_*`. Only the most recently issued ticket of
//! each kind may change state; older tickets settle as [`Settled::Stale`].

use serde::Serialize;
use shopcart_core::ProductId;

/// Identity of an issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub(super) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Ticket for an in-flight full-catalog fetch.
#[derive(Debug)]
#[must_use = "a catalog request must be settled or loading never clears"]
pub struct CatalogRequest {
    pub(super) id: RequestId,
}

impl CatalogRequest {
    /// Request identity.
    pub const fn id(&self) -> RequestId {
        self.id
    }
}

/// Ticket for an in-flight single-product fetch.
#[derive(Debug)]
#[must_use = "a detail request must be settled"]
pub struct DetailRequest {
    pub(super) id: RequestId,
    pub(super) product_id: ProductId,
}

impl DetailRequest {
    /// Request identity.
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Product being fetched.
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }
}

/// Outcome of settling a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The result was applied to the store.
    Applied,
    /// A newer request superseded this one; the result was discarded.
    Stale,
}

/// State of the product detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum DetailStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch for this product is in flight.
    Loading(ProductId),
    /// The selected detail holds this product.
    Ready(ProductId),
    /// The catalog has no such product. Terminal until another request.
    NotFound(ProductId),
    /// The fetch failed; the previously selected detail is kept.
    Failed(ProductId),
}
