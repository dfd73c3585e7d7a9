//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for catalog and cart concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod selection;

pub use cart::{Cart, CartItem};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::Product;
pub use selection::{ALL_CATEGORIES, CategorySelection, ParseSortError, SortOption};
