//! Shopcart Core - Shared domain types.
//!
//! This crate provides the catalog and cart model used by the storefront:
//! - [`Product`] and [`ProductId`] as delivered by the remote catalog
//! - [`Cart`] and [`CartItem`] with the one-line-per-product invariant
//! - [`CategorySelection`] and [`SortOption`] describing the active view
//! - [`view`] for deriving the visible list from catalog, filter and sort
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps the invariants testable in isolation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod view;

pub use types::*;
