//! Shopcart Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Modules
//!
//! - [`store`] - Catalog and cart state container
//! - [`catalog`] - Remote catalog client
//! - [`persistence`] - Durable and session storage backends
//! - [`location`] - Query-string mirror of the view state
//! - [`routes`] - JSON HTTP surface over the store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod location;
pub mod middleware;
pub mod notifications;
pub mod persistence;
pub mod routes;
pub mod state;
pub mod store;
