//! Song catalog client
//!
//! The catalog service owns canonical song metadata and the mutable
//! favourites / stream counters. This module is the only place that talks
//! to it.

pub mod client;
pub mod traits;

pub use client::HttpCatalogClient;
pub use traits::{CatalogClient, CatalogError, CatalogResult, FavouriteDelta};

#[cfg(test)]
pub(crate) mod mock;
