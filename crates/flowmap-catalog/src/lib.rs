//! Reference catalog access for Flowmap
//!
//! This crate defines the capability interfaces the resolver consumes
//! (flow search, providers, unit and category catalogs, entity creation and
//! flow map storage) and ships an in-memory and a local-directory provider.

pub mod catalog;
pub mod error;
pub mod fixtures;
pub mod providers;


pub use catalog::*;
pub use error::{CatalogError, Result};
pub use providers::create_catalog;
pub use providers::local::LocalCatalog;
pub use providers::memory::{InMemoryCatalog, Operation, ProviderLink, Snapshot};
