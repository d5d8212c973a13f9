//! Field catalogs: what a feature type exposes and what may be filtered on.
//!
//! A [`FieldCatalog`] is loaded once per feature type from a
//! [`CatalogSource`] and is read-only afterwards. Every field reference in a
//! filter or a field selection is checked against it before any fetch.
//!
//! # Example
//!
//! ```ignore
//! use wfs_search::catalog::{CatalogCache, FieldCatalog};
//!
//! let catalog = FieldCatalog::load(&source, "dov-pub:Boringen").await?;
//! let diepte = catalog.get("diepte_boring_tot")?;
//!
//! // Or share catalogs for the whole session
//! let cache = CatalogCache::new();
//! let catalog = cache.get_or_load(&source, "dov-pub:Boringen").await?;
//! ```

mod cache;
#[allow(clippy::module_inception)]
mod catalog;
mod field;
mod source;

pub use cache::CatalogCache;
pub use catalog::{CatalogDocument, FieldCatalog};
pub use field::{DataType, Field};
pub use source::{CatalogSource, StaticCatalogSource};
