//! Fixtures

use std::{fs, path::PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    orders::Order,
};

pub mod catalog;
pub mod orders;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No items in the catalog fixture
    #[error("No items defined; currency unknown")]
    NoItems,

    /// Free-item promotion does not list exactly two items
    #[error("Free-item promotion must name exactly two items, found {0}")]
    InvalidPromotion(usize),

    /// Order quantity is not a decimal number
    #[error("Invalid quantity for {item}: {value}")]
    InvalidQuantity {
        /// Raw item key
        item: String,

        /// Quantity as written
        value: String,
    },

    /// Catalog failed validation
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Loads catalog and order sets from a fixtures directory.
///
/// Catalogs live in `<base>/catalogs/<name>.yml`, orders in `<base>/orders/<name>.yml`.
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Fixture set rooted at `./fixtures`
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Fixture set rooted at `base_path`
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Base path for fixture files
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// Load a catalog from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the catalog is invalid.
    pub fn load_catalog(&self, name: &str) -> Result<Catalog, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));

        debug!(path = %file_path.display(), "loading catalog");

        catalog::catalog_from_str(&fs::read_to_string(&file_path)?)
    }

    /// Load an order from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_order(&self, name: &str) -> Result<Order, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));

        debug!(path = %file_path.display(), "loading order");

        orders::order_from_str(&fs::read_to_string(&file_path)?)
    }
}
