//! Product catalog query and assembly engine.
//!
//! Turns untrusted pagination and filter parameters into bounded, parameterized
//! queries against a DuckDB catalog, then assembles each product with its
//! category and variants. Variants without their own price inherit the
//! product's price.
//!
//! # Quick start
//!
//! ```no_run
//! use catalog_engine::{Catalog, RawListParams};
//!
//! let catalog = Catalog::builder().in_memory().build().unwrap();
//!
//! let page = catalog
//!     .list_products(&RawListParams::new().category("shoes").price_lt("20.00"))
//!     .unwrap();
//! println!("{} matching products", page.total);
//!
//! let product = catalog.get_product("PROD001");
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod error;
pub mod filter;
pub mod loader;
pub mod models;
pub mod params;
pub mod price;
pub mod queries;
pub mod resolve;
pub mod sql_builder;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncCatalog;
pub use connection::{Connection, InterruptHandle};
pub use error::{CatalogError, Result, StoreError};
pub use models::{CatalogPage, CatalogProduct, CatalogVariant, Category, NewCategory, NewProduct, Product};
pub use params::{ListQuery, RawListParams};
pub use price::Price;
pub use sql_builder::SqlBuilder;
pub use store::{CatalogStore, InMemoryStore, WriteOutcome};

use std::fmt;
use std::path::{Path, PathBuf};

use error::StoreResultExt;

// ---------------------------------------------------------------------------
// CatalogBuilder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Location {
    Default,
    Path(PathBuf),
    InMemory,
}

impl Location {
    pub(crate) fn open(&self) -> Result<Connection> {
        let opened = match self {
            Location::Default => Connection::open(config::default_database_path()),
            Location::Path(path) => Connection::open(path),
            Location::InMemory => Connection::open_in_memory(),
        };
        opened.op("open catalog")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Default => write!(f, "{}", config::default_database_path().display()),
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::InMemory => f.write_str(":memory:"),
        }
    }
}

/// Builder for configuring and constructing a [`Catalog`].
///
/// Without [`database`](Self::database) or [`in_memory`](Self::in_memory) the
/// catalog opens [`config::default_database_path`].
pub struct CatalogBuilder {
    location: Location,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self {
            location: Location::Default,
        }
    }
}

impl CatalogBuilder {
    /// Use the DuckDB file at `path`, creating it (and its parent
    /// directories) if missing.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.location = Location::Path(path.as_ref().to_path_buf());
        self
    }

    /// Use a private in-memory database that disappears with the catalog.
    pub fn in_memory(mut self) -> Self {
        self.location = Location::InMemory;
        self
    }

    /// Open the database and apply the schema.
    pub fn build(self) -> Result<Catalog> {
        let conn = self.location.open()?;
        tracing::debug!(database = %self.location, "opened catalog");
        Ok(Catalog {
            conn,
            location: self.location,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Synchronous entry point.
///
/// Owns one DuckDB [`Connection`] and hands out borrowing query interfaces.
/// For concurrent use wrap it in [`AsyncCatalog`], which gives every request
/// its own connection.
pub struct Catalog {
    conn: Connection,
    location: Location,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    pub fn products(&self) -> queries::ProductQuery<'_> {
        queries::ProductQuery::new(&self.conn)
    }

    pub fn categories(&self) -> queries::CategoryQuery<'_> {
        queries::CategoryQuery::new(&self.conn)
    }

    // -- Transport-facing operations ---------------------------------------

    /// Normalize raw parameters and return one page of the catalog.
    pub fn list_products(&self, raw: &RawListParams) -> Result<CatalogPage> {
        self.products().list_raw(raw)
    }

    /// Look up one product by code; `NotFound` when absent.
    pub fn get_product(&self, code: &str) -> Result<CatalogProduct> {
        self.products().get_by_code(code)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        self.categories().list()
    }

    pub fn create_category(&self, new: &NewCategory) -> Result<Category> {
        self.categories().create(new)
    }

    /// Seed a product and its variants.
    pub fn insert_product(&self, new: &NewProduct) -> Result<Product> {
        self.products().create(new)
    }

    // -- Utility -----------------------------------------------------------

    /// Handle that aborts the statement currently running on this catalog.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.interrupt_handle()
    }

    /// A second catalog on the same database with its own connection.
    pub fn try_clone(&self) -> Result<Catalog> {
        let conn = self.conn.try_clone().op("clone connection")?;
        Ok(Catalog {
            conn,
            location: self.location.clone(),
        })
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Catalog(database={})", self.location)
    }
}
