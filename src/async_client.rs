//! Async facade over [`Catalog`] for use in Tokio services.
//!
//! Every call clones a fresh DuckDB connection and runs on the blocking pool
//! via [`tokio::task::spawn_blocking`], so requests never share connection
//! state. Dropping a call's future, or exceeding the configured timeout,
//! cancels that call's connection: the running statement is interrupted and no
//! later statement of the call reaches the database.
//!
//! # Example
//!
//! ```no_run
//! use catalog_engine::{AsyncCatalog, RawListParams};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let catalog = AsyncCatalog::builder()
//!         .in_memory()
//!         .timeout(Duration::from_secs(5))
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let page = catalog
//!         .list_products(RawListParams::new().limit("5"))
//!         .await
//!         .unwrap();
//!     println!("{}", page.total);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::connection::InterruptHandle;
use crate::error::{CatalogError, Result, StoreError};
use crate::models::{CatalogPage, CatalogProduct, Category, NewCategory, NewProduct, Product};
use crate::params::{normalize, RawListParams};
use crate::{Catalog, CatalogBuilder};

// ---------------------------------------------------------------------------
// AsyncCatalogBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCatalog`].
#[derive(Default)]
pub struct AsyncCatalogBuilder {
    database: Option<PathBuf>,
    in_memory: bool,
    timeout: Option<Duration>,
}

impl AsyncCatalogBuilder {
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self.in_memory = false;
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self.database = None;
        self
    }

    /// Upper bound on one call, including its time in the blocking pool.
    ///
    /// Unset by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Open the catalog on the blocking pool.
    pub async fn build(self) -> Result<AsyncCatalog> {
        let timeout = self.timeout;
        let catalog = tokio::task::spawn_blocking(move || {
            let mut builder = CatalogBuilder::default();
            if let Some(path) = self.database {
                builder = builder.database(path);
            } else if self.in_memory {
                builder = builder.in_memory();
            }
            builder.build()
        })
        .await
        .map_err(|e| CatalogError::internal("open catalog", StoreError::Runtime(e.to_string())))??;

        Ok(AsyncCatalog {
            root: Arc::new(Mutex::new(catalog)),
            timeout,
        })
    }
}

// ---------------------------------------------------------------------------
// InterruptOnDrop
// ---------------------------------------------------------------------------

/// Cancels the call's connection unless disarmed.
struct InterruptOnDrop {
    handle: Option<InterruptHandle>,
}

impl InterruptOnDrop {
    fn disarm(mut self) {
        self.handle = None;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!("interrupting abandoned catalog call");
            handle.interrupt();
        }
    }
}

// ---------------------------------------------------------------------------
// AsyncCatalog
// ---------------------------------------------------------------------------

/// Cloneable async handle; every clone shares the same database.
#[derive(Clone)]
pub struct AsyncCatalog {
    root: Arc<Mutex<Catalog>>,
    timeout: Option<Duration>,
}

impl AsyncCatalog {
    pub fn builder() -> AsyncCatalogBuilder {
        AsyncCatalogBuilder::default()
    }

    /// Run a sync catalog operation on its own connection.
    ///
    /// `op` names the operation in `Internal` errors raised here (timeout,
    /// interruption, task failure).
    pub async fn run<F, T>(&self, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&Catalog) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let catalog = {
            let root = self
                .root
                .lock()
                .map_err(|e| CatalogError::internal(op, StoreError::Runtime(e.to_string())))?;
            root.try_clone()?
        };

        let guard = InterruptOnDrop {
            handle: Some(catalog.interrupt_handle()),
        };
        let task = tokio::task::spawn_blocking(move || f(&catalog));

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(op, timeout_ms = limit.as_millis() as u64, "catalog call timed out");
                    drop(guard);
                    return Err(CatalogError::internal(op, StoreError::Interrupted));
                }
            },
            None => task.await,
        };
        guard.disarm();

        joined.map_err(|e| CatalogError::internal(op, StoreError::Runtime(e.to_string())))?
    }

    /// Validate raw parameters, then list. Invalid input never reaches the pool.
    pub async fn list_products(&self, raw: RawListParams) -> Result<CatalogPage> {
        let query = normalize(&raw)?;
        self.run("list products", move |c| c.products().list(&query))
            .await
    }

    pub async fn get_product(&self, code: &str) -> Result<CatalogProduct> {
        let code = code.to_string();
        self.run("get product", move |c| c.get_product(&code)).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.run("list categories", |c| c.list_categories()).await
    }

    pub async fn create_category(&self, new: NewCategory) -> Result<Category> {
        let new = new.validated()?;
        self.run("create category", move |c| c.create_category(&new))
            .await
    }

    pub async fn insert_product(&self, new: NewProduct) -> Result<Product> {
        self.run("insert product", move |c| c.insert_product(&new))
            .await
    }
}
