//! Storage seam for the query engine.
//!
//! [`CatalogStore`] is everything the engine needs from persistence. The
//! DuckDB-backed [`Connection`](crate::Connection) is the production
//! implementation; [`InMemoryStore`] evaluates the same [`Predicate`] over
//! plain collections.

mod memory;
mod sql;

pub use memory::InMemoryStore;

use crate::error::StoreResult;
use crate::filter::Predicate;
use crate::models::{CategoryRecord, NewCategory, NewProduct, Product, ProductRecord};

/// Result of a write that may be refused by a uniqueness or reference rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    Created(T),
    /// A row with the same unique key already exists.
    Duplicate(String),
    /// A referenced row does not exist.
    MissingReference(String),
}

pub trait CatalogStore {
    /// Number of products matching `predicate`, ignoring paging.
    fn count(&self, predicate: &Predicate) -> StoreResult<u64>;

    /// At most `limit` matching products starting at `offset`, in id order.
    fn fetch_page(
        &self,
        predicate: &Predicate,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<ProductRecord>>;

    fn fetch_by_code(&self, code: &str) -> StoreResult<Option<ProductRecord>>;

    /// Attach category and id-ordered variants to every record.
    ///
    /// The number of round-trips must not depend on `records.len()`.
    fn load_associations(&self, records: Vec<ProductRecord>) -> StoreResult<Vec<Product>>;

    /// All categories in id order.
    fn list_categories(&self) -> StoreResult<Vec<CategoryRecord>>;

    /// Insert a category unless its code is taken. Check and insert are atomic.
    fn create_category(&self, new: &NewCategory) -> StoreResult<WriteOutcome<CategoryRecord>>;

    /// Insert a product and its variants under an existing category.
    fn insert_product(&self, new: &NewProduct) -> StoreResult<WriteOutcome<Product>>;
}
