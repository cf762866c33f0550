//! Query interfaces.
//!
//! Each query struct borrows a [`CatalogStore`](crate::store::CatalogStore)
//! and exposes methods returning [`Result<T>`](crate::Result) with typed
//! catalog models.

pub mod categories;
pub mod products;

pub use categories::CategoryQuery;
pub use products::ProductQuery;
