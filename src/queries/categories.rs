//! Category listing and creation.

use crate::error::{CatalogError, Result, StoreResultExt};
use crate::models::{Category, NewCategory};
use crate::store::{CatalogStore, WriteOutcome};

pub struct CategoryQuery<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> CategoryQuery<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// All categories, oldest first.
    pub fn list(&self) -> Result<Vec<Category>> {
        let records = self.store.list_categories().op("list categories")?;
        Ok(records.into_iter().map(Category::from).collect())
    }

    /// Create a category. Both fields are trimmed and required; an existing
    /// code is a conflict.
    pub fn create(&self, new: &NewCategory) -> Result<Category> {
        let new = new.validated()?;
        match self.store.create_category(&new).op("create category")? {
            WriteOutcome::Created(record) => {
                tracing::debug!(code = %record.code, id = record.id, "created category");
                Ok(record.into())
            }
            WriteOutcome::Duplicate(code) => Err(CatalogError::conflict(format!(
                "category {code} already exists"
            ))),
            WriteOutcome::MissingReference(what) => Err(CatalogError::invalid(format!(
                "{what} does not exist"
            ))),
        }
    }
}
