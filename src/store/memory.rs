use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CatalogStore, WriteOutcome};
use crate::error::{StoreError, StoreResult};
use crate::filter::Predicate;
use crate::loader;
use crate::models::{CategoryRecord, NewCategory, NewProduct, Product, ProductRecord, Variant};

#[derive(Debug, Default)]
struct Tables {
    categories: Vec<CategoryRecord>,
    products: Vec<ProductRecord>,
    variants: Vec<Variant>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn category_code(&self, id: i64) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.code.as_str())
    }

    fn matching<'a>(&'a self, predicate: &'a Predicate) -> impl Iterator<Item = &'a ProductRecord> + 'a {
        self.products.iter().filter(move |p| {
            self.category_code(p.category_id)
                .is_some_and(|code| predicate.matches(p.price, code))
        })
    }
}

/// Catalog held in process memory.
///
/// Rows are kept in insertion order, which is also id order. Filtering uses
/// [`Predicate::matches`], the in-memory twin of the SQL rendering.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Runtime(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Runtime(e.to_string()))
    }
}

impl CatalogStore for InMemoryStore {
    fn count(&self, predicate: &Predicate) -> StoreResult<u64> {
        let tables = self.read()?;
        Ok(tables.matching(predicate).count() as u64)
    }

    fn fetch_page(
        &self,
        predicate: &Predicate,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<ProductRecord>> {
        let tables = self.read()?;
        Ok(tables
            .matching(predicate)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn fetch_by_code(&self, code: &str) -> StoreResult<Option<ProductRecord>> {
        let tables = self.read()?;
        Ok(tables.products.iter().find(|p| p.code == code).cloned())
    }

    fn load_associations(&self, records: Vec<ProductRecord>) -> StoreResult<Vec<Product>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let tables = self.read()?;
        let categories = tables
            .categories
            .iter()
            .filter(|c| records.iter().any(|r| r.category_id == c.id))
            .cloned()
            .collect();
        let variants = tables
            .variants
            .iter()
            .filter(|v| records.iter().any(|r| r.id == v.product_id))
            .cloned()
            .collect();
        drop(tables);
        loader::assemble(records, categories, variants)
    }

    fn list_categories(&self) -> StoreResult<Vec<CategoryRecord>> {
        Ok(self.read()?.categories.clone())
    }

    fn create_category(&self, new: &NewCategory) -> StoreResult<WriteOutcome<CategoryRecord>> {
        let mut tables = self.write()?;
        if tables.categories.iter().any(|c| c.code == new.code) {
            return Ok(WriteOutcome::Duplicate(new.code.clone()));
        }
        let record = CategoryRecord {
            id: tables.next_id(),
            code: new.code.clone(),
            name: new.name.clone(),
        };
        tables.categories.push(record.clone());
        Ok(WriteOutcome::Created(record))
    }

    fn insert_product(&self, new: &NewProduct) -> StoreResult<WriteOutcome<Product>> {
        let mut tables = self.write()?;
        let Some(category_id) = tables
            .categories
            .iter()
            .find(|c| c.code == new.category_code)
            .map(|c| c.id)
        else {
            return Ok(WriteOutcome::MissingReference(new.category_code.clone()));
        };
        if tables.products.iter().any(|p| p.code == new.code) {
            return Ok(WriteOutcome::Duplicate(new.code.clone()));
        }
        if let Some(sku) = new.repeated_sku() {
            return Ok(WriteOutcome::Duplicate(sku.to_string()));
        }
        if let Some(v) = new
            .variants
            .iter()
            .find(|v| tables.variants.iter().any(|existing| existing.sku == v.sku))
        {
            return Ok(WriteOutcome::Duplicate(v.sku.clone()));
        }

        let record = ProductRecord {
            id: tables.next_id(),
            code: new.code.clone(),
            price: new.price,
            category_id,
        };
        tables.products.push(record.clone());
        for v in &new.variants {
            let variant = Variant {
                id: tables.next_id(),
                product_id: record.id,
                name: v.name.clone(),
                sku: v.sku.clone(),
                price: v.price,
            };
            tables.variants.push(variant);
        }
        drop(tables);

        let mut loaded = self.load_associations(vec![record])?;
        loaded
            .pop()
            .map(WriteOutcome::Created)
            .ok_or_else(|| StoreError::Decode("inserted product vanished".into()))
    }
}
