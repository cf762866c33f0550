//! Product listing and lookup.

use crate::config::MAX_STORED_PRICE_CENTS;
use crate::error::{CatalogError, Result, StoreResultExt};
use crate::filter::compose;
use crate::models::{CatalogPage, CatalogProduct, NewProduct, Product};
use crate::params::{normalize, ListQuery, RawListParams};
use crate::price::Price;
use crate::resolve::resolve_product;
use crate::store::{CatalogStore, WriteOutcome};

// ---------------------------------------------------------------------------
// ProductQuery
// ---------------------------------------------------------------------------

/// Query interface for products, bound to one store.
pub struct ProductQuery<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> ProductQuery<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// Validate raw transport parameters, then list.
    ///
    /// Invalid parameters are rejected before the store is touched.
    pub fn list_raw(&self, raw: &RawListParams) -> Result<CatalogPage> {
        let query = normalize(raw)?;
        self.list(&query)
    }

    /// One page of products plus the total matching the same filters.
    ///
    /// `total` ignores offset and limit. Count and fetch run as separate
    /// statements, so a concurrent write may make them disagree slightly.
    pub fn list(&self, query: &ListQuery) -> Result<CatalogPage> {
        let predicate = compose(query);
        tracing::debug!(
            offset = query.offset(),
            limit = query.limit(),
            category = query.category(),
            price_below = query.price_below().map(tracing::field::display),
            "listing products"
        );

        let total = self.store.count(&predicate).op("count products")?;
        let records = self
            .store
            .fetch_page(&predicate, query.offset(), query.limit())
            .op("fetch products")?;
        let products = self
            .store
            .load_associations(records)
            .op("load product associations")?;

        tracing::debug!(total, returned = products.len(), "listed products");
        Ok(CatalogPage {
            total,
            products: products.into_iter().map(resolve_product).collect(),
        })
    }

    /// Fetch one product by its exact code.
    pub fn get_by_code(&self, code: &str) -> Result<CatalogProduct> {
        let record = self
            .store
            .fetch_by_code(code)
            .op("fetch product")?
            .ok_or_else(|| CatalogError::not_found(format!("product {code} not found")))?;
        let mut products = self
            .store
            .load_associations(vec![record])
            .op("load product associations")?;
        products
            .pop()
            .map(resolve_product)
            .ok_or_else(|| CatalogError::not_found(format!("product {code} not found")))
    }

    /// Insert a product with its variants. Prices are stored as given.
    pub fn create(&self, new: &NewProduct) -> Result<Product> {
        if new.code.trim().is_empty() || new.category_code.trim().is_empty() {
            return Err(CatalogError::invalid("code and category are required"));
        }
        let max = Price::from_cents(MAX_STORED_PRICE_CENTS);
        if new.prices().any(|p| p.as_decimal().abs() > max.as_decimal()) {
            return Err(CatalogError::invalid(format!("price magnitude must not exceed {max}")));
        }
        match self.store.insert_product(new).op("insert product")? {
            WriteOutcome::Created(product) => {
                tracing::debug!(code = %product.code, variants = product.variants.len(), "inserted product");
                Ok(product)
            }
            WriteOutcome::Duplicate(key) => Err(CatalogError::conflict(format!("{key} already exists"))),
            WriteOutcome::MissingReference(code) => {
                Err(CatalogError::invalid(format!("category {code} does not exist")))
            }
        }
    }
}
