//! Association loading for a page of products.
//!
//! A page is completed with exactly two extra statements: one for the
//! categories it references and one for all of its variants. Page size never
//! changes the number of round-trips.

use std::collections::HashMap;

use duckdb::types::Value;

use crate::config::{CATEGORIES_TABLE, VARIANTS_TABLE};
use crate::connection::Connection;
use crate::error::{StoreError, StoreResult};
use crate::models::{Category, CategoryRecord, Product, ProductRecord, Variant};
use crate::sql_builder::SqlBuilder;

/// Attach category and variants to every record, preserving record order.
pub fn load(conn: &Connection, records: Vec<ProductRecord>) -> StoreResult<Vec<Product>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let category_ids = distinct(records.iter().map(|r| r.category_id));
    let product_ids: Vec<Value> = records.iter().map(|r| Value::BigInt(r.id)).collect();

    let categories = load_categories(conn, &category_ids)?;
    let variants = load_variants(conn, &product_ids)?;
    tracing::debug!(
        products = records.len(),
        categories = categories.len(),
        variants = variants.len(),
        "loaded associations"
    );

    assemble(records, categories, variants)
}

fn load_categories(conn: &Connection, ids: &[Value]) -> StoreResult<Vec<CategoryRecord>> {
    let mut qb = SqlBuilder::new(CATEGORIES_TABLE);
    qb.select(&["id", "code", "name"]).where_in("id", ids);
    let (sql, params) = qb.build();
    conn.execute_into(&sql, &params)
}

fn load_variants(conn: &Connection, product_ids: &[Value]) -> StoreResult<Vec<Variant>> {
    let mut qb = SqlBuilder::new(VARIANTS_TABLE);
    qb.select(&[
        "id",
        "product_id",
        "name",
        "sku",
        "CAST(price AS VARCHAR) AS price",
    ])
    .where_in("product_id", product_ids)
    .order_by(&["product_id ASC", "id ASC"]);
    let (sql, params) = qb.build();
    conn.execute_into(&sql, &params)
}

fn distinct(ids: impl Iterator<Item = i64>) -> Vec<Value> {
    let mut seen = Vec::new();
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen.into_iter().map(Value::BigInt).collect()
}

/// Join already-fetched rows into products.
///
/// `variants` may arrive in any order; each product's list is sorted by
/// variant id. A record whose category is missing is a data error.
pub fn assemble(
    records: Vec<ProductRecord>,
    categories: Vec<CategoryRecord>,
    variants: Vec<Variant>,
) -> StoreResult<Vec<Product>> {
    let categories: HashMap<i64, Category> = categories
        .into_iter()
        .map(|c| (c.id, Category::from(c)))
        .collect();

    let mut by_product: HashMap<i64, Vec<Variant>> = HashMap::new();
    for v in variants {
        by_product.entry(v.product_id).or_default().push(v);
    }

    records
        .into_iter()
        .map(|r| {
            let category = categories.get(&r.category_id).cloned().ok_or_else(|| {
                StoreError::Decode(format!(
                    "product {} references missing category {}",
                    r.code, r.category_id
                ))
            })?;
            let mut variants = by_product.remove(&r.id).unwrap_or_default();
            variants.sort_by_key(|v| v.id);
            Ok(Product {
                id: r.id,
                code: r.code,
                price: r.price,
                category,
                variants,
            })
        })
        .collect()
}
