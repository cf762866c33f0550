use duckdb::types::Value;

use super::{CatalogStore, WriteOutcome};
use crate::config::{CATEGORIES_TABLE, PRODUCTS_TABLE, VARIANTS_TABLE};
use crate::connection::Connection;
use crate::error::{StoreError, StoreResult};
use crate::filter::Predicate;
use crate::loader;
use crate::models::{CategoryRecord, NewCategory, NewProduct, Product, ProductRecord};
use crate::price::Price;
use crate::sql_builder::SqlBuilder;

const PRODUCT_COLUMNS: &[&str] = &[
    "p.id",
    "p.code",
    "CAST(p.price AS VARCHAR) AS price",
    "p.category_id",
];

fn products() -> SqlBuilder {
    SqlBuilder::new(&format!("{PRODUCTS_TABLE} p"))
}

fn price_param(price: Option<Price>) -> Value {
    match price {
        Some(p) => Value::Text(p.to_string()),
        None => Value::Null,
    }
}

fn scalar_i64(value: Option<serde_json::Value>) -> StoreResult<i64> {
    value
        .as_ref()
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| StoreError::Decode(format!("expected integer scalar, got {value:?}")))
}

/// Unique-key violations and write-write conflicts with a concurrent
/// transaction, both of which mean another writer claimed the key first.
fn is_key_conflict(err: &StoreError) -> bool {
    let StoreError::DuckDb(e) = err else {
        return false;
    };
    let msg = e.to_string().to_lowercase();
    msg.contains("duplicate key") || msg.contains("conflict")
}

/// Turn a lost race for `key` into [`WriteOutcome::Duplicate`].
fn claim<T>(key: &str, result: StoreResult<WriteOutcome<T>>) -> StoreResult<WriteOutcome<T>> {
    match result {
        Err(e) if is_key_conflict(&e) => {
            tracing::debug!(key, error = %e, "concurrent writer claimed key");
            Ok(WriteOutcome::Duplicate(key.to_string()))
        }
        other => other,
    }
}

impl Connection {
    fn exists(&self, table: &str, column: &str, value: &str) -> StoreResult<bool> {
        let mut qb = SqlBuilder::new(table);
        qb.select(&["COUNT(*)"])
            .where_eq(column, Value::Text(value.to_string()));
        let (sql, params) = qb.build();
        Ok(scalar_i64(self.execute_scalar(&sql, &params)?)? > 0)
    }
}

impl CatalogStore for Connection {
    fn count(&self, predicate: &Predicate) -> StoreResult<u64> {
        let mut qb = products();
        qb.select(&["COUNT(*)"]);
        predicate.apply(&mut qb);
        let (sql, params) = qb.build();
        let n = scalar_i64(self.execute_scalar(&sql, &params)?)?;
        u64::try_from(n).map_err(|_| StoreError::Decode(format!("negative count {n}")))
    }

    fn fetch_page(
        &self,
        predicate: &Predicate,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<ProductRecord>> {
        let mut qb = products();
        qb.select(PRODUCT_COLUMNS);
        predicate.apply(&mut qb);
        qb.order_by(&["p.id ASC"]).limit(limit).offset(offset);
        let (sql, params) = qb.build();
        self.execute_into(&sql, &params)
    }

    fn fetch_by_code(&self, code: &str) -> StoreResult<Option<ProductRecord>> {
        let mut qb = products();
        qb.select(PRODUCT_COLUMNS)
            .where_eq("p.code", Value::Text(code.to_string()))
            .limit(1);
        let (sql, params) = qb.build();
        Ok(self.execute_into(&sql, &params)?.into_iter().next())
    }

    fn load_associations(&self, records: Vec<ProductRecord>) -> StoreResult<Vec<Product>> {
        loader::load(self, records)
    }

    fn list_categories(&self) -> StoreResult<Vec<CategoryRecord>> {
        let mut qb = SqlBuilder::new(CATEGORIES_TABLE);
        qb.select(&["id", "code", "name"]).order_by(&["id ASC"]);
        let (sql, params) = qb.build();
        self.execute_into(&sql, &params)
    }

    fn create_category(&self, new: &NewCategory) -> StoreResult<WriteOutcome<CategoryRecord>> {
        let result = self.transaction(|tx| {
            if tx.exists(CATEGORIES_TABLE, "code", &new.code)? {
                return Ok(WriteOutcome::Duplicate(new.code.clone()));
            }
            let created: Vec<CategoryRecord> = tx.execute_into(
                "INSERT INTO categories (code, name) VALUES (?, ?) RETURNING id, code, name",
                &[Value::Text(new.code.clone()), Value::Text(new.name.clone())],
            )?;
            created
                .into_iter()
                .next()
                .map(WriteOutcome::Created)
                .ok_or_else(|| StoreError::Decode("insert returned no row".into()))
        });
        claim(&new.code, result)
    }

    fn insert_product(&self, new: &NewProduct) -> StoreResult<WriteOutcome<Product>> {
        let result = self.transaction(|tx| {
            let mut qb = SqlBuilder::new(CATEGORIES_TABLE);
            qb.select(&["id"])
                .where_eq("code", Value::Text(new.category_code.clone()));
            let (sql, params) = qb.build();
            let Some(category_id) = tx.execute_scalar(&sql, &params)? else {
                return Ok(WriteOutcome::MissingReference(new.category_code.clone()));
            };
            let category_id = scalar_i64(Some(category_id))?;

            if tx.exists(PRODUCTS_TABLE, "code", &new.code)? {
                return Ok(WriteOutcome::Duplicate(new.code.clone()));
            }
            if let Some(sku) = new.repeated_sku() {
                return Ok(WriteOutcome::Duplicate(sku.to_string()));
            }
            for v in &new.variants {
                if tx.exists(VARIANTS_TABLE, "sku", &v.sku)? {
                    return Ok(WriteOutcome::Duplicate(v.sku.clone()));
                }
            }

            let inserted: Vec<ProductRecord> = tx.execute_into(
                "INSERT INTO products (code, price, category_id) \
                 VALUES (?, CAST(? AS DECIMAL(10, 2)), ?) \
                 RETURNING id, code, CAST(price AS VARCHAR) AS price, category_id",
                &[
                    Value::Text(new.code.clone()),
                    price_param(Some(new.price)),
                    Value::BigInt(category_id),
                ],
            )?;
            let record = inserted
                .into_iter()
                .next()
                .ok_or_else(|| StoreError::Decode("insert returned no row".into()))?;

            for v in &new.variants {
                tx.execute_statement(
                    "INSERT INTO product_variants (product_id, name, sku, price) \
                     VALUES (?, ?, ?, CAST(? AS DECIMAL(10, 2)))",
                    &[
                        Value::BigInt(record.id),
                        Value::Text(v.name.clone()),
                        Value::Text(v.sku.clone()),
                        price_param(v.price),
                    ],
                )?;
            }

            let mut loaded = loader::load(tx, vec![record])?;
            loaded
                .pop()
                .map(WriteOutcome::Created)
                .ok_or_else(|| StoreError::Decode("inserted product vanished".into()))
        });
        claim(&new.code, result)
    }
}
