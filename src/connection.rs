//! DuckDB connection wrapper with schema setup and query execution.
//!
//! Rows come back as `serde_json` maps so they can be deserialized straight
//! into model structs. `DECIMAL` columns are selected as `VARCHAR` by the
//! callers and parsed into [`Price`](crate::price::Price), keeping money out of
//! floating point on the way out of the database.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use duckdb::types::{Value, ValueRef};
use duckdb::Connection as DuckDbConnection;
use serde::de::DeserializeOwned;

use crate::config;
use crate::error::{StoreError, StoreResult};

/// Wraps a DuckDB connection holding the catalog tables.
///
/// A `Connection` is `Send` but not `Sync`: share it across threads by
/// cloning ([`try_clone`](Self::try_clone)) rather than by reference.
pub struct Connection {
    conn: DuckDbConnection,
    queries: Cell<u64>,
    interrupted: Arc<AtomicBool>,
}

impl Connection {
    /// Open (or create) an on-disk catalog and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_schema(DuckDbConnection::open(path)?)
    }

    /// Open a private in-memory catalog and apply the schema.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_schema(DuckDbConnection::open_in_memory()?)
    }

    fn with_schema(conn: DuckDbConnection) -> StoreResult<Self> {
        conn.execute_batch(config::SCHEMA)?;
        Ok(Self {
            conn,
            queries: Cell::new(0),
            interrupted: Arc::new(AtomicBool::new(false)),
        })
    }

    /// New connection to the same database, e.g. for one request.
    ///
    /// The clone starts uninterrupted and counts its own queries.
    pub fn try_clone(&self) -> StoreResult<Self> {
        Ok(Self {
            conn: self.conn.try_clone()?,
            queries: Cell::new(0),
            interrupted: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Whether an [`InterruptHandle`] from this connection has fired.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }

    /// Run one statement unless the connection was interrupted.
    ///
    /// DuckDB resets its own interrupt flag whenever a statement is prepared,
    /// so the check here is what stops the statements after the one that was
    /// running when the interrupt landed.
    fn statement<T>(&self, run: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        if self.is_interrupted() {
            return Err(StoreError::Interrupted);
        }
        self.queries.set(self.queries.get() + 1);
        run().map_err(|e| if self.is_interrupted() { StoreError::Interrupted } else { e })
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    pub fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<Vec<HashMap<String, serde_json::Value>>> {
        self.statement(|| self.query_rows(sql, params))
    }

    fn query_rows(
        &self,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available after execution.
        let statement = rows_result
            .as_ref()
            .ok_or_else(|| StoreError::Decode("statement missing after execution".into()))?;
        let column_names: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let column_count = column_names.len();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_count);
            for (i, col_name) in column_names.iter().enumerate() {
                let value = convert_value_ref(row.get_ref(i)?);
                map.insert(col_name.clone(), value);
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[Value]) -> StoreResult<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str, params: &[Value]) -> StoreResult<Option<serde_json::Value>> {
        self.statement(|| {
            let mut stmt = self.conn.prepare(sql)?;
            let param_values: Vec<&dyn duckdb::ToSql> = params
                .iter()
                .map(|p| p as &dyn duckdb::ToSql)
                .collect();

            let mut rows = stmt.query(param_values.as_slice())?;

            if let Some(row) = rows.next()? {
                Ok(Some(convert_value_ref(row.get_ref(0)?)))
            } else {
                Ok(None)
            }
        })
    }

    /// Execute a statement that returns no rows; yields the affected row count.
    pub fn execute_statement(&self, sql: &str, params: &[Value]) -> StoreResult<usize> {
        self.statement(|| {
            let param_values: Vec<&dyn duckdb::ToSql> = params
                .iter()
                .map(|p| p as &dyn duckdb::ToSql)
                .collect();
            Ok(self.conn.execute(sql, param_values.as_slice())?)
        })
    }

    /// Run `f` inside `BEGIN` / `COMMIT`, rolling back if it or the commit fails.
    ///
    /// Transaction control statements are not counted by
    /// [`query_count`](Self::query_count).
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> StoreResult<T>) -> StoreResult<T> {
        if self.is_interrupted() {
            return Err(StoreError::Interrupted);
        }
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        let committed = f(self).and_then(|value| {
            if self.is_interrupted() {
                return Err(StoreError::Interrupted);
            }
            self.conn.execute_batch("COMMIT")?;
            Ok(value)
        });
        if committed.is_err() {
            // A failed COMMIT has already ended the transaction.
            if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                tracing::debug!(error = %rollback, "rollback skipped");
            }
        }
        committed
    }

    /// Number of statements this connection has sent to DuckDB.
    pub fn query_count(&self) -> u64 {
        self.queries.get()
    }

    /// Handle that cancels this connection.
    ///
    /// Firing it aborts the running statement and makes every later statement
    /// on this connection fail with [`StoreError::Interrupted`]. Use
    /// [`try_clone`](Self::try_clone) for a fresh connection.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        let handle = self.conn.interrupt_handle();
        InterruptHandle {
            interrupted: Arc::clone(&self.interrupted),
            trigger: Arc::new(move || handle.interrupt()),
        }
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

/// Cancels the connection it came from. Safe to use from any thread.
#[derive(Clone)]
pub struct InterruptHandle {
    interrupted: Arc<AtomicBool>,
    trigger: Arc<dyn Fn() + Send + Sync>,
}

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
        (self.trigger)();
    }
}

impl std::fmt::Debug for InterruptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InterruptHandle")
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; try i64, fallback to string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Decimal(d) => serde_json::Value::String(d.to_string()),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        _ => serde_json::Value::Null,
    }
}
