//! Listing predicates as data.
//!
//! [`compose`] turns a [`ListQuery`] into a [`Predicate`]. The same value is
//! handed to the count and to the page fetch, and it is rendered to SQL in
//! exactly one place ([`Predicate::apply`]), so `total` and the page can
//! never be filtered differently.

use duckdb::types::Value;

use crate::params::ListQuery;
use crate::price::Price;
use crate::sql_builder::SqlBuilder;

/// Join that makes `c.code` available; only added when a term needs it.
pub const CATEGORY_JOIN: &str = "JOIN categories c ON c.id = p.category_id";

/// A single condition over products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Product belongs to the category with this (lower-case) code.
    CategoryCode(String),
    /// Product price is strictly below this value.
    PriceBelow(Price),
}

impl Filter {
    fn needs_category_join(&self) -> bool {
        matches!(self, Filter::CategoryCode(_))
    }
}

/// Conjunction of filters. The empty predicate matches every product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    filters: Vec<Filter>,
}

impl Predicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn needs_category_join(&self) -> bool {
        self.filters.iter().any(Filter::needs_category_join)
    }

    /// Add this predicate's join and WHERE terms to a query over `products p`.
    pub fn apply(&self, qb: &mut SqlBuilder) {
        if self.needs_category_join() {
            qb.join(CATEGORY_JOIN);
        }
        for filter in &self.filters {
            match filter {
                Filter::CategoryCode(code) => {
                    qb.where_eq("LOWER(c.code)", Value::Text(code.clone()));
                }
                Filter::PriceBelow(ceiling) => {
                    // Wide enough for any parsed ceiling; the column itself is DECIMAL(10, 2).
                    qb.where_clause(
                        "p.price < CAST(? AS DECIMAL(38, 2))",
                        vec![Value::Text(ceiling.to_string())],
                    );
                }
            }
        }
    }

    /// Evaluate against an in-memory product and its category code.
    pub fn matches(&self, price: Price, category_code: &str) -> bool {
        self.filters.iter().all(|f| match f {
            Filter::CategoryCode(code) => category_code.to_lowercase() == *code,
            Filter::PriceBelow(ceiling) => price < *ceiling,
        })
    }
}

/// Build the predicate for a listing query.
pub fn compose(query: &ListQuery) -> Predicate {
    let mut predicate = Predicate::all();
    if let Some(code) = query.category() {
        predicate = predicate.and(Filter::CategoryCode(code.to_string()));
    }
    if let Some(ceiling) = query.price_below() {
        predicate = predicate.and(Filter::PriceBelow(ceiling));
    }
    predicate
}
