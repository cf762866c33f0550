use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::price::Price;

// ---------------------------------------------------------------------------
// ProductRecord: products row before associations are attached
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub code: String,
    pub price: Price,
    pub category_id: i64,
}

// ---------------------------------------------------------------------------
// Variant: product_variants row; `price` is `None` when unset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub price: Option<Price>,
}

// ---------------------------------------------------------------------------
// Product: fully loaded product with stored (unresolved) variant prices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub code: String,
    pub price: Price,
    pub category: Category,
    pub variants: Vec<Variant>,
}

// ---------------------------------------------------------------------------
// NewProduct / NewVariant: seeding input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub price: Price,
    pub category_code: String,
    #[serde(default)]
    pub variants: Vec<NewVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariant {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub price: Option<Price>,
}

impl NewProduct {
    pub fn new(code: impl Into<String>, price: Price, category_code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            price,
            category_code: category_code.into(),
            variants: Vec::new(),
        }
    }

    pub fn variant(mut self, name: impl Into<String>, sku: impl Into<String>, price: Option<Price>) -> Self {
        self.variants.push(NewVariant {
            name: name.into(),
            sku: sku.into(),
            price,
        });
        self
    }

    /// First SKU that appears more than once among the new variants.
    pub fn repeated_sku(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.variants
            .iter()
            .map(|v| v.sku.as_str())
            .find(|sku| !seen.insert(*sku))
    }

    /// The product price followed by every explicit variant price.
    pub fn prices(&self) -> impl Iterator<Item = Price> + '_ {
        std::iter::once(self.price).chain(self.variants.iter().filter_map(|v| v.price))
    }
}
