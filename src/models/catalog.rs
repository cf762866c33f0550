//! Caller-facing shapes: what the engine returns after variant prices are
//! resolved. Every price here is concrete.

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::price::Price;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVariant {
    pub name: String,
    pub sku: String,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub code: String,
    pub price: Price,
    pub category: Category,
    pub variants: Vec<CatalogVariant>,
}

/// One page of products plus the filtered total (independent of paging).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogPage {
    pub total: u64,
    pub products: Vec<CatalogProduct>,
}
