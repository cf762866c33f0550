//! Variant price resolution.
//!
//! Stored variant prices are optional. A variant with no price, or a price of
//! zero, is sold at its product's price. Resolution happens only when building
//! the caller-facing [`CatalogProduct`]; stored rows are never rewritten.

use crate::models::{CatalogProduct, CatalogVariant, Product, Variant};
use crate::price::Price;

/// Price a variant is actually sold at.
pub fn effective_price(own: Option<Price>, parent: Price) -> Price {
    match own {
        Some(p) if !p.is_zero() => p,
        _ => parent,
    }
}

pub fn resolve_variant(variant: Variant, parent: Price) -> CatalogVariant {
    CatalogVariant {
        price: effective_price(variant.price, parent),
        name: variant.name,
        sku: variant.sku,
    }
}

/// Build the caller-facing shape of a fully loaded product.
pub fn resolve_product(product: Product) -> CatalogProduct {
    let parent = product.price;
    CatalogProduct {
        code: product.code,
        price: parent,
        category: product.category,
        variants: product
            .variants
            .into_iter()
            .map(|v| resolve_variant(v, parent))
            .collect(),
    }
}
