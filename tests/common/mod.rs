//! Shared test fixtures for the catalog integration tests.
//!
//! `setup_sample_catalog()` returns an in-memory DuckDB catalog and
//! `setup_memory_store()` an [`InMemoryStore`], both seeded with the same ten
//! products across three categories.

#![allow(dead_code)]

use catalog_engine::{
    Catalog, CatalogStore, InMemoryStore, NewCategory, NewProduct, Price, WriteOutcome,
};

/// Shoes priced strictly below 20.00, in id order.
pub const CHEAP_SHOES: [&str; 5] = ["PROD002", "PROD003", "PROD004", "PROD006", "PROD008"];

pub fn setup_sample_catalog() -> Catalog {
    let catalog = Catalog::builder().in_memory().build().unwrap();
    seed(catalog.connection());
    catalog
}

pub fn setup_memory_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    seed(&store);
    store
}

pub fn price(raw: &str) -> Price {
    raw.parse().unwrap()
}

pub fn seed(store: &dyn CatalogStore) {
    for (code, name) in [
        ("clothing", "Clothing"),
        ("shoes", "Shoes"),
        ("accessories", "Accessories"),
    ] {
        let outcome = store.create_category(&NewCategory::new(code, name)).unwrap();
        assert!(matches!(outcome, WriteOutcome::Created(_)));
    }

    let products = vec![
        NewProduct::new("PROD001", price("10.99"), "clothing")
            .variant("Variant A", "SKU001A", Some(price("11.99")))
            .variant("Variant B", "SKU001B", None),
        NewProduct::new("PROD002", price("12.49"), "shoes")
            .variant("Variant A", "SKU002A", Some(Price::ZERO)),
        NewProduct::new("PROD003", price("5.00"), "shoes"),
        NewProduct::new("PROD004", price("19.99"), "shoes"),
        NewProduct::new("PROD005", price("20.00"), "shoes"),
        NewProduct::new("PROD006", price("3.50"), "shoes"),
        NewProduct::new("PROD007", price("15.00"), "accessories")
            .variant("Gold", "SKU007G", Some(price("45.00")))
            .variant("Silver", "SKU007S", None)
            .variant("Bronze", "SKU007B", Some(Price::ZERO)),
        NewProduct::new("PROD008", price("18.00"), "shoes"),
        NewProduct::new("PROD009", price("7.25"), "clothing"),
        NewProduct::new("PROD010", price("25.00"), "shoes"),
    ];
    for product in &products {
        let outcome = store.insert_product(product).unwrap();
        assert!(
            matches!(outcome, WriteOutcome::Created(_)),
            "seeding {} failed: {outcome:?}",
            product.code
        );
    }
}
