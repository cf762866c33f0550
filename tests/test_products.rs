//! Catalog listing and lookup against the seeded DuckDB catalog.

mod common;

use catalog_engine::{ListQuery, NewProduct, Price, RawListParams, StoreError};

fn codes(page: &catalog_engine::CatalogPage) -> Vec<&str> {
    page.products.iter().map(|p| p.code.as_str()).collect()
}

// ---------------------------------------------------------------------------
// list_products
// ---------------------------------------------------------------------------

#[test]
fn defaults_return_first_ten_in_id_order() {
    let catalog = common::setup_sample_catalog();
    let page = catalog.list_products(&RawListParams::new()).unwrap();
    assert_eq!(page.total, 10);
    assert_eq!(page.products.len(), 10);
    assert_eq!(page.products[0].code, "PROD001");
    assert_eq!(page.products[9].code, "PROD010");
}

#[test]
fn category_and_price_with_paging() {
    let catalog = common::setup_sample_catalog();
    let raw = RawListParams::new()
        .category("Shoes ")
        .price_lt("20.00")
        .offset("2")
        .limit("3");
    let page = catalog.list_products(&raw).unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(codes(&page), ["PROD004", "PROD006", "PROD008"]);
    for p in &page.products {
        assert_eq!(p.category.code, "shoes");
        assert!(p.price < Price::from_cents(2000));
    }
}

#[test]
fn total_ignores_paging() {
    let catalog = common::setup_sample_catalog();
    let filtered = RawListParams::new().category("shoes").price_lt("20");
    let all = catalog.list_products(&filtered.clone().limit("100")).unwrap();
    let sliver = catalog
        .list_products(&filtered.offset("4").limit("1"))
        .unwrap();
    assert_eq!(all.total, sliver.total);
    assert_eq!(codes(&all), common::CHEAP_SHOES);
    assert_eq!(codes(&sliver), ["PROD008"]);
}

#[test]
fn ceiling_is_strict_and_exact() {
    let catalog = common::setup_sample_catalog();
    let page = catalog
        .list_products(&RawListParams::new().price_lt("19.99"))
        .unwrap();
    assert!(!codes(&page).contains(&"PROD004"));

    let page = catalog
        .list_products(&RawListParams::new().price_lt("19.991"))
        .unwrap();
    assert!(codes(&page).contains(&"PROD004"));
}

#[test]
fn ceiling_above_any_stored_price_matches_everything() {
    let catalog = common::setup_sample_catalog();
    for raw in ["100000000000000000000", "79228162514264337593543950335", "99999999.995"] {
        let page = catalog
            .list_products(&RawListParams::new().price_lt(raw))
            .unwrap();
        assert_eq!(page.total, 10, "{raw}");
    }
}

#[test]
fn zero_ceiling_matches_nothing() {
    let catalog = common::setup_sample_catalog();
    let page = catalog
        .list_products(&RawListParams::new().price_lt("0"))
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.products.is_empty());
}

#[test]
fn offset_past_the_end_is_empty_but_counted() {
    let catalog = common::setup_sample_catalog();
    let page = catalog
        .list_products(&RawListParams::new().offset("50"))
        .unwrap();
    assert_eq!(page.total, 10);
    assert!(page.products.is_empty());
}

#[test]
fn limit_is_clamped() {
    let catalog = common::setup_sample_catalog();
    let page = catalog
        .list_products(&RawListParams::new().limit("0"))
        .unwrap();
    assert_eq!(page.products.len(), 1);
    let page = catalog
        .list_products(&RawListParams::new().limit("1000"))
        .unwrap();
    assert_eq!(page.products.len(), 10);
}

#[test]
fn unknown_category_is_empty_not_an_error() {
    let catalog = common::setup_sample_catalog();
    let page = catalog
        .list_products(&RawListParams::new().category("hats"))
        .unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn empty_catalog_lists_nothing() {
    let catalog = catalog_engine::Catalog::builder().in_memory().build().unwrap();
    let page = catalog.list_products(&RawListParams::new()).unwrap();
    assert_eq!(page, catalog_engine::CatalogPage::default());
}

#[test]
fn invalid_parameters_are_rejected() {
    let catalog = common::setup_sample_catalog();
    let cases = [
        (RawListParams::new().offset("two"), "offset must be an integer"),
        (RawListParams::new().limit("ten"), "limit must be an integer"),
        (RawListParams::new().price_lt("cheap"), "price ceiling must be numeric"),
        (RawListParams::new().price_lt("-5"), "price ceiling must be >= 0"),
    ];
    for (raw, message) in cases {
        let err = catalog.list_products(&raw).unwrap_err();
        assert_eq!(err.kind(), "invalid");
        assert_eq!(err.to_string(), message);
    }
}

#[test]
fn invalid_parameters_issue_no_queries() {
    let catalog = common::setup_sample_catalog();
    let before = catalog.connection().query_count();
    let _ = catalog.list_products(&RawListParams::new().limit("x"));
    assert_eq!(catalog.connection().query_count(), before);
}

#[test]
fn interrupted_catalog_runs_no_more_queries() {
    let catalog = common::setup_sample_catalog();
    catalog.interrupt_handle().interrupt();
    let before = catalog.connection().query_count();

    let err = catalog.list_products(&RawListParams::new()).unwrap_err();
    assert_eq!(err.kind(), "internal");
    let source = std::error::Error::source(&err).unwrap();
    assert!(source
        .downcast_ref::<StoreError>()
        .is_some_and(|e| matches!(e, StoreError::Interrupted)));
    assert_eq!(catalog.connection().query_count(), before);

    let fresh = catalog.try_clone().unwrap();
    assert_eq!(fresh.list_products(&RawListParams::new()).unwrap().total, 10);
}

#[test]
fn listing_is_idempotent() {
    let catalog = common::setup_sample_catalog();
    let raw = RawListParams::new().category("clothing");
    let first = catalog.list_products(&raw).unwrap();
    let second = catalog.list_products(&raw).unwrap();
    assert_eq!(first, second);
}

#[test]
fn association_loading_is_not_per_product() {
    let catalog = common::setup_sample_catalog();
    let conn = catalog.connection();

    let before = conn.query_count();
    catalog.products().list(&ListQuery::new(0, 1)).unwrap();
    let one = conn.query_count() - before;

    let before = conn.query_count();
    catalog.products().list(&ListQuery::new(0, 10)).unwrap();
    let ten = conn.query_count() - before;

    assert_eq!(one, ten);
    // count + page + categories + variants
    assert_eq!(ten, 4);
}

// ---------------------------------------------------------------------------
// Variant prices
// ---------------------------------------------------------------------------

#[test]
fn variants_inherit_missing_or_zero_prices() {
    let catalog = common::setup_sample_catalog();
    let product = catalog.get_product("PROD007").unwrap();
    let resolved: Vec<(&str, String)> = product
        .variants
        .iter()
        .map(|v| (v.sku.as_str(), v.price.to_string()))
        .collect();
    assert_eq!(
        resolved,
        [
            ("SKU007G", "45.00".to_string()),
            ("SKU007S", "15.00".to_string()),
            ("SKU007B", "15.00".to_string()),
        ]
    );
}

#[test]
fn resolution_does_not_touch_stored_rows() {
    let catalog = common::setup_sample_catalog();
    catalog.get_product("PROD001").unwrap();
    let rows = catalog
        .connection()
        .execute(
            "SELECT CAST(price AS VARCHAR) AS price FROM product_variants WHERE sku = 'SKU001B'",
            &[],
        )
        .unwrap();
    assert!(rows[0]["price"].is_null());
}

// ---------------------------------------------------------------------------
// get_product
// ---------------------------------------------------------------------------

#[test]
fn get_product_assembles_everything() {
    let catalog = common::setup_sample_catalog();
    let product = catalog.get_product("PROD001").unwrap();
    assert_eq!(product.price, common::price("10.99"));
    assert_eq!(product.category.code, "clothing");
    assert_eq!(product.category.name, "Clothing");
    let skus: Vec<_> = product.variants.iter().map(|v| v.sku.as_str()).collect();
    assert_eq!(skus, ["SKU001A", "SKU001B"]);
    assert_eq!(product.variants[1].price, common::price("10.99"));
}

#[test]
fn product_without_variants_has_empty_list() {
    let catalog = common::setup_sample_catalog();
    assert!(catalog.get_product("PROD003").unwrap().variants.is_empty());
}

#[test]
fn get_unknown_product_is_not_found() {
    let catalog = common::setup_sample_catalog();
    let err = catalog.get_product("NOPE").unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

// ---------------------------------------------------------------------------
// JSON shape
// ---------------------------------------------------------------------------

#[test]
fn page_serializes_prices_as_numbers() {
    let catalog = common::setup_sample_catalog();
    let page = catalog
        .list_products(&RawListParams::new().category("accessories"))
        .unwrap();
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["total"], 1);
    let product = &json["products"][0];
    assert_eq!(product["code"], "PROD007");
    assert_eq!(product["price"], 15.0);
    assert_eq!(product["category"]["code"], "accessories");
    assert_eq!(product["variants"][1]["price"], 15.0);
    assert!(product.get("id").is_none());

    let text = serde_json::to_string(&page).unwrap();
    assert!(text.contains("\"price\":15.0"), "{text}");
    let back: catalog_engine::CatalogPage = serde_json::from_str(&text).unwrap();
    assert_eq!(back, page);
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

#[test]
fn repeated_sku_in_one_product_is_a_conflict() {
    let catalog = common::setup_sample_catalog();
    let new = NewProduct::new("PROD011", common::price("5.00"), "shoes")
        .variant("Left", "DUP", None)
        .variant("Right", "DUP", None);
    let err = catalog.insert_product(&new).unwrap_err();
    assert_eq!(err.kind(), "conflict");
    assert_eq!(err.to_string(), "DUP already exists");
    assert_eq!(catalog.get_product("PROD011").unwrap_err().kind(), "not_found");
}

#[test]
fn price_too_large_for_storage_is_invalid() {
    let catalog = common::setup_sample_catalog();
    let new = NewProduct::new("PROD011", common::price("100000000.00"), "shoes");
    let err = catalog.insert_product(&new).unwrap_err();
    assert_eq!(err.kind(), "invalid");

    let largest = NewProduct::new("PROD011", common::price("99999999.99"), "shoes");
    let product = catalog.insert_product(&largest).unwrap();
    assert_eq!(product.price, common::price("99999999.99"));
}
