use std::path::PathBuf;

pub const DEFAULT_OFFSET: usize = 0;
pub const DEFAULT_LIMIT: usize = 10;
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 100;

/// Fractional digits carried by every [`Price`](crate::price::Price).
pub const PRICE_SCALE: u32 = 2;

/// Largest magnitude, in cents, that fits the `DECIMAL(10, 2)` price columns.
pub const MAX_STORED_PRICE_CENTS: i64 = 9_999_999_999;

/// Environment variable overriding [`default_database_path`].
pub const DATABASE_ENV: &str = "CATALOG_DATABASE";

pub const CATEGORIES_TABLE: &str = "categories";
pub const PRODUCTS_TABLE: &str = "products";
pub const VARIANTS_TABLE: &str = "product_variants";

/// Idempotent DDL applied whenever a catalog is opened.
pub const SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS categories_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS products_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS product_variants_id_seq START 1;

CREATE TABLE IF NOT EXISTS categories (
    id BIGINT PRIMARY KEY DEFAULT nextval('categories_id_seq'),
    code VARCHAR NOT NULL UNIQUE,
    name VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id BIGINT PRIMARY KEY DEFAULT nextval('products_id_seq'),
    code VARCHAR NOT NULL UNIQUE,
    price DECIMAL(10, 2) NOT NULL,
    category_id BIGINT NOT NULL REFERENCES categories (id)
);

CREATE TABLE IF NOT EXISTS product_variants (
    id BIGINT PRIMARY KEY DEFAULT nextval('product_variants_id_seq'),
    product_id BIGINT NOT NULL REFERENCES products (id),
    name VARCHAR NOT NULL,
    sku VARCHAR NOT NULL UNIQUE,
    price DECIMAL(10, 2)
);
";

/// Where the catalog database lives when the builder is not told otherwise.
///
/// `CATALOG_DATABASE` wins; otherwise the platform data directory
/// (e.g. `~/.local/share/catalog-engine/catalog.duckdb` on Linux).
pub fn default_database_path() -> PathBuf {
    if let Some(path) = std::env::var_os(DATABASE_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(data) = dirs::data_dir() {
        data.join("catalog-engine").join("catalog.duckdb")
    } else {
        PathBuf::from(".catalog-engine").join("catalog.duckdb")
    }
}
