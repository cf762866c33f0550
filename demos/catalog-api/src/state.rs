/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Opens a fresh connection per call and interrupts it when the
    /// handler's future is dropped.
    pub catalog: catalog_engine::AsyncCatalog,
}
