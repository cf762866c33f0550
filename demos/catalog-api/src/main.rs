mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::http::Request;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use state::AppState;

/// JSON logs filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init();
}

fn request_span<B>(req: &Request<B>) -> tracing::Span {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        request_id = %request_id,
    )
}

#[tokio::main]
async fn main() {
    init_tracing();

    let mut builder = catalog_engine::AsyncCatalog::builder()
        .timeout(std::time::Duration::from_secs(10));
    if let Ok(path) = std::env::var("CATALOG_DATABASE") {
        builder = builder.database(path);
    }
    let catalog = builder.build().await.expect("Failed to open catalog");
    tracing::info!("catalog ready");

    let state = Arc::new(AppState { catalog });

    let app = Router::new()
        .route("/catalog", get(routes::catalog::list_products))
        .route("/catalog/{code}", get(routes::catalog::get_product))
        .route(
            "/categories",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("CATALOG_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
