use axum::{
    http::StatusCode,
    middleware::from_fn,
    response::Redirect,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

pub mod collections;
pub mod pages;
pub mod state;
pub mod titles;
pub mod watchlist;

pub use state::{AppState, PaginationSettings};

/// Prefix every API route is nested under
pub const API_PREFIX: &str = "/api/v1";

/// Creates the application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest(API_PREFIX, api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog pages
        .route("/movie/:id", get(titles::movie_by_id))
        .route("/movie/:id/:slug", get(titles::movie))
        .route("/tv/:id", get(titles::tv_by_id))
        .route("/tv/:id/:slug", get(titles::tv))
        .route("/person/:slug", get(titles::person))
        .route("/search", get(titles::search))
        .route("/pages", get(pages::page_window))
        // Playlists and lists
        .route(
            "/collections",
            get(collections::list).post(collections::create),
        )
        .route(
            "/collections/:id",
            get(collections::get)
                .patch(collections::update)
                .delete(collections::delete),
        )
        .route(
            "/collections/:id/entries",
            get(collections::entries).post(collections::add_entry),
        )
        .route(
            "/collections/:id/entries/:entry_id",
            delete(collections::remove_entry),
        )
        .route("/collections/:id/reorder", post(collections::reorder))
        // Watchlist
        .route("/watchlist", get(watchlist::get))
        .route("/watchlist/entries", post(watchlist::add_entry))
        .route("/watchlist/reorder", post(watchlist::reorder))
}

/// Permanent redirect to an API path
pub(crate) fn redirect_to(path: &str) -> Redirect {
    Redirect::permanent(&format!("{}{}", API_PREFIX, path))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
