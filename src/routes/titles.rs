use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    core::{pagination, PageItem},
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{CatalogTitle, MediaType},
    routes::{redirect_to, AppState},
    services::canonical::{self, Canonical},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub page: u32,
    pub total_pages: u32,
    pub pages: Vec<PageItem>,
    pub results: Vec<CatalogTitle>,
}

/// Catalog ids are numeric; anything else cannot name a title
fn parse_catalog_id(raw: &str) -> AppResult<u64> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("title {}", raw)))
}

fn render<T: Serialize>(resolved: Canonical<T>) -> Response {
    match resolved {
        Canonical::Current(value) => Json(value).into_response(),
        Canonical::Redirect(path) => redirect_to(&path).into_response(),
    }
}

async fn title_page(
    state: &AppState,
    media_type: MediaType,
    id: &str,
    slug: &str,
) -> AppResult<Response> {
    let id = parse_catalog_id(id)?;
    let resolved = canonical::resolve_title(state.catalog.as_ref(), media_type, id, slug).await?;
    Ok(render(resolved))
}

/// `GET /movie/{id}/{slug}`
pub async fn movie(
    State(state): State<Arc<AppState>>,
    Path((id, slug)): Path<(String, String)>,
) -> AppResult<Response> {
    title_page(&state, MediaType::Movie, &id, &slug).await
}

/// `GET /movie/{id}`, always answered with the slugged path
pub async fn movie_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    title_page(&state, MediaType::Movie, &id, "").await
}

/// `GET /tv/{id}/{slug}`
pub async fn tv(
    State(state): State<Arc<AppState>>,
    Path((id, slug)): Path<(String, String)>,
) -> AppResult<Response> {
    title_page(&state, MediaType::Tv, &id, &slug).await
}

/// `GET /tv/{id}`
pub async fn tv_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    title_page(&state, MediaType::Tv, &id, "").await
}

/// `GET /person/{id}-{slug}`
pub async fn person(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let resolved = canonical::resolve_person(state.catalog.as_ref(), &slug).await?;
    Ok(render(resolved))
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let page = params.page.unwrap_or(1);

    tracing::info!(
        request_id = %request_id,
        query = %params.q,
        page = page,
        provider = state.catalog.name(),
        "Processing search request"
    );

    let results = state.catalog.search(&params.q, page).await?;
    let total_pages = results.total_pages.max(1);
    let current = results.page.clamp(1, total_pages);

    Ok(Json(SearchResponse {
        query: params.q.trim().to_string(),
        page: results.page,
        total_pages,
        pages: pagination::page_window(
            current,
            total_pages,
            state.pagination.max_visible_pages,
        ),
        results: results.results,
    }))
}
