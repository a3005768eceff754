use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::{Caller, RequestId},
    models::Entry,
    routes::{
        collections::{reorder_collection, ReorderResponse},
        AppState,
    },
    services::collections::{self as service, AddEntry, EntryPage, EntryQuery, Reorder},
};

/// The caller's watchlist; an empty listing until the first item is added
pub async fn get(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Query(query): Query<EntryQuery>,
) -> AppResult<Json<EntryPage>> {
    let settings = state.pagination;
    let (_, per_page) = service::page_params(&query, settings.default_page_size)?;
    let page = match state.collections.find_watchlist(caller.id()).await? {
        Some(watchlist) => {
            service::list_entries(
                state.collections.as_ref(),
                watchlist,
                &query,
                settings.default_page_size,
                settings.max_visible_pages,
            )
            .await?
        }
        None => service::empty_page(per_page, settings.max_visible_pages),
    };
    Ok(Json(page))
}

/// Adds to the caller's watchlist, creating it on first use
pub async fn add_entry(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(request): Json<AddEntry>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    let watchlist = state.collections.get_or_create_watchlist(caller.id()).await?;
    let entry = service::add_entry(
        state.collections.as_ref(),
        state.catalog.as_ref(),
        &watchlist,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn reorder(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    caller: Caller,
    Json(request): Json<Reorder>,
) -> AppResult<Json<ReorderResponse>> {
    let watchlist = state
        .collections
        .find_watchlist(caller.id())
        .await?
        .ok_or_else(|| AppError::NotFound("watchlist".to_string()))?;
    reorder_collection(&state, request_id, &watchlist, &request).await
}
