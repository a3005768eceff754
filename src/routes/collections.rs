use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    core::PositionUpdate,
    error::AppResult,
    middleware::{Caller, RequestId},
    models::{Collection, Entry},
    routes::AppState,
    services::collections::{
        self as service, AddEntry, CreateCollection, EntryPage, EntryQuery, Reorder,
        UpdateCollection,
    },
};

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub collection_id: Uuid,
    pub updates: Vec<PositionUpdate<Uuid>>,
}

/// Collections owned by the caller
pub async fn list(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> AppResult<Json<Vec<Collection>>> {
    let collections = state.collections.list_collections(caller.id()).await?;
    Ok(Json(collections))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    caller: Caller,
    Json(request): Json<CreateCollection>,
) -> AppResult<(StatusCode, Json<Collection>)> {
    tracing::info!(
        request_id = %request_id,
        owner_id = %caller.id(),
        kind = request.kind.as_str(),
        "Creating collection"
    );

    let collection =
        service::create_collection(state.collections.as_ref(), caller.id(), request).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// Anonymous callers may read public collections
pub async fn get(
    State(state): State<Arc<AppState>>,
    caller: Option<Caller>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Collection>> {
    let caller_id = caller.as_ref().map(Caller::id);
    let collection = service::readable_collection(state.collections.as_ref(), id, caller_id).await?;
    Ok(Json(collection))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCollection>,
) -> AppResult<Json<Collection>> {
    let collection =
        service::update_collection(state.collections.as_ref(), id, caller.id(), request).await?;
    Ok(Json(collection))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    service::delete_collection(state.collections.as_ref(), id, caller.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// One page of entries, optionally narrowed by `q`
pub async fn entries(
    State(state): State<Arc<AppState>>,
    caller: Option<Caller>,
    Path(id): Path<Uuid>,
    Query(query): Query<EntryQuery>,
) -> AppResult<Json<EntryPage>> {
    let caller_id = caller.as_ref().map(Caller::id);
    let collection = service::readable_collection(state.collections.as_ref(), id, caller_id).await?;

    let page = service::list_entries(
        state.collections.as_ref(),
        collection,
        &query,
        state.pagination.default_page_size,
        state.pagination.max_visible_pages,
    )
    .await?;
    Ok(Json(page))
}

pub async fn add_entry(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<AddEntry>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    let collection = service::owned_collection(state.collections.as_ref(), id, caller.id()).await?;
    let entry = service::add_entry(
        state.collections.as_ref(),
        state.catalog.as_ref(),
        &collection,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove_entry(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let collection = service::owned_collection(state.collections.as_ref(), id, caller.id()).await?;
    service::remove_entry(state.collections.as_ref(), &collection, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Applies a drag-and-drop made in the (possibly filtered) entry view
pub async fn reorder(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<Reorder>,
) -> AppResult<Json<ReorderResponse>> {
    let collection = service::owned_collection(state.collections.as_ref(), id, caller.id()).await?;
    reorder_collection(&state, request_id, &collection, &request).await
}

pub(crate) async fn reorder_collection(
    state: &AppState,
    request_id: RequestId,
    collection: &Collection,
    request: &Reorder,
) -> AppResult<Json<ReorderResponse>> {
    tracing::info!(
        request_id = %request_id,
        collection_id = %collection.id,
        source = request.source_index,
        destination = request.destination_index,
        filtered = request.q.is_some(),
        "Processing reorder request"
    );

    let updates = service::reorder(state.collections.as_ref(), collection, request).await?;

    tracing::info!(
        request_id = %request_id,
        updated = updates.len(),
        "Reorder completed"
    );

    Ok(Json(ReorderResponse {
        collection_id: collection.id,
        updates,
    }))
}
