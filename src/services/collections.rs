use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    core::{ordering, pagination, PageItem, PositionUpdate},
    db::CollectionStore,
    error::{AppError, AppResult},
    models::{filtered_view, Collection, CollectionKind, Entry, MediaType, NewEntry, Visibility},
    services::catalog::{lookup_title, CatalogProvider},
};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct CreateCollection {
    pub name: String,
    pub kind: CollectionKind,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCollection {
    pub name: Option<String>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Deserialize)]
pub struct AddEntry {
    pub media_type: MediaType,
    pub catalog_id: u64,
}

/// Drag-and-drop inside the view filtered by `q`
#[derive(Debug, Deserialize)]
pub struct Reorder {
    #[serde(default)]
    pub q: Option<String>,
    pub source_index: usize,
    pub destination_index: usize,
}

/// Filter and page of an entry listing
#[derive(Debug, Default, Deserialize)]
pub struct EntryQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<usize>,
}

/// One page of a (possibly filtered) collection
///
/// `collection` is `None` only for a watchlist that has not been created yet.
#[derive(Debug, Serialize)]
pub struct EntryPage {
    pub collection: Option<Collection>,
    pub entries: Vec<Entry>,
    pub page: u32,
    pub per_page: usize,
    /// Entries matching the filter, across all pages
    pub total_entries: usize,
    pub total_pages: u32,
    pub pages: Vec<PageItem>,
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "name cannot exceed {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// Creates a playlist or list; watchlists only come into being on first add
pub async fn create_collection(
    store: &dyn CollectionStore,
    owner_id: &str,
    request: CreateCollection,
) -> AppResult<Collection> {
    if request.kind == CollectionKind::Watchlist {
        return Err(AppError::InvalidInput(
            "watchlists are created by adding an item to them".to_string(),
        ));
    }
    let name = validate_name(&request.name)?;

    let collection = Collection::new(owner_id.to_string(), request.kind, name, request.visibility);
    store.create_collection(&collection).await?;

    tracing::info!(
        collection_id = %collection.id,
        owner_id = %owner_id,
        kind = collection.kind.as_str(),
        "Created collection"
    );
    Ok(collection)
}

/// Fetches a collection `caller` may read.
///
/// Collections the caller cannot see are reported as missing.
pub async fn readable_collection(
    store: &dyn CollectionStore,
    id: Uuid,
    caller: Option<&str>,
) -> AppResult<Collection> {
    store
        .get_collection(id)
        .await?
        .filter(|c| c.is_visible_to(caller))
        .ok_or_else(|| AppError::NotFound(format!("collection {}", id)))
}

/// Fetches a collection `owner_id` may modify
pub async fn owned_collection(
    store: &dyn CollectionStore,
    id: Uuid,
    owner_id: &str,
) -> AppResult<Collection> {
    let collection = readable_collection(store, id, Some(owner_id)).await?;
    if !collection.is_owned_by(owner_id) {
        return Err(AppError::Forbidden(
            "only the owner can modify this collection".to_string(),
        ));
    }
    Ok(collection)
}

pub async fn update_collection(
    store: &dyn CollectionStore,
    id: Uuid,
    owner_id: &str,
    request: UpdateCollection,
) -> AppResult<Collection> {
    let mut collection = owned_collection(store, id, owner_id).await?;

    if let Some(name) = request.name {
        collection.name = validate_name(&name)?;
    }
    if let Some(visibility) = request.visibility {
        collection.visibility = visibility;
    }
    collection.updated_at = Utc::now();

    store.update_collection(&collection).await?;
    Ok(collection)
}

pub async fn delete_collection(store: &dyn CollectionStore, id: Uuid, owner_id: &str) -> AppResult<()> {
    let collection = owned_collection(store, id, owner_id).await?;
    if !store.delete_collection(collection.id).await? {
        return Err(AppError::NotFound(format!("collection {}", id)));
    }
    tracing::info!(collection_id = %id, "Deleted collection");
    Ok(())
}

/// Validated `(page, per_page)` of a listing request
pub fn page_params(query: &EntryQuery, default_page_size: usize) -> AppResult<(u32, usize)> {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(AppError::InvalidInput("page starts at 1".to_string()));
    }
    let per_page = query.per_page.unwrap_or(default_page_size);
    if per_page == 0 || per_page > MAX_PAGE_SIZE {
        return Err(AppError::InvalidInput(format!(
            "per_page must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok((page, per_page))
}

/// Lists one page of the entries matching `query.q`, with its page window
pub async fn list_entries(
    store: &dyn CollectionStore,
    collection: Collection,
    query: &EntryQuery,
    default_page_size: usize,
    max_visible_pages: u32,
) -> AppResult<EntryPage> {
    let (page, per_page) = page_params(query, default_page_size)?;

    let all = store.list_entries(collection.id).await?;
    let view = filtered_view(&all, query.q.as_deref());

    let total_pages = pagination::total_pages(view.len(), per_page);
    let bounds = pagination::page_bounds(view.len(), page, per_page);
    let entries: Vec<Entry> = view[bounds].iter().map(|e| Entry::clone(e)).collect();

    Ok(EntryPage {
        collection: Some(collection),
        entries,
        page,
        per_page,
        total_entries: view.len(),
        total_pages,
        pages: pagination::page_window(page, total_pages, max_visible_pages),
    })
}

/// Listing of a collection that does not exist yet
pub fn empty_page(per_page: usize, max_visible_pages: u32) -> EntryPage {
    EntryPage {
        collection: None,
        entries: Vec::new(),
        page: 1,
        per_page,
        total_entries: 0,
        total_pages: 1,
        pages: pagination::page_window(1, 1, max_visible_pages),
    }
}

/// Appends a catalog item, caching its display fields from the catalog
pub async fn add_entry(
    store: &dyn CollectionStore,
    catalog: &dyn CatalogProvider,
    collection: &Collection,
    request: AddEntry,
) -> AppResult<Entry> {
    let title = lookup_title(catalog, request.media_type, request.catalog_id).await?;

    let entry = store
        .append_entry(
            collection,
            NewEntry {
                media_type: title.media_type,
                catalog_id: title.id,
                title: title.title,
                poster_path: title.poster_path,
            },
        )
        .await?;

    tracing::info!(
        collection_id = %collection.id,
        entry_id = %entry.id,
        position = entry.position,
        "Added entry"
    );
    Ok(entry)
}

pub async fn remove_entry(
    store: &dyn CollectionStore,
    collection: &Collection,
    entry_id: Uuid,
) -> AppResult<()> {
    if !store.remove_entry(collection, entry_id).await? {
        return Err(AppError::NotFound(format!("entry {}", entry_id)));
    }
    tracing::info!(collection_id = %collection.id, entry_id = %entry_id, "Removed entry");
    Ok(())
}

/// Applies a drag-and-drop made in a filtered view to the whole collection.
///
/// Returns the position updates written; empty when the entry was dropped
/// where it started.
pub async fn reorder(
    store: &dyn CollectionStore,
    collection: &Collection,
    request: &Reorder,
) -> AppResult<Vec<PositionUpdate<Uuid>>> {
    let all = store.list_entries(collection.id).await?;
    let view = filtered_view(&all, request.q.as_deref());

    let updates = ordering::reorder_filtered(
        &view,
        &all,
        request.source_index,
        request.destination_index,
        collection.kind.position_base(),
    )?;

    if updates.is_empty() {
        return Ok(updates);
    }

    store.apply_positions(collection, &updates).await?;

    tracing::info!(
        collection_id = %collection.id,
        source = request.source_index,
        destination = request.destination_index,
        filtered = view.len(),
        total = all.len(),
        "Reordered collection"
    );
    Ok(updates)
}
