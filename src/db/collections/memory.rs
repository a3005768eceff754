use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    core::{ordering, PositionUpdate},
    error::{AppError, AppResult},
    models::{Collection, CollectionKind, Entry, NewEntry, Visibility},
};

use super::{is_dense, CollectionStore};

/// Process-local collection store
///
/// All mutations of one collection happen under a single write guard, which
/// gives the same all-or-nothing batches as the Postgres store.
#[derive(Default)]
pub struct InMemoryCollectionStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<Uuid, Collection>,
    /// Entries per collection, kept sorted by position
    entries: HashMap<Uuid, Vec<Entry>>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn create_collection(&self, collection: &Collection) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.collections.contains_key(&collection.id) {
            return Err(AppError::Conflict(format!(
                "collection {} already exists",
                collection.id
            )));
        }
        inner.collections.insert(collection.id, collection.clone());
        inner.entries.insert(collection.id, Vec::new());
        Ok(())
    }

    async fn get_collection(&self, id: Uuid) -> AppResult<Option<Collection>> {
        let inner = self.inner.read().await;
        Ok(inner.collections.get(&id).cloned())
    }

    async fn list_collections(&self, owner_id: &str) -> AppResult<Vec<Collection>> {
        let inner = self.inner.read().await;
        let mut collections: Vec<Collection> = inner
            .collections
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        collections.sort_by_key(|c| c.created_at);
        Ok(collections)
    }

    async fn find_watchlist(&self, owner_id: &str) -> AppResult<Option<Collection>> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .values()
            .find(|c| c.owner_id == owner_id && c.kind == CollectionKind::Watchlist)
            .cloned())
    }

    async fn get_or_create_watchlist(&self, owner_id: &str) -> AppResult<Collection> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner
            .collections
            .values()
            .find(|c| c.owner_id == owner_id && c.kind == CollectionKind::Watchlist)
        {
            return Ok(existing.clone());
        }

        let watchlist = Collection::new(
            owner_id.to_string(),
            CollectionKind::Watchlist,
            "Watchlist".to_string(),
            Visibility::Private,
        );
        inner.collections.insert(watchlist.id, watchlist.clone());
        inner.entries.insert(watchlist.id, Vec::new());
        tracing::debug!(owner_id = %owner_id, collection_id = %watchlist.id, "Created watchlist");
        Ok(watchlist)
    }

    async fn update_collection(&self, collection: &Collection) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .collections
            .get_mut(&collection.id)
            .ok_or_else(|| AppError::NotFound(format!("collection {}", collection.id)))?;
        stored.name = collection.name.clone();
        stored.visibility = collection.visibility;
        stored.updated_at = collection.updated_at;
        Ok(())
    }

    async fn delete_collection(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        inner.entries.remove(&id);
        Ok(inner.collections.remove(&id).is_some())
    }

    async fn list_entries(&self, collection_id: Uuid) -> AppResult<Vec<Entry>> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(&collection_id).cloned().unwrap_or_default())
    }

    async fn append_entry(&self, collection: &Collection, item: NewEntry) -> AppResult<Entry> {
        let mut inner = self.inner.write().await;
        let entries = inner
            .entries
            .get_mut(&collection.id)
            .ok_or_else(|| AppError::NotFound(format!("collection {}", collection.id)))?;

        if entries
            .iter()
            .any(|e| e.refers_to(item.media_type, item.catalog_id))
        {
            return Err(AppError::Conflict(format!(
                "{} {} is already in this collection",
                item.media_type, item.catalog_id
            )));
        }

        let position = ordering::next_position(entries.len(), collection.kind.position_base())?;
        let entry = Entry::new(collection.id, item, position);
        entries.push(entry.clone());
        touch(&mut inner, collection.id);
        Ok(entry)
    }

    async fn remove_entry(&self, collection: &Collection, entry_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(entries) = inner.entries.get_mut(&collection.id) else {
            return Ok(false);
        };
        let Some(index) = entries.iter().position(|e| e.id == entry_id) else {
            return Ok(false);
        };

        entries.remove(index);
        let updates = ordering::repack(&entries[..], collection.kind.position_base())?;
        for (entry, update) in entries.iter_mut().zip(updates) {
            entry.position = update.position;
        }
        touch(&mut inner, collection.id);
        Ok(true)
    }

    async fn apply_positions(
        &self,
        collection: &Collection,
        updates: &[PositionUpdate<Uuid>],
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let entries = inner
            .entries
            .get_mut(&collection.id)
            .ok_or_else(|| AppError::NotFound(format!("collection {}", collection.id)))?;

        let by_id: HashMap<Uuid, u32> = updates.iter().map(|u| (u.id, u.position)).collect();
        let covers_collection = by_id.len() == updates.len()
            && by_id.len() == entries.len()
            && entries.iter().all(|e| by_id.contains_key(&e.id));
        let mut positions: Vec<u32> = by_id.values().copied().collect();
        if !covers_collection || !is_dense(&mut positions, collection.kind.position_base().value()) {
            return Err(AppError::Conflict(
                "position update does not match the current collection".to_string(),
            ));
        }

        for entry in entries.iter_mut() {
            if let Some(position) = by_id.get(&entry.id) {
                entry.position = *position;
            }
        }
        entries.sort_by_key(|e| e.position);
        touch(&mut inner, collection.id);
        Ok(())
    }
}

fn touch(inner: &mut Inner, collection_id: Uuid) {
    if let Some(collection) = inner.collections.get_mut(&collection_id) {
        collection.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;

    fn item(catalog_id: u64, title: &str) -> NewEntry {
        NewEntry {
            media_type: MediaType::Movie,
            catalog_id,
            title: title.to_string(),
            poster_path: None,
        }
    }

    fn playlist(store: &InMemoryCollectionStore) -> Collection {
        let collection = Collection::new(
            "alice".to_string(),
            CollectionKind::Playlist,
            "Friday".to_string(),
            Visibility::Public,
        );
        tokio_test::block_on(store.create_collection(&collection)).unwrap();
        collection
    }

    fn positions(store: &InMemoryCollectionStore, collection: &Collection) -> Vec<(String, u32)> {
        tokio_test::block_on(store.list_entries(collection.id))
            .unwrap()
            .into_iter()
            .map(|e| (e.title, e.position))
            .collect()
    }

    #[test]
    fn test_append_uses_kind_base() {
        let store = InMemoryCollectionStore::new();
        let collection = playlist(&store);

        tokio_test::block_on(store.append_entry(&collection, item(1, "Heat"))).unwrap();
        tokio_test::block_on(store.append_entry(&collection, item(2, "Ronin"))).unwrap();

        assert_eq!(
            positions(&store, &collection),
            vec![("Heat".to_string(), 1), ("Ronin".to_string(), 2)]
        );
    }

    #[test]
    fn test_duplicate_item_conflicts() {
        let store = InMemoryCollectionStore::new();
        let collection = playlist(&store);

        tokio_test::block_on(store.append_entry(&collection, item(1, "Heat"))).unwrap();
        let result = tokio_test::block_on(store.append_entry(&collection, item(1, "Heat")));
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_remove_repacks_positions() {
        let store = InMemoryCollectionStore::new();
        let collection = playlist(&store);
        let first = tokio_test::block_on(store.append_entry(&collection, item(1, "Heat"))).unwrap();
        tokio_test::block_on(store.append_entry(&collection, item(2, "Ronin"))).unwrap();
        tokio_test::block_on(store.append_entry(&collection, item(3, "Thief"))).unwrap();

        assert!(tokio_test::block_on(store.remove_entry(&collection, first.id)).unwrap());
        assert!(!tokio_test::block_on(store.remove_entry(&collection, first.id)).unwrap());

        assert_eq!(
            positions(&store, &collection),
            vec![("Ronin".to_string(), 1), ("Thief".to_string(), 2)]
        );
    }

    #[test]
    fn test_apply_positions_rejects_partial_batches() {
        let store = InMemoryCollectionStore::new();
        let collection = playlist(&store);
        let a = tokio_test::block_on(store.append_entry(&collection, item(1, "A"))).unwrap();
        let b = tokio_test::block_on(store.append_entry(&collection, item(2, "B"))).unwrap();

        let partial = vec![PositionUpdate { id: b.id, position: 1 }];
        let result = tokio_test::block_on(store.apply_positions(&collection, &partial));
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let colliding = vec![
            PositionUpdate { id: a.id, position: 1 },
            PositionUpdate { id: b.id, position: 1 },
        ];
        let result = tokio_test::block_on(store.apply_positions(&collection, &colliding));
        assert!(matches!(result, Err(AppError::Conflict(_))));

        assert_eq!(
            positions(&store, &collection),
            vec![("A".to_string(), 1), ("B".to_string(), 2)]
        );
    }

    #[test]
    fn test_apply_positions_reorders() {
        let store = InMemoryCollectionStore::new();
        let collection = playlist(&store);
        let a = tokio_test::block_on(store.append_entry(&collection, item(1, "A"))).unwrap();
        let b = tokio_test::block_on(store.append_entry(&collection, item(2, "B"))).unwrap();

        let swap = vec![
            PositionUpdate { id: b.id, position: 1 },
            PositionUpdate { id: a.id, position: 2 },
        ];
        tokio_test::block_on(store.apply_positions(&collection, &swap)).unwrap();

        assert_eq!(
            positions(&store, &collection),
            vec![("B".to_string(), 1), ("A".to_string(), 2)]
        );
    }

    #[test]
    fn test_watchlist_is_created_once() {
        let store = InMemoryCollectionStore::new();
        assert!(tokio_test::block_on(store.find_watchlist("bob")).unwrap().is_none());

        let first = tokio_test::block_on(store.get_or_create_watchlist("bob")).unwrap();
        let second = tokio_test::block_on(store.get_or_create_watchlist("bob")).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.kind, CollectionKind::Watchlist);
        assert_eq!(tokio_test::block_on(store.list_collections("bob")).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_collection_drops_entries() {
        let store = InMemoryCollectionStore::new();
        let collection = playlist(&store);
        tokio_test::block_on(store.append_entry(&collection, item(1, "A"))).unwrap();

        assert!(tokio_test::block_on(store.delete_collection(collection.id)).unwrap());
        assert!(tokio_test::block_on(store.get_collection(collection.id)).unwrap().is_none());
        assert!(tokio_test::block_on(store.list_entries(collection.id)).unwrap().is_empty());
    }
}
