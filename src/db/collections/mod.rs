/// Persistence for ordered collections
///
/// Every mutating operation leaves the collection's positions dense and
/// starting at the kind's base, or fails without changing anything.
use uuid::Uuid;

use crate::{
    core::PositionUpdate,
    error::AppResult,
    models::{Collection, Entry, NewEntry},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCollectionStore;
pub use postgres::PgCollectionStore;

#[async_trait::async_trait]
pub trait CollectionStore: Send + Sync {
    async fn create_collection(&self, collection: &Collection) -> AppResult<()>;

    async fn get_collection(&self, id: Uuid) -> AppResult<Option<Collection>>;

    /// All collections of one owner, oldest first
    async fn list_collections(&self, owner_id: &str) -> AppResult<Vec<Collection>>;

    async fn find_watchlist(&self, owner_id: &str) -> AppResult<Option<Collection>>;

    /// Returns the owner's watchlist, creating an empty one if needed
    async fn get_or_create_watchlist(&self, owner_id: &str) -> AppResult<Collection>;

    /// Persists name, visibility and `updated_at`
    async fn update_collection(&self, collection: &Collection) -> AppResult<()>;

    /// Deletes a collection and its entries; `false` if it did not exist
    async fn delete_collection(&self, id: Uuid) -> AppResult<bool>;

    /// All entries of a collection in position order
    async fn list_entries(&self, collection_id: Uuid) -> AppResult<Vec<Entry>>;

    /// Appends an entry after the current last position.
    ///
    /// Fails with `Conflict` when the catalog item is already present.
    async fn append_entry(&self, collection: &Collection, item: NewEntry) -> AppResult<Entry>;

    /// Removes an entry and re-packs the remaining positions in one step;
    /// `false` if the entry was not part of the collection
    async fn remove_entry(&self, collection: &Collection, entry_id: Uuid) -> AppResult<bool>;

    /// Applies a full position assignment atomically.
    ///
    /// The batch must name every entry of the collection exactly once and
    /// produce a dense run from the collection's base; otherwise nothing is
    /// written and `Conflict` is returned.
    async fn apply_positions(
        &self,
        collection: &Collection,
        updates: &[PositionUpdate<Uuid>],
    ) -> AppResult<()>;
}

/// Whether `positions` is exactly `base, base + 1, ...` once sorted
pub(crate) fn is_dense(positions: &mut [u32], base: u32) -> bool {
    positions.sort_unstable();
    positions
        .iter()
        .enumerate()
        .all(|(index, position)| u64::from(*position) == u64::from(base) + index as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_dense() {
        assert!(is_dense(&mut [], 1));
        assert!(is_dense(&mut [2, 0, 1], 0));
        assert!(is_dense(&mut [3, 1, 2], 1));
        assert!(!is_dense(&mut [1, 1, 2], 1));
        assert!(!is_dense(&mut [1, 2, 4], 1));
        assert!(!is_dense(&mut [0, 1], 1));
    }
}
