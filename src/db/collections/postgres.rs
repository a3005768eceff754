use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{ordering, PositionUpdate},
    error::{AppError, AppResult},
    models::{Collection, CollectionKind, Entry, MediaType, NewEntry, Visibility},
};

use super::CollectionStore;

const COLLECTION_COLUMNS: &str =
    "id, owner_id, kind, name, visibility, created_at, updated_at";
const ENTRY_COLUMNS: &str =
    "id, collection_id, media_type, catalog_id, position, title, poster_path, added_at";

/// Collection store backed by PostgreSQL
#[derive(Clone)]
pub struct PgCollectionStore {
    pool: PgPool,
}

impl PgCollectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Locks the collection row so concurrent mutations of one collection
    /// are serialized
    async fn lock_collection(
        tx: &mut Transaction<'_, Postgres>,
        collection_id: Uuid,
    ) -> AppResult<()> {
        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM collections WHERE id = $1 FOR UPDATE")
                .bind(collection_id)
                .fetch_optional(&mut **tx)
                .await?;
        locked
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("collection {}", collection_id)))
    }

    async fn entries_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        collection_id: Uuid,
    ) -> AppResult<Vec<Entry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM collection_entries WHERE collection_id = $1 ORDER BY position"
        ))
        .bind(collection_id)
        .fetch_all(&mut **tx)
        .await?;
        rows.into_iter().map(Entry::try_from).collect()
    }

    /// Writes a batch of positions with a single statement
    async fn write_positions(
        tx: &mut Transaction<'_, Postgres>,
        collection_id: Uuid,
        updates: &[PositionUpdate<Uuid>],
    ) -> AppResult<u64> {
        let ids: Vec<Uuid> = updates.iter().map(|u| u.id).collect();
        let positions = updates
            .iter()
            .map(|u| position_to_db(u.position))
            .collect::<AppResult<Vec<i32>>>()?;

        let result = sqlx::query(
            r#"
            UPDATE collection_entries AS e
            SET position = u.position
            FROM UNNEST($1::uuid[], $2::int4[]) AS u(id, position)
            WHERE e.id = u.id AND e.collection_id = $3
            "#,
        )
        .bind(&ids)
        .bind(&positions)
        .bind(collection_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl CollectionStore for PgCollectionStore {
    async fn create_collection(&self, collection: &Collection) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO collections ({COLLECTION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(collection.id)
        .bind(&collection.owner_id)
        .bind(collection.kind.as_str())
        .bind(&collection.name)
        .bind(collection.visibility.as_str())
        .bind(collection.created_at)
        .bind(collection.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation_as_conflict(e, "collection already exists"))?;
        Ok(())
    }

    async fn get_collection(&self, id: Uuid) -> AppResult<Option<Collection>> {
        let row: Option<CollectionRow> = sqlx::query_as(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Collection::try_from).transpose()
    }

    async fn list_collections(&self, owner_id: &str) -> AppResult<Vec<Collection>> {
        let rows: Vec<CollectionRow> = sqlx::query_as(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE owner_id = $1 ORDER BY created_at"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Collection::try_from).collect()
    }

    async fn find_watchlist(&self, owner_id: &str) -> AppResult<Option<Collection>> {
        let row: Option<CollectionRow> = sqlx::query_as(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE owner_id = $1 AND kind = 'watchlist'"
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Collection::try_from).transpose()
    }

    async fn get_or_create_watchlist(&self, owner_id: &str) -> AppResult<Collection> {
        let candidate = Collection::new(
            owner_id.to_string(),
            CollectionKind::Watchlist,
            "Watchlist".to_string(),
            Visibility::Private,
        );

        let inserted = sqlx::query(&format!(
            "INSERT INTO collections ({COLLECTION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (owner_id) WHERE kind = 'watchlist' DO NOTHING"
        ))
        .bind(candidate.id)
        .bind(&candidate.owner_id)
        .bind(candidate.kind.as_str())
        .bind(&candidate.name)
        .bind(candidate.visibility.as_str())
        .bind(candidate.created_at)
        .bind(candidate.updated_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 1 {
            tracing::debug!(owner_id = %owner_id, collection_id = %candidate.id, "Created watchlist");
        }

        self.find_watchlist(owner_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("watchlist for {} vanished", owner_id)))
    }

    async fn update_collection(&self, collection: &Collection) -> AppResult<()> {
        let updated = sqlx::query(
            "UPDATE collections SET name = $2, visibility = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(collection.id)
        .bind(&collection.name)
        .bind(collection.visibility.as_str())
        .bind(collection.updated_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(format!("collection {}", collection.id)));
        }
        Ok(())
    }

    async fn delete_collection(&self, id: Uuid) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn list_entries(&self, collection_id: Uuid) -> AppResult<Vec<Entry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM collection_entries WHERE collection_id = $1 ORDER BY position"
        ))
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Entry::try_from).collect()
    }

    async fn append_entry(&self, collection: &Collection, item: NewEntry) -> AppResult<Entry> {
        let mut tx = self.pool.begin().await?;
        Self::lock_collection(&mut tx, collection.id).await?;

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM collection_entries WHERE collection_id = $1")
                .bind(collection.id)
                .fetch_one(&mut *tx)
                .await?;
        let len = usize::try_from(count)
            .map_err(|_| AppError::Decode(format!("negative entry count {}", count)))?;

        let position = ordering::next_position(len, collection.kind.position_base())?;
        let entry = Entry::new(collection.id, item, position);
        let catalog_id = i64::try_from(entry.catalog_id)
            .map_err(|_| AppError::InvalidInput(format!("catalog id {} too large", entry.catalog_id)))?;

        sqlx::query(&format!(
            "INSERT INTO collection_entries ({ENTRY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(entry.id)
        .bind(entry.collection_id)
        .bind(entry.media_type.as_str())
        .bind(catalog_id)
        .bind(position_to_db(entry.position)?)
        .bind(&entry.title)
        .bind(&entry.poster_path)
        .bind(entry.added_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(e, "this item is already in the collection")
        })?;

        touch(&mut tx, collection.id).await?;
        tx.commit().await?;
        Ok(entry)
    }

    async fn remove_entry(&self, collection: &Collection, entry_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        Self::lock_collection(&mut tx, collection.id).await?;

        let deleted =
            sqlx::query("DELETE FROM collection_entries WHERE id = $1 AND collection_id = $2")
                .bind(entry_id)
                .bind(collection.id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        if deleted == 0 {
            return Ok(false);
        }

        let remaining = Self::entries_in_tx(&mut tx, collection.id).await?;
        let updates = ordering::repack(&remaining, collection.kind.position_base())?;
        Self::write_positions(&mut tx, collection.id, &updates).await?;

        touch(&mut tx, collection.id).await?;
        tx.commit().await?;

        tracing::debug!(
            collection_id = %collection.id,
            entry_id = %entry_id,
            remaining = remaining.len(),
            "Removed entry and re-packed positions"
        );
        Ok(true)
    }

    async fn apply_positions(
        &self,
        collection: &Collection,
        updates: &[PositionUpdate<Uuid>],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::lock_collection(&mut tx, collection.id).await?;

        let current = Self::entries_in_tx(&mut tx, collection.id).await?;
        let written = Self::write_positions(&mut tx, collection.id, updates).await?;

        let mut positions: Vec<u32> = updates.iter().map(|u| u.position).collect();
        let matches_collection = written as usize == current.len()
            && updates.len() == current.len()
            && super::is_dense(&mut positions, collection.kind.position_base().value());
        if !matches_collection {
            // dropping the transaction rolls it back
            return Err(AppError::Conflict(
                "position update does not match the current collection".to_string(),
            ));
        }

        touch(&mut tx, collection.id).await?;
        tx.commit().await.map_err(|e| {
            unique_violation_as_conflict(e, "position update does not match the current collection")
        })?;
        Ok(())
    }
}

async fn touch(tx: &mut Transaction<'_, Postgres>, collection_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE collections SET updated_at = $2 WHERE id = $1")
        .bind(collection_id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

fn position_to_db(position: u32) -> AppResult<i32> {
    i32::try_from(position)
        .map_err(|_| AppError::InvalidInput(format!("position {} out of range", position)))
}

fn unique_violation_as_conflict(error: sqlx::Error, message: &str) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(error),
    }
}

// ============================================================================
// Row decoding
// ============================================================================

/// Raw `collections` row
#[derive(Debug, sqlx::FromRow)]
struct CollectionRow {
    id: Uuid,
    owner_id: String,
    kind: String,
    name: String,
    visibility: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CollectionRow> for Collection {
    type Error = AppError;

    fn try_from(row: CollectionRow) -> Result<Self, Self::Error> {
        let kind = CollectionKind::parse(&row.kind).ok_or_else(|| {
            AppError::Decode(format!("collection {} has kind {:?}", row.id, row.kind))
        })?;
        let visibility = Visibility::parse(&row.visibility).ok_or_else(|| {
            AppError::Decode(format!(
                "collection {} has visibility {:?}",
                row.id, row.visibility
            ))
        })?;

        Ok(Collection {
            id: row.id,
            owner_id: row.owner_id,
            kind,
            name: row.name,
            visibility,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Raw `collection_entries` row
#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    collection_id: Uuid,
    media_type: String,
    catalog_id: i64,
    position: i32,
    title: String,
    poster_path: Option<String>,
    added_at: DateTime<Utc>,
}

impl TryFrom<EntryRow> for Entry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let media_type = MediaType::parse(&row.media_type).ok_or_else(|| {
            AppError::Decode(format!("entry {} has media type {:?}", row.id, row.media_type))
        })?;
        let catalog_id = u64::try_from(row.catalog_id).map_err(|_| {
            AppError::Decode(format!("entry {} has catalog id {}", row.id, row.catalog_id))
        })?;
        let position = u32::try_from(row.position).map_err(|_| {
            AppError::Decode(format!("entry {} has position {}", row.id, row.position))
        })?;

        Ok(Entry {
            id: row.id,
            collection_id: row.collection_id,
            media_type,
            catalog_id,
            position,
            title: row.title,
            poster_path: row.poster_path,
            added_at: row.added_at,
        })
    }
}
