use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{Identified, PositionBase};

use super::MediaType;

/// Kind of ordered collection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Watchlist,
    Playlist,
    List,
}

impl CollectionKind {
    /// First position value used by entries of this kind
    pub fn position_base(self) -> PositionBase {
        match self {
            CollectionKind::Watchlist => PositionBase::Zero,
            CollectionKind::Playlist | CollectionKind::List => PositionBase::One,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Watchlist => "watchlist",
            CollectionKind::Playlist => "playlist",
            CollectionKind::List => "list",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "watchlist" => Some(CollectionKind::Watchlist),
            "playlist" => Some(CollectionKind::Playlist),
            "list" => Some(CollectionKind::List),
            _ => None,
        }
    }
}

/// Who may read a collection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    FollowersOnly,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
            Visibility::FollowersOnly => "followers_only",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "private" => Some(Visibility::Private),
            "public" => Some(Visibility::Public),
            "followers_only" => Some(Visibility::FollowersOnly),
            _ => None,
        }
    }
}

/// A user's watchlist, playlist or list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: CollectionKind,
    pub name: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    /// Creates a new, empty collection
    pub fn new(owner_id: String, kind: CollectionKind, name: String, visibility: Visibility) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            name,
            visibility,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, caller: &str) -> bool {
        self.owner_id == caller
    }

    /// Whether `caller` may read this collection.
    ///
    /// The follower graph is not known here, so followers-only collections
    /// are readable by their owner alone.
    pub fn is_visible_to(&self, caller: Option<&str>) -> bool {
        match self.visibility {
            Visibility::Public => true,
            Visibility::Private | Visibility::FollowersOnly => {
                caller.is_some_and(|caller| self.is_owned_by(caller))
            }
        }
    }
}

/// Catalog item to append to a collection, with display fields already
/// resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub media_type: MediaType,
    pub catalog_id: u64,
    pub title: String,
    pub poster_path: Option<String>,
}

/// One catalog item placed in a collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub media_type: MediaType,
    pub catalog_id: u64,
    pub position: u32,
    /// Title cached when the entry was added
    pub title: String,
    /// Poster path cached when the entry was added
    pub poster_path: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(collection_id: Uuid, item: NewEntry, position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection_id,
            media_type: item.media_type,
            catalog_id: item.catalog_id,
            position,
            title: item.title,
            poster_path: item.poster_path,
            added_at: Utc::now(),
        }
    }

    pub fn refers_to(&self, media_type: MediaType, catalog_id: u64) -> bool {
        self.media_type == media_type && self.catalog_id == catalog_id
    }
}

impl Identified for Entry {
    type Id = Uuid;

    fn identity(&self) -> Uuid {
        self.id
    }
}

/// Entries of a collection visible under a search term, in position order.
///
/// A blank term matches every entry.
pub fn filtered_view<'a>(entries: &'a [Entry], term: Option<&str>) -> Vec<&'a Entry> {
    let needle = term.map(str::trim).filter(|t| !t.is_empty()).map(str::to_lowercase);
    entries
        .iter()
        .filter(|entry| match &needle {
            Some(needle) => entry.title.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(collection_id: Uuid, title: &str, position: u32) -> Entry {
        Entry::new(
            collection_id,
            NewEntry {
                media_type: MediaType::Movie,
                catalog_id: u64::from(position) + 100,
                title: title.to_string(),
                poster_path: None,
            },
            position,
        )
    }

    #[test]
    fn test_position_bases() {
        assert_eq!(CollectionKind::Watchlist.position_base(), PositionBase::Zero);
        assert_eq!(CollectionKind::Playlist.position_base(), PositionBase::One);
        assert_eq!(CollectionKind::List.position_base(), PositionBase::One);
    }

    #[test]
    fn test_kind_and_visibility_parse_round_trip() {
        for kind in [CollectionKind::Watchlist, CollectionKind::Playlist, CollectionKind::List] {
            assert_eq!(CollectionKind::parse(kind.as_str()), Some(kind));
        }
        for visibility in [Visibility::Private, Visibility::Public, Visibility::FollowersOnly] {
            assert_eq!(Visibility::parse(visibility.as_str()), Some(visibility));
        }
        assert_eq!(CollectionKind::parse("queue"), None);
        assert_eq!(Visibility::parse("friends"), None);
    }

    #[test]
    fn test_visibility_rules() {
        let mut collection = Collection::new(
            "alice".to_string(),
            CollectionKind::List,
            "Noir".to_string(),
            Visibility::Private,
        );
        assert!(collection.is_visible_to(Some("alice")));
        assert!(!collection.is_visible_to(Some("bob")));
        assert!(!collection.is_visible_to(None));

        collection.visibility = Visibility::FollowersOnly;
        assert!(!collection.is_visible_to(Some("bob")));

        collection.visibility = Visibility::Public;
        assert!(collection.is_visible_to(Some("bob")));
        assert!(collection.is_visible_to(None));
    }

    #[test]
    fn test_filtered_view_matches_case_insensitively() {
        let id = Uuid::new_v4();
        let entries = vec![
            entry(id, "The Dark Knight", 1),
            entry(id, "Heat", 2),
            entry(id, "The Dark Crystal", 3),
        ];

        let view = filtered_view(&entries, Some("  dark "));
        let titles: Vec<&str> = view.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["The Dark Knight", "The Dark Crystal"]);

        assert_eq!(filtered_view(&entries, None).len(), 3);
        assert_eq!(filtered_view(&entries, Some("   ")).len(), 3);
        assert!(filtered_view(&entries, Some("zzz")).is_empty());
    }

    #[test]
    fn test_serialized_kind_names() {
        assert_eq!(serde_json::to_string(&Visibility::FollowersOnly).unwrap(), "\"followers_only\"");
        assert_eq!(serde_json::to_string(&CollectionKind::Watchlist).unwrap(), "\"watchlist\"");
    }
}
