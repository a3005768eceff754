use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod collection;

pub use collection::{filtered_view, Collection, CollectionKind, Entry, NewEntry, Visibility};

/// Kind of catalog item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(MediaType::Movie),
            "tv" => Some(MediaType::Tv),
            _ => None,
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a movie or TV show returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogTitle {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
}

impl CatalogTitle {
    /// Canonical page path for this title
    pub fn canonical_path(&self) -> String {
        match self.media_type {
            MediaType::Movie => crate::core::slug::movie_path(self.id, &self.title),
            MediaType::Tv => crate::core::slug::tv_path(self.id, &self.title),
        }
    }
}

/// Represents a cast or crew member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub biography: Option<String>,
    pub profile_path: Option<String>,
}

/// One page of catalog search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<CatalogTitle>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw response from GET /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl From<TmdbMovie> for CatalogTitle {
    fn from(movie: TmdbMovie) -> Self {
        CatalogTitle {
            id: movie.id,
            media_type: MediaType::Movie,
            title: movie.title,
            overview: non_empty(movie.overview),
            poster_path: movie.poster_path,
            release_date: non_empty(movie.release_date),
        }
    }
}

/// Raw response from GET /tv/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTv {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

impl From<TmdbTv> for CatalogTitle {
    fn from(tv: TmdbTv) -> Self {
        CatalogTitle {
            id: tv.id,
            media_type: MediaType::Tv,
            title: tv.name,
            overview: non_empty(tv.overview),
            poster_path: tv.poster_path,
            release_date: non_empty(tv.first_air_date),
        }
    }
}

/// Raw response from GET /person/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPerson {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl From<TmdbPerson> for Person {
    fn from(person: TmdbPerson) -> Self {
        Person {
            id: person.id,
            name: person.name,
            biography: non_empty(person.biography),
            profile_path: person.profile_path,
        }
    }
}

/// Raw response from GET /search/multi
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    pub page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
}

/// Search hit; movies carry `title`, shows carry `name`, people are skipped
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResult {
    pub id: u64,
    pub media_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

impl TmdbSearchResult {
    /// Converts a movie or TV hit; other media types yield `None`
    pub fn into_title(self) -> Option<CatalogTitle> {
        let media_type = MediaType::parse(&self.media_type)?;
        let (title, release_date) = match media_type {
            MediaType::Movie => (self.title?, self.release_date),
            MediaType::Tv => (self.name?, self.first_air_date),
        };
        Some(CatalogTitle {
            id: self.id,
            media_type,
            title,
            overview: non_empty(self.overview),
            poster_path: self.poster_path,
            release_date: non_empty(release_date),
        })
    }
}

impl From<TmdbSearchResponse> for SearchPage {
    fn from(response: TmdbSearchResponse) -> Self {
        SearchPage {
            page: response.page.max(1),
            total_pages: response.total_pages.max(1),
            results: response
                .results
                .into_iter()
                .filter_map(TmdbSearchResult::into_title)
                .collect(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_display() {
        assert_eq!(format!("{}", MediaType::Movie), "movie");
        assert_eq!(format!("{}", MediaType::Tv), "tv");
        assert_eq!(MediaType::parse("person"), None);
    }

    #[test]
    fn test_tmdb_movie_to_title() {
        let movie: TmdbMovie = serde_json::from_str(
            r#"{"id": 155, "title": "The Dark Knight", "overview": "",
                "poster_path": "/qJ2tW6WMUDux911r6m7haRef0WH.jpg",
                "release_date": "2008-07-16", "budget": 185000000}"#,
        )
        .unwrap();

        let title: CatalogTitle = movie.into();
        assert_eq!(title.id, 155);
        assert_eq!(title.media_type, MediaType::Movie);
        assert_eq!(title.title, "The Dark Knight");
        assert_eq!(title.overview, None);
        assert_eq!(title.release_date.as_deref(), Some("2008-07-16"));
        assert_eq!(title.canonical_path(), "/movie/155/the-dark-knight");
    }

    #[test]
    fn test_tmdb_tv_to_title() {
        let tv: TmdbTv = serde_json::from_str(
            r#"{"id": 1396, "name": "Breaking Bad", "first_air_date": "2008-01-20"}"#,
        )
        .unwrap();

        let title: CatalogTitle = tv.into();
        assert_eq!(title.media_type, MediaType::Tv);
        assert_eq!(title.title, "Breaking Bad");
        assert_eq!(title.poster_path, None);
        assert_eq!(title.canonical_path(), "/tv/1396/breaking-bad");
    }

    #[test]
    fn test_search_response_skips_people() {
        let response: TmdbSearchResponse = serde_json::from_str(
            r#"{
                "page": 1,
                "total_pages": 3,
                "total_results": 55,
                "results": [
                    {"id": 603, "media_type": "movie", "title": "The Matrix", "release_date": "1999-03-30"},
                    {"id": 6384, "media_type": "person", "name": "Keanu Reeves"},
                    {"id": 1399, "media_type": "tv", "name": "Game of Thrones", "first_air_date": "2011-04-17"}
                ]
            }"#,
        )
        .unwrap();

        let page: SearchPage = response.into();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].title, "The Matrix");
        assert_eq!(page.results[1].media_type, MediaType::Tv);
        assert_eq!(page.results[1].release_date.as_deref(), Some("2011-04-17"));
    }

    #[test]
    fn test_search_response_with_no_results_has_one_page() {
        let response: TmdbSearchResponse =
            serde_json::from_str(r#"{"page": 1, "total_pages": 0, "results": []}"#).unwrap();
        let page: SearchPage = response.into();
        assert_eq!(page.total_pages, 1);
        assert!(page.results.is_empty());
    }
}
