/// Movie/TV catalog abstraction
///
/// Route handlers only see this trait; the TMDB client is one implementation
/// and tests substitute their own.
use crate::{
    error::AppResult,
    models::{CatalogTitle, MediaType, Person, SearchPage},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Movie details by catalog id; `NotFound` when the catalog has none
    async fn movie(&self, id: u64) -> AppResult<CatalogTitle>;

    /// TV show details by catalog id; `NotFound` when the catalog has none
    async fn tv(&self, id: u64) -> AppResult<CatalogTitle>;

    async fn person(&self, id: u64) -> AppResult<Person>;

    /// One page (1-indexed) of movie and TV matches for `query`
    async fn search(&self, query: &str, page: u32) -> AppResult<SearchPage>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Looks up a movie or TV show by media type
pub async fn lookup_title(
    catalog: &dyn CatalogProvider,
    media_type: MediaType,
    id: u64,
) -> AppResult<CatalogTitle> {
    match media_type {
        MediaType::Movie => catalog.movie(id).await,
        MediaType::Tv => catalog.tv(id).await,
    }
}
