/// TMDB catalog provider
///
/// API Flow:
/// 1. Details: /movie/{id}, /tv/{id}, /person/{id}
/// 2. Search: /search/multi?query=...&page=... (people are dropped from results)
///
/// Every response is cached in Redis through the background writer.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{CatalogTitle, Person, SearchPage, TmdbMovie, TmdbPerson, TmdbSearchResponse, TmdbTv},
    services::catalog::CatalogProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const DETAILS_CACHE_TTL: u64 = 86_400; // 1 day
const SEARCH_CACHE_TTL: u64 = 3_600; // 1 hour

/// TMDB rejects pages beyond this
pub const MAX_SEARCH_PAGE: u32 = 500;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// GETs `path` and decodes the JSON body, mapping 404 to `NotFound`
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        tracing::debug!(path = %path, provider = self.name(), "Fetching from external API");

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{} not found in catalog", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "External API request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!(path = %path, error = %e, "Failed to parse TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn movie(&self, id: u64) -> AppResult<CatalogTitle> {
        cached!(self.cache, CacheKey::Movie(id), DETAILS_CACHE_TTL, async move {
            let movie: TmdbMovie = self.get_json(&format!("/movie/{}", id), &[]).await?;
            Ok::<_, AppError>(CatalogTitle::from(movie))
        })
    }

    async fn tv(&self, id: u64) -> AppResult<CatalogTitle> {
        cached!(self.cache, CacheKey::Tv(id), DETAILS_CACHE_TTL, async move {
            let tv: TmdbTv = self.get_json(&format!("/tv/{}", id), &[]).await?;
            Ok::<_, AppError>(CatalogTitle::from(tv))
        })
    }

    async fn person(&self, id: u64) -> AppResult<Person> {
        cached!(self.cache, CacheKey::Person(id), DETAILS_CACHE_TTL, async move {
            let person: TmdbPerson = self.get_json(&format!("/person/{}", id), &[]).await?;
            Ok::<_, AppError>(Person::from(person))
        })
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<SearchPage> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        if page == 0 || page > MAX_SEARCH_PAGE {
            return Err(AppError::InvalidInput(format!(
                "page must be between 1 and {}",
                MAX_SEARCH_PAGE
            )));
        }

        let key = CacheKey::Search {
            query: query.to_string(),
            page,
        };
        cached!(self.cache, key, SEARCH_CACHE_TTL, async move {
            let page_param = page.to_string();
            let response: TmdbSearchResponse = self
                .get_json(
                    "/search/multi",
                    &[
                        ("query", query),
                        ("page", page_param.as_str()),
                        ("include_adult", "false"),
                    ],
                )
                .await?;
            let results = SearchPage::from(response);

            tracing::info!(
                query = %query,
                page = page,
                results = results.results.len(),
                provider = "tmdb",
                "Title search completed"
            );

            Ok::<_, AppError>(results)
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
