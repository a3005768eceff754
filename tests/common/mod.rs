use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;

use what2watch_api::{
    db::InMemoryCollectionStore,
    error::{AppError, AppResult},
    middleware::identity::USER_ID_HEADER,
    models::{CatalogTitle, MediaType, Person, SearchPage},
    routes::{create_router, AppState, PaginationSettings},
    services::CatalogProvider,
};

/// Fixed catalog standing in for TMDB
#[derive(Default)]
pub struct StubCatalog {
    titles: HashMap<(MediaType, u64), CatalogTitle>,
    people: HashMap<u64, Person>,
}

impl StubCatalog {
    pub fn with_title(mut self, media_type: MediaType, id: u64, title: &str) -> Self {
        self.titles.insert(
            (media_type, id),
            CatalogTitle {
                id,
                media_type,
                title: title.to_string(),
                overview: None,
                poster_path: Some(format!("/posters/{}.jpg", id)),
                release_date: None,
            },
        );
        self
    }

    pub fn with_person(mut self, id: u64, name: &str) -> Self {
        self.people.insert(
            id,
            Person {
                id,
                name: name.to_string(),
                biography: None,
                profile_path: None,
            },
        );
        self
    }

    fn title(&self, media_type: MediaType, id: u64) -> AppResult<CatalogTitle> {
        self.titles
            .get(&(media_type, id))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{} {}", media_type, id)))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn movie(&self, id: u64) -> AppResult<CatalogTitle> {
        self.title(MediaType::Movie, id)
    }

    async fn tv(&self, id: u64) -> AppResult<CatalogTitle> {
        self.title(MediaType::Tv, id)
    }

    async fn person(&self, id: u64) -> AppResult<Person> {
        self.people
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("person {}", id)))
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<SearchPage> {
        let needle = query.trim().to_lowercase();
        let mut results: Vec<CatalogTitle> = self
            .titles
            .values()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        results.sort_by_key(|t| t.id);
        Ok(SearchPage {
            page,
            total_pages: 12,
            results,
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Catalog used by most tests: seven movies, one show and two people
pub fn default_catalog() -> StubCatalog {
    StubCatalog::default()
        .with_title(MediaType::Movie, 1, "Alien")
        .with_title(MediaType::Movie, 2, "Aliens")
        .with_title(MediaType::Movie, 3, "Blade Runner")
        .with_title(MediaType::Movie, 4, "Casablanca")
        .with_title(MediaType::Movie, 155, "The Dark Knight")
        .with_title(MediaType::Movie, 603, "The Matrix")
        .with_title(MediaType::Movie, 18148, "東京物語")
        .with_title(MediaType::Tv, 1396, "Breaking Bad")
        .with_person(31, "Tom Hanks")
        .with_person(7, "Björk")
}

pub fn create_test_server() -> TestServer {
    create_test_server_with(default_catalog())
}

pub fn create_test_server_with(catalog: StubCatalog) -> TestServer {
    let state = AppState::new(
        Arc::new(InMemoryCollectionStore::new()),
        Arc::new(catalog),
        PaginationSettings::default(),
    );
    let app = create_router(Arc::new(state));
    TestServer::new(app).unwrap()
}

pub fn user_header() -> HeaderName {
    HeaderName::from_static(USER_ID_HEADER)
}

pub fn user(id: &str) -> HeaderValue {
    HeaderValue::from_str(id).unwrap()
}
