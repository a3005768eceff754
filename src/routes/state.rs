use std::sync::Arc;

use crate::{
    config::Config,
    core::pagination::DEFAULT_MAX_VISIBLE,
    db::CollectionStore,
    services::CatalogProvider,
};

/// Page sizing shared by every listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSettings {
    pub max_visible_pages: u32,
    pub default_page_size: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            max_visible_pages: DEFAULT_MAX_VISIBLE,
            default_page_size: 20,
        }
    }
}

impl From<&Config> for PaginationSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_visible_pages: config.max_visible_pages,
            default_page_size: config.default_page_size,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub collections: Arc<dyn CollectionStore>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub pagination: PaginationSettings,
}

impl AppState {
    pub fn new(
        collections: Arc<dyn CollectionStore>,
        catalog: Arc<dyn CatalogProvider>,
        pagination: PaginationSettings,
    ) -> Self {
        Self {
            collections,
            catalog,
            pagination,
        }
    }
}
