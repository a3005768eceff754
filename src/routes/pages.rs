use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    core::{
        pagination::{self, is_valid_max_visible},
        PageItem,
    },
    error::{AppError, AppResult},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PageWindowQuery {
    current: u32,
    total: u32,
    max_visible: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PageWindowResponse {
    pub current: u32,
    pub total: u32,
    pub pages: Vec<PageItem>,
}

/// Computes the page selector for an arbitrary listing.
///
/// Unlike the listing endpoints this one is strict: out-of-range input is a
/// 400 rather than being clamped.
pub async fn page_window(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageWindowQuery>,
) -> AppResult<Json<PageWindowResponse>> {
    if params.total == 0 {
        return Err(AppError::InvalidInput("total must be at least 1".to_string()));
    }
    if params.current == 0 || params.current > params.total {
        return Err(AppError::InvalidInput(format!(
            "current must be between 1 and {}",
            params.total
        )));
    }
    let max_visible = params
        .max_visible
        .unwrap_or(state.pagination.max_visible_pages);
    if !is_valid_max_visible(max_visible) {
        return Err(AppError::InvalidInput(
            "max_visible must be an odd number of at least 5".to_string(),
        ));
    }

    Ok(Json(PageWindowResponse {
        current: params.current,
        total: params.total,
        pages: pagination::page_window(params.current, params.total, max_visible),
    }))
}
