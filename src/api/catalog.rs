//! Catalog home page

use axum::{extract::State, response::Response};

use super::present;
use crate::{error::AppResult, AppState};

/// Counts of every record kind
pub async fn index(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.catalog.index().await?;
    Ok(present(&state, page))
}
