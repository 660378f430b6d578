//! Book pages

use axum::{
    extract::{Path, State},
    response::Response,
};
use axum_extra::extract::Form;

use super::present;
use crate::{error::AppResult, validation::BookForm, AppState};

pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.books.list().await?;
    Ok(present(&state, page))
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let page = state.services.books.detail(&id).await?;
    Ok(present(&state, page))
}

pub async fn create_form(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.books.create_form().await?;
    Ok(present(&state, page))
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<BookForm>,
) -> AppResult<Response> {
    let page = state.services.books.create(form).await?;
    Ok(present(&state, page))
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.books.update_form(&id).await?;
    Ok(present(&state, page))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> AppResult<Response> {
    let page = state.services.books.update(&id, form).await?;
    Ok(present(&state, page))
}
