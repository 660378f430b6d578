//! Author pages

use axum::{
    extract::{Path, State},
    response::Response,
};
use axum_extra::extract::Form;

use super::{present, DeleteForm};
use crate::{error::AppResult, validation::AuthorForm, AppState};

pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.authors.list().await?;
    Ok(present(&state, page))
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let page = state.services.authors.detail(&id).await?;
    Ok(present(&state, page))
}

pub async fn create_form(State(state): State<AppState>) -> Response {
    let page = state.services.authors.create_form();
    present(&state, page)
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<AuthorForm>,
) -> AppResult<Response> {
    let page = state.services.authors.create(form).await?;
    Ok(present(&state, page))
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.authors.update_form(&id).await?;
    Ok(present(&state, page))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<AuthorForm>,
) -> AppResult<Response> {
    let page = state.services.authors.update(&id, form).await?;
    Ok(present(&state, page))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.authors.delete_form(&id).await?;
    Ok(present(&state, page))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Option<Form<DeleteForm>>,
) -> AppResult<Response> {
    DeleteForm::check_target(form.as_ref().map(|Form(f)| f), &id);
    let page = state.services.authors.delete(&id).await?;
    Ok(present(&state, page))
}
