//! HTTP handlers for the catalog pages

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;

use axum::{
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::{
    models::CATALOG_ROOT,
    views::Page,
    AppState,
};

/// Body of a delete submission.
///
/// The form repeats the target id (`authorid`, `genreid`, `bookinstanceid`);
/// the path parameter is authoritative.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    #[serde(alias = "authorid", alias = "genreid", alias = "bookinstanceid")]
    pub id: Option<String>,
}

impl DeleteForm {
    /// Warn when the body names a different record than the path.
    ///
    /// A missing or unreadable body is accepted: deletes go by path id.
    pub(crate) fn check_target(form: Option<&Self>, path_id: &str) {
        let Some(form) = form else {
            return;
        };
        if let Some(body_id) = form.id.as_deref().map(str::trim) {
            if !body_id.is_empty() && body_id != path_id.trim() {
                tracing::warn!(path_id, body_id, "Delete body id differs from path id; using path id");
            }
        }
    }
}

/// Turn a workflow result into an HTTP response: a rendered view tagged with
/// its name, or a 303 redirect
pub(crate) fn present(state: &AppState, page: Page) -> Response {
    match page {
        Page::Redirect(to) => Redirect::to(&to).into_response(),
        Page::Render(view) => {
            let html = state.renderer.render(&view);
            (view.status, [("x-view", view.name)], Html(html)).into_response()
        }
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let catalog = Router::new()
        .route("/", get(catalog::index))
        // Authors
        .route("/authors", get(authors::list))
        .route("/author/create", get(authors::create_form).post(authors::create))
        .route("/author/:id", get(authors::detail))
        .route("/author/:id/update", get(authors::update_form).post(authors::update))
        .route("/author/:id/delete", get(authors::delete_form).post(authors::delete))
        // Genres
        .route("/genres", get(genres::list))
        .route("/genre/create", get(genres::create_form).post(genres::create))
        .route("/genre/:id", get(genres::detail))
        .route("/genre/:id/update", get(genres::update_form).post(genres::update))
        .route("/genre/:id/delete", get(genres::delete_form).post(genres::delete))
        // Books
        .route("/books", get(books::list))
        .route("/book/create", get(books::create_form).post(books::create))
        .route("/book/:id", get(books::detail))
        .route("/book/:id/update", get(books::update_form).post(books::update))
        // Book copies
        .route("/bookinstances", get(book_instances::list))
        .route(
            "/bookinstance/create",
            get(book_instances::create_form).post(book_instances::create),
        )
        .route("/bookinstance/:id", get(book_instances::detail))
        .route(
            "/bookinstance/:id/update",
            get(book_instances::update_form).post(book_instances::update),
        )
        .route(
            "/bookinstance/:id/delete",
            get(book_instances::delete_form).post(book_instances::delete),
        );

    Router::new()
        .route("/", get(|| async { Redirect::to(CATALOG_ROOT) }))
        .route("/health", get(health::health_check))
        .nest(CATALOG_ROOT, catalog)
        .with_state(state)
}

