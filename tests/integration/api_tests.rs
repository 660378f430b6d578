//! HTTP integration tests: the full router over an in-memory store

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use library_catalog::{
    api,
    config::AppConfig,
    repository::Repository,
    views::{Renderer, View},
    AppState,
};

/// Renders the bare context so tests can inspect it
struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, view: &View) -> String {
        serde_json::to_string(&view.context).unwrap()
    }
}

fn app() -> Router {
    let state = AppState::new(AppConfig::default(), Repository::in_memory())
        .with_renderer(Arc::new(JsonRenderer));
    api::router(state)
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &Router, uri: &str, body: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

fn view_name(response: &Response) -> &str {
    response.headers()["x-view"].to_str().unwrap()
}

fn location(response: &Response) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()[header::LOCATION].to_str().unwrap().to_string()
}

async fn context(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_author(app: &Router, first: &str, family: &str) -> String {
    let response = post(
        app,
        "/catalog/author/create",
        &format!("firstName={}&familyName={}", first, family),
    )
    .await;
    location(&response)
}

fn id_of(url: &str) -> &str {
    url.rsplit('/').next().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = context(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let app = app();
    let response = get(&app, "/").await;
    assert_eq!(location(&response), "/catalog");
}

#[tokio::test]
async fn test_create_author_trims_and_redirects() {
    let app = app();
    let url = create_author(&app, "++Jane++", "Austen").await;
    assert!(url.starts_with("/catalog/author/"));

    let response = get(&app, &url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(view_name(&response), "authorDetail");
    let ctx = context(response).await;
    assert_eq!(ctx["author"]["firstName"], "Jane");
    assert_eq!(ctx["author"]["name"], "Jane Austen");
}

#[tokio::test]
async fn test_invalid_author_rerenders_form() {
    let app = app();
    let response = post(&app, "/catalog/author/create", "firstName=Jane&familyName=").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(view_name(&response), "authorForm");

    let ctx = context(response).await;
    assert_eq!(ctx["title"], "Create Author");
    assert_eq!(ctx["errors"][0]["message"], "Family name must be specified.");

    let list = context(get(&app, "/catalog/authors").await).await;
    assert_eq!(list["authorList"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_author_list_sorted_by_family_name() {
    let app = app();
    create_author(&app, "Zadie", "Smith").await;
    create_author(&app, "Chinua", "Achebe").await;

    let ctx = context(get(&app, "/catalog/authors").await).await;
    let names: Vec<_> = ctx["authorList"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Chinua Achebe", "Zadie Smith"]);
}

#[tokio::test]
async fn test_missing_detail_is_404() {
    let app = app();
    let response = get(&app, "/catalog/author/5f1b7c2e-8d4a-4c6b-9a3e-2f0d1c9b8a7e").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(view_name(&response), "error");

    let response = get(&app, "/catalog/genre/not-an-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Genre not found"));
}

#[tokio::test]
async fn test_genre_create_dedups() {
    let app = app();
    let first = location(&post(&app, "/catalog/genre/create", "name=Fantasy").await);
    let second = location(&post(&app, "/catalog/genre/create", "name=fantasy").await);
    assert_eq!(first, second);

    let ctx = context(get(&app, "/catalog/genres").await).await;
    assert_eq!(ctx["genreList"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_author_delete_blocked_then_allowed() {
    let app = app();
    let author_url = create_author(&app, "Mary", "Shelley").await;
    let author_id = id_of(&author_url).to_string();

    let book_url = location(
        &post(
            &app,
            "/catalog/book/create",
            &format!(
                "title=Frankenstein&author={}&summary=Creature&isbn=9780486282114",
                author_id
            ),
        )
        .await,
    );

    let delete_uri = format!("{}/delete", author_url);
    let body = format!("authorid={}", author_id);
    let response = post(&app, &delete_uri, &body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(view_name(&response), "authorDelete");
    let ctx = context(response).await;
    assert_eq!(ctx["authorBooks"][0]["title"], "Frankenstein");
    assert_eq!(ctx["authorBooks"][0]["url"], book_url);

    // Still present
    assert_eq!(get(&app, &author_url).await.status(), StatusCode::OK);

    // Books have no delete page
    let response = get(&app, &format!("{}/delete", book_url)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = app();
    let author_url = create_author(&app, "Jane", "Austen").await;
    let delete_uri = format!("{}/delete", author_url);

    for _ in 0..2 {
        let response = post(&app, &delete_uri, "").await;
        assert_eq!(location(&response), "/catalog/authors");
    }
    assert_eq!(get(&app, &author_url).await.status(), StatusCode::NOT_FOUND);

    let response = get(&app, "/catalog/genre/garbage/delete").await;
    assert_eq!(location(&response), "/catalog/genres");
}

#[tokio::test]
async fn test_delete_without_form_body_redirects() {
    let app = app();
    let author_url = create_author(&app, "Jane", "Austen").await;

    let bare = Request::builder()
        .method("POST")
        .uri(format!("{}/delete", author_url))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(bare).await.unwrap();
    assert_eq!(location(&response), "/catalog/authors");
    assert_eq!(get(&app, &author_url).await.status(), StatusCode::NOT_FOUND);

    let missing = Request::builder()
        .method("POST")
        .uri("/catalog/genre/00000000-0000-0000-0000-000000000000/delete")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(missing).await.unwrap();
    assert_eq!(location(&response), "/catalog/genres");
}

#[tokio::test]
async fn test_book_form_with_several_genres() {
    let app = app();
    let author_id = id_of(&create_author(&app, "Ursula", "LeGuin").await).to_string();
    let sf = location(&post(&app, "/catalog/genre/create", "name=Science+Fiction").await);
    let fantasy = location(&post(&app, "/catalog/genre/create", "name=Fantasy").await);

    let body = format!(
        "title=&author={}&summary=Islands&isbn=1&genre={}&genre={}",
        author_id,
        id_of(&sf),
        id_of(&fantasy)
    );
    let response = post(&app, "/catalog/book/create", &body).await;
    assert_eq!(view_name(&response), "bookForm");
    let ctx = context(response).await;
    assert_eq!(ctx["errors"][0]["message"], "Title must not be empty.");
    let checked = ctx["genres"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|g| g["checked"] == true)
        .count();
    assert_eq!(checked, 2);
}

#[tokio::test]
async fn test_book_instance_lifecycle_and_home_counts() {
    let app = app();
    let author_id = id_of(&create_author(&app, "Jane", "Austen").await).to_string();
    let book_url = location(
        &post(
            &app,
            "/catalog/book/create",
            &format!("title=Emma&author={}&summary=Matchmaking&isbn=1", author_id),
        )
        .await,
    );

    let copy_url = location(
        &post(
            &app,
            "/catalog/bookinstance/create",
            &format!("book={}&imprint=Penguin&status=Available&dueBack=", id_of(&book_url)),
        )
        .await,
    );

    let home = context(get(&app, "/catalog").await).await;
    assert_eq!(home["bookCount"], 1);
    assert_eq!(home["bookInstanceCount"], 1);
    assert_eq!(home["bookInstanceAvailableCount"], 1);
    assert_eq!(home["authorCount"], 1);
    assert_eq!(home["genreCount"], 0);

    let detail = context(get(&app, &book_url).await).await;
    assert_eq!(detail["bookInstances"][0]["url"], copy_url);

    let response = post(&app, &format!("{}/delete", copy_url), "").await;
    assert_eq!(location(&response), "/catalog/bookinstances");
    let list = context(get(&app, "/catalog/bookinstances").await).await;
    assert_eq!(list["bookInstanceList"].as_array().unwrap().len(), 0);
}
