//! Author workflows

use serde::Serialize;
use uuid::Uuid;

use super::{list_url, parse_id};
use crate::{
    error::{AppError, AppResult, StoreResult},
    models::{Author, Book, Entity},
    repository::{Filter, Query, Repository},
    validation::{AuthorForm, FieldError, Validated},
    views::{Page, View},
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

fn not_found() -> AppError {
    AppError::NotFound("Author not found".to_string())
}

fn form_view(title: &str, author: Option<impl Serialize>, errors: Option<Vec<FieldError>>) -> View {
    View::new("authorForm", title)
        .with_opt("author", author)
        .with_opt("errors", errors)
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Author and the books written by them, fetched together
    async fn with_books(&self, id: Uuid) -> StoreResult<(Option<Author>, Vec<Book>)> {
        tokio::try_join!(
            self.repository.get::<Author>(id),
            self.repository
                .find_all::<Book>(Query::all().filter(Filter::references("author", id))),
        )
    }

    /// All authors ordered by family name
    pub async fn list(&self) -> AppResult<Page> {
        let authors: Vec<Author> = self
            .repository
            .find_all(Query::all().sort_by("family_name"))
            .await?;
        let authors: Vec<_> = authors.iter().map(Author::view).collect();
        Ok(View::new("authorList", "Author list")
            .with("authorList", authors)
            .into())
    }

    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (author, books) = self.with_books(id).await?;
        let author = author.ok_or_else(not_found)?;

        let books: Vec<_> = books.iter().map(Book::summary_view).collect();
        Ok(View::new("authorDetail", "Author detail")
            .with("author", author.view())
            .with("authorBooks", books)
            .into())
    }

    pub fn create_form(&self) -> Page {
        form_view("Create Author", None::<AuthorForm>, None).into()
    }

    pub async fn create(&self, form: AuthorForm) -> AppResult<Page> {
        match form.validate_draft() {
            Validated::Invalid { form, errors } => {
                Ok(form_view("Create Author", Some(form), Some(errors)).into())
            }
            Validated::Valid(draft) => {
                let author: Author = self.repository.create(draft).await?;
                tracing::info!(author_id = %author.id, "Author created");
                Ok(Page::redirect(author.url()))
            }
        }
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let author = self
            .repository
            .get::<Author>(id)
            .await?
            .ok_or_else(not_found)?;
        Ok(form_view("Update Author", Some(author.view()), None).into())
    }

    pub async fn update(&self, id: &str, form: AuthorForm) -> AppResult<Page> {
        match form.validate_draft() {
            Validated::Invalid { form, errors } => {
                Ok(form_view("Update Author", Some(form), Some(errors)).into())
            }
            Validated::Valid(draft) => {
                let id = parse_id(id).ok_or_else(not_found)?;
                let author = self
                    .repository
                    .update::<Author>(id, draft)
                    .await?
                    .ok_or_else(not_found)?;
                tracing::info!(author_id = %author.id, "Author updated");
                Ok(Page::redirect(author.url()))
            }
        }
    }

    /// Confirmation page listing the author's books; a missing author goes back to the list
    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(list_url("authors")));
        };
        let (author, books) = self.with_books(id).await?;
        let Some(author) = author else {
            return Ok(Page::redirect(list_url("authors")));
        };
        Ok(delete_view(&author, &books).into())
    }

    /// Delete unless books still reference the author
    pub async fn delete(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(list_url("authors")));
        };
        let (author, books) = self.with_books(id).await?;
        let Some(author) = author else {
            return Ok(Page::redirect(list_url("authors")));
        };

        if !books.is_empty() {
            tracing::info!(author_id = %id, books = books.len(), "Author delete refused: books remain");
            return Ok(delete_view(&author, &books).into());
        }

        self.repository.delete::<Author>(id).await?;
        tracing::info!(author_id = %id, "Author deleted");
        Ok(Page::redirect(list_url("authors")))
    }
}

fn delete_view(author: &Author, books: &[Book]) -> View {
    let books: Vec<_> = books.iter().map(Book::summary_view).collect();
    View::new("authorDelete", "Delete Author")
        .with("author", author.view())
        .with("authorBooks", books)
}
