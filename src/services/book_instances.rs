//! Book copy workflows

use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::{list_url, parse_id};
use crate::{
    error::{AppError, AppResult, StoreResult},
    models::{Book, BookInstance, Entity},
    repository::{Query, Repository},
    validation::{BookInstanceForm, FieldError, Validated},
    views::{Page, View},
};

#[derive(Clone)]
pub struct BookInstancesService {
    repository: Repository,
}

fn not_found() -> AppError {
    AppError::NotFound("Book copy not found".to_string())
}

fn form_view(
    title: &str,
    books: &[Book],
    selected_book: Option<String>,
    instance: Option<impl Serialize>,
    errors: Option<Vec<FieldError>>,
) -> View {
    let books: Vec<_> = books.iter().map(Book::summary_view).collect();
    View::new("bookInstanceForm", title)
        .with("bookList", books)
        .with_opt("selectedBook", selected_book)
        .with_opt("bookInstance", instance)
        .with_opt("errors", errors)
}

impl BookInstancesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn books_by_title(&self) -> StoreResult<Vec<Book>> {
        self.repository
            .find_all::<Book>(Query::all().sort_by("title"))
            .await
    }

    /// Copy with its book resolved
    async fn lookup(&self, id: Uuid) -> StoreResult<Option<(BookInstance, Option<Book>)>> {
        let Some(instance) = self.repository.get::<BookInstance>(id).await? else {
            return Ok(None);
        };
        let book = self.repository.get::<Book>(instance.book).await?;
        Ok(Some((instance, book)))
    }

    pub async fn list(&self) -> AppResult<Page> {
        let (instances, books) = tokio::try_join!(
            self.repository.find_all::<BookInstance>(Query::all()),
            self.repository.find_all::<Book>(Query::all()),
        )?;
        let books: HashMap<Uuid, Book> = books.into_iter().map(|b| (b.id, b)).collect();

        let instances: Vec<_> = instances
            .iter()
            .map(|i| i.view(books.get(&i.book).map(Book::summary_view)))
            .collect();
        Ok(View::new("bookInstanceList", "Book Instance List")
            .with("bookInstanceList", instances)
            .into())
    }

    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (instance, book) = self.lookup(id).await?.ok_or_else(not_found)?;
        let title = book
            .as_ref()
            .map(|b| format!("Copy: {}", b.title))
            .unwrap_or_else(|| "Book".to_string());
        Ok(View::new("bookInstanceDetail", title)
            .with("bookInstance", instance.view(book.as_ref().map(Book::summary_view)))
            .into())
    }

    pub async fn create_form(&self) -> AppResult<Page> {
        let books = self.books_by_title().await?;
        Ok(form_view("Create Book Instance", &books, None, None::<BookInstanceForm>, None).into())
    }

    pub async fn create(&self, form: BookInstanceForm) -> AppResult<Page> {
        match form.validate_draft() {
            Validated::Invalid { form, errors } => {
                let books = self.books_by_title().await?;
                let selected = Some(form.book.clone()).filter(|b| !b.is_empty());
                Ok(form_view("Create Book Instance", &books, selected, Some(form), Some(errors)).into())
            }
            Validated::Valid(draft) => {
                let instance: BookInstance = self.repository.create(draft).await?;
                tracing::info!(book_instance_id = %instance.id, book_id = %instance.book, "Book copy created");
                Ok(Page::redirect(instance.url()))
            }
        }
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (instance, books) = tokio::try_join!(
            self.repository.get::<BookInstance>(id),
            self.books_by_title(),
        )?;
        let instance = instance.ok_or_else(not_found)?;
        let selected = Some(instance.book.to_string());
        Ok(form_view(
            "Update Book Instance",
            &books,
            selected,
            Some(instance.view(None)),
            None,
        )
        .into())
    }

    pub async fn update(&self, id: &str, form: BookInstanceForm) -> AppResult<Page> {
        match form.validate_draft() {
            Validated::Invalid { form, errors } => {
                let books = self.books_by_title().await?;
                let selected = Some(form.book.clone()).filter(|b| !b.is_empty());
                Ok(form_view("Update Book Instance", &books, selected, Some(form), Some(errors)).into())
            }
            Validated::Valid(draft) => {
                let id = parse_id(id).ok_or_else(not_found)?;
                let instance = self
                    .repository
                    .update::<BookInstance>(id, draft)
                    .await?
                    .ok_or_else(not_found)?;
                tracing::info!(book_instance_id = %instance.id, "Book copy updated");
                Ok(Page::redirect(instance.url()))
            }
        }
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(list_url("bookinstances")));
        };
        match self.lookup(id).await? {
            Some((instance, book)) => Ok(View::new("bookInstanceDelete", "Delete Book Instance")
                .with("bookInstance", instance.view(book.as_ref().map(Book::summary_view)))
                .into()),
            None => Ok(Page::redirect(list_url("bookinstances"))),
        }
    }

    /// Copies have no dependents, so deletion always proceeds
    pub async fn delete(&self, id: &str) -> AppResult<Page> {
        if let Some(id) = parse_id(id) {
            if self.repository.delete::<BookInstance>(id).await? {
                tracing::info!(book_instance_id = %id, "Book copy deleted");
            }
        }
        Ok(Page::redirect(list_url("bookinstances")))
    }
}
