//! Book workflows. Books have no delete workflow.

use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::parse_id;
use crate::{
    error::{AppError, AppResult, StoreResult},
    models::{Author, Book, BookInstance, Entity, Genre},
    repository::{Filter, Query, Repository},
    validation::{BookForm, FieldError, Validated},
    views::{Page, View},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

fn not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

/// Choices offered on the book form
struct FormChoices {
    authors: Vec<Author>,
    genres: Vec<Genre>,
}

impl FormChoices {
    fn view(
        &self,
        title: &str,
        selected_genres: &[String],
        book: Option<impl Serialize>,
        errors: Option<Vec<FieldError>>,
    ) -> View {
        let authors: Vec<_> = self.authors.iter().map(Author::view).collect();
        let genres: Vec<_> = self
            .genres
            .iter()
            .map(|g| {
                let mut view = g.view();
                view.checked = selected_genres.contains(&g.id.to_string());
                view
            })
            .collect();
        View::new("bookForm", title)
            .with("authors", authors)
            .with("genres", genres)
            .with_opt("book", book)
            .with_opt("errors", errors)
    }
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn form_choices(&self) -> StoreResult<FormChoices> {
        let (authors, genres) = tokio::try_join!(
            self.repository.find_all::<Author>(Query::all().sort_by("family_name")),
            self.repository.find_all::<Genre>(Query::all().sort_by("name")),
        )?;
        Ok(FormChoices { authors, genres })
    }

    /// All books ordered by title, with their authors
    pub async fn list(&self) -> AppResult<Page> {
        let (books, authors) = tokio::try_join!(
            self.repository.find_all::<Book>(Query::all().sort_by("title")),
            self.repository.find_all::<Author>(Query::all()),
        )?;
        let authors: HashMap<Uuid, Author> = authors.into_iter().map(|a| (a.id, a)).collect();

        let books: Vec<_> = books
            .iter()
            .map(|b| b.view(authors.get(&b.author).map(Author::view), vec![]))
            .collect();
        Ok(View::new("bookList", "Book List").with("bookList", books).into())
    }

    /// Book with author, genres and copies
    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (book, instances) = tokio::try_join!(
            self.repository.get::<Book>(id),
            self.repository
                .find_all::<BookInstance>(Query::all().filter(Filter::references("book", id))),
        )?;
        let book = book.ok_or_else(not_found)?;

        let genre_query = Query::all().filter(Filter::ids(&book.genre)).sort_by("name");
        let (author, genres) = tokio::try_join!(
            self.repository.get::<Author>(book.author),
            self.repository.find_all::<Genre>(genre_query),
        )?;

        let summary = book.summary_view();
        let instances: Vec<_> = instances
            .iter()
            .map(|i| i.view(Some(summary.clone())))
            .collect();
        let genres = genres.iter().map(Genre::view).collect();
        Ok(View::new("bookDetail", book.title.clone())
            .with("book", book.view(author.as_ref().map(Author::view), genres))
            .with("bookInstances", instances)
            .into())
    }

    pub async fn create_form(&self) -> AppResult<Page> {
        let choices = self.form_choices().await?;
        Ok(choices.view("Create Book", &[], None::<BookForm>, None).into())
    }

    pub async fn create(&self, form: BookForm) -> AppResult<Page> {
        match form.validate_draft() {
            Validated::Invalid { form, errors } => {
                let choices = self.form_choices().await?;
                let selected = form.genre.clone();
                Ok(choices.view("Create Book", &selected, Some(form), Some(errors)).into())
            }
            Validated::Valid(draft) => {
                let book: Book = self.repository.create(draft).await?;
                tracing::info!(book_id = %book.id, "Book created");
                Ok(Page::redirect(book.url()))
            }
        }
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (book, choices) = tokio::try_join!(self.repository.get::<Book>(id), self.form_choices())?;
        let book = book.ok_or_else(not_found)?;

        let selected: Vec<String> = book.genre.iter().map(Uuid::to_string).collect();
        Ok(choices.view("Update Book", &selected, Some(&book), None).into())
    }

    pub async fn update(&self, id: &str, form: BookForm) -> AppResult<Page> {
        match form.validate_draft() {
            Validated::Invalid { form, errors } => {
                let choices = self.form_choices().await?;
                let selected = form.genre.clone();
                Ok(choices.view("Update Book", &selected, Some(form), Some(errors)).into())
            }
            Validated::Valid(draft) => {
                let id = parse_id(id).ok_or_else(not_found)?;
                let book = self
                    .repository
                    .update::<Book>(id, draft)
                    .await?
                    .ok_or_else(not_found)?;
                tracing::info!(book_id = %book.id, "Book updated");
                Ok(Page::redirect(book.url()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorDraft, BookInstanceDraft, BookInstanceStatus, GenreDraft};
    use chrono::NaiveDate;
    use tokio_test::assert_ok;

    fn rendered(page: Page) -> View {
        match page {
            Page::Render(view) => view,
            Page::Redirect(to) => panic!("expected a view, got redirect to {}", to),
        }
    }

    async fn seed(repo: &Repository) -> (Author, Genre, Genre) {
        let author: Author = repo
            .create(AuthorDraft {
                first_name: "Mary".into(),
                family_name: "Shelley".into(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        let horror: Genre = repo.create(GenreDraft { name: "Horror".into() }).await.unwrap();
        let gothic: Genre = repo.create(GenreDraft { name: "Gothic".into() }).await.unwrap();
        (author, horror, gothic)
    }

    fn form(author: &Author, genres: &[&Genre]) -> BookForm {
        BookForm {
            title: "Frankenstein".into(),
            author: author.id.to_string(),
            summary: "A creature".into(),
            isbn: "9780486282114".into(),
            genre: genres.iter().map(|g| g.id.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_detail() {
        let repo = Repository::in_memory();
        let service = BooksService::new(repo.clone());
        let (author, horror, gothic) = seed(&repo).await;

        let page = assert_ok!(service.create(form(&author, &[&horror, &gothic])).await);
        let id = page.location().unwrap().rsplit('/').next().unwrap().to_string();
        let book_id = Uuid::parse_str(&id).unwrap();

        let copy: BookInstance = repo
            .create(BookInstanceDraft {
                book: book_id,
                imprint: "Dover".into(),
                status: BookInstanceStatus::Available,
                due_back: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            })
            .await
            .unwrap();

        let view = rendered(assert_ok!(service.detail(&id).await));
        assert_eq!(view.name, "bookDetail");
        assert_eq!(view.title(), "Frankenstein");
        let book = view.get("book").unwrap();
        assert_eq!(book["author"]["name"], "Mary Shelley");
        let genre_names: Vec<_> = book["genre"].as_array().unwrap().iter().map(|g| g["name"].clone()).collect();
        assert_eq!(genre_names, vec!["Gothic", "Horror"]);
        let copies = view.get("bookInstances").unwrap().as_array().unwrap();
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0]["id"], copy.id.to_string());
    }

    #[tokio::test]
    async fn test_list_sorted_by_title_with_author() {
        let repo = Repository::in_memory();
        let service = BooksService::new(repo.clone());
        let (author, _, _) = seed(&repo).await;
        let mut second = form(&author, &[]);
        second.title = "Valperga".into();
        assert_ok!(service.create(second).await);
        assert_ok!(service.create(form(&author, &[])).await);

        let view = rendered(assert_ok!(service.list().await));
        let books = view.get("bookList").unwrap().as_array().unwrap();
        assert_eq!(books[0]["title"], "Frankenstein");
        assert_eq!(books[1]["title"], "Valperga");
        assert_eq!(books[0]["author"]["name"], "Mary Shelley");
    }

    #[tokio::test]
    async fn test_invalid_create_keeps_choices_and_selection() {
        let repo = Repository::in_memory();
        let service = BooksService::new(repo.clone());
        let (author, horror, _) = seed(&repo).await;
        let mut submitted = form(&author, &[&horror]);
        submitted.summary = "  ".into();

        let view = rendered(assert_ok!(service.create(submitted).await));
        assert_eq!(view.name, "bookForm");
        assert_eq!(view.get("errors").unwrap()[0]["message"], "Summary must not be empty.");
        assert_eq!(view.get("authors").unwrap().as_array().unwrap().len(), 1);
        let genres = view.get("genres").unwrap().as_array().unwrap();
        let checked: Vec<_> = genres
            .iter()
            .filter(|g| g["checked"] == true)
            .map(|g| g["name"].clone())
            .collect();
        assert_eq!(checked, vec!["Horror"]);
        assert_eq!(repo.count::<Book>(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update() {
        let repo = Repository::in_memory();
        let service = BooksService::new(repo.clone());
        let (author, horror, gothic) = seed(&repo).await;
        let page = assert_ok!(service.create(form(&author, &[&horror])).await);
        let id = page.location().unwrap().rsplit('/').next().unwrap().to_string();

        let prefill = rendered(assert_ok!(service.update_form(&id).await));
        assert_eq!(prefill.get("book").unwrap()["title"], "Frankenstein");

        let mut changed = form(&author, &[&gothic]);
        changed.title = "Frankenstein; or, The Modern Prometheus".into();
        let page = assert_ok!(service.update(&id, changed).await);
        assert_eq!(page.location(), Some(format!("/catalog/book/{}", id).as_str()));

        let stored = repo.get::<Book>(Uuid::parse_str(&id).unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.genre, vec![gothic.id]);
        assert_eq!(stored.title, "Frankenstein; or, The Modern Prometheus");
    }

    #[tokio::test]
    async fn test_missing_book_is_not_found() {
        let service = BooksService::new(Repository::in_memory());
        let missing = Uuid::new_v4().to_string();
        assert!(matches!(service.detail(&missing).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.update_form(&missing).await, Err(AppError::NotFound(_))));
    }
}
