//! Genre workflows

use serde::Serialize;
use uuid::Uuid;

use super::{list_url, parse_id};
use crate::{
    error::{AppError, AppResult, StoreResult},
    models::{Book, Entity, Genre},
    repository::{Filter, Query, Repository},
    validation::{FieldError, GenreForm, Validated},
    views::{Page, View},
};

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

fn not_found() -> AppError {
    AppError::NotFound("Genre not found".to_string())
}

fn form_view(title: &str, genre: Option<impl Serialize>, errors: Option<Vec<FieldError>>) -> View {
    View::new("genreForm", title)
        .with_opt("genre", genre)
        .with_opt("errors", errors)
}

fn delete_view(genre: &Genre, books: &[Book]) -> View {
    let books: Vec<_> = books.iter().map(Book::summary_view).collect();
    View::new("genreDelete", "Delete Genre")
        .with("genre", genre.view())
        .with("genreBooks", books)
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn with_books(&self, id: Uuid) -> StoreResult<(Option<Genre>, Vec<Book>)> {
        tokio::try_join!(
            self.repository.get::<Genre>(id),
            self.repository
                .find_all::<Book>(Query::all().filter(Filter::contains_ref("genre", id))),
        )
    }

    /// Existing genre with this name, ignoring case
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Genre>> {
        let query = Query::all().filter(Filter::eq_ignore_case("name", name));
        Ok(self.repository.find_all::<Genre>(query).await?.into_iter().next())
    }

    /// All genres ordered by name
    pub async fn list(&self) -> AppResult<Page> {
        let genres: Vec<Genre> = self
            .repository
            .find_all(Query::all().sort_by("name"))
            .await?;
        let genres: Vec<_> = genres.iter().map(Genre::view).collect();
        Ok(View::new("genreList", "Genre list")
            .with("genreList", genres)
            .into())
    }

    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let (genre, books) = self.with_books(id).await?;
        let genre = genre.ok_or_else(not_found)?;

        let books: Vec<_> = books.iter().map(Book::summary_view).collect();
        Ok(View::new("genreDetail", "Genre Detail")
            .with("genre", genre.view())
            .with("genreBooks", books)
            .into())
    }

    pub fn create_form(&self) -> Page {
        form_view("Create Genre", None::<GenreForm>, None).into()
    }

    /// Create a genre, or go to the existing one when the name is already taken
    pub async fn create(&self, form: GenreForm) -> AppResult<Page> {
        let draft = match form.validate_draft() {
            Validated::Invalid { form, errors } => {
                return Ok(form_view("Create Genre", Some(form), Some(errors)).into());
            }
            Validated::Valid(draft) => draft,
        };

        if let Some(existing) = self.find_by_name(&draft.name).await? {
            tracing::info!(genre_id = %existing.id, "Genre already exists, not creating a duplicate");
            return Ok(Page::redirect(existing.url()));
        }

        let genre: Genre = self.repository.create(draft).await?;
        tracing::info!(genre_id = %genre.id, "Genre created");
        Ok(Page::redirect(genre.url()))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = parse_id(id).ok_or_else(not_found)?;
        let genre = self
            .repository
            .get::<Genre>(id)
            .await?
            .ok_or_else(not_found)?;
        Ok(form_view("Update Genre", Some(genre.view()), None).into())
    }

    /// Rename a genre; a name held by another genre is rejected on the form
    pub async fn update(&self, id: &str, form: GenreForm) -> AppResult<Page> {
        let (form, draft) = match form.validate_draft() {
            Validated::Invalid { form, errors } => {
                return Ok(form_view("Update Genre", Some(form), Some(errors)).into());
            }
            Validated::Valid(draft) => (GenreForm { name: draft.name.clone() }, draft),
        };
        let id = parse_id(id).ok_or_else(not_found)?;

        if let Some(existing) = self.find_by_name(&draft.name).await? {
            if existing.id != id {
                let errors = vec![FieldError::new("name", "A genre with this name already exists")];
                return Ok(form_view("Update Genre", Some(form), Some(errors)).into());
            }
        }

        let genre = self
            .repository
            .update::<Genre>(id, draft)
            .await?
            .ok_or_else(not_found)?;
        tracing::info!(genre_id = %genre.id, "Genre updated");
        Ok(Page::redirect(genre.url()))
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(list_url("genres")));
        };
        let (genre, books) = self.with_books(id).await?;
        match genre {
            Some(genre) => Ok(delete_view(&genre, &books).into()),
            None => Ok(Page::redirect(list_url("genres"))),
        }
    }

    /// Delete unless books are still filed under the genre
    pub async fn delete(&self, id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(id) else {
            return Ok(Page::redirect(list_url("genres")));
        };
        let (genre, books) = self.with_books(id).await?;
        let Some(genre) = genre else {
            return Ok(Page::redirect(list_url("genres")));
        };

        if !books.is_empty() {
            tracing::info!(genre_id = %id, books = books.len(), "Genre delete refused: books remain");
            return Ok(delete_view(&genre, &books).into());
        }

        self.repository.delete::<Genre>(id).await?;
        tracing::info!(genre_id = %id, "Genre deleted");
        Ok(Page::redirect(list_url("genres")))
    }
}
