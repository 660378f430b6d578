//! Catalog home page

use crate::{
    error::AppResult,
    models::{Author, Book, BookInstance, BookInstanceStatus, Genre},
    repository::{Filter, Repository},
    views::{Page, View},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record counts for the home page
    pub async fn index(&self) -> AppResult<Page> {
        let available = [Filter::eq("status", BookInstanceStatus::Available.as_str())];
        let (books, instances, available, authors, genres) = tokio::try_join!(
            self.repository.count::<Book>(&[]),
            self.repository.count::<BookInstance>(&[]),
            self.repository.count::<BookInstance>(&available),
            self.repository.count::<Author>(&[]),
            self.repository.count::<Genre>(&[]),
        )?;

        Ok(View::new("index", "Local Library Home")
            .with("bookCount", books)
            .with("bookInstanceCount", instances)
            .with("bookInstanceAvailableCount", available)
            .with("authorCount", authors)
            .with("genreCount", genres)
            .into())
    }
}
