//! Catalog workflows
//!
//! One service per entity. Each workflow returns a [`Page`]: a view to render
//! or a URL to redirect to. Validation failures are not errors here; they
//! re-render the form. Only a missing target on detail/update pages and store
//! failures surface as [`crate::AppError`].

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;

use uuid::Uuid;

use crate::{models::CATALOG_ROOT, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub authors: authors::AuthorsService,
    pub genres: genres::GenresService,
    pub books: books::BooksService,
    pub book_instances: book_instances::BookInstancesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            authors: authors::AuthorsService::new(repository.clone()),
            genres: genres::GenresService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            book_instances: book_instances::BookInstancesService::new(repository),
        }
    }
}

/// Path ids that do not parse are treated like ids that do not exist
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// List page URL for a collection path segment (`authors`, `genres`, ...)
pub(crate) fn list_url(segment: &str) -> String {
    format!("{}/{}", CATALOG_ROOT, segment)
}
