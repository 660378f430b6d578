//! Local library catalog
//!
//! Server-rendered pages for browsing and maintaining authors, genres, books
//! and book copies, with integrity guards on delete and a shared
//! validate-then-persist path for every form.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use views::{HtmlRenderer, Renderer};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    /// State over the given repository, rendering with [`HtmlRenderer`]
    pub fn new(config: AppConfig, repository: Repository) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(repository)),
            renderer: Arc::new(HtmlRenderer),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }
}
