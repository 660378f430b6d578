//! Presentation boundary: named views with a data context
//!
//! Workflows never produce markup themselves. They hand a [`View`] (a view
//! name plus a JSON context) or a redirect target to the HTTP layer, which
//! renders it through a [`Renderer`].

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::escape;

/// A named view and the context it is rendered with
#[derive(Debug, Clone)]
pub struct View {
    pub name: &'static str,
    pub status: StatusCode,
    pub context: Map<String, Value>,
}

impl View {
    pub fn new(name: &'static str, title: impl Into<String>) -> Self {
        let mut context = Map::new();
        context.insert("title".to_string(), Value::String(title.into()));
        Self {
            name,
            status: StatusCode::OK,
            context,
        }
    }

    /// Generic failure page
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let title = status.canonical_reason().unwrap_or("Error");
        Self {
            status,
            ..Self::new("error", title)
        }
        .with("message", message.into())
        .with("status", status.as_u16())
    }

    /// Add a field to the context
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::warn!(view = self.name, field = key, "Unserializable view field: {}", e);
            Value::Null
        });
        self.context.insert(key.to_string(), value);
        self
    }

    /// Add a field only when present
    pub fn with_opt<T: Serialize>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn title(&self) -> &str {
        self.context
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}

/// What a workflow asks the HTTP layer to do
#[derive(Debug, Clone)]
pub enum Page {
    Render(View),
    Redirect(String),
}

impl Page {
    pub fn redirect(to: impl Into<String>) -> Self {
        Page::Redirect(to.into())
    }

    pub fn view(&self) -> Option<&View> {
        match self {
            Page::Render(view) => Some(view),
            Page::Redirect(_) => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Page::Redirect(to) => Some(to),
            Page::Render(_) => None,
        }
    }
}

impl From<View> for Page {
    fn from(view: View) -> Self {
        Page::Render(view)
    }
}

/// Turns a view into a response body
pub trait Renderer: Send + Sync {
    fn render(&self, view: &View) -> String;
}

/// Minimal HTML document: the title and the context as escaped JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, view: &View) -> String {
        let title = escape(view.title());
        let context = serde_json::to_string_pretty(&view.context).unwrap_or_default();
        format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body data-view=\"{name}\">\n<h1>{title}</h1>\n<pre>{context}</pre>\n</body>\n</html>\n",
            title = title,
            name = view.name,
            context = escape(&context),
        )
    }
}
