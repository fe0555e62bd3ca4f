use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use serde::Deserialize;
use serde::Serialize;

use std::sync::Arc;

pub const UNCATEGORIZED_NAME: &str = "Uncategorized";
pub const UNCATEGORIZED_COLOR: &str = "#9e9e9e";

/// Productivity category attached to a window or a process.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct CategoryEntity {
    pub name: Arc<str>,
    pub color: Arc<str>,
}

impl CategoryEntity {
    pub fn new(name: impl Into<Arc<str>>, color: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn uncategorized() -> Self {
        Self::new(UNCATEGORIZED_NAME, UNCATEGORIZED_COLOR)
    }
}

/// A span of time spent in a single window, as stored on disk.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct HeartbeatEntity {
    pub window_name: Arc<str>,
    pub process_name: Arc<str>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub idle: bool,
    #[serde(default)]
    pub window_category: Option<CategoryEntity>,
    #[serde(default)]
    pub process_category: Option<CategoryEntity>,
}

impl HeartbeatEntity {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Category of the window, falling back to the one of its process.
    pub fn category(&self) -> CategoryEntity {
        self.window_category
            .as_ref()
            .or(self.process_category.as_ref())
            .cloned()
            .unwrap_or_else(CategoryEntity::uncategorized)
    }

    pub fn with_span(self, start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
            ..self
        }
    }

    pub fn with_idle(self, idle: bool) -> Self {
        Self { idle, ..self }
    }
}
