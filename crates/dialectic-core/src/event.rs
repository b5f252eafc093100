use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An error reported alongside a code change (e.g. from a monitoring feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_error_count")]
    pub count: u32,
}

fn default_error_count() -> u32 {
    1
}

/// A hypothetical code change: free text plus the files it touched.
///
/// Events are never mutated after construction; every stage of the pipeline
/// takes them by shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub errors: Vec<ErrorInfo>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(message: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            message: message.into(),
            files,
            errors: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<ErrorInfo>) -> Self {
        self.errors = errors;
        self
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Files joined for display, `none` when empty.
    pub fn files_display(&self) -> String {
        if self.files.is_empty() {
            "none".to_string()
        } else {
            self.files.join(", ")
        }
    }
}
