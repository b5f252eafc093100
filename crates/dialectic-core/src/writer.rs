use crate::event::Event;
use crate::io;
use crate::template::Template;
use crate::types::FocusFlags;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// FileUpdateRecord
// ---------------------------------------------------------------------------

/// Result of writing one template target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUpdateRecord {
    /// Target as configured, relative to the docs directory.
    pub target: String,
    /// Resolved path. Empty when the target was rejected before resolution.
    pub path: PathBuf,
    pub template: String,
    pub was_created: bool,
    pub bytes_written: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileUpdateRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// `Created`, `Updated` or `Failed`.
    pub fn action(&self) -> &'static str {
        match (&self.error, self.was_created) {
            (Some(_), _) => "Failed",
            (None, true) => "Created",
            (None, false) => "Updated",
        }
    }
}

// ---------------------------------------------------------------------------
// DocWriter
// ---------------------------------------------------------------------------

/// Appends rendered template blocks to documentation files under one base
/// directory.
#[derive(Debug, Clone)]
pub struct DocWriter {
    base_dir: PathBuf,
}

impl DocWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write `template`'s block to each of its targets.
    ///
    /// Best effort: a failing target yields a failed record and the remaining
    /// targets are still written. One record per target, in target order.
    pub fn apply(
        &self,
        template: &Template,
        event: &Event,
        flags: &FocusFlags,
    ) -> Vec<FileUpdateRecord> {
        let block = render_block(template, event, flags);
        template
            .target_files
            .iter()
            .map(|target| self.write_target(template, target, &block))
            .collect()
    }

    fn write_target(&self, template: &Template, target: &str, block: &str) -> FileUpdateRecord {
        let path = match io::join_within(&self.base_dir, target) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(template = %template.name, file = target, "rejected target: {e}");
                return FileUpdateRecord {
                    target: target.to_string(),
                    path: PathBuf::new(),
                    template: template.name.clone(),
                    was_created: false,
                    bytes_written: 0,
                    error: Some(e.to_string()),
                };
            }
        };

        let header = file_header(&path);
        match io::ensure_dir_then_append(&path, &header, block) {
            Ok(created) => {
                let bytes_written = if created {
                    header.len() + block.len()
                } else {
                    block.len()
                };
                FileUpdateRecord {
                    target: target.to_string(),
                    path,
                    template: template.name.clone(),
                    was_created: created,
                    bytes_written,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    template = %template.name,
                    path = %path.display(),
                    "documentation write failed: {e}"
                );
                FileUpdateRecord {
                    target: target.to_string(),
                    path,
                    template: template.name.clone(),
                    was_created: false,
                    bytes_written: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// `# Title Case Stem` header for a newly created file.
pub fn file_header(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let title: Vec<String> = stem
        .split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    format!("# {}\n\n", title.join(" "))
}

pub fn render_block(template: &Template, event: &Event, flags: &FocusFlags) -> String {
    let focus: Vec<&str> = flags.categories().into_iter().map(|c| c.label()).collect();
    let focus = if focus.is_empty() {
        "General".to_string()
    } else {
        focus.join(", ")
    };
    let context = if event.message.is_empty() {
        "No message"
    } else {
        event.message.as_str()
    };

    let mut out = format!(
        "\n## {} update - {}\n\n**Files Modified**: {}  \n**Context**: {}  \n**Focus**: {}\n",
        template.display_name,
        event.timestamp.format("%Y-%m-%d %H:%M:%S"),
        event.files_display(),
        context,
        focus,
    );
    if !event.errors.is_empty() {
        let errors: Vec<String> = event
            .errors
            .iter()
            .map(|e| format!("{} x{}", e.kind, e.count))
            .collect();
        out.push_str(&format!("**Errors**: {}\n", errors.join(", ")));
    }
    if !template.checklist.is_empty() {
        out.push_str("\n### Action Items\n");
        for item in &template.checklist {
            out.push_str(&format!("- [ ] {item}\n"));
        }
    }
    out.push_str("\n---\n");
    out
}
