use crate::config::KeywordConfig;
use crate::event::Event;
use crate::types::{Category, FocusFlags};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// KeywordRule
// ---------------------------------------------------------------------------

/// One category's matcher: lower-cased substrings searched in the event text.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }

    fn hits(&self, haystack: &str) -> usize {
        self.keywords
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .count()
    }
}

/// Path fragments that raise security confidence when found in changed files.
const SECURITY_PATH_MARKERS: &[&str] = &[
    "auth",
    "security",
    "login",
    "jwt",
    "middleware",
    "guard",
    "permission",
];

/// Path fragments that raise performance confidence when found in changed files.
const PERFORMANCE_PATH_MARKERS: &[&str] = &[
    "optimize",
    "cache",
    "async",
    "queue",
    "pool",
    "connection",
    "database",
];

// ---------------------------------------------------------------------------
// FileKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Python,
    Javascript,
    Typescript,
    Html,
    Css,
    Markdown,
    Config,
    Other,
}

impl FileKind {
    pub fn of(path: &str) -> FileKind {
        let lower = path.to_lowercase();
        let ext = match lower.rsplit_once('.') {
            Some((_, ext)) if !ext.contains('/') => ext,
            _ => return FileKind::Other,
        };
        match ext {
            "py" | "pyi" => FileKind::Python,
            "js" | "jsx" => FileKind::Javascript,
            "ts" | "tsx" => FileKind::Typescript,
            "html" | "htm" => FileKind::Html,
            "css" | "scss" | "sass" => FileKind::Css,
            "md" | "rst" | "txt" => FileKind::Markdown,
            "json" | "yaml" | "yml" | "toml" | "ini" | "cfg" => FileKind::Config,
            _ => FileKind::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub flags: FocusFlags,
    pub pattern: String,
    pub file_kinds: BTreeMap<FileKind, usize>,
    pub error_count: usize,
    pub complexity: u32,
    /// 0..=1 heuristic strength for security, MVP and performance.
    #[serde(default)]
    pub confidence: BTreeMap<Category, f64>,
}

impl Analysis {
    pub fn complexity_label(&self) -> &'static str {
        match self.complexity {
            0..=4 => "Low",
            5..=14 => "Medium",
            _ => "High",
        }
    }

    pub fn confidence_for(&self, category: Category) -> Option<f64> {
        self.confidence.get(&category).copied()
    }

    /// One-line human summary, e.g.
    /// `Security (60.0%), MVP (30.0%) | Complexity: Medium (9)`.
    pub fn summary(&self) -> String {
        let focuses: Vec<String> = self
            .flags
            .categories()
            .into_iter()
            .map(|c| match (c, self.confidence_for(c)) {
                (Category::Error, _) => format!("{} ({})", c.label(), self.error_count),
                (_, Some(confidence)) => format!("{} ({:.1}%)", c.label(), confidence * 100.0),
                (_, None) => c.label().to_string(),
            })
            .collect();
        let focuses = if focuses.is_empty() {
            "General".to_string()
        } else {
            focuses.join(", ")
        };
        format!(
            "{focuses} | Complexity: {} ({})",
            self.complexity_label(),
            self.complexity
        )
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Maps an event to focus flags by case-insensitive substring matching.
///
/// Total and side-effect free: every event yields a full flag set. There is
/// no word-boundary check, so "authorization" matches "auth".
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<KeywordRule>,
    doc_extensions: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_keywords(&KeywordConfig::default())
    }
}

impl Classifier {
    pub fn new(rules: Vec<KeywordRule>, doc_extensions: Vec<String>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| KeywordRule {
                category: r.category,
                keywords: r
                    .keywords
                    .into_iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        let doc_extensions = doc_extensions
            .into_iter()
            .map(|e| e.to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            rules,
            doc_extensions,
        }
    }

    pub fn from_keywords(keywords: &KeywordConfig) -> Self {
        let rules = Category::all()
            .iter()
            .filter(|c| **c != Category::Error)
            .map(|c| KeywordRule {
                category: *c,
                keywords: keywords.for_category(*c).to_vec(),
            })
            .collect();
        Self::new(rules, keywords.doc_extensions.clone())
    }

    fn haystack(event: &Event) -> String {
        let mut text = event.message.to_lowercase();
        text.push(' ');
        text.push_str(&event.files.join(" ").to_lowercase());
        text
    }

    fn rule(&self, category: Category) -> Option<&KeywordRule> {
        self.rules.iter().find(|r| r.category == category)
    }

    /// Confidence per scored category, computed in tenths so the caps are
    /// exact: +4 per path marker, +1 per keyword hit (at most 6), capped at 10.
    /// MVP scores 3 per keyword found in the message alone.
    fn confidence(&self, event: &Event, haystack: &str) -> BTreeMap<Category, f64> {
        let files = event.files.join(" ").to_lowercase();
        let message = event.message.to_lowercase();
        let hits = |category: Category, text: &str| {
            self.rule(category).map_or(0, |r| r.hits(text))
        };
        let markers = |list: &[&str]| list.iter().filter(|m| files.contains(**m)).count();

        let path_scored = |category: Category, list: &[&str]| {
            (markers(list) * 4 + hits(category, haystack).min(6)).min(10)
        };
        let tenths = [
            (Category::Security, path_scored(Category::Security, SECURITY_PATH_MARKERS)),
            (Category::Mvp, (hits(Category::Mvp, message.as_str()) * 3).min(10)),
            (
                Category::Performance,
                path_scored(Category::Performance, PERFORMANCE_PATH_MARKERS),
            ),
        ];
        tenths
            .into_iter()
            .map(|(category, t)| (category, t as f64 / 10.0))
            .collect()
    }

    pub fn classify(&self, event: &Event) -> FocusFlags {
        let text = Self::haystack(event);
        let mut flags = FocusFlags::default();

        for rule in &self.rules {
            if rule.matches(&text) {
                flags.set(rule.category, true);
            }
        }

        if !flags.documentation {
            let has_doc_file = event.files.iter().any(|f| {
                let lower = f.to_lowercase();
                self.doc_extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
            });
            flags.documentation = has_doc_file;
        }

        flags.error = !event.errors.is_empty();
        flags
    }

    pub fn analyze(&self, event: &Event) -> Analysis {
        let flags = self.classify(event);

        let mut file_kinds: BTreeMap<FileKind, usize> = BTreeMap::new();
        for f in &event.files {
            *file_kinds.entry(FileKind::of(f)).or_insert(0) += 1;
        }

        let words = event.message.split_whitespace().count() as u32;
        let mut complexity = event.files.len() as u32 * 2 + words / 2 + file_kinds.len() as u32 * 3;
        if flags.security {
            complexity += 5;
        }
        if flags.performance {
            complexity += 3;
        }

        Analysis {
            pattern: flags.pattern_key().to_string(),
            flags,
            file_kinds,
            error_count: event.error_count(),
            complexity,
            confidence: self.confidence(event, &Self::haystack(event)),
        }
    }
}
