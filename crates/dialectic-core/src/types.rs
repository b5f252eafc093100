use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The closed set of focus categories an event can be classified into.
///
/// Declaration order is significant: the selector walks categories in this
/// order, so it is the tie-break for templates of equal priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Security,
    Mvp,
    Performance,
    Documentation,
    Error,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Security,
            Category::Mvp,
            Category::Performance,
            Category::Documentation,
            Category::Error,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Mvp => "mvp",
            Category::Performance => "performance",
            Category::Documentation => "documentation",
            Category::Error => "error",
        }
    }

    /// Short label used in human-readable summaries.
    pub fn label(self) -> &'static str {
        match self {
            Category::Security => "Security",
            Category::Mvp => "MVP",
            Category::Performance => "Performance",
            Category::Documentation => "Documentation",
            Category::Error => "Errors",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::error::DialecticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "security" => Ok(Category::Security),
            "mvp" => Ok(Category::Mvp),
            "performance" => Ok(Category::Performance),
            "documentation" => Ok(Category::Documentation),
            "error" => Ok(Category::Error),
            _ => Err(crate::error::DialecticError::UnknownCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FocusFlags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FocusFlags {
    pub security: bool,
    pub mvp: bool,
    pub performance: bool,
    pub documentation: bool,
    pub error: bool,
}

impl FocusFlags {
    pub fn is_set(&self, category: Category) -> bool {
        match category {
            Category::Security => self.security,
            Category::Mvp => self.mvp,
            Category::Performance => self.performance,
            Category::Documentation => self.documentation,
            Category::Error => self.error,
        }
    }

    pub fn set(&mut self, category: Category, value: bool) {
        match category {
            Category::Security => self.security = value,
            Category::Mvp => self.mvp = value,
            Category::Performance => self.performance = value,
            Category::Documentation => self.documentation = value,
            Category::Error => self.error = value,
        }
    }

    /// Active categories in declaration order.
    pub fn categories(&self) -> Vec<Category> {
        Category::all()
            .iter()
            .copied()
            .filter(|c| self.is_set(*c))
            .collect()
    }

    pub fn any(&self) -> bool {
        Category::all().iter().any(|c| self.is_set(*c))
    }

    pub fn pattern_key(&self) -> PatternKey {
        PatternKey::from_flags(self)
    }
}

// ---------------------------------------------------------------------------
// PatternKey
// ---------------------------------------------------------------------------

/// Canonical grouping key for a flag combination:
/// `sec:<bool>|mvp:<bool>|perf:<bool>|err:<bool>`.
///
/// Documentation is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternKey(String);

impl PatternKey {
    pub fn from_flags(flags: &FocusFlags) -> Self {
        Self(format!(
            "sec:{}|mvp:{}|perf:{}|err:{}",
            flags.security, flags.mvp, flags.performance, flags.error
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which applications of `template_name` for this pattern are
    /// counted.
    pub fn for_template(&self, template_name: &str) -> String {
        format!("{}::{}", self.0, template_name)
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}
