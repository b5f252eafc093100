use crate::error::Result;
use crate::template::Template;
use crate::types::{FocusFlags, Outcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Counters (persisted form)
// ---------------------------------------------------------------------------

/// On-disk tallies. Pattern keys and `pattern::template` keys share one map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    #[serde(default)]
    pub patterns: BTreeMap<String, u64>,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub successful_updates: u64,
}

impl Counters {
    /// Missing file means nothing counted yet. A file that exists but does not
    /// parse is an error: silently starting over would lose counts.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let counters: Counters = serde_json::from_str(&data)?;
        Ok(counters)
    }

    /// Overwrite the whole file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    pub fn get(&self, key: &str) -> u64 {
        self.patterns.get(key).copied().unwrap_or(0)
    }

    fn bump(&mut self, key: String) {
        *self.patterns.entry(key).or_insert(0) += 1;
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternCount {
    pub pattern: String,
    pub count: u64,
}

/// How often one template was applied, across every pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCount {
    pub template: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterSummary {
    pub total: u64,
    pub successful: u64,
    pub success_rate: f64,
    pub patterns_seen: usize,
    pub top_patterns: Vec<PatternCount>,
    #[serde(default)]
    pub top_templates: Vec<TemplateCount>,
}

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

/// In-memory counters bound to their backing file.
///
/// Not synchronized: callers that share a `Counter` serialize access to it
/// (the dispatcher keeps it behind its own mutex).
#[derive(Debug)]
pub struct Counter {
    path: PathBuf,
    counters: Counters,
}

impl Counter {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let counters = Counters::load(&path)?;
        Ok(Self { path, counters })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counters.get(key)
    }

    /// Count one processed event, then persist.
    ///
    /// The in-memory counts are updated before the save is attempted, so an
    /// `Err` here means only that the file could not be written.
    pub fn record(
        &mut self,
        flags: &FocusFlags,
        applied: &[Template],
        outcome: Outcome,
    ) -> Result<()> {
        let key = flags.pattern_key();
        self.counters.bump(key.to_string());
        for template in applied {
            self.counters.bump(key.for_template(&template.name));
        }
        self.counters.total_events += 1;
        if outcome.is_success() {
            self.counters.successful_updates += 1;
        }
        self.counters.save(&self.path)
    }

    pub fn success_rate(&self) -> f64 {
        if self.counters.total_events == 0 {
            0.0
        } else {
            self.counters.successful_updates as f64 / self.counters.total_events as f64
        }
    }

    /// Totals plus the `n` most frequent pattern keys and the `n` most
    /// applied templates. Ties are ordered by key.
    pub fn summary(&self, n: usize) -> CounterSummary {
        let mut patterns: Vec<PatternCount> = Vec::new();
        let mut per_template: BTreeMap<&str, u64> = BTreeMap::new();
        for (key, count) in &self.counters.patterns {
            match key.split_once("::") {
                Some((_, template)) => *per_template.entry(template).or_insert(0) += count,
                None => patterns.push(PatternCount {
                    pattern: key.clone(),
                    count: *count,
                }),
            }
        }
        let patterns_seen = patterns.len();
        patterns.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.pattern.cmp(&b.pattern)));
        patterns.truncate(n);

        // BTreeMap iteration is already name-ordered; the stable sort keeps it
        // for equal counts.
        let mut templates: Vec<TemplateCount> = per_template
            .into_iter()
            .map(|(template, count)| TemplateCount {
                template: template.to_string(),
                count,
            })
            .collect();
        templates.sort_by(|a, b| b.count.cmp(&a.count));
        templates.truncate(n);

        CounterSummary {
            total: self.counters.total_events,
            successful: self.counters.successful_updates,
            success_rate: self.success_rate(),
            patterns_seen,
            top_patterns: patterns,
            top_templates: templates,
        }
    }
}
