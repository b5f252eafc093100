use crate::error::{DialecticError, Result};
use crate::paths;
use crate::template::Template;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// DocsConfig / CountersConfig / ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Every documentation write lands under this directory.
    #[serde(default = "default_docs_dir")]
    pub base_dir: PathBuf,
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DOCS_DIR)
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_docs_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountersConfig {
    #[serde(default = "default_counters_path")]
    pub path: PathBuf,
    /// Recent-event log, kept apart from the counters file.
    #[serde(default = "default_history_path")]
    pub history: PathBuf,
}

fn default_counters_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_COUNTERS_FILE)
}

fn default_history_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_HISTORY_FILE)
}

impl Default for CountersConfig {
    fn default() -> Self {
        Self {
            path: default_counters_path(),
            history: default_history_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// KeywordConfig
// ---------------------------------------------------------------------------

/// Substring keywords per category. Matching is case-insensitive, so entries
/// are lower-cased when the classifier is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_security_keywords")]
    pub security: Vec<String>,
    #[serde(default = "default_mvp_keywords")]
    pub mvp: Vec<String>,
    #[serde(default = "default_performance_keywords")]
    pub performance: Vec<String>,
    #[serde(default = "default_documentation_keywords")]
    pub documentation: Vec<String>,
    /// File extensions that mark an event as documentation work on their own.
    #[serde(default = "default_doc_extensions")]
    pub doc_extensions: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_security_keywords() -> Vec<String> {
    owned(&[
        "auth",
        "password",
        "token",
        "security",
        "encrypt",
        "permission",
        "login",
        "session",
        "jwt",
        "oauth",
        "csrf",
        "xss",
        "secret",
        "certificate",
    ])
}

fn default_mvp_keywords() -> Vec<String> {
    owned(&[
        "mvp",
        "prototype",
        "hackathon",
        "demo",
        "rapid",
        "quick",
        "poc",
        "placeholder",
    ])
}

fn default_performance_keywords() -> Vec<String> {
    owned(&[
        "optimize",
        "performance",
        "cache",
        "async",
        "speed",
        "latency",
        "bottleneck",
        "concurrent",
        "parallel",
    ])
}

fn default_documentation_keywords() -> Vec<String> {
    owned(&["readme", "docs", "documentation", "guide", "tutorial"])
}

fn default_doc_extensions() -> Vec<String> {
    owned(&[".md", ".rst", ".txt"])
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            security: default_security_keywords(),
            mvp: default_mvp_keywords(),
            performance: default_performance_keywords(),
            documentation: default_documentation_keywords(),
            doc_extensions: default_doc_extensions(),
        }
    }
}

impl KeywordConfig {
    /// Keyword list for a category. `Error` is driven by the event's error
    /// list and has no keywords.
    pub fn for_category(&self, category: Category) -> &[String] {
        match category {
            Category::Security => &self.security,
            Category::Mvp => &self.mvp,
            Category::Performance => &self.performance,
            Category::Documentation => &self.documentation,
            Category::Error => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn default_version() -> u32 {
    1
}

fn default_templates() -> BTreeMap<Category, Template> {
    Category::all()
        .iter()
        .map(|c| (*c, c.default_template()))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub counters: CountersConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub keywords: KeywordConfig,
    /// One template per category. A partial map is a configuration error,
    /// not a request to fall back to defaults.
    #[serde(default = "default_templates")]
    pub templates: BTreeMap<Category, Template>,
    /// Applied when an event matches no category. Absent means such events
    /// update no documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Template>,
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            docs: DocsConfig::default(),
            counters: CountersConfig::default(),
            server: ServerConfig::default(),
            keywords: KeywordConfig::default(),
            templates: default_templates(),
            fallback: None,
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(DialecticError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load the project config, or a default one named after the root
    /// directory when the project has not been initialized.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(DialecticError::NotInitialized) => {
                let name = root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "dialectic".to_string());
                Ok(Self::new(name))
            }
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn docs_dir(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.docs.base_dir)
    }

    pub fn counters_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.counters.path)
    }

    pub fn history_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.counters.history)
    }

    pub fn template_for(&self, category: Category) -> Result<&Template> {
        self.templates
            .get(&category)
            .ok_or(DialecticError::MissingTemplate(category))
    }

    /// Collect problems with this config. `Error`-level entries make
    /// [`Config::check`] fail.
    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // 1. Every category needs a template.
        for &category in Category::all() {
            if !self.templates.contains_key(&category) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("no template configured for category '{category}'"),
                });
            }
        }

        // 2. Templates need targets, and targets must stay under the docs dir.
        let docs_dir = self.docs_dir(root);
        let all_templates = self
            .templates
            .iter()
            .map(|(c, t)| (c.as_str(), t))
            .chain(self.fallback.iter().map(|t| ("fallback", t)));
        for (slot, template) in all_templates {
            if template.target_files.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("template '{}' ({slot}) has no target files", template.name),
                });
            }
            for target in &template.target_files {
                if crate::io::join_within(&docs_dir, target).is_err() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!(
                            "template '{}' target '{}' escapes the docs directory",
                            template.name, target
                        ),
                    });
                }
            }
        }

        // 3. Shared template names are merged by the selector; flag them.
        let mut by_name: HashMap<&str, Vec<&str>> = HashMap::new();
        for (category, template) in &self.templates {
            by_name
                .entry(template.name.as_str())
                .or_default()
                .push(category.as_str());
        }
        let mut shared: Vec<_> = by_name.into_iter().filter(|(_, c)| c.len() > 1).collect();
        shared.sort();
        for (name, categories) in shared {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "template '{name}' is mapped from several categories ({}); it is applied once per event",
                    categories.join(", ")
                ),
            });
        }

        // 4. Empty keyword lists can never match.
        for &category in &[
            Category::Security,
            Category::Mvp,
            Category::Performance,
            Category::Documentation,
        ] {
            if self.keywords.for_category(category).is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("keyword list for '{category}' is empty"),
                });
            }
        }

        // 5. The docs directory must exist before events are accepted.
        if !docs_dir.is_dir() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "documentation base directory does not exist: {}",
                    docs_dir.display()
                ),
            });
        }

        warnings
    }

    /// Fail fast on the first fatal configuration problem.
    pub fn check(&self, root: &Path) -> Result<()> {
        for &category in Category::all() {
            self.template_for(category)?;
        }
        let docs_dir = self.docs_dir(root);
        if !docs_dir.is_dir() {
            return Err(DialecticError::BaseDirMissing(
                docs_dir.display().to_string(),
            ));
        }
        if let Some(w) = self
            .validate(root)
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            return Err(DialecticError::InvalidConfig(w.message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init(dir: &TempDir) -> Config {
        let cfg = Config::new("test-project");
        std::fs::create_dir_all(cfg.docs_dir(dir.path())).unwrap();
        cfg.save(dir.path()).unwrap();
        cfg
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(DialecticError::NotInitialized)
        ));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        init(&dir);
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project.name, "test-project");
        assert_eq!(loaded.templates.len(), Category::all().len());
        assert_eq!(loaded.server.port, 8000);
        assert!(loaded.check(dir.path()).is_ok());
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("project:\n  name: tiny\n").unwrap();
        assert_eq!(cfg.docs.base_dir, PathBuf::from(".cursor"));
        assert_eq!(cfg.counters.history, PathBuf::from(".dialectic/history.json"));
        assert!(cfg.keywords.security.iter().any(|k| k == "auth"));
        assert_eq!(
            cfg.template_for(Category::Security).unwrap().name,
            "security_specialist"
        );
        assert!(cfg.fallback.is_none());
    }

    #[test]
    fn partial_template_map_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".cursor")).unwrap();
        let yaml = "project:\n  name: partial\ntemplates:\n  security:\n    name: sec\n    display_name: Sec\n    target_files: [sec.md]\n    priority: 1\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            cfg.check(dir.path()),
            Err(DialecticError::MissingTemplate(Category::Mvp))
        ));
    }

    #[test]
    fn missing_docs_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("no-docs");
        assert!(matches!(
            cfg.check(dir.path()),
            Err(DialecticError::BaseDirMissing(_))
        ));
    }

    #[test]
    fn escaping_target_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut cfg = init(&dir);
        cfg.templates
            .get_mut(&Category::Mvp)
            .unwrap()
            .target_files
            .push("../outside.md".into());
        assert!(matches!(
            cfg.check(dir.path()),
            Err(DialecticError::InvalidConfig(_))
        ));
    }

    #[test]
    fn shared_template_name_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let mut cfg = init(&dir);
        let security = cfg.templates[&Category::Security].clone();
        cfg.templates.insert(Category::Error, security);
        let warnings = cfg.validate(dir.path());
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("security_specialist")));
        assert!(cfg.check(dir.path()).is_ok());
    }
}
