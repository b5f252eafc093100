use crate::types::Category;
use serde::{Deserialize, Serialize};

/// Static descriptor of one agent: what it is called, which documentation
/// files it writes to, and where it sits in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Paths relative to the documentation base directory.
    pub target_files: Vec<String>,
    /// Lower is dispatched first.
    pub priority: u32,
    #[serde(default)]
    pub estimated_duration: String,
    /// Action items rendered into every block this template appends.
    #[serde(default)]
    pub checklist: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Category {
    /// Built-in template for this category.
    pub fn default_template(self) -> Template {
        match self {
            Category::Security => Template {
                name: "security_specialist".into(),
                display_name: "Security Specialist".into(),
                description: "Reviews changes for authentication, secrets and permission handling"
                    .into(),
                capabilities: strings(&[
                    "vulnerability_detection",
                    "security_patterns",
                    "auth_analysis",
                ]),
                target_files: strings(&[
                    "rules/security_rules.md",
                    "commands/security_commands.md",
                    "development/patterns/auth_patterns.md",
                    "development/debugging/security_debugging.md",
                ]),
                priority: 1,
                estimated_duration: "15-30 min".into(),
                checklist: strings(&[
                    "Review authentication flow in modified files",
                    "Verify permission checks are in place",
                    "Check token and secret handling",
                    "Update security tests",
                ]),
            },
            Category::Mvp => Template {
                name: "mvp_strategist".into(),
                display_name: "MVP Strategist".into(),
                description: "Keeps prototype work focused on demo-ready scope".into(),
                capabilities: strings(&[
                    "mvp_analysis",
                    "user_value_assessment",
                    "feature_prioritization",
                ]),
                target_files: strings(&[
                    "rules/mvp_guidelines.md",
                    "commands/rapid_prototyping.md",
                    "development/patterns/mvp_patterns.md",
                    "plans/mvp_tracking.md",
                ]),
                priority: 2,
                estimated_duration: "10-20 min".into(),
                checklist: strings(&[
                    "Record shortcuts taken",
                    "Track technical debt for post-MVP refactoring",
                ]),
            },
            Category::Performance => Template {
                name: "performance_expert".into(),
                display_name: "Performance Expert".into(),
                description: "Tracks optimization work and its measurements".into(),
                capabilities: strings(&[
                    "performance_analysis",
                    "optimization_recommendations",
                    "scalability_assessment",
                ]),
                target_files: strings(&[
                    "rules/performance_rules.md",
                    "commands/optimization_commands.md",
                    "development/patterns/performance_patterns.md",
                    "development/debugging/performance_debugging.md",
                ]),
                priority: 2,
                estimated_duration: "20-40 min".into(),
                checklist: strings(&[
                    "Benchmark before and after the change",
                    "Document cache invalidation rules",
                ]),
            },
            Category::Documentation => Template {
                name: "documentation_specialist".into(),
                display_name: "Documentation Specialist".into(),
                description: "Keeps guides and indexes in step with code changes".into(),
                capabilities: strings(&["doc_generation", "pattern_documentation"]),
                target_files: strings(&[
                    "README.md",
                    "plans/documentation_log.md",
                    "commands/documentation_commands.md",
                ]),
                priority: 3,
                estimated_duration: "5-15 min".into(),
                checklist: strings(&["Cross-link new pages from the README"]),
            },
            Category::Error => Template {
                name: "error_handler".into(),
                display_name: "Error Handler".into(),
                description: "Captures reported errors and their fixes".into(),
                capabilities: strings(&["error_triage", "debugging_guides"]),
                target_files: strings(&[
                    "development/debugging/error_log.md",
                    "commands/debugging_commands.md",
                    "rules/error_handling_rules.md",
                ]),
                priority: 1,
                estimated_duration: "10-25 min".into(),
                checklist: strings(&[
                    "Add a regression test for the reported error",
                    "Document the root cause",
                ]),
            },
        }
    }
}

impl Template {
    /// Template for events that match no category, used when a fallback is
    /// configured.
    pub fn general() -> Self {
        Template {
            name: "general_updater".into(),
            display_name: "General Updater".into(),
            description: "Logs changes that match no focus category".into(),
            capabilities: strings(&["change_logging"]),
            target_files: strings(&["plans/general_updates.md"]),
            priority: 3,
            estimated_duration: "5 min".into(),
            checklist: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_targets() {
        for &c in Category::all() {
            let t = c.default_template();
            assert!(!t.target_files.is_empty(), "{c} has no targets");
            assert!(!t.name.is_empty());
        }
    }

    #[test]
    fn default_template_names_are_unique() {
        let mut names: Vec<String> = Category::all()
            .iter()
            .map(|c| c.default_template().name)
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Category::all().len());
    }

    #[test]
    fn template_yaml_defaults_optional_fields() {
        let yaml = "name: custom\ndisplay_name: Custom\ntarget_files: [custom.md]\npriority: 5\n";
        let t: Template = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(t.priority, 5);
        assert!(t.capabilities.is_empty());
        assert!(t.checklist.is_empty());
    }
}
