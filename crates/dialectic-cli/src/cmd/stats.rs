use crate::output::{percent, print_json, print_table};
use anyhow::Context;
use dialectic_core::config::Config;
use dialectic_core::counter::Counter;
use std::path::Path;

/// Counts, success rate, and the most frequent patterns and templates.
///
/// Reads the counters file directly; no dispatcher (and so no docs-directory
/// check) is needed just to look at counts.
pub fn run(root: &Path, top: usize, json: bool) -> anyhow::Result<()> {
    if top == 0 {
        anyhow::bail!("--top must be at least 1");
    }
    let config = Config::load_or_default(root).context("failed to load config")?;
    let path = config.counters_path(root);
    let counter =
        Counter::open(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let summary = counter.summary(top);

    if json {
        return print_json(&summary);
    }

    println!("events:       {}", summary.total);
    println!("successful:   {}", summary.successful);
    println!("success rate: {}", percent(summary.success_rate));
    println!("patterns:     {}", summary.patterns_seen);
    if !summary.top_patterns.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = summary
            .top_patterns
            .iter()
            .map(|p| vec![p.pattern.clone(), p.count.to_string()])
            .collect();
        print_table(&["PATTERN", "COUNT"], &rows);
    }
    if !summary.top_templates.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = summary
            .top_templates
            .iter()
            .map(|t| vec![t.template.clone(), t.count.to_string()])
            .collect();
        print_table(&["TEMPLATE", "APPLIED"], &rows);
    }
    Ok(())
}
