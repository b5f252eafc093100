use crate::output::{print_json, print_table};
use anyhow::Context;
use dialectic_core::config::Config;
use dialectic_core::history::History;
use std::path::Path;

pub fn run(root: &Path, limit: usize, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let entries = History::open(config.history_path(root)).recent(limit);

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No events recorded yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            let outcome = match e.files_failed {
                0 => "success".to_string(),
                n => format!("{n} failed"),
            };
            vec![
                e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                e.pattern.clone(),
                e.templates.join(", "),
                e.updates.to_string(),
                outcome,
                e.message.clone(),
            ]
        })
        .collect();
    print_table(
        &["TIME", "PATTERN", "TEMPLATES", "WRITTEN", "OUTCOME", "MESSAGE"],
        &rows,
    );
    Ok(())
}
