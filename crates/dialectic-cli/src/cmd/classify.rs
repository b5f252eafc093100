use crate::output::print_json;
use anyhow::Context;
use dialectic_core::classifier::Classifier;
use dialectic_core::config::Config;
use dialectic_core::selector::Selector;
use std::path::Path;

use super::EventArgs;

/// Classify without touching the docs directory or the counters, so this
/// works before `dialectic init`.
pub fn run(root: &Path, event: EventArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let event = event.into_event()?;

    let classifier = Classifier::from_keywords(&config.keywords);
    let selector = Selector::new(config.templates.clone())?;
    let analysis = classifier.analyze(&event);
    let templates = selector.select(&analysis.flags);

    if json {
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        return print_json(&serde_json::json!({
            "summary": analysis.summary(),
            "analysis": analysis,
            "templates": names,
        }));
    }

    println!("{}", analysis.summary());
    println!("pattern: {}", analysis.pattern);
    if templates.is_empty() {
        println!("templates: none");
    } else {
        println!("templates:");
        for t in &templates {
            println!("  {} (priority {}, {} targets)", t.name, t.priority, t.target_files.len());
        }
    }
    Ok(())
}
