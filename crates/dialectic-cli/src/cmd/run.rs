use crate::output::{print_json, print_table};
use anyhow::Context;
use dialectic_core::config::Config;
use dialectic_core::pipeline::Dispatcher;
use dialectic_core::scenario::Scenario;
use std::path::Path;

use super::EventArgs;

pub fn run(root: &Path, scenario: Option<&str>, event: EventArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut dispatcher = Dispatcher::from_config(root, &config)?;

    let event = match scenario {
        Some(name) => {
            let scenario: Scenario = name.parse()?;
            tracing::info!(%scenario, "running scenario");
            scenario.event()
        }
        None => event.into_event()?,
    };

    let report = dispatcher.dispatch(&event);

    if json {
        return print_json(&report);
    }

    println!("{}", report.analysis.summary());
    println!("pattern: {}", report.pattern());
    if report.templates.is_empty() {
        println!("no templates matched; nothing written");
    } else {
        println!("templates: {}", report.templates.join(", "));
        let rows: Vec<Vec<String>> = report
            .updates
            .iter()
            .map(|u| {
                vec![
                    u.action().to_string(),
                    u.target.clone(),
                    u.template.clone(),
                    u.error.clone().unwrap_or_else(|| format!("{} bytes", u.bytes_written)),
                ]
            })
            .collect();
        println!();
        print_table(&["ACTION", "FILE", "TEMPLATE", "DETAIL"], &rows);
    }
    if !report.persisted {
        eprintln!("warning: counters could not be saved; counts from this run are not on disk");
    }

    if report.files_failed() > 0 {
        anyhow::bail!(
            "{} of {} documentation writes failed",
            report.files_failed(),
            report.updates.len()
        );
    }
    Ok(())
}
