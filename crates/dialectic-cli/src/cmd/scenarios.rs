use crate::output::{print_json, print_table};
use dialectic_core::scenario::Scenario;

pub fn run(json: bool) -> anyhow::Result<()> {
    if json {
        let list: Vec<serde_json::Value> = Scenario::all()
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.as_str(),
                    "title": s.title(),
                    "event": s.event(),
                })
            })
            .collect();
        return print_json(&list);
    }

    let rows: Vec<Vec<String>> = Scenario::all()
        .iter()
        .map(|s| {
            let event = s.event();
            vec![
                s.as_str().to_string(),
                s.title().to_string(),
                event.message.clone(),
                event.files_display(),
            ]
        })
        .collect();
    print_table(&["NAME", "TITLE", "MESSAGE", "FILES"], &rows);
    Ok(())
}
