use anyhow::Context;
use dialectic_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    println!("Initializing dialectic in: {}", root.display());

    // 1. .dialectic/
    let dir = paths::dialectic_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    // 2. config.yaml, never overwritten
    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load existing config.yaml")?
    } else {
        let project_name = name.map(str::to_string).unwrap_or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string())
        });
        let config = Config::new(project_name);
        config.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        config
    };

    // 3. Documentation base directory; template targets are created on first write.
    let docs = config.docs_dir(root);
    if docs.is_dir() {
        println!("  exists:  {}", docs.display());
    } else {
        io::ensure_dir(&docs).with_context(|| format!("failed to create {}", docs.display()))?;
        println!("  created: {}", docs.display());
    }

    println!("\nNext: dialectic run --scenario security");
    Ok(())
}
