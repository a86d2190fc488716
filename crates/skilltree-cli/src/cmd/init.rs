use crate::output::print_json;
use anyhow::Context;
use skilltree_core::{config::WarnLevel, engine::Engine, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let existed = paths::config_path(root).exists();
    let engine = Engine::init(root)
        .with_context(|| format!("failed to initialize {}", root.display()))?;
    let warnings = engine.config().validate();

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "created": !existed,
            "warnings": warnings,
        }))?;
        return Ok(());
    }

    println!("Initializing skilltree in: {}", root.display());
    if existed {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        println!("  created: {}", paths::CONFIG_FILE);
    }
    println!("  db:      {}", paths::DB_FILE);
    for w in &warnings {
        let tag = match w.level {
            WarnLevel::Warning => "warning",
            WarnLevel::Error => "error",
        };
        println!("  {tag}: {}", w.message);
    }
    Ok(())
}
