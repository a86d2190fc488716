use crate::cmd::open_engine;
use crate::output::{print_json, print_table};
use std::path::Path;
use uuid::Uuid;

pub fn run(root: &Path, user: &str, container: Option<Uuid>, json: bool) -> anyhow::Result<()> {
    let engine = open_engine(root)?;
    match container {
        Some(id) => {
            let promoted = engine.reconcile(user, id)?;
            if json {
                return print_json(&serde_json::json!({ "promoted": promoted }));
            }
            println!("{} skill(s) unlocked", promoted.len());
            for id in promoted {
                println!("  {id}");
            }
        }
        None => {
            let changed = engine.reconcile_all()?;
            if json {
                return print_json(&serde_json::json!({ "changed": changed }));
            }
            println!("{} container(s) changed", changed.len());
        }
    }
    Ok(())
}

pub fn check(root: &Path, user: &str, container: Uuid, json: bool) -> anyhow::Result<()> {
    let engine = open_engine(root)?;
    let report = engine.check_consistency(user, container)?;
    if json {
        print_json(&report)?;
    } else if report.consistent {
        println!("{container}: consistent");
    } else {
        println!("{container}: {} issue(s)", report.issues.len());
        let rows = report
            .issues
            .iter()
            .map(|i| {
                vec![
                    serde_json::to_value(i.kind)
                        .ok()
                        .and_then(|v| v.as_str().map(str::to_string))
                        .unwrap_or_default(),
                    i.skill.map(|s| s.to_string()).unwrap_or_default(),
                    i.message.clone(),
                ]
            })
            .collect();
        print_table(&["KIND", "SKILL", "MESSAGE"], rows);
    }

    if !report.consistent {
        anyhow::bail!("container {container} needs a re-sync");
    }
    Ok(())
}
