use crate::cmd::open_engine;
use crate::output::{print_json, print_skills, print_table};
use anyhow::Context;
use clap::Subcommand;
use skilltree_core::types::ContainerKind;
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum ContainerSubcommand {
    /// Create an area or project; level 1 is generated immediately
    Create {
        /// area | project
        kind: ContainerKind,
        title: String,
    },
    /// List your containers
    List {
        /// Only this kind (area | project | skill_root)
        #[arg(long)]
        kind: Option<ContainerKind>,
    },
    /// Show a container and its visible skills
    Show { id: Uuid },
    /// Delete a container, its skills and nested sub-trees
    Delete { id: Uuid },
    /// Set the label shown for a level
    Subtitle {
        id: Uuid,
        level: u32,
        label: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

pub fn run(root: &Path, user: &str, subcmd: ContainerSubcommand, json: bool) -> anyhow::Result<()> {
    let engine = open_engine(root)?;
    match subcmd {
        ContainerSubcommand::Create { kind, title } => {
            let (container, skills) = engine
                .create_container(user, kind, &title)
                .context("failed to create container")?;
            if json {
                return print_json(&serde_json::json!({
                    "container": container,
                    "skills": skills,
                }));
            }
            println!("Created {} '{}': {}", container.kind, container.title, container.id);
            print_skills(&skills);
            Ok(())
        }
        ContainerSubcommand::List { kind } => {
            let containers = engine.list_containers(user, kind)?;
            if json {
                return print_json(&containers);
            }
            if containers.is_empty() {
                println!("No containers.");
                return Ok(());
            }
            let rows = containers
                .iter()
                .map(|c| {
                    vec![
                        c.id.to_string(),
                        c.kind.to_string(),
                        c.title.clone(),
                        c.unlocked_level.to_string(),
                    ]
                })
                .collect();
            print_table(&["ID", "KIND", "TITLE", "LEVEL"], rows);
            Ok(())
        }
        ContainerSubcommand::Show { id } => {
            let container = engine.get_container(user, id)?;
            let skills = engine.list_skills(user, id)?;
            if json {
                return print_json(&serde_json::json!({
                    "container": container,
                    "skills": skills,
                }));
            }
            println!("{} '{}' ({})", container.kind, container.title, container.id);
            println!("Unlocked level: {}", container.unlocked_level);
            for (level, sub) in &container.level_subtitles {
                println!("  level {level}: {} {}", sub.label, sub.description);
            }
            let plain: Vec<_> = skills.iter().map(|v| v.skill.clone()).collect();
            println!("{}", skilltree_core::skill::summarize(&plain));
            print_skills(&skills);
            Ok(())
        }
        ContainerSubcommand::Delete { id } => {
            let removed = engine
                .delete_container(user, id)
                .with_context(|| format!("failed to delete container {id}"))?;
            if json {
                return print_json(&serde_json::json!({
                    "deleted": id,
                    "containers_removed": removed,
                }));
            }
            println!("Deleted {id} ({removed} container(s) removed)");
            Ok(())
        }
        ContainerSubcommand::Subtitle {
            id,
            level,
            label,
            description,
        } => {
            let container = engine.set_level_subtitle(user, id, level, &label, &description)?;
            if json {
                return print_json(&container);
            }
            println!("Level {level} of {id}: {label}");
            Ok(())
        }
    }
}
