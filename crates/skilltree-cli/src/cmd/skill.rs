use crate::cmd::open_engine;
use crate::output::{print_json, print_skills};
use anyhow::Context;
use clap::Subcommand;
use skilltree_core::skill::{NewSkill, SkillPatch, SkillView};
use skilltree_core::status::{LevelChange, ToggleOutcome};
use skilltree_core::types::{Direction, SkillStatus};
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum SkillSubcommand {
    /// List visible skills of a container (or of a parent skill's sub-tree)
    List { container: Uuid },
    /// Add a skill without shifting others (max 5 per level)
    Add {
        /// Container id, or a parent skill id to grow its sub-tree
        container: Uuid,
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        level: Option<u32>,
        #[arg(long)]
        y: Option<i64>,
        /// Dependency ids (repeatable)
        #[arg(long = "depends-on")]
        depends_on: Vec<Uuid>,
        /// Mark as the level's final node
        #[arg(long = "final")]
        is_final: bool,
        /// Never auto-unlock this skill
        #[arg(long)]
        manual_lock: bool,
    },
    /// Edit fields of a skill
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        feedback: Option<String>,
        #[arg(long)]
        status: Option<SkillStatus>,
        /// Write the status without the level guard
        #[arg(long)]
        system: bool,
        #[arg(long)]
        manual_lock: Option<bool>,
        #[arg(long = "final")]
        is_final: Option<bool>,
        #[arg(long)]
        xp: Option<u32>,
    },
    /// Flip between available and mastered
    Toggle { id: Uuid },
    /// Swap with the neighbour above or below
    Move { id: Uuid, direction: Direction },
    /// Splice a new skill directly below an anchor
    Insert { anchor: Uuid, title: String },
    /// Delete a skill and rewire its dependents
    Delete { id: Uuid },
}

pub fn run(root: &Path, user: &str, subcmd: SkillSubcommand, json: bool) -> anyhow::Result<()> {
    let engine = open_engine(root)?;
    match subcmd {
        SkillSubcommand::List { container } => {
            let skills = engine.list_skills(user, container)?;
            if json {
                return print_json(&skills);
            }
            if skills.is_empty() {
                println!("No skills.");
                return Ok(());
            }
            print_skills(&skills);
            Ok(())
        }
        SkillSubcommand::Add {
            container,
            title,
            description,
            level,
            y,
            depends_on,
            is_final,
            manual_lock,
        } => {
            let new = NewSkill {
                description: description.unwrap_or_default(),
                level,
                y,
                dependencies: depends_on,
                is_final_node: is_final,
                manual_lock,
                ..NewSkill::titled(title)
            };
            let view = engine
                .create_skill(user, container, new)
                .context("failed to add skill")?;
            report(&view, "Added", json)
        }
        SkillSubcommand::Edit {
            id,
            title,
            description,
            feedback,
            status,
            system,
            manual_lock,
            is_final,
            xp,
        } => {
            let patch = SkillPatch {
                title,
                description,
                feedback,
                status,
                manual_lock,
                is_final_node: is_final,
                experience_points: xp,
                system,
                ..SkillPatch::default()
            };
            let view = engine.update_skill(user, id, patch)?;
            report(&view, "Updated", json)
        }
        SkillSubcommand::Toggle { id } => {
            let result = engine.toggle_status(user, id)?;
            if json {
                return print_json(&result);
            }
            match &result.outcome {
                ToggleOutcome::Unchanged { status } => println!("{id} is {status}; nothing to do"),
                ToggleOutcome::Rejected { reason, .. } => println!("Rejected: {reason}"),
                ToggleOutcome::Changed {
                    from,
                    to,
                    level_change,
                } => {
                    println!("{id}: {from} -> {to}");
                    match level_change {
                        Some(LevelChange::Opened { level, created, .. }) => {
                            let how = if *created { "generated" } else { "re-opened" };
                            println!("Level {level} {how}");
                        }
                        Some(LevelChange::Closed { level, relocked }) => {
                            println!(
                                "Closed levels above {level}; {} skill(s) relocked",
                                relocked.len()
                            );
                        }
                        None => {}
                    }
                }
            }
            Ok(())
        }
        SkillSubcommand::Move { id, direction } => {
            let moved = engine.move_skill(user, id, direction)?;
            if json {
                return print_json(&serde_json::json!({ "moved": moved }));
            }
            if moved {
                println!("Moved {id} {direction}");
            } else {
                println!("{id} is already at the {direction} edge of its level");
            }
            Ok(())
        }
        SkillSubcommand::Insert { anchor, title } => {
            let view = engine
                .insert_skill_below(user, anchor, &title)
                .with_context(|| format!("failed to insert below {anchor}"))?;
            report(&view, "Inserted", json)
        }
        SkillSubcommand::Delete { id } => {
            let removed = engine.delete_skill(user, id)?;
            if json {
                return print_json(&removed);
            }
            println!("Deleted {} from level {}", removed.id, removed.level);
            Ok(())
        }
    }
}

fn report(view: &SkillView, verb: &str, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(view);
    }
    println!("{verb} {}", view.id());
    print_skills(std::slice::from_ref(view));
    Ok(())
}
