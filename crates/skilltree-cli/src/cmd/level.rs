use crate::cmd::open_engine;
use crate::output::{print_json, print_skills};
use clap::Subcommand;
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum LevelSubcommand {
    /// Generate a level, or re-open it if it already exists. Safe to repeat.
    Generate {
        /// Container id, or a parent skill id
        container: Uuid,
        level: u32,
        /// y of the first node (default: below everything stored)
        #[arg(long)]
        start_y: Option<i64>,
    },
}

pub fn run(root: &Path, user: &str, subcmd: LevelSubcommand, json: bool) -> anyhow::Result<()> {
    let engine = open_engine(root)?;
    match subcmd {
        LevelSubcommand::Generate {
            container,
            level,
            start_y,
        } => {
            let generated = engine.generate_level(user, container, level, start_y)?;
            if json {
                return print_json(&generated);
            }
            let how = if generated.created {
                "Generated"
            } else {
                "Re-opened"
            };
            println!(
                "{how} level {} (unlocked: {})",
                generated.level, generated.container.unlocked_level
            );
            print_skills(&generated.skills);
            Ok(())
        }
    }
}
