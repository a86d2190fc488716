mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{container::ContainerSubcommand, level::LevelSubcommand, skill::SkillSubcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "skilltree",
    about = "Level-gated skill trees for areas and projects",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: nearest directory holding .skilltree/)
    #[arg(long, global = true, env = "SKILLTREE_ROOT")]
    root: Option<PathBuf>,

    /// Identity that owns the containers you touch
    #[arg(long, global = true, env = "SKILLTREE_USER", default_value = "local")]
    user: String,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .skilltree/ with a default config and an empty database
    Init,

    /// Manage areas and projects
    Container {
        #[command(subcommand)]
        subcommand: ContainerSubcommand,
    },

    /// Manage skills inside a container
    Skill {
        #[command(subcommand)]
        subcommand: SkillSubcommand,
    },

    /// Generate or re-open levels
    Level {
        #[command(subcommand)]
        subcommand: LevelSubcommand,
    },

    /// Promote locked skills whose dependencies are mastered
    Reconcile {
        /// Container to reconcile (omit for every container)
        container: Option<Uuid>,
    },

    /// Report anything that needs a re-sync before editing
    Check { container: Uuid },

    /// Serve the HTTP API
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let user = cli.user.as_str();

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Container { subcommand } => cmd::container::run(&root, user, subcommand, cli.json),
        Commands::Skill { subcommand } => cmd::skill::run(&root, user, subcommand, cli.json),
        Commands::Level { subcommand } => cmd::level::run(&root, user, subcommand, cli.json),
        Commands::Reconcile { container } => cmd::reconcile::run(&root, user, container, cli.json),
        Commands::Check { container } => cmd::reconcile::check(&root, user, container, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
