pub mod container;
pub mod init;
pub mod level;
pub mod reconcile;
pub mod serve;
pub mod skill;

use anyhow::Context;
use skilltree_core::engine::Engine;
use std::path::Path;

/// Open the engine under `root`, pointing at `skilltree init` when missing.
pub(crate) fn open_engine(root: &Path) -> anyhow::Result<Engine> {
    Engine::open(root).with_context(|| format!("failed to open skilltree at {}", root.display()))
}
