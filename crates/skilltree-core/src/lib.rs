pub mod config;
pub mod consistency;
pub mod container;
pub mod edit;
pub mod engine;
pub mod error;
pub mod graph;
pub mod io;
pub mod level;
pub mod paths;
pub mod skill;
pub mod status;
pub mod store;
pub mod tree;
pub mod types;
pub mod unlock;

pub use error::{Result, SkillError};
