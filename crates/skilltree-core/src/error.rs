use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("not initialized: run 'skilltree init'")]
    NotInitialized,

    #[error("container not found: {0}")]
    ContainerNotFound(Uuid),

    #[error("skill not found: {0}")]
    SkillNotFound(Uuid),

    #[error("dependency not found: {0}")]
    DependencyNotFound(Uuid),

    #[error("caller '{caller}' does not own container {container}")]
    NotOwner { caller: String, container: Uuid },

    #[error("level {level} already holds {max} skills")]
    LevelFull { level: u32, max: usize },

    #[error("position y={y} is already taken in level {level}")]
    PositionTaken { level: u32, y: i64 },

    #[error("rejected: {0}")]
    GuardRejected(String),

    #[error("container {container} may be inconsistent, re-sync before editing: {reason}")]
    Inconsistent { container: Uuid, reason: String },

    #[error("sub-tree nesting under {0} exceeds the configured depth")]
    SubtreeTooDeep(Uuid),

    #[error("invalid level: {0}")]
    InvalidLevel(u32),

    #[error("invalid container kind: {0}")]
    InvalidKind(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    #[error("database error: {0}")]
    Db(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkillError>;
