use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SkillStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillStatus {
    Locked,
    Available,
    Mastered,
}

impl SkillStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillStatus::Locked => "locked",
            SkillStatus::Available => "available",
            SkillStatus::Mastered => "mastered",
        }
    }

    pub fn is_mastered(self) -> bool {
        matches!(self, SkillStatus::Mastered)
    }
}

impl fmt::Display for SkillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SkillStatus {
    type Err = crate::error::SkillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(SkillStatus::Locked),
            "available" => Ok(SkillStatus::Available),
            "mastered" => Ok(SkillStatus::Mastered),
            _ => Err(crate::error::SkillError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ContainerKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Area,
    Project,
    SkillRoot,
}

impl ContainerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Area => "area",
            ContainerKind::Project => "project",
            ContainerKind::SkillRoot => "skill_root",
        }
    }

    /// Areas and projects are owned directly; sub-tree roots borrow the
    /// owner of whatever they hang off.
    pub fn is_root(self) -> bool {
        !matches!(self, ContainerKind::SkillRoot)
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContainerKind {
    type Err = crate::error::SkillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "area" => Ok(ContainerKind::Area),
            "project" => Ok(ContainerKind::Project),
            "skill_root" | "skill-root" => Ok(ContainerKind::SkillRoot),
            _ => Err(crate::error::SkillError::InvalidKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Direction {
    type Err = crate::error::SkillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(crate::error::SkillError::InvalidDirection(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
