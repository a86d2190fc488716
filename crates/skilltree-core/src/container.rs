use crate::skill::ContainerRef;
use crate::types::ContainerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// LevelSubtitle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSubtitle {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// An area, a project, or the nested tree under a parent skill. For
/// `SkillRoot` containers `id` is the parent skill's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: Uuid,
    pub kind: ContainerKind,
    pub owner: String,
    #[serde(default)]
    pub title: String,
    pub unlocked_level: u32,
    pub next_level_to_assign: u32,
    #[serde(default)]
    pub level_subtitles: BTreeMap<u32, LevelSubtitle>,
    /// Explicit final node per level. One entry per level keeps "at most one
    /// final node per level" true by construction.
    #[serde(default)]
    pub final_nodes: BTreeMap<u32, Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Container {
    pub fn new(kind: ContainerKind, owner: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), kind, owner, title)
    }

    /// Container for the nested tree under `parent_skill`.
    pub fn subtree(parent_skill: Uuid, owner: impl Into<String>) -> Self {
        Self::with_id(parent_skill, ContainerKind::SkillRoot, owner, "")
    }

    fn with_id(
        id: Uuid,
        kind: ContainerKind,
        owner: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            owner: owner.into(),
            title: title.into(),
            unlocked_level: 0,
            next_level_to_assign: 0,
            level_subtitles: BTreeMap::new(),
            final_nodes: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn container_ref(&self) -> ContainerRef {
        ContainerRef::new(self.kind, self.id)
    }

    pub fn final_node(&self, level: u32) -> Option<Uuid> {
        self.final_nodes.get(&level).copied()
    }

    /// Designate `skill` as the final node of `level`, replacing any
    /// previous designation.
    pub fn set_final_node(&mut self, level: u32, skill: Uuid) {
        self.final_nodes.insert(level, skill);
        self.updated_at = Utc::now();
    }

    /// Remove the designation for `level`. Returns the id that held it.
    pub fn clear_final_node(&mut self, level: u32) -> Option<Uuid> {
        let prev = self.final_nodes.remove(&level);
        if prev.is_some() {
            self.updated_at = Utc::now();
        }
        prev
    }

    pub fn set_subtitle(
        &mut self,
        level: u32,
        label: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.level_subtitles.insert(
            level,
            LevelSubtitle {
                label: label.into(),
                description: description.into(),
            },
        );
        self.updated_at = Utc::now();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
