use crate::error::{Result, SkillError};
use crate::skill::{Skill, LEVEL_SIZE, START_MARKER_TITLE, Y_STEP};
use crate::tree::SkillTree;
use crate::types::SkillStatus;
use serde::Serialize;
use uuid::Uuid;

/// Result of `SkillTree::generate_level`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelBatch {
    pub level: u32,
    /// `false` when the level already existed and nothing was inserted.
    pub created: bool,
    /// Ids of the level's nodes, ordered by `y`.
    pub skills: Vec<Uuid>,
}

impl SkillTree {
    /// Make sure `level` exists and is unlocked.
    ///
    /// When the level already has nodes this only advances the counters and,
    /// for levels past the first, re-marks the lowest node as the mastered,
    /// untitled continuation marker. Otherwise it appends a chain of
    /// `LEVEL_SIZE` nodes starting at `start_y`. Calling it twice returns the
    /// same ids both times. Levels open one at a time: anything past
    /// `unlocked_level + 1` is `InvalidLevel`.
    pub fn generate_level(&mut self, level: u32, start_y: i64, lane_x: i64) -> Result<LevelBatch> {
        if level == 0 || level > self.container.unlocked_level + 1 {
            return Err(SkillError::InvalidLevel(level));
        }

        let existing = self.level_ids(level);
        let created = existing.is_empty();
        let skills = if created {
            self.append_level(level, start_y, lane_x)
        } else {
            if level >= 2 {
                let first = existing[0];
                let marker = self.get(first)?;
                if !marker.status.is_mastered() || !marker.title.is_empty() {
                    let marker = self.get_mut(first)?;
                    marker.status = SkillStatus::Mastered;
                    marker.title.clear();
                    marker.touch();
                }
            }
            existing
        };

        self.advance_to(level);
        Ok(LevelBatch {
            level,
            created,
            skills,
        })
    }

    fn append_level(&mut self, level: u32, start_y: i64, lane_x: i64) -> Vec<Uuid> {
        let container = self.container.container_ref();
        let mut ids = Vec::with_capacity(LEVEL_SIZE);
        let mut prev: Option<Uuid> = None;

        for i in 0..LEVEL_SIZE {
            let mut node = Skill::new(container, level, start_y + Y_STEP * i as i64);
            node.x = lane_x;
            node.level_position = i as u32 + 1;
            node.status = match i {
                0 => SkillStatus::Mastered,
                1 => SkillStatus::Available,
                _ => SkillStatus::Locked,
            };
            if i == 0 && level == 1 {
                node.title = START_MARKER_TITLE.to_string();
            }
            if let Some(p) = prev {
                node.dependencies.push(p);
            }
            prev = Some(node.id);
            ids.push(node.id);
            self.push(node);
        }

        tracing::info!(container = %self.id(), level, start_y, "generated level");
        ids
    }

    fn advance_to(&mut self, level: u32) {
        if self.container.unlocked_level < level || self.container.next_level_to_assign < level {
            let container = self.container_mut();
            container.unlocked_level = container.unlocked_level.max(level);
            container.next_level_to_assign = container.next_level_to_assign.max(level);
            container.touch();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
