//! In-memory working set for one container.
//!
//! Every engine operation loads a `SkillTree` (the container plus all of its
//! skills), mutates it through the methods in `level`, `status`, `unlock`,
//! `edit` and `graph`, and hands the result to `SkillDb::commit` as a single
//! write transaction. The tree records which skills were written or removed
//! so a commit only touches what changed.

use crate::container::Container;
use crate::error::{Result, SkillError};
use crate::skill::{self, Skill, SkillView, Y_STEP};
use crate::store::Batch;
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SkillTree {
    pub container: Container,
    skills: Vec<Skill>,
    dirty: BTreeSet<Uuid>,
    removed: Vec<Skill>,
    container_dirty: bool,
}

impl SkillTree {
    /// Wrap a persisted container and its skills.
    pub fn new(container: Container, skills: Vec<Skill>) -> Self {
        Self {
            container,
            skills,
            dirty: BTreeSet::new(),
            removed: Vec::new(),
            container_dirty: false,
        }
    }

    /// Wrap a container that has not been written yet.
    pub fn fresh(container: Container) -> Self {
        let mut tree = Self::new(container, Vec::new());
        tree.container_dirty = true;
        tree
    }

    pub fn id(&self) -> Uuid {
        self.container.id
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn get(&self, id: Uuid) -> Result<&Skill> {
        skill::find(&self.skills, id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.skills.iter().any(|s| s.id == id)
    }

    /// Mutable access; the skill is written on commit.
    pub(crate) fn get_mut(&mut self, id: Uuid) -> Result<&mut Skill> {
        let skill = skill::find_mut(&mut self.skills, id)?;
        self.dirty.insert(id);
        Ok(skill)
    }

    pub(crate) fn push(&mut self, skill: Skill) {
        self.dirty.insert(skill.id);
        self.skills.push(skill);
    }

    /// Remove a skill from the working set; it is deleted on commit.
    pub(crate) fn take(&mut self, id: Uuid) -> Result<Skill> {
        let idx = self
            .skills
            .iter()
            .position(|s| s.id == id)
            .ok_or(SkillError::SkillNotFound(id))?;
        let skill = self.skills.remove(idx);
        self.dirty.remove(&id);
        self.removed.push(skill.clone());
        Ok(skill)
    }

    pub(crate) fn container_mut(&mut self) -> &mut Container {
        self.container_dirty = true;
        &mut self.container
    }

    // ---------------------------------------------------------------------------
    // Level queries
    // ---------------------------------------------------------------------------

    /// Ids of the skills in `level`, ordered by ascending `y`.
    pub fn level_ids(&self, level: u32) -> Vec<Uuid> {
        skill::level_members(&self.skills, level)
            .into_iter()
            .map(|s| s.id)
            .collect()
    }

    pub fn is_final(&self, id: Uuid) -> bool {
        self.get(id)
            .map(|s| self.container.final_node(s.level) == Some(id))
            .unwrap_or(false)
    }

    /// The node whose mastery opens the next level: the designated final
    /// node when it is present in the level, otherwise the highest-`y` node.
    pub fn gating_node(&self, level: u32) -> Option<Uuid> {
        if let Some(id) = self.container.final_node(level) {
            if self.get(id).map(|s| s.level == level).unwrap_or(false) {
                return Some(id);
            }
        }
        self.level_ids(level).last().copied()
    }

    pub fn max_y(&self) -> Option<i64> {
        skill::max_y(&self.skills)
    }

    /// Where a level appended after everything currently stored starts.
    pub fn next_level_start_y(&self, default: i64) -> i64 {
        self.max_y().map(|y| y + 2 * Y_STEP).unwrap_or(default)
    }

    // ---------------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------------

    pub fn view(&self, id: Uuid) -> Result<SkillView> {
        let skill = self.get(id)?.clone();
        let is_final_node = self.container.final_node(skill.level) == Some(id);
        Ok(SkillView {
            skill,
            is_final_node,
        })
    }

    /// Skills of unlocked levels, ordered by level then `y`. Nodes of
    /// levels above `unlocked_level` stay in storage but are never shown.
    pub fn visible(&self) -> Vec<SkillView> {
        self.visible_through(self.container.unlocked_level)
    }

    pub fn visible_through(&self, level: u32) -> Vec<SkillView> {
        let mut shown: Vec<&Skill> = self.skills.iter().filter(|s| s.level <= level).collect();
        shown.sort_by(|a, b| a.level.cmp(&b.level).then(a.y.cmp(&b.y)));
        shown
            .into_iter()
            .map(|s| SkillView {
                skill: s.clone(),
                is_final_node: self.container.final_node(s.level) == Some(s.id),
            })
            .collect()
    }

    // ---------------------------------------------------------------------------
    // Commit
    // ---------------------------------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        self.container_dirty || !self.dirty.is_empty() || !self.removed.is_empty()
    }

    pub fn into_batch(self) -> Batch {
        let mut batch = Batch::default();
        if self.container_dirty {
            batch.containers.push(self.container);
        }
        batch.skills = self
            .skills
            .into_iter()
            .filter(|s| self.dirty.contains(&s.id))
            .collect();
        batch.removed_skills = self.removed;
        batch
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
