use crate::error::{Result, SkillError};
use crate::skill::{NewSkill, Skill, SkillPatch, LEVEL_SIZE, Y_STEP};
use crate::tree::SkillTree;
use crate::types::SkillStatus;
use uuid::Uuid;

impl SkillTree {
    /// Create one skill without shifting anything. Capped at `LEVEL_SIZE`
    /// skills per level; positional inserts go through `insert_below`.
    pub fn add_skill(&mut self, new: NewSkill, default_start_y: i64, lane_x: i64) -> Result<Uuid> {
        let level = new
            .level
            .unwrap_or_else(|| self.container.unlocked_level.max(1));
        if level == 0 {
            return Err(SkillError::InvalidLevel(level));
        }

        let members = self.level_ids(level);
        if members.len() >= LEVEL_SIZE {
            return Err(SkillError::LevelFull {
                level,
                max: LEVEL_SIZE,
            });
        }

        let y = match new.y {
            Some(y) => y,
            None => match members.last() {
                Some(last) => self.get(*last)?.y + Y_STEP,
                None => self.next_level_start_y(default_start_y),
            },
        };
        if members
            .iter()
            .any(|id| self.get(*id).map(|s| s.y == y).unwrap_or(false))
        {
            return Err(SkillError::PositionTaken { level, y });
        }
        self.check_dependencies(None, &new.dependencies)?;

        let mut skill = Skill::new(self.container.container_ref(), level, y);
        skill.title = new.title;
        skill.description = new.description;
        skill.feedback = new.feedback;
        skill.x = new.x.unwrap_or(lane_x);
        skill.status = new.status.unwrap_or(SkillStatus::Locked);
        skill.dependencies = new.dependencies;
        skill.manual_lock = new.manual_lock;
        skill.experience_points = new.experience_points;
        let id = skill.id;
        self.push(skill);
        self.renumber_level(level);

        if new.is_final_node {
            self.container_mut().set_final_node(level, id);
        }
        // The first node of an empty sub-tree makes level 1 exist.
        if self.container.unlocked_level == 0 && level == 1 {
            let container = self.container_mut();
            container.unlocked_level = 1;
            container.next_level_to_assign = 1;
        }
        Ok(id)
    }

    /// Apply a partial update. A status change from the user goes through
    /// the transition machine and fails with `GuardRejected` when refused;
    /// `patch.system` writes it directly.
    pub fn apply_patch(&mut self, id: Uuid, patch: SkillPatch, lane_x: i64) -> Result<()> {
        let level = self.get(id)?.level;

        if let Some(deps) = &patch.dependencies {
            self.check_dependencies(Some(id), deps)?;
        }

        {
            let skill = self.get_mut(id)?;
            if let Some(title) = patch.title {
                skill.title = title;
            }
            if let Some(description) = patch.description {
                skill.description = description;
            }
            if let Some(feedback) = patch.feedback {
                skill.feedback = feedback;
            }
            if let Some(manual_lock) = patch.manual_lock {
                skill.manual_lock = manual_lock;
            }
            if let Some(xp) = patch.experience_points {
                skill.experience_points = xp;
            }
            if let Some(x) = patch.x {
                skill.x = x;
            }
            if let Some(deps) = patch.dependencies {
                skill.dependencies = deps;
            }
            skill.touch();
        }

        match patch.is_final_node {
            Some(true) => self.container_mut().set_final_node(level, id),
            Some(false) if self.container.final_node(level) == Some(id) => {
                self.container_mut().clear_final_node(level);
            }
            _ => {}
        }

        if let Some(target) = patch.status {
            let current = self.get(id)?.status;
            if target != current {
                if patch.system {
                    self.force_status(id, target)?;
                } else {
                    match (current, target) {
                        (SkillStatus::Available, SkillStatus::Mastered)
                        | (SkillStatus::Mastered, SkillStatus::Available) => {
                            let outcome = self.toggle_status(id, lane_x)?;
                            if let crate::status::ToggleOutcome::Rejected { reason, .. } = outcome {
                                return Err(SkillError::GuardRejected(reason));
                            }
                        }
                        _ => {
                            return Err(SkillError::GuardRejected(format!(
                                "a skill cannot go from {current} to {target} directly"
                            )))
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Reassign `level_position` 1..n in `y` order.
    pub(crate) fn renumber_level(&mut self, level: u32) {
        for (i, id) in self.level_ids(level).into_iter().enumerate() {
            let position = i as u32 + 1;
            if self.get(id).map(|s| s.level_position != position).unwrap_or(false) {
                if let Ok(skill) = self.get_mut(id) {
                    skill.level_position = position;
                }
            }
        }
    }

    fn check_dependencies(&self, owner: Option<Uuid>, deps: &[Uuid]) -> Result<()> {
        for dep in deps {
            if Some(*dep) == owner || !self.contains(*dep) {
                return Err(SkillError::DependencyNotFound(*dep));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
