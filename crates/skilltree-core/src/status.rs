use crate::error::Result;
use crate::tree::SkillTree;
use crate::types::SkillStatus;
use serde::Serialize;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelChange {
    /// The gating node was mastered and `level` is now playable.
    Opened {
        level: u32,
        created: bool,
        skills: Vec<Uuid>,
    },
    /// The gating node was reverted; everything above `level` was relocked.
    Closed { level: u32, relocked: Vec<Uuid> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// Locked skills do not toggle.
    Unchanged { status: SkillStatus },
    /// The guard refused the transition. Nothing was written.
    Rejected { status: SkillStatus, reason: String },
    Changed {
        from: SkillStatus,
        to: SkillStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        level_change: Option<LevelChange>,
    },
}

impl ToggleOutcome {
    /// The skill's status after the toggle.
    pub fn status(&self) -> SkillStatus {
        match self {
            ToggleOutcome::Unchanged { status } | ToggleOutcome::Rejected { status, .. } => *status,
            ToggleOutcome::Changed { to, .. } => *to,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ToggleOutcome::Rejected { .. })
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

impl SkillTree {
    /// Flip a skill between available and mastered.
    ///
    /// Mastering the level's gating node requires every sibling to be
    /// mastered and opens the next level (appended below the lowest stored
    /// node). Reverting the gating node closes everything above its level.
    pub fn toggle_status(&mut self, id: Uuid, lane_x: i64) -> Result<ToggleOutcome> {
        let skill = self.get(id)?;
        let level = skill.level;
        let from = skill.status;

        if from == SkillStatus::Locked {
            return Ok(ToggleOutcome::Unchanged { status: from });
        }

        let gating = self.gating_node(level) == Some(id);
        let visible = level <= self.container.unlocked_level;
        match from {
            SkillStatus::Available => {
                if !visible {
                    return Ok(ToggleOutcome::Rejected {
                        status: from,
                        reason: format!("level {level} is not unlocked"),
                    });
                }
                if gating {
                    if let Some(reason) = self.unmastered_siblings(id, level) {
                        return Ok(ToggleOutcome::Rejected {
                            status: from,
                            reason,
                        });
                    }
                }
                self.write_status(id, SkillStatus::Mastered)?;

                let level_change = if gating {
                    let start_y = self.next_level_start_y(0);
                    let batch = self.generate_level(level + 1, start_y, lane_x)?;
                    tracing::info!(container = %self.id(), level = level + 1, "level opened");
                    Some(LevelChange::Opened {
                        level: batch.level,
                        created: batch.created,
                        skills: batch.skills,
                    })
                } else {
                    None
                };

                Ok(ToggleOutcome::Changed {
                    from,
                    to: SkillStatus::Mastered,
                    level_change,
                })
            }
            _ => {
                self.write_status(id, SkillStatus::Available)?;
                // A hidden level has nothing open above it to close.
                let level_change = if gating && visible {
                    Some(self.close_above(level))
                } else {
                    None
                };
                Ok(ToggleOutcome::Changed {
                    from,
                    to: SkillStatus::Available,
                    level_change,
                })
            }
        }
    }

    /// Write `status` without any guard or level side effects.
    pub fn force_status(&mut self, id: Uuid, status: SkillStatus) -> Result<()> {
        if self.get(id)?.status != status {
            self.write_status(id, status)?;
        }
        Ok(())
    }

    fn write_status(&mut self, id: Uuid, status: SkillStatus) -> Result<()> {
        let skill = self.get_mut(id)?;
        skill.status = status;
        skill.touch();
        Ok(())
    }

    fn unmastered_siblings(&self, id: Uuid, level: u32) -> Option<String> {
        let siblings: Vec<_> = self
            .skills()
            .iter()
            .filter(|s| s.level == level && s.id != id)
            .collect();
        let open = siblings.iter().filter(|s| !s.status.is_mastered()).count();
        if open == 0 {
            None
        } else {
            Some(format!(
                "{open} of {} sibling skills in level {level} are not mastered yet",
                siblings.len()
            ))
        }
    }

    /// Roll the container back to `level`: counters reset and every node
    /// above it returns to locked.
    pub(crate) fn close_above(&mut self, level: u32) -> LevelChange {
        {
            let container = self.container_mut();
            container.unlocked_level = level;
            container.next_level_to_assign = level;
            container.touch();
        }

        let relock: Vec<Uuid> = self
            .skills()
            .iter()
            .filter(|s| s.level > level && s.status != SkillStatus::Locked)
            .map(|s| s.id)
            .collect();
        for id in &relock {
            if let Ok(skill) = self.get_mut(*id) {
                skill.status = SkillStatus::Locked;
                skill.touch();
            }
        }

        tracing::info!(container = %self.id(), level, relocked = relock.len(), "level closed");
        LevelChange::Closed {
            level,
            relocked: relock,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
