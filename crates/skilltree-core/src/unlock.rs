use crate::tree::SkillTree;
use crate::types::SkillStatus;
use std::collections::HashSet;
use uuid::Uuid;

impl SkillTree {
    /// Promote every locked skill whose dependencies are all mastered.
    ///
    /// Candidates must not be manually locked and must sit in an unlocked
    /// level. A dependency id that does not resolve counts as not mastered.
    /// Readiness is decided against the state before the pass, so the
    /// result does not depend on iteration order and a second pass is a
    /// no-op. Returns the promoted ids.
    pub fn propagate(&mut self) -> Vec<Uuid> {
        let mastered: HashSet<Uuid> = self
            .skills()
            .iter()
            .filter(|s| s.status.is_mastered())
            .map(|s| s.id)
            .collect();
        let unlocked = self.container.unlocked_level;

        let ready: Vec<Uuid> = self
            .skills()
            .iter()
            .filter(|s| {
                s.status == SkillStatus::Locked
                    && !s.manual_lock
                    && s.level <= unlocked
                    && s.dependencies.iter().all(|d| mastered.contains(d))
            })
            .map(|s| s.id)
            .collect();

        for id in &ready {
            if let Ok(skill) = self.get_mut(*id) {
                skill.status = SkillStatus::Available;
                skill.touch();
            }
        }

        if !ready.is_empty() {
            tracing::debug!(container = %self.id(), promoted = ready.len(), "auto-unlock");
        }
        ready
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
