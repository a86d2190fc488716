use crate::error::{Result, SkillError};
use crate::skill;
use crate::tree::SkillTree;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DanglingDependency,
    SelfDependency,
    DanglingFinalNode,
    PositionOrder,
    DuplicatePosition,
    MissingLevel,
    CounterMismatch,
    WrongContainer,
}

impl IssueKind {
    /// Issues that make a structural edit unsafe. The rest are reported but
    /// the engine reads around them.
    pub fn blocks_edits(self) -> bool {
        matches!(
            self,
            IssueKind::DanglingDependency
                | IssueKind::SelfDependency
                | IssueKind::PositionOrder
                | IssueKind::DuplicatePosition
                | IssueKind::WrongContainer
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyIssue {
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub container: Uuid,
    pub consistent: bool,
    pub issues: Vec<ConsistencyIssue>,
}

impl SkillTree {
    /// Inspect the working set for anything an interrupted or out-of-band
    /// write could have left behind.
    pub fn check(&self) -> ConsistencyReport {
        let mut issues = Vec::new();
        let ids: HashSet<Uuid> = self.skills().iter().map(|s| s.id).collect();
        let home = self.container.container_ref();

        for s in self.skills() {
            if s.container != home {
                issues.push(issue(
                    IssueKind::WrongContainer,
                    Some(s.id),
                    format!("stored under {} but points at {:?}", self.id(), s.container),
                ));
            }
            for dep in &s.dependencies {
                if *dep == s.id {
                    issues.push(issue(
                        IssueKind::SelfDependency,
                        Some(s.id),
                        "depends on itself".to_string(),
                    ));
                } else if !ids.contains(dep) {
                    issues.push(issue(
                        IssueKind::DanglingDependency,
                        Some(s.id),
                        format!("depends on missing skill {dep}"),
                    ));
                }
            }
        }

        let levels: BTreeSet<u32> = self.skills().iter().map(|s| s.level).collect();
        for level in &levels {
            let members = skill::level_members(self.skills(), *level);
            for pair in members.windows(2) {
                if pair[0].y == pair[1].y {
                    issues.push(issue(
                        IssueKind::DuplicatePosition,
                        Some(pair[1].id),
                        format!("shares y={} with {} in level {level}", pair[1].y, pair[0].id),
                    ));
                }
            }
            for (i, s) in members.iter().enumerate() {
                let expected = i as u32 + 1;
                if s.level_position != expected {
                    issues.push(issue(
                        IssueKind::PositionOrder,
                        Some(s.id),
                        format!(
                            "level_position {} but rank {expected} by y in level {level}",
                            s.level_position
                        ),
                    ));
                }
            }
        }

        for (level, id) in &self.container.final_nodes {
            let valid = self.get(*id).map(|s| s.level == *level).unwrap_or(false);
            if !valid {
                issues.push(issue(
                    IssueKind::DanglingFinalNode,
                    Some(*id),
                    format!("final node of level {level} is not a skill of that level"),
                ));
            }
        }

        for level in 1..=self.container.unlocked_level {
            if !levels.contains(&level) {
                issues.push(issue(
                    IssueKind::MissingLevel,
                    None,
                    format!("level {level} is unlocked but has no skills"),
                ));
            }
        }

        if self.container.next_level_to_assign != self.container.unlocked_level {
            issues.push(issue(
                IssueKind::CounterMismatch,
                None,
                format!(
                    "next_level_to_assign {} differs from unlocked_level {}",
                    self.container.next_level_to_assign, self.container.unlocked_level
                ),
            ));
        }

        if !issues.is_empty() {
            tracing::warn!(container = %self.id(), issues = issues.len(), "container inconsistent");
        }
        ConsistencyReport {
            container: self.id(),
            consistent: issues.is_empty(),
            issues,
        }
    }

    /// Refuse structural edits on a container that needs a re-sync first.
    pub fn ensure_editable(&self) -> Result<()> {
        let report = self.check();
        match report.issues.iter().find(|i| i.kind.blocks_edits()) {
            Some(first) => Err(SkillError::Inconsistent {
                container: self.id(),
                reason: first.message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn issue(kind: IssueKind, skill: Option<Uuid>, message: String) -> ConsistencyIssue {
    ConsistencyIssue {
        kind,
        skill,
        message,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
