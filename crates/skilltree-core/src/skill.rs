use crate::error::{Result, SkillError};
use crate::types::{ContainerKind, SkillStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vertical distance between consecutive nodes of a level.
pub const Y_STEP: i64 = 150;

/// Number of nodes in a generated level, and the cap for non-positional
/// creation.
pub const LEVEL_SIZE: usize = 5;

/// Title of the pre-mastered first node of level 1.
pub const START_MARKER_TITLE: &str = "Start";

// ---------------------------------------------------------------------------
// ContainerRef
// ---------------------------------------------------------------------------

/// The one container a skill belongs to. `Skill(id)` means the skill hangs
/// in the nested tree rooted at the parent skill `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ContainerRef {
    Area(Uuid),
    Project(Uuid),
    Skill(Uuid),
}

impl ContainerRef {
    pub fn new(kind: ContainerKind, id: Uuid) -> Self {
        match kind {
            ContainerKind::Area => ContainerRef::Area(id),
            ContainerKind::Project => ContainerRef::Project(id),
            ContainerKind::SkillRoot => ContainerRef::Skill(id),
        }
    }

    pub fn id(self) -> Uuid {
        match self {
            ContainerRef::Area(id) | ContainerRef::Project(id) | ContainerRef::Skill(id) => id,
        }
    }

    pub fn kind(self) -> ContainerKind {
        match self {
            ContainerRef::Area(_) => ContainerKind::Area,
            ContainerRef::Project(_) => ContainerKind::Project,
            ContainerRef::Skill(_) => ContainerKind::SkillRoot,
        }
    }
}

// ---------------------------------------------------------------------------
// Skill
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: Uuid,
    pub container: ContainerRef,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub feedback: String,
    pub status: SkillStatus,
    #[serde(default)]
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
    #[serde(default)]
    pub manual_lock: bool,
    pub level: u32,
    pub level_position: u32,
    #[serde(default)]
    pub experience_points: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Skill {
    pub fn new(container: ContainerRef, level: u32, y: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            container,
            title: String::new(),
            description: String::new(),
            feedback: String::new(),
            status: SkillStatus::Locked,
            x: 0,
            y,
            dependencies: Vec::new(),
            manual_lock: false,
            level,
            level_position: 1,
            experience_points: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn depends_on(&self, id: Uuid) -> bool {
        self.dependencies.contains(&id)
    }
}

// ---------------------------------------------------------------------------
// SkillView
// ---------------------------------------------------------------------------

/// A skill as handed to callers: the stored record plus the final-node flag,
/// which lives on the container rather than on the skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillView {
    #[serde(flatten)]
    pub skill: Skill,
    pub is_final_node: bool,
}

impl SkillView {
    pub fn id(&self) -> Uuid {
        self.skill.id
    }
}

/// Append `incoming` views to `visible`, skipping ids already present.
/// Returns how many were added.
pub fn merge_new(visible: &mut Vec<SkillView>, incoming: impl IntoIterator<Item = SkillView>) -> usize {
    let mut added = 0;
    for view in incoming {
        if visible.iter().any(|v| v.id() == view.id()) {
            continue;
        }
        visible.push(view);
        added += 1;
    }
    added
}

// ---------------------------------------------------------------------------
// Creation / patch payloads
// ---------------------------------------------------------------------------

/// Fields for a non-positional skill creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSkill {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub feedback: String,
    /// Defaults to the container's highest unlocked level.
    #[serde(default)]
    pub level: Option<u32>,
    /// Defaults to one step below the lowest node of the level.
    #[serde(default)]
    pub y: Option<i64>,
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub status: Option<SkillStatus>,
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
    #[serde(default)]
    pub manual_lock: bool,
    #[serde(default)]
    pub is_final_node: bool,
    #[serde(default)]
    pub experience_points: u32,
}

impl NewSkill {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub status: Option<SkillStatus>,
    #[serde(default)]
    pub manual_lock: Option<bool>,
    #[serde(default)]
    pub is_final_node: Option<bool>,
    #[serde(default)]
    pub experience_points: Option<u32>,
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub dependencies: Option<Vec<Uuid>>,
    /// Status changes bypass the transition guard when set (cascading
    /// completion driven by the system rather than the user).
    #[serde(default)]
    pub system: bool,
}

// ---------------------------------------------------------------------------
// Skill list helpers
// ---------------------------------------------------------------------------

/// Skills of `level`, ordered by ascending `y`.
pub fn level_members(skills: &[Skill], level: u32) -> Vec<&Skill> {
    let mut members: Vec<&Skill> = skills.iter().filter(|s| s.level == level).collect();
    members.sort_by_key(|s| s.y);
    members
}

pub fn max_y(skills: &[Skill]) -> Option<i64> {
    skills.iter().map(|s| s.y).max()
}

pub fn find(skills: &[Skill], id: Uuid) -> Result<&Skill> {
    skills
        .iter()
        .find(|s| s.id == id)
        .ok_or(SkillError::SkillNotFound(id))
}

pub fn find_mut(skills: &mut [Skill], id: Uuid) -> Result<&mut Skill> {
    skills
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or(SkillError::SkillNotFound(id))
}

/// Human-readable summary: "3/5 mastered, 1 available, 1 locked"
pub fn summarize(skills: &[Skill]) -> String {
    let total = skills.len();
    let mastered = skills.iter().filter(|s| s.status.is_mastered()).count();
    let available = skills
        .iter()
        .filter(|s| matches!(s.status, SkillStatus::Available))
        .count();
    let locked = total - mastered - available;
    format!("{mastered}/{total} mastered, {available} available, {locked} locked")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> ContainerRef {
        ContainerRef::Area(Uuid::new_v4())
    }

    #[test]
    fn new_skill_starts_locked() {
        let s = Skill::new(area(), 1, 100);
        assert_eq!(s.status, SkillStatus::Locked);
        assert!(s.dependencies.is_empty());
        assert!(!s.manual_lock);
    }

    #[test]
    fn container_ref_serializes_tagged() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(ContainerRef::Skill(id)).unwrap();
        assert_eq!(json["kind"], "skill");
        assert_eq!(json["id"], id.to_string());
        assert_eq!(ContainerRef::Skill(id).kind(), ContainerKind::SkillRoot);
    }

    #[test]
    fn view_flattens_skill_fields() {
        let s = Skill::new(area(), 2, 400);
        let view = SkillView {
            skill: s.clone(),
            is_final_node: true,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["level"], 2);
        assert_eq!(json["y"], 400);
        assert_eq!(json["is_final_node"], true);
        let back: SkillView = serde_json::from_value(json).unwrap();
        assert_eq!(back.skill.id, s.id);
    }

    #[test]
    fn level_members_sorted_by_y() {
        let c = area();
        let skills = vec![
            Skill::new(c, 1, 400),
            Skill::new(c, 2, 50),
            Skill::new(c, 1, 100),
        ];
        let ys: Vec<i64> = level_members(&skills, 1).iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![100, 400]);
    }

    #[test]
    fn merge_new_skips_present_ids() {
        let c = area();
        let a = SkillView {
            skill: Skill::new(c, 1, 100),
            is_final_node: false,
        };
        let b = SkillView {
            skill: Skill::new(c, 1, 250),
            is_final_node: false,
        };
        let mut visible = vec![a.clone()];
        let added = merge_new(&mut visible, vec![a, b.clone(), b]);
        assert_eq!(added, 1);
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn summarize_counts_statuses() {
        let c = area();
        let mut skills = vec![Skill::new(c, 1, 100), Skill::new(c, 1, 250)];
        skills[0].status = SkillStatus::Mastered;
        assert_eq!(summarize(&skills), "1/2 mastered, 0 available, 1 locked");
    }

    #[test]
    fn find_missing_is_error() {
        let skills: Vec<Skill> = Vec::new();
        assert!(matches!(
            find(&skills, Uuid::nil()),
            Err(SkillError::SkillNotFound(_))
        ));
    }
}
