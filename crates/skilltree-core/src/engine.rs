//! The operation set exposed to the CLI and the HTTP server.
//!
//! Every call names a caller identity. Ownership is checked against the
//! Area or Project at the top of the container chain; sub-tree roots are
//! resolved by walking parent skills upward, at most `max_subtree_depth`
//! hops. Mutations load one `SkillTree`, edit it in memory, and commit it
//! as a single redb write transaction while holding the engine's write
//! lock, so reads-then-writes never interleave.

use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::consistency::ConsistencyReport;
use crate::container::Container;
use crate::error::{Result, SkillError};
use crate::level::LevelBatch;
use crate::paths;
use crate::skill::{merge_new, NewSkill, Skill, SkillPatch, SkillView};
use crate::status::{LevelChange, ToggleOutcome};
use crate::store::SkillDb;
use crate::tree::SkillTree;
use crate::types::{ContainerKind, Direction};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Returned by `Engine::generate_level`.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedLevel {
    pub container: Container,
    pub level: u32,
    pub created: bool,
    pub skills: Vec<SkillView>,
}

/// Returned by `Engine::toggle_status`: the outcome plus the visible skill
/// set after it, with any newly opened level merged in.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleResult {
    #[serde(flatten)]
    pub outcome: ToggleOutcome,
    pub skills: Vec<SkillView>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    db: SkillDb,
    config: Config,
    write_lock: Mutex<()>,
}

impl Engine {
    /// Open the engine of an initialized root.
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        let db = SkillDb::open(&paths::db_path(root))?;
        Ok(Self::with_parts(db, config))
    }

    /// Create `.skilltree/` with a default config if needed, then open it.
    pub fn init(root: &Path) -> Result<Self> {
        crate::io::ensure_dir(&paths::skilltree_dir(root))?;
        if !paths::config_path(root).exists() {
            Config::default().save(root)?;
            tracing::info!(root = %root.display(), "initialized skilltree");
        }
        Self::open(root)
    }

    pub fn with_parts(db: SkillDb, config: Config) -> Self {
        Self {
            db,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Containers
    // -----------------------------------------------------------------------

    /// Create an Area or Project and generate its first level.
    pub fn create_container(
        &self,
        caller: &str,
        kind: ContainerKind,
        title: &str,
    ) -> Result<(Container, Vec<SkillView>)> {
        if !kind.is_root() {
            return Err(SkillError::InvalidKind(kind.to_string()));
        }
        let _guard = self.lock();
        let mut tree = SkillTree::fresh(Container::new(kind, caller, title));
        tree.generate_level(1, self.config.start_y, self.config.lane_x)?;
        let container = tree.container.clone();
        let skills = tree.visible();
        self.db.commit(tree.into_batch())?;
        tracing::info!(container = %container.id, %kind, "created container");
        Ok((container, skills))
    }

    /// The caller's containers, oldest first. Without a filter only areas
    /// and projects are listed.
    pub fn list_containers(
        &self,
        caller: &str,
        kind: Option<ContainerKind>,
    ) -> Result<Vec<Container>> {
        let all = self.db.list_containers()?;
        Ok(all
            .into_iter()
            .filter(|c| c.owner == caller)
            .filter(|c| match kind {
                Some(k) => c.kind == k,
                None => c.kind.is_root(),
            })
            .collect())
    }

    pub fn get_container(&self, caller: &str, id: Uuid) -> Result<Container> {
        let container = self.db.get_container(id)?;
        self.authorize(caller, &container)?;
        Ok(container)
    }

    /// Delete a container, its skills and every sub-tree nested below them.
    /// Returns how many containers were removed.
    pub fn delete_container(&self, caller: &str, id: Uuid) -> Result<usize> {
        let _guard = self.lock();
        let container = self.db.get_container(id)?;
        self.authorize(caller, &container)?;

        let mut removed = vec![id];
        let skill_ids: Vec<Uuid> = self.db.list_skills(id)?.iter().map(|s| s.id).collect();
        removed.extend(self.nested_containers(skill_ids)?);
        let count = removed.len();

        self.db.commit(crate::store::Batch {
            removed_containers: removed,
            ..Default::default()
        })?;
        tracing::info!(container = %id, removed = count, "deleted container");
        Ok(count)
    }

    pub fn set_level_subtitle(
        &self,
        caller: &str,
        id: Uuid,
        level: u32,
        label: &str,
        description: &str,
    ) -> Result<Container> {
        if level == 0 {
            return Err(SkillError::InvalidLevel(level));
        }
        let _guard = self.lock();
        let mut container = self.db.get_container(id)?;
        self.authorize(caller, &container)?;
        container.set_subtitle(level, label, description);
        self.db.commit(crate::store::Batch {
            containers: vec![container.clone()],
            ..Default::default()
        })?;
        Ok(container)
    }

    // -----------------------------------------------------------------------
    // Skills
    // -----------------------------------------------------------------------

    /// Skills of the unlocked levels of `target` (a container id, or the id
    /// of a parent skill). Runs a reconciliation pass first.
    pub fn list_skills(&self, caller: &str, target: Uuid) -> Result<Vec<SkillView>> {
        let _guard = self.lock();
        let (mut tree, fresh) = self.resolve_target(caller, target)?;
        if fresh {
            return Ok(Vec::new());
        }
        let promoted = tree.propagate();
        let views = tree.visible();
        if !promoted.is_empty() {
            self.db.commit(tree.into_batch())?;
        }
        Ok(views)
    }

    /// Non-positional creation in `target` (a container id, or a parent
    /// skill id whose sub-tree is created on first use).
    pub fn create_skill(&self, caller: &str, target: Uuid, new: NewSkill) -> Result<SkillView> {
        let _guard = self.lock();
        let (mut tree, _) = self.resolve_target(caller, target)?;
        let id = tree.add_skill(new, self.config.start_y, self.config.lane_x)?;
        let view = tree.view(id)?;
        self.db.commit(tree.into_batch())?;
        Ok(view)
    }

    pub fn update_skill(&self, caller: &str, id: Uuid, patch: SkillPatch) -> Result<SkillView> {
        let _guard = self.lock();
        let mut tree = self.tree_for_skill(caller, id)?;
        tree.apply_patch(id, patch, self.config.lane_x)?;
        let view = tree.view(id)?;
        self.db.commit(tree.into_batch())?;
        Ok(view)
    }

    /// Delete a skill, rewire its dependents and drop the sub-tree rooted
    /// at it.
    pub fn delete_skill(&self, caller: &str, id: Uuid) -> Result<Skill> {
        let _guard = self.lock();
        let mut tree = self.tree_for_skill(caller, id)?;
        tree.ensure_editable()?;
        let removed = tree.delete_skill(id)?;
        let nested = self.nested_containers(vec![id])?;

        let mut batch = tree.into_batch();
        batch.removed_containers.extend(nested);
        self.db.commit(batch)?;
        Ok(removed)
    }

    /// Generate or re-open `level`. Safe to retry. `start_y` defaults to
    /// two steps below the lowest stored node.
    pub fn generate_level(
        &self,
        caller: &str,
        target: Uuid,
        level: u32,
        start_y: Option<i64>,
    ) -> Result<GeneratedLevel> {
        let _guard = self.lock();
        let (mut tree, _) = self.resolve_target(caller, target)?;
        let start_y = start_y.unwrap_or_else(|| tree.next_level_start_y(self.config.start_y));
        let LevelBatch {
            level,
            created,
            skills,
        } = tree.generate_level(level, start_y, self.config.lane_x)?;

        let views = skills
            .iter()
            .map(|id| tree.view(*id))
            .collect::<Result<Vec<_>>>()?;
        let container = tree.container.clone();
        self.db.commit(tree.into_batch())?;
        Ok(GeneratedLevel {
            container,
            level,
            created,
            skills: views,
        })
    }

    pub fn toggle_status(&self, caller: &str, id: Uuid) -> Result<ToggleResult> {
        let _guard = self.lock();
        let mut tree = self.tree_for_skill(caller, id)?;
        let shown_before = tree.container.unlocked_level;
        let outcome = tree.toggle_status(id, self.config.lane_x)?;

        let mut skills = tree.visible_through(shown_before.min(tree.container.unlocked_level));
        if let ToggleOutcome::Changed {
            level_change: Some(LevelChange::Opened { skills: opened, .. }),
            ..
        } = &outcome
        {
            let views = opened
                .iter()
                .map(|sid| tree.view(*sid))
                .collect::<Result<Vec<_>>>()?;
            merge_new(&mut skills, views);
        }

        if tree.is_dirty() {
            self.db.commit(tree.into_batch())?;
        }
        Ok(ToggleResult { outcome, skills })
    }

    /// Returns `false` when the skill is already at the edge of its level.
    pub fn move_skill(&self, caller: &str, id: Uuid, direction: Direction) -> Result<bool> {
        let _guard = self.lock();
        let mut tree = self.tree_for_skill(caller, id)?;
        tree.ensure_editable()?;
        let moved = tree.move_skill(id, direction)?;
        if moved {
            self.db.commit(tree.into_batch())?;
        }
        Ok(moved)
    }

    pub fn insert_skill_below(&self, caller: &str, anchor: Uuid, title: &str) -> Result<SkillView> {
        let _guard = self.lock();
        let mut tree = self.tree_for_skill(caller, anchor)?;
        tree.ensure_editable()?;
        let id = tree.insert_below(anchor, title)?;
        let view = tree.view(id)?;
        self.db.commit(tree.into_batch())?;
        Ok(view)
    }

    /// The container `id` is stored under, for callers that own it.
    pub fn skill_container(&self, caller: &str, id: Uuid) -> Result<Uuid> {
        let home = self
            .db
            .skill_home(id)?
            .ok_or(SkillError::SkillNotFound(id))?;
        let container = self.db.get_container(home)?;
        self.authorize(caller, &container)?;
        Ok(home)
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    pub fn reconcile(&self, caller: &str, id: Uuid) -> Result<Vec<Uuid>> {
        let _guard = self.lock();
        let container = self.db.get_container(id)?;
        self.authorize(caller, &container)?;
        let mut tree = self.load(container)?;
        let promoted = tree.propagate();
        if !promoted.is_empty() {
            self.db.commit(tree.into_batch())?;
        }
        Ok(promoted)
    }

    /// One propagation pass over every stored container. Returns the
    /// containers that changed.
    pub fn reconcile_all(&self) -> Result<Vec<Uuid>> {
        let _guard = self.lock();
        let mut changed = Vec::new();
        for container in self.db.list_containers()? {
            let mut tree = self.load(container)?;
            if tree.propagate().is_empty() {
                continue;
            }
            changed.push(tree.id());
            self.db.commit(tree.into_batch())?;
        }
        if !changed.is_empty() {
            tracing::debug!(containers = changed.len(), "reconciled");
        }
        Ok(changed)
    }

    pub fn check_consistency(&self, caller: &str, id: Uuid) -> Result<ConsistencyReport> {
        let container = self.db.get_container(id)?;
        self.authorize(caller, &container)?;
        Ok(self.load(container)?.check())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self, container: Container) -> Result<SkillTree> {
        let skills = self.db.list_skills(container.id)?;
        Ok(SkillTree::new(container, skills))
    }

    /// Walk from `container` up to its Area or Project and check the caller
    /// owns it.
    fn authorize(&self, caller: &str, container: &Container) -> Result<()> {
        let mut current = container.clone();
        let mut hops = 0;
        while !current.kind.is_root() {
            hops += 1;
            if hops > self.config.max_subtree_depth {
                return Err(SkillError::SubtreeTooDeep(container.id));
            }
            let parent_home = self
                .db
                .skill_home(current.id)?
                .ok_or(SkillError::SkillNotFound(current.id))?;
            current = self.db.get_container(parent_home)?;
        }
        if current.owner != caller {
            return Err(SkillError::NotOwner {
                caller: caller.to_string(),
                container: container.id,
            });
        }
        Ok(())
    }

    /// Load the container `target` names. A parent skill without a
    /// sub-tree yet yields an unsaved, empty one (`true` in the tuple).
    fn resolve_target(&self, caller: &str, target: Uuid) -> Result<(SkillTree, bool)> {
        if let Some(container) = self.db.find_container(target)? {
            self.authorize(caller, &container)?;
            return Ok((self.load(container)?, false));
        }
        if self.db.skill_home(target)?.is_none() {
            return Err(SkillError::ContainerNotFound(target));
        }
        let container = Container::subtree(target, caller);
        self.authorize(caller, &container)?;
        Ok((SkillTree::fresh(container), true))
    }

    fn tree_for_skill(&self, caller: &str, id: Uuid) -> Result<SkillTree> {
        let home = self.skill_container(caller, id)?;
        self.load(self.db.get_container(home)?)
    }

    /// Sub-tree containers rooted at any of `skills`, transitively.
    fn nested_containers(&self, skills: Vec<Uuid>) -> Result<Vec<Uuid>> {
        let mut found = Vec::new();
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<Uuid> = skills.into();
        while let Some(skill) = queue.pop_front() {
            if !seen.insert(skill) {
                continue;
            }
            if self.db.find_container(skill)?.is_some() {
                found.push(skill);
                queue.extend(self.db.list_skills(skill)?.iter().map(|s| s.id));
            }
        }
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SkillStatus;
    use tempfile::TempDir;

    const ANA: &str = "ana";

    fn engine() -> (TempDir, Engine) {
        let dir = TempDir::new().unwrap();
        let engine = Engine::init(dir.path()).unwrap();
        (dir, engine)
    }

    fn area(engine: &Engine) -> (Container, Vec<Uuid>) {
        let (c, skills) = engine
            .create_container(ANA, ContainerKind::Area, "Piano")
            .unwrap();
        (c, skills.iter().map(|s| s.id()).collect())
    }

    fn status(engine: &Engine, container: Uuid, id: Uuid) -> SkillStatus {
        engine
            .list_skills(ANA, container)
            .unwrap()
            .into_iter()
            .find(|s| s.id() == id)
            .map(|s| s.skill.status)
            .unwrap()
    }

    fn system_set(engine: &Engine, id: Uuid, status: SkillStatus) {
        engine
            .update_skill(
                ANA,
                id,
                SkillPatch {
                    status: Some(status),
                    system: true,
                    ..SkillPatch::default()
                },
            )
            .unwrap();
    }

    #[test]
    fn fresh_container_scenario() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        let skills = engine.list_skills(ANA, c.id).unwrap();
        let ys: Vec<i64> = skills.iter().map(|s| s.skill.y).collect();
        assert_eq!(ys, vec![100, 250, 400, 550, 700]);
        assert_eq!(skills[0].skill.status, SkillStatus::Mastered);
        assert_eq!(skills[1].skill.status, SkillStatus::Available);
        assert_eq!(skills[1].skill.dependencies, vec![ids[0]]);
        for i in 2..5 {
            assert_eq!(skills[i].skill.status, SkillStatus::Locked);
            assert_eq!(skills[i].skill.dependencies, vec![ids[i - 1]]);
        }

        let result = engine.toggle_status(ANA, ids[1]).unwrap();
        assert!(matches!(
            result.outcome,
            ToggleOutcome::Changed {
                level_change: None,
                ..
            }
        ));
        assert_eq!(engine.get_container(ANA, c.id).unwrap().unlocked_level, 1);
        // The next reconciliation (listing runs one) unlocks node 3.
        assert_eq!(status(&engine, c.id, ids[2]), SkillStatus::Available);
        assert_eq!(status(&engine, c.id, ids[3]), SkillStatus::Locked);
    }

    #[test]
    fn generate_level_is_idempotent() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        let first = engine.generate_level(ANA, c.id, 1, Some(100)).unwrap();
        let second = engine.generate_level(ANA, c.id, 1, Some(100)).unwrap();
        assert!(!first.created);
        let a: Vec<Uuid> = first.skills.iter().map(|s| s.id()).collect();
        let b: Vec<Uuid> = second.skills.iter().map(|s| s.id()).collect();
        assert_eq!(a, ids);
        assert_eq!(a, b);

        let two = engine.generate_level(ANA, c.id, 2, None).unwrap();
        let again = engine.generate_level(ANA, c.id, 2, None).unwrap();
        assert!(two.created);
        assert!(!again.created);
        assert_eq!(two.skills.len(), 5);
        assert_eq!(
            two.skills.iter().map(|s| s.id()).collect::<Vec<_>>(),
            again.skills.iter().map(|s| s.id()).collect::<Vec<_>>()
        );
        assert_eq!(engine.list_skills(ANA, c.id).unwrap().len(), 10);
    }

    #[test]
    fn generate_level_cannot_jump_ahead() {
        let (_dir, engine) = engine();
        let (c, _) = area(&engine);
        let err = engine.generate_level(ANA, c.id, 5, None).unwrap_err();
        assert!(matches!(err, SkillError::InvalidLevel(5)));

        assert_eq!(engine.get_container(ANA, c.id).unwrap().unlocked_level, 1);
        assert_eq!(engine.list_skills(ANA, c.id).unwrap().len(), 5);
        assert!(engine.check_consistency(ANA, c.id).unwrap().consistent);
    }

    #[test]
    fn gate_closure_opens_and_rejects() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        for id in &ids[1..4] {
            system_set(&engine, *id, SkillStatus::Mastered);
        }
        system_set(&engine, ids[4], SkillStatus::Available);
        system_set(&engine, ids[2], SkillStatus::Available);

        let rejected = engine.toggle_status(ANA, ids[4]).unwrap();
        assert!(rejected.outcome.is_rejected());
        assert_eq!(engine.get_container(ANA, c.id).unwrap().unlocked_level, 1);
        assert_eq!(status(&engine, c.id, ids[4]), SkillStatus::Available);

        system_set(&engine, ids[2], SkillStatus::Mastered);
        let opened = engine.toggle_status(ANA, ids[4]).unwrap();
        assert_eq!(opened.outcome.status(), SkillStatus::Mastered);
        assert_eq!(opened.skills.len(), 10);
        let container = engine.get_container(ANA, c.id).unwrap();
        assert_eq!(container.unlocked_level, 2);
        assert_eq!(container.next_level_to_assign, 2);
    }

    #[test]
    fn level_revert_relocks_higher_levels() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        for id in &ids[1..4] {
            system_set(&engine, *id, SkillStatus::Mastered);
        }
        system_set(&engine, ids[4], SkillStatus::Available);
        let opened = engine.toggle_status(ANA, ids[4]).unwrap();
        let level_two: Vec<Uuid> = opened.skills[5..].iter().map(|s| s.id()).collect();

        let reverted = engine.toggle_status(ANA, ids[4]).unwrap();
        assert_eq!(reverted.outcome.status(), SkillStatus::Available);
        assert_eq!(reverted.skills.len(), 5);

        let container = engine.get_container(ANA, c.id).unwrap();
        assert_eq!(container.unlocked_level, 1);
        let visible = engine.list_skills(ANA, c.id).unwrap();
        assert!(visible.iter().all(|s| s.skill.level == 1));

        let stored = engine.generate_level(ANA, c.id, 2, None).unwrap();
        assert_eq!(
            stored.skills.iter().map(|s| s.id()).collect::<Vec<_>>(),
            level_two
        );
        // Re-opening re-marks the continuation node; the rest stay locked.
        assert!(stored.skills[1..]
            .iter()
            .all(|s| s.skill.status == SkillStatus::Locked));
    }

    #[test]
    fn manual_lock_survives_reconciliation() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        engine
            .update_skill(
                ANA,
                ids[2],
                SkillPatch {
                    manual_lock: Some(true),
                    ..SkillPatch::default()
                },
            )
            .unwrap();
        system_set(&engine, ids[1], SkillStatus::Mastered);
        assert!(engine.reconcile(ANA, c.id).unwrap().is_empty());
        assert_eq!(status(&engine, c.id, ids[2]), SkillStatus::Locked);
    }

    #[test]
    fn reconcile_all_touches_every_container() {
        let (_dir, engine) = engine();
        let (_, a) = area(&engine);
        let (_, b) = area(&engine);
        system_set(&engine, a[1], SkillStatus::Mastered);
        system_set(&engine, b[1], SkillStatus::Mastered);
        assert_eq!(engine.reconcile_all().unwrap().len(), 2);
        assert!(engine.reconcile_all().unwrap().is_empty());
    }

    #[test]
    fn delete_rewires_and_persists() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        engine.delete_skill(ANA, ids[1]).unwrap();
        let skills = engine.list_skills(ANA, c.id).unwrap();
        assert_eq!(skills.len(), 4);
        assert_eq!(skills[1].id(), ids[2]);
        assert_eq!(skills[1].skill.dependencies, vec![ids[0]]);
        assert_eq!(skills[1].skill.y, 250);
        assert_eq!(skills[3].skill.y, 550);
    }

    #[test]
    fn insert_then_move_persist() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        let x = engine.insert_skill_below(ANA, ids[1], "Scales").unwrap();
        assert_eq!(x.skill.y, 400);
        assert_eq!(x.skill.dependencies, vec![ids[1]]);

        assert!(engine.move_skill(ANA, x.id(), Direction::Up).unwrap());
        let skills = engine.list_skills(ANA, c.id).unwrap();
        assert_eq!(skills[1].id(), x.id());
        assert_eq!(skills[1].skill.y, 250);
        assert!(!engine.move_skill(ANA, ids[0], Direction::Up).unwrap());
    }

    #[test]
    fn capacity_cap_applies_to_create() {
        let (_dir, engine) = engine();
        let (c, _) = area(&engine);
        let err = engine
            .create_skill(ANA, c.id, NewSkill::titled("sixth"))
            .unwrap_err();
        assert!(matches!(err, SkillError::LevelFull { .. }));
        assert_eq!(engine.list_skills(ANA, c.id).unwrap().len(), 5);
    }

    #[test]
    fn other_callers_are_rejected() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        assert!(matches!(
            engine.list_skills("bo", c.id),
            Err(SkillError::NotOwner { .. })
        ));
        assert!(matches!(
            engine.toggle_status("bo", ids[1]),
            Err(SkillError::NotOwner { .. })
        ));
        assert!(matches!(
            engine.delete_container("bo", c.id),
            Err(SkillError::NotOwner { .. })
        ));
        assert_eq!(status(&engine, c.id, ids[1]), SkillStatus::Available);
        assert!(engine.list_containers("bo", None).unwrap().is_empty());
    }

    #[test]
    fn nested_subtree_is_owned_through_parent() {
        let (_dir, engine) = engine();
        let (_, ids) = area(&engine);
        let parent = ids[1];

        assert!(engine.list_skills(ANA, parent).unwrap().is_empty());
        let child = engine
            .create_skill(ANA, parent, NewSkill::titled("Left hand"))
            .unwrap();
        assert_eq!(child.skill.container, crate::skill::ContainerRef::Skill(parent));
        assert_eq!(child.skill.level, 1);

        let sub = engine.get_container(ANA, parent).unwrap();
        assert_eq!(sub.kind, ContainerKind::SkillRoot);
        assert_eq!(sub.unlocked_level, 1);
        assert!(matches!(
            engine.list_skills("bo", parent),
            Err(SkillError::NotOwner { .. })
        ));

        let grandchild = engine
            .create_skill(ANA, child.id(), NewSkill::titled("Arpeggio"))
            .unwrap();
        assert_eq!(
            grandchild.skill.container,
            crate::skill::ContainerRef::Skill(child.id())
        );
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let dir = TempDir::new().unwrap();
        Engine::init(dir.path()).unwrap();
        let mut config = Config::load(dir.path()).unwrap();
        config.max_subtree_depth = 1;
        let db = SkillDb::open(&paths::db_path(dir.path())).unwrap();
        let engine = Engine::with_parts(db, config);

        let (_, ids) = area(&engine);
        let child = engine
            .create_skill(ANA, ids[1], NewSkill::titled("one"))
            .unwrap();
        let err = engine
            .create_skill(ANA, child.id(), NewSkill::titled("two"))
            .unwrap_err();
        assert!(matches!(err, SkillError::SubtreeTooDeep(_)));
    }

    #[test]
    fn custom_y_delete_leaves_container_editable() {
        let (_dir, engine) = engine();
        let (_, ids) = area(&engine);
        let parent = ids[1];
        let at = |y: i64| NewSkill {
            y: Some(y),
            ..NewSkill::titled(format!("at {y}"))
        };
        let a = engine.create_skill(ANA, parent, at(100)).unwrap().id();
        let c = engine.create_skill(ANA, parent, at(250)).unwrap().id();
        let b = engine.create_skill(ANA, parent, at(175)).unwrap().id();

        engine.delete_skill(ANA, b).unwrap();
        let report = engine.check_consistency(ANA, parent).unwrap();
        assert!(report.consistent, "{:?}", report.issues);
        assert!(engine.move_skill(ANA, c, Direction::Up).unwrap());

        let skills = engine.list_skills(ANA, parent).unwrap();
        let order: Vec<Uuid> = skills.iter().map(|s| s.id()).collect();
        assert_eq!(order, vec![c, a]);
        assert_eq!(skills[0].skill.y, 100);
        assert_eq!(skills[1].skill.y, 175);
    }

    #[test]
    fn skill_container_checks_ownership() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        assert_eq!(engine.skill_container(ANA, ids[2]).unwrap(), c.id);
        assert!(matches!(
            engine.skill_container("bo", ids[2]),
            Err(SkillError::NotOwner { .. })
        ));
        assert!(matches!(
            engine.skill_container(ANA, Uuid::new_v4()),
            Err(SkillError::SkillNotFound(_))
        ));
    }

    #[test]
    fn deleting_parent_drops_subtree() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        let child = engine
            .create_skill(ANA, ids[1], NewSkill::titled("nested"))
            .unwrap();
        engine
            .create_skill(ANA, child.id(), NewSkill::titled("deeper"))
            .unwrap();

        engine.delete_skill(ANA, ids[1]).unwrap();
        assert!(matches!(
            engine.get_container(ANA, ids[1]),
            Err(SkillError::ContainerNotFound(_))
        ));
        assert!(matches!(
            engine.get_container(ANA, child.id()),
            Err(SkillError::ContainerNotFound(_))
        ));
        assert_eq!(engine.list_skills(ANA, c.id).unwrap().len(), 4);
    }

    #[test]
    fn deleting_container_cascades() {
        let (_dir, engine) = engine();
        let (c, ids) = area(&engine);
        engine
            .create_skill(ANA, ids[2], NewSkill::titled("nested"))
            .unwrap();
        assert_eq!(engine.delete_container(ANA, c.id).unwrap(), 2);
        assert!(engine.list_containers(ANA, None).unwrap().is_empty());
        assert!(engine
            .list_containers(ANA, Some(ContainerKind::SkillRoot))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn status_patch_is_guarded() {
        let (_dir, engine) = engine();
        let (_, ids) = area(&engine);
        let err = engine
            .update_skill(
                ANA,
                ids[3],
                SkillPatch {
                    status: Some(SkillStatus::Mastered),
                    ..SkillPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SkillError::GuardRejected(_)));
    }

    #[test]
    fn subtitles_are_stored() {
        let (_dir, engine) = engine();
        let (c, _) = area(&engine);
        engine
            .set_level_subtitle(ANA, c.id, 1, "Basics", "Posture and scales")
            .unwrap();
        let stored = engine.get_container(ANA, c.id).unwrap();
        assert_eq!(stored.level_subtitles[&1].label, "Basics");
        assert!(matches!(
            engine.set_level_subtitle(ANA, c.id, 0, "x", ""),
            Err(SkillError::InvalidLevel(0))
        ));
    }

    #[test]
    fn skill_root_cannot_be_created_directly() {
        let (_dir, engine) = engine();
        assert!(matches!(
            engine.create_container(ANA, ContainerKind::SkillRoot, "x"),
            Err(SkillError::InvalidKind(_))
        ));
    }

    #[test]
    fn consistency_report_for_clean_container() {
        let (_dir, engine) = engine();
        let (c, _) = area(&engine);
        let report = engine.check_consistency(ANA, c.id).unwrap();
        assert!(report.consistent);
    }
}
