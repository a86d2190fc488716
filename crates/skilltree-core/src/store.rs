//! Persistent storage for containers and skills using redb.
//!
//! # Table design
//!
//! `CONTAINERS` is keyed by the 16 raw bytes of the container id.
//!
//! `SKILLS` uses a 32-byte composite key:
//! ```text
//! [ container_id: 16 bytes | skill_id: 16 bytes ]
//! ```
//! so every skill of one container sits in one contiguous key range and a
//! single range scan lists them.
//!
//! `SKILL_HOME` maps a skill id to its container id, which is what lets a
//! caller address a skill by id alone.
//!
//! All values are JSON. `commit` applies a whole `Batch` in one write
//! transaction: either every write in it is visible or none is.

use std::fmt::Display;
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::container::Container;
use crate::error::{Result, SkillError};
use crate::skill::Skill;

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const CONTAINERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("containers");
const SKILLS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("skills");
const SKILL_HOME: TableDefinition<&[u8], &[u8]> = TableDefinition::new("skill_home");

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

fn skill_key(container: Uuid, skill: Uuid) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(container.as_bytes());
    key[16..].copy_from_slice(skill.as_bytes());
    key
}

/// Inclusive key bounds covering every skill of `container`.
fn container_bounds(container: Uuid) -> ([u8; 32], [u8; 32]) {
    let mut lo = [0u8; 32];
    let mut hi = [0xffu8; 32];
    lo[..16].copy_from_slice(container.as_bytes());
    hi[..16].copy_from_slice(container.as_bytes());
    (lo, hi)
}

fn db_err<E: Display>(e: E) -> SkillError {
    SkillError::Db(e.to_string())
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Writes applied together by `SkillDb::commit`.
#[derive(Debug, Default)]
pub struct Batch {
    pub containers: Vec<Container>,
    pub skills: Vec<Skill>,
    pub removed_skills: Vec<Skill>,
    /// Containers dropped together with every skill stored under them.
    pub removed_containers: Vec<Uuid>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
            && self.skills.is_empty()
            && self.removed_skills.is_empty()
            && self.removed_containers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SkillDb
// ---------------------------------------------------------------------------

pub struct SkillDb {
    db: Database,
}

impl SkillDb {
    /// Open or create the redb database at `path`, creating all tables.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(CONTAINERS).map_err(db_err)?;
        wt.open_table(SKILLS).map_err(db_err)?;
        wt.open_table(SKILL_HOME).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }

    pub fn find_container(&self, id: Uuid) -> Result<Option<Container>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(CONTAINERS).map_err(db_err)?;
        let found = table.get(id.as_bytes().as_slice()).map_err(db_err)?;
        match found {
            Some(v) => Ok(Some(serde_json::from_slice(v.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_container(&self, id: Uuid) -> Result<Container> {
        self.find_container(id)?
            .ok_or(SkillError::ContainerNotFound(id))
    }

    /// All containers, oldest first.
    pub fn list_containers(&self) -> Result<Vec<Container>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(CONTAINERS).map_err(db_err)?;

        let mut result = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (_, v) = entry.map_err(db_err)?;
            let container: Container = serde_json::from_slice(v.value())?;
            result.push(container);
        }
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    /// Every stored skill of `container`, hidden levels included, ordered by
    /// level then `y`.
    pub fn list_skills(&self, container: Uuid) -> Result<Vec<Skill>> {
        let (lo, hi) = container_bounds(container);
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(SKILLS).map_err(db_err)?;

        let mut result = Vec::new();
        for entry in table
            .range(lo.as_slice()..=hi.as_slice())
            .map_err(db_err)?
        {
            let (_, v) = entry.map_err(db_err)?;
            let skill: Skill = serde_json::from_slice(v.value())?;
            result.push(skill);
        }
        result.sort_by(|a, b| a.level.cmp(&b.level).then(a.y.cmp(&b.y)));
        Ok(result)
    }

    /// The container id a skill is stored under.
    pub fn skill_home(&self, id: Uuid) -> Result<Option<Uuid>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let home = rt.open_table(SKILL_HOME).map_err(db_err)?;
        let found = home.get(id.as_bytes().as_slice()).map_err(db_err)?;
        match found {
            Some(v) => Ok(Some(Uuid::from_slice(v.value()).map_err(db_err)?)),
            None => Ok(None),
        }
    }

    pub fn get_skill(&self, id: Uuid) -> Result<Skill> {
        let container = self.skill_home(id)?.ok_or(SkillError::SkillNotFound(id))?;
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(SKILLS).map_err(db_err)?;
        let key = skill_key(container, id);
        let found = table.get(key.as_slice()).map_err(db_err)?;
        match found {
            Some(v) => Ok(serde_json::from_slice(v.value())?),
            None => Err(SkillError::SkillNotFound(id)),
        }
    }

    /// Apply `batch` in a single write transaction.
    pub fn commit(&self, batch: Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut containers = wt.open_table(CONTAINERS).map_err(db_err)?;
            let mut skills = wt.open_table(SKILLS).map_err(db_err)?;
            let mut home = wt.open_table(SKILL_HOME).map_err(db_err)?;

            for id in &batch.removed_containers {
                containers
                    .remove(id.as_bytes().as_slice())
                    .map_err(db_err)?;
                let (lo, hi) = container_bounds(*id);
                let mut keys: Vec<Vec<u8>> = Vec::new();
                for entry in skills
                    .range(lo.as_slice()..=hi.as_slice())
                    .map_err(db_err)?
                {
                    let (k, _) = entry.map_err(db_err)?;
                    keys.push(k.value().to_vec());
                }
                for key in keys {
                    skills.remove(key.as_slice()).map_err(db_err)?;
                    home.remove(&key[16..]).map_err(db_err)?;
                }
            }

            for skill in &batch.removed_skills {
                let key = skill_key(skill.container.id(), skill.id);
                skills.remove(key.as_slice()).map_err(db_err)?;
                home.remove(skill.id.as_bytes().as_slice())
                    .map_err(db_err)?;
            }

            for container in &batch.containers {
                let value = serde_json::to_vec(container)?;
                containers
                    .insert(container.id.as_bytes().as_slice(), value.as_slice())
                    .map_err(db_err)?;
            }

            for skill in &batch.skills {
                let key = skill_key(skill.container.id(), skill.id);
                let value = serde_json::to_vec(skill)?;
                skills
                    .insert(key.as_slice(), value.as_slice())
                    .map_err(db_err)?;
                home.insert(
                    skill.id.as_bytes().as_slice(),
                    skill.container.id().as_bytes().as_slice(),
                )
                .map_err(db_err)?;
            }
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContainerKind;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, SkillDb) {
        let dir = TempDir::new().unwrap();
        let db = SkillDb::open(&dir.path().join("test.redb")).unwrap();
        (dir, db)
    }

    fn container_with_skills(n: usize) -> (Container, Vec<Skill>) {
        let c = Container::new(ContainerKind::Area, "ana", "Guitar");
        let skills = (0..n)
            .map(|i| Skill::new(c.container_ref(), 1, 100 + 150 * i as i64))
            .collect();
        (c, skills)
    }

    #[test]
    fn commit_then_list() {
        let (_dir, db) = open_tmp();
        let (c, skills) = container_with_skills(3);
        db.commit(Batch {
            containers: vec![c.clone()],
            skills: skills.clone(),
            ..Batch::default()
        })
        .unwrap();

        assert_eq!(db.get_container(c.id).unwrap(), c);
        let listed = db.list_skills(c.id).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].y, 100);
        assert_eq!(db.get_skill(skills[2].id).unwrap(), skills[2]);
    }

    #[test]
    fn range_scan_is_scoped_to_container() {
        let (_dir, db) = open_tmp();
        let (a, a_skills) = container_with_skills(2);
        let (b, b_skills) = container_with_skills(4);
        db.commit(Batch {
            containers: vec![a.clone(), b.clone()],
            skills: a_skills.into_iter().chain(b_skills).collect(),
            ..Batch::default()
        })
        .unwrap();

        assert_eq!(db.list_skills(a.id).unwrap().len(), 2);
        assert_eq!(db.list_skills(b.id).unwrap().len(), 4);
        assert_eq!(db.list_containers().unwrap().len(), 2);
    }

    #[test]
    fn removed_skill_is_gone_everywhere() {
        let (_dir, db) = open_tmp();
        let (c, skills) = container_with_skills(2);
        db.commit(Batch {
            containers: vec![c.clone()],
            skills: skills.clone(),
            ..Batch::default()
        })
        .unwrap();

        db.commit(Batch {
            removed_skills: vec![skills[0].clone()],
            ..Batch::default()
        })
        .unwrap();

        assert_eq!(db.list_skills(c.id).unwrap().len(), 1);
        assert!(matches!(
            db.get_skill(skills[0].id),
            Err(SkillError::SkillNotFound(_))
        ));
    }

    #[test]
    fn removing_container_drops_its_skills() {
        let (_dir, db) = open_tmp();
        let (c, skills) = container_with_skills(5);
        db.commit(Batch {
            containers: vec![c.clone()],
            skills: skills.clone(),
            ..Batch::default()
        })
        .unwrap();

        db.commit(Batch {
            removed_containers: vec![c.id],
            ..Batch::default()
        })
        .unwrap();

        assert!(db.find_container(c.id).unwrap().is_none());
        assert!(db.list_skills(c.id).unwrap().is_empty());
        assert!(db.skill_home(skills[0].id).unwrap().is_none());
    }

    #[test]
    fn empty_batch_is_noop() {
        let (_dir, db) = open_tmp();
        db.commit(Batch::default()).unwrap();
        assert!(db.list_containers().unwrap().is_empty());
    }

    #[test]
    fn missing_container_is_not_found() {
        let (_dir, db) = open_tmp();
        assert!(matches!(
            db.get_container(Uuid::new_v4()),
            Err(SkillError::ContainerNotFound(_))
        ));
    }
}
