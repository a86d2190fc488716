//! Structural edits: reorder, splice and remove nodes of one container.
//!
//! All three work on the in-memory `SkillTree`; the engine commits the
//! resulting batch in one transaction, so a failed edit leaves nothing
//! half-shifted in storage.

use crate::error::Result;
use crate::skill::{Skill, Y_STEP};
use crate::tree::SkillTree;
use crate::types::{Direction, SkillStatus};
use uuid::Uuid;

impl SkillTree {
    /// Swap `id` with its neighbour in `y` order within its level.
    ///
    /// The two nodes exchange chain positions: `y`, `level_position` and
    /// dependency lists swap, every reference between the two is remapped,
    /// and the final-node designation stays with the position. Returns
    /// `false` when there is no neighbour in that direction.
    pub fn move_skill(&mut self, id: Uuid, direction: Direction) -> Result<bool> {
        let level = self.get(id)?.level;
        let order = self.level_ids(level);
        let idx = order.iter().position(|s| *s == id).unwrap_or(0);
        let other = match direction {
            Direction::Up if idx > 0 => order[idx - 1],
            Direction::Down if idx + 1 < order.len() => order[idx + 1],
            _ => return Ok(false),
        };

        let (a_y, a_pos, a_deps) = {
            let a = self.get(id)?;
            (a.y, a.level_position, a.dependencies.clone())
        };
        let (b_y, b_pos, b_deps) = {
            let b = self.get(other)?;
            (b.y, b.level_position, b.dependencies.clone())
        };

        {
            let a = self.get_mut(id)?;
            a.y = b_y;
            a.level_position = b_pos;
            a.dependencies = b_deps;
            a.touch();
        }
        {
            let b = self.get_mut(other)?;
            b.y = a_y;
            b.level_position = a_pos;
            b.dependencies = a_deps;
            b.touch();
        }
        self.swap_references(id, other);

        match self.container.final_node(level) {
            Some(f) if f == id => self.container_mut().set_final_node(level, other),
            Some(f) if f == other => self.container_mut().set_final_node(level, id),
            _ => {}
        }

        tracing::debug!(container = %self.id(), skill = %id, ?direction, "moved skill");
        Ok(true)
    }

    /// Splice a new locked node directly below `anchor`.
    ///
    /// Everything below the anchor shifts down one step. The new node
    /// depends on the anchor, and if the level's gating node depended on
    /// the anchor it now depends on the new node instead.
    pub fn insert_below(&mut self, anchor: Uuid, title: impl Into<String>) -> Result<Uuid> {
        let (level, anchor_y, anchor_pos, anchor_x) = {
            let a = self.get(anchor)?;
            (a.level, a.y, a.level_position, a.x)
        };
        let gate = self.gating_node(level);

        self.shift_below(anchor_y, level, Y_STEP);

        let mut node = Skill::new(self.container.container_ref(), level, anchor_y + Y_STEP);
        node.title = title.into();
        node.x = anchor_x;
        node.level_position = anchor_pos + 1;
        node.status = SkillStatus::Locked;
        node.dependencies = vec![anchor];
        let new_id = node.id;
        self.push(node);

        if let Some(gate) = gate.filter(|g| *g != anchor) {
            if self.get(gate)?.depends_on(anchor) {
                let g = self.get_mut(gate)?;
                for dep in g.dependencies.iter_mut() {
                    if *dep == anchor {
                        *dep = new_id;
                    }
                }
                g.touch();
            }
        }

        tracing::info!(container = %self.id(), anchor = %anchor, skill = %new_id, "inserted skill");
        Ok(new_id)
    }

    /// Remove `id` and close the gap it leaves.
    ///
    /// Dependents inherit the removed node's dependencies in its place, and
    /// everything below it shifts up by the gap it leaves, at most one step.
    /// If it was the level's
    /// explicit final node, the new highest node of the level takes over.
    pub fn delete_skill(&mut self, id: Uuid) -> Result<Skill> {
        let removed = self.take(id)?;
        let level = removed.level;

        let dependents: Vec<Uuid> = self
            .skills()
            .iter()
            .filter(|s| s.depends_on(id))
            .map(|s| s.id)
            .collect();
        for dependent in dependents {
            let s = self.get_mut(dependent)?;
            s.dependencies = substitute(&s.dependencies, id, &removed.dependencies, dependent);
            s.touch();
        }

        let gap = self
            .skills()
            .iter()
            .filter(|s| s.y > removed.y)
            .map(|s| s.y - removed.y)
            .min()
            .unwrap_or(Y_STEP)
            .min(Y_STEP);
        self.shift_below(removed.y, level, -gap);

        if self.container.final_node(level) == Some(id) {
            let container = self.container_mut();
            container.clear_final_node(level);
            if let Some(top) = self.level_ids(level).last().copied() {
                self.container_mut().set_final_node(level, top);
            }
        }

        tracing::info!(container = %self.id(), skill = %id, level, "deleted skill");
        Ok(removed)
    }

    /// Shift every node with `y > from_y` by `delta`; nodes of `level` also
    /// move one rank.
    fn shift_below(&mut self, from_y: i64, level: u32, delta: i64) {
        let below: Vec<Uuid> = self
            .skills()
            .iter()
            .filter(|s| s.y > from_y)
            .map(|s| s.id)
            .collect();
        for id in below {
            if let Ok(s) = self.get_mut(id) {
                s.y += delta;
                if s.level == level {
                    if delta > 0 {
                        s.level_position += 1;
                    } else {
                        s.level_position = s.level_position.saturating_sub(1).max(1);
                    }
                }
                s.touch();
            }
        }
    }

    /// Exchange `a` and `b` in every dependency list of the container.
    fn swap_references(&mut self, a: Uuid, b: Uuid) {
        let touched: Vec<Uuid> = self
            .skills()
            .iter()
            .filter(|s| s.depends_on(a) || s.depends_on(b))
            .map(|s| s.id)
            .collect();
        for id in touched {
            if let Ok(s) = self.get_mut(id) {
                for dep in s.dependencies.iter_mut() {
                    if *dep == a {
                        *dep = b;
                    } else if *dep == b {
                        *dep = a;
                    }
                }
            }
        }
    }
}

/// Replace `removed` in `deps` with `inherited`, keeping order and dropping
/// duplicates and self-references to `owner`.
fn substitute(deps: &[Uuid], removed: Uuid, inherited: &[Uuid], owner: Uuid) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(deps.len() + inherited.len());
    for dep in deps {
        if *dep == removed {
            for i in inherited {
                if *i != owner && !out.contains(i) {
                    out.push(*i);
                }
            }
        } else if !out.contains(dep) {
            out.push(*dep);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
