// Agent storage.
//
// `AgentPool` owns every live (and, until the end of the current tick, every
// freshly dead) `Agent`, keyed by `AgentId` in a `BTreeMap`. Ids come from a
// monotonically increasing counter and are never reused, so an id seen in an
// old snapshot can never refer to a different agent later.
//
// Death is two-phase. When an agent starves or is eaten it is marked
// `alive = false` and its grid cell is released immediately, so later actors
// in the same tick see the cell as free. The record itself stays in the pool
// until `purge_dead()` runs at the end of the tick.
//
// See also: `behavior.rs` which mutates agents, `engine.rs` which seeds the
// pool and purges it, `grid.rs` which holds the position side of the
// pool/grid invariant.
//
// **Critical constraint: determinism.** Iteration is in id order (BTreeMap);
// any randomized ordering is drawn explicitly from the engine's `SimRng`.

use crate::types::{AgentId, AgentKind, Coord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Coord,
    pub energy: i64,
    pub alive: bool,
    /// Ticks of post-meal rest remaining.
    pub resting: u32,
}

impl Agent {
    pub fn is_resting(&self) -> bool {
        self.resting > 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPool {
    agents: BTreeMap<AgentId, Agent>,
    next_id: u64,
}

impl AgentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a live agent with a fresh id. The caller places it on the grid.
    pub fn spawn(&mut self, kind: AgentKind, position: Coord, energy: i64) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents.insert(
            id,
            Agent {
                id,
                kind,
                position,
                energy,
                alive: true,
                resting: 0,
            },
        );
        id
    }

    /// The id the next `spawn` will hand out.
    pub fn next_id(&self) -> AgentId {
        AgentId(self.next_id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// True if `id` names a live agent of `kind`.
    pub fn is_live(&self, id: AgentId, kind: AgentKind) -> bool {
        self.agents
            .get(&id)
            .is_some_and(|a| a.alive && a.kind == kind)
    }

    /// Ids of live agents of one kind, in id order.
    pub fn live_ids(&self, kind: AgentKind) -> Vec<AgentId> {
        self.live(kind).map(|a| a.id).collect()
    }

    pub fn live(&self, kind: AgentKind) -> impl Iterator<Item = &Agent> + '_ {
        self.agents
            .values()
            .filter(move |a| a.alive && a.kind == kind)
    }

    pub fn count(&self, kind: AgentKind) -> usize {
        self.live(kind).count()
    }

    /// Mark an agent dead. Returns false if it was already dead or unknown.
    pub fn kill(&mut self, id: AgentId) -> bool {
        match self.agents.get_mut(&id) {
            Some(agent) if agent.alive => {
                agent.alive = false;
                true
            }
            _ => false,
        }
    }

    /// Drop every dead agent. Returns how many were removed.
    pub fn purge_dead(&mut self) -> usize {
        let before = self.agents.len();
        self.agents.retain(|_, a| a.alive);
        before - self.agents.len()
    }

    /// Every stored agent, dead or alive, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let mut pool = AgentPool::new();
        let a = pool.spawn(AgentKind::Herbivore, Coord::new(0, 0), 5);
        let b = pool.spawn(AgentKind::Predator, Coord::new(1, 0), 5);
        assert_eq!((a, b), (AgentId(0), AgentId(1)));
        pool.kill(a);
        pool.purge_dead();
        let c = pool.spawn(AgentKind::Herbivore, Coord::new(0, 0), 5);
        assert_eq!(c, AgentId(2));
        assert_eq!(pool.next_id(), AgentId(3));
    }

    #[test]
    fn counts_only_live_agents_of_a_kind() {
        let mut pool = AgentPool::new();
        let h1 = pool.spawn(AgentKind::Herbivore, Coord::new(0, 0), 5);
        pool.spawn(AgentKind::Herbivore, Coord::new(1, 0), 5);
        pool.spawn(AgentKind::Predator, Coord::new(2, 0), 5);
        assert_eq!(pool.count(AgentKind::Herbivore), 2);
        assert_eq!(pool.count(AgentKind::Predator), 1);

        assert!(pool.kill(h1));
        assert!(!pool.kill(h1));
        assert_eq!(pool.count(AgentKind::Herbivore), 1);
        assert!(!pool.is_live(h1, AgentKind::Herbivore));
        // Still stored until purged.
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.purge_dead(), 1);
        assert_eq!(pool.len(), 2);
        assert!(pool.get(h1).is_none());
    }

    #[test]
    fn live_ids_are_in_id_order() {
        let mut pool = AgentPool::new();
        let ids: Vec<_> = (0..5)
            .map(|i| pool.spawn(AgentKind::Predator, Coord::new(i, 0), 1))
            .collect();
        pool.kill(ids[2]);
        assert_eq!(
            pool.live_ids(AgentKind::Predator),
            vec![ids[0], ids[1], ids[3], ids[4]]
        );
        assert!(pool.live_ids(AgentKind::Herbivore).is_empty());
    }

    #[test]
    fn pool_serializes_to_json() {
        let mut pool = AgentPool::new();
        pool.spawn(AgentKind::Herbivore, Coord::new(3, 4), 9);
        let json = serde_json::to_string(&pool).unwrap();
        let restored: AgentPool = serde_json::from_str(&json).unwrap();
        assert_eq!(pool, restored);
    }
}
