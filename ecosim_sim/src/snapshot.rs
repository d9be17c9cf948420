// Immutable per-tick output.
//
// `TickEngine::step()` returns a `WorldSnapshot`: the tick index, the three
// population counts, per-tick event tallies (`TickStats`), and, when
// `EcoConfig::full_snapshots` is set (or via `TickEngine::observe()`), a
// `WorldView` holding the full per-cell and per-agent state for rendering.
//
// Snapshots are plain owned values. Nothing in them points back into the
// engine, so renderers, charts and loggers can keep them as long as they like.
//
// See also: `engine.rs` which builds them, `ecosim_cli` which logs them.

use crate::types::{AgentId, AgentKind, Coord, Terrain};
use serde::{Deserialize, Serialize};

/// Event tallies for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    pub herbivore_births: u32,
    pub predator_births: u32,
    pub herbivores_starved: u32,
    pub predators_starved: u32,
    pub herbivores_eaten: u32,
    pub grass_eaten: u32,
    pub grass_regrown: u32,
}

impl TickStats {
    pub(crate) fn record_birth(&mut self, kind: AgentKind) {
        match kind {
            AgentKind::Herbivore => self.herbivore_births += 1,
            AgentKind::Predator => self.predator_births += 1,
        }
    }

    pub(crate) fn record_starvation(&mut self, kind: AgentKind) {
        match kind {
            AgentKind::Herbivore => self.herbivores_starved += 1,
            AgentKind::Predator => self.predators_starved += 1,
        }
    }
}

/// One agent as seen by a renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Coord,
    pub energy: i64,
}

/// Full world state, row-major per-cell layers plus the live agent list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldView {
    pub width: u32,
    pub height: u32,
    pub terrain: Vec<Terrain>,
    pub grass: Vec<bool>,
    /// Live agents in id order.
    pub agents: Vec<AgentView>,
}

impl WorldView {
    /// The agent standing on `coord`, if any. `coord` must be in range.
    pub fn agent_at(&self, coord: Coord) -> Option<&AgentView> {
        self.agents.iter().find(|a| a.position == coord)
    }

    pub fn grass_at(&self, coord: Coord) -> bool {
        self.grass[(coord.x as u32 + coord.y as u32 * self.width) as usize]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    tick: u64,
    herbivores: usize,
    predators: usize,
    grass: usize,
    stats: TickStats,
    view: Option<WorldView>,
}

impl WorldSnapshot {
    pub(crate) fn new(
        tick: u64,
        herbivores: usize,
        predators: usize,
        grass: usize,
        stats: TickStats,
        view: Option<WorldView>,
    ) -> Self {
        Self {
            tick,
            herbivores,
            predators,
            grass,
            stats,
            view,
        }
    }

    /// Ticks completed. 0 before the first step.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn herbivores(&self) -> usize {
        self.herbivores
    }

    pub fn predators(&self) -> usize {
        self.predators
    }

    /// Number of cells with grass.
    pub fn grass(&self) -> usize {
        self.grass
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn view(&self) -> Option<&WorldView> {
        self.view.as_ref()
    }

    /// No animals of either kind remain.
    pub fn is_extinct(&self) -> bool {
        self.herbivores == 0 && self.predators == 0
    }

    /// The counts only, as `(tick, herbivores, predators, grass)`.
    pub fn counts(&self) -> (u64, usize, usize, usize) {
        (self.tick, self.herbivores, self.predators, self.grass)
    }
}
