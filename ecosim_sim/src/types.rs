// Core types shared across the simulation.
//
// Defines grid coordinates (`Coord`), agent identifiers (`AgentId`), the agent
// variant tag (`AgentKind`), per-cell terrain (`Terrain`), and the movement
// neighborhood policy (`Neighborhood`). Everything derives `Serialize` and
// `Deserialize` so snapshots and checkpoints can carry it.
//
// A `Coord` on its own is just a pair of integers. It only becomes a valid
// cell address after `WorldGrid::wrap()` normalizes it against the grid size;
// every grid and grass accessor wraps its input first.
//
// **Critical constraint: determinism.** Agent IDs are allocated from a
// monotonic counter in `AgentPool`, never from hashing or the clock, and all
// of these types have a total order so `BTreeMap` iteration is stable.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position. `x` grows east, `y` grows south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by `(dx, dy)` without wrapping.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which cells count as a cell's neighbors for movement and reproduction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Neighborhood {
    /// N, E, S, W.
    #[default]
    VonNeumann,
    /// The four orthogonal cells plus the four diagonals.
    Moore,
}

impl Neighborhood {
    const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
    const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

    /// Unwrapped offsets for this policy, orthogonal directions first.
    pub fn offsets(self) -> SmallVec<[(i32, i32); 8]> {
        let mut out: SmallVec<[(i32, i32); 8]> = SmallVec::from_slice(&Self::ORTHOGONAL);
        if self == Neighborhood::Moore {
            out.extend_from_slice(&Self::DIAGONAL);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Per-cell terrain, fixed at world creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Open,
    Rock,
}

impl Terrain {
    pub fn is_rock(self) -> bool {
        self == Terrain::Rock
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Compact agent identifier. Allocated in increasing order, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// The two mobile species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentKind {
    Herbivore,
    Predator,
}

impl AgentKind {
    pub const ALL: [AgentKind; 2] = [AgentKind::Herbivore, AgentKind::Predator];
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Herbivore => f.write_str("herbivore"),
            AgentKind::Predator => f.write_str("predator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn von_neumann_has_four_offsets() {
        let offsets = Neighborhood::VonNeumann.offsets();
        assert_eq!(offsets.len(), 4);
        assert!(offsets.iter().all(|&(dx, dy)| dx.abs() + dy.abs() == 1));
    }

    #[test]
    fn moore_has_eight_distinct_offsets() {
        let offsets = Neighborhood::Moore.offsets();
        assert_eq!(offsets.len(), 8);
        for (i, a) in offsets.iter().enumerate() {
            assert_ne!(*a, (0, 0));
            for b in &offsets[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn coord_offset_does_not_wrap() {
        assert_eq!(Coord::new(0, 0).offset(-1, 2), Coord::new(-1, 2));
    }

    #[test]
    fn agent_ids_order_by_allocation() {
        assert!(AgentId(3) < AgentId(10));
        assert_eq!(AgentId(7).to_string(), "agent#7");
    }

    #[test]
    fn kind_serializes_as_variant_name() {
        let json = serde_json::to_string(&AgentKind::Predator).unwrap();
        assert_eq!(json, "\"Predator\"");
    }
}
