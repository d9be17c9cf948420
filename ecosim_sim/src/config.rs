// Data-driven simulation configuration.
//
// Every tunable parameter lives in `EcoConfig`, which loads from JSON (the
// pre-launch form and the CLI both produce one) and is immutable once a
// `TickEngine` owns it. The sim never uses magic numbers; it reads from here.
//
// Parameters are grouped into nested structs:
// - `TerrainParams`: coherent-noise rock generation (scale, threshold, octaves).
// - `GrassParams`: regrowth countdown, initial coverage, neighbor rule.
// - `SpeciesParams` (see `species.rs`): one entry each for herbivores and
//   predators, looked up by `AgentKind` via `species()`.
//
// `validate()` checks every field and returns a `ConfigError` naming all the
// violations at once, so a form can highlight every bad field in one pass.
// The defaults reproduce the classroom setup the model was built for
// (120×60 torus, 50 herbivores, 10 predators, grass back after 30 ticks).
//
// See also: `engine.rs` which validates the config in `TickEngine::new()`,
// `terrain.rs` for how `TerrainParams` is consumed.
//
// **Critical constraint: determinism.** The config, including `seed`, fully
// determines a run. Two engines with equal configs produce equal snapshots.

use crate::error::{ConfigError, Violations};
use crate::species::SpeciesParams;
use crate::types::{AgentKind, Neighborhood};
use serde::{Deserialize, Serialize};

/// Largest accepted grid side. Keeps cell counts small enough for the
/// dense, single-threaded layout.
pub const MAX_GRID_SIDE: u32 = 4096;

/// Coherent-noise terrain parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Approximate rock blob size in cells. Larger values give larger blobs.
    pub noise_scale: f64,
    /// Cells whose noise value exceeds this become rock. Must lie in [-1, 1];
    /// lower values give more rock.
    pub rock_threshold: f64,
    /// Number of noise layers summed together.
    pub octaves: u32,
    /// Amplitude multiplier per octave, in (0, 1].
    pub persistence: f64,
    /// Frequency multiplier per octave, at least 1.
    pub lacunarity: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            noise_scale: 10.0,
            rock_threshold: 0.15,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl TerrainParams {
    pub(crate) fn validate(&self) -> Violations {
        let mut v = Violations::default();
        v.check(
            self.noise_scale.is_finite() && self.noise_scale > 0.0,
            "terrain.noise_scale",
            format!("must be a positive number, got {}", self.noise_scale),
        );
        v.check(
            (-1.0..=1.0).contains(&self.rock_threshold),
            "terrain.rock_threshold",
            format!("must lie in [-1, 1], got {}", self.rock_threshold),
        );
        v.check(
            (1..=16).contains(&self.octaves),
            "terrain.octaves",
            format!("must be between 1 and 16, got {}", self.octaves),
        );
        v.check(
            self.persistence > 0.0 && self.persistence <= 1.0,
            "terrain.persistence",
            format!("must be in (0, 1], got {}", self.persistence),
        );
        v.check(
            self.lacunarity.is_finite() && self.lacunarity >= 1.0,
            "terrain.lacunarity",
            format!("must be at least 1, got {}", self.lacunarity),
        );
        v
    }
}

/// Vegetation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrassParams {
    /// Ticks between a cell being grazed and its grass returning.
    pub regrow_ticks: u32,
    /// Fraction of open cells that start with grass. Unseeded open cells
    /// start bare with a random countdown in `1..=regrow_ticks`.
    pub initial_coverage: f64,
    /// When set, a bare cell's countdown only advances while at least one
    /// orthogonal neighbor has grass, so grass spreads from existing patches.
    pub regrow_needs_neighbor: bool,
}

impl Default for GrassParams {
    fn default() -> Self {
        Self {
            regrow_ticks: 30,
            initial_coverage: 1.0,
            regrow_needs_neighbor: false,
        }
    }
}

impl GrassParams {
    pub(crate) fn validate(&self) -> Violations {
        let mut v = Violations::default();
        v.check(
            self.regrow_ticks >= 1,
            "grass.regrow_ticks",
            "must be at least 1",
        );
        v.check(
            (0.0..=1.0).contains(&self.initial_coverage),
            "grass.initial_coverage",
            format!("must lie in [0, 1], got {}", self.initial_coverage),
        );
        v
    }
}

/// Complete configuration for one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EcoConfig {
    pub grid_width: u32,
    pub grid_height: u32,

    /// Seed for every random decision in the run.
    pub seed: u64,

    /// Cells considered adjacent for movement and reproduction.
    #[serde(default)]
    pub neighborhood: Neighborhood,

    pub terrain: TerrainParams,
    pub grass: GrassParams,
    pub herbivore: SpeciesParams,
    pub predator: SpeciesParams,

    /// When no herbivore is adjacent, a predator steps toward the nearest
    /// herbivore within this many cells (toroidal Manhattan distance).
    /// 0 means predators wander at random instead.
    #[serde(default)]
    pub predator_pursuit_radius: u32,

    /// Attach the full per-cell and per-agent state to every snapshot.
    #[serde(default)]
    pub full_snapshots: bool,
}

impl Default for EcoConfig {
    fn default() -> Self {
        Self {
            grid_width: 120,
            grid_height: 60,
            seed: 0,
            neighborhood: Neighborhood::VonNeumann,
            terrain: TerrainParams::default(),
            grass: GrassParams::default(),
            herbivore: SpeciesParams::herbivore(),
            predator: SpeciesParams::predator(),
            predator_pursuit_radius: 0,
            full_snapshots: false,
        }
    }
}

impl EcoConfig {
    /// Parameters for one species.
    pub fn species(&self, kind: AgentKind) -> &SpeciesParams {
        match kind {
            AgentKind::Herbivore => &self.herbivore,
            AgentKind::Predator => &self.predator,
        }
    }

    pub fn cell_count(&self) -> u64 {
        self.grid_width as u64 * self.grid_height as u64
    }

    /// Check every field, reporting all violations together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut v = Violations::default();
        v.check(
            (1..=MAX_GRID_SIDE).contains(&self.grid_width),
            "grid_width",
            format!("must be between 1 and {MAX_GRID_SIDE}, got {}", self.grid_width),
        );
        v.check(
            (1..=MAX_GRID_SIDE).contains(&self.grid_height),
            "grid_height",
            format!("must be between 1 and {MAX_GRID_SIDE}, got {}", self.grid_height),
        );
        v.extend(self.terrain.validate());
        v.extend(self.grass.validate());
        v.extend(self.herbivore.validate("herbivore"));
        v.extend(self.predator.validate("predator"));
        v.check(
            self.predator.food_reward > self.herbivore.food_reward,
            "predator.food_reward",
            format!(
                "must exceed herbivore.food_reward ({}), got {}",
                self.herbivore.food_reward, self.predator.food_reward
            ),
        );
        let population = self.herbivore.initial_count as u64 + self.predator.initial_count as u64;
        v.check(
            population <= self.cell_count(),
            "initial_count",
            format!(
                "{population} initial agents cannot fit on {} cells",
                self.cell_count()
            ),
        );
        v.into_result()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
