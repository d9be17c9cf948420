// ecosim_sim — pure Rust predator/prey/grass simulation library.
//
// This crate contains all simulation logic: terrain generation, the toroidal
// grid, the grass layer, the agent pool, per-agent behavior, and the tick
// engine that ties them together. It does no I/O, reads no clock, and never
// initializes a logger, so it can be tested, benchmarked, and run headless.
//
// Module overview:
// - `engine.rs`:    TickEngine — state machine, tick phases, checkpoints.
// - `behavior.rs`:  Herbivore and predator rules (metabolism, movement,
//                   feeding, reproduction).
// - `agent.rs`:     Agent + AgentPool (BTreeMap keyed by AgentId).
// - `grid.rs`:      WorldGrid — terrain and occupancy per cell, toroidal wrap.
// - `grass.rs`:     GrassField — presence and regrow countdown per cell.
// - `terrain.rs`:   Tileable fractal gradient noise -> RockMask.
// - `snapshot.rs`:  WorldSnapshot, WorldView, TickStats — the only output.
// - `config.rs`:    EcoConfig + TerrainParams + GrassParams.
// - `species.rs`:   SpeciesParams — per-kind energetics.
// - `error.rs`:     ConfigError, CellError, SimError.
// - `types.rs`:     Coord, AgentId, AgentKind, Terrain, Neighborhood.
// - `prng`:         Re-exported from `ecosim_prng` — xoshiro256++ PRNG with
//                   SplitMix64 seeding.
//
// The companion crate `ecosim_cli` drives this library from the command line
// and writes the population log.
//
// **Critical constraint: determinism.** A run is a pure function of its
// `EcoConfig` (seed included). All randomness comes from `prng::SimRng`. No
// `HashMap`, no system time, no OS entropy. Use `BTreeMap` for ordered
// collections.

pub mod agent;
mod behavior;
pub mod config;
pub mod engine;
pub mod error;
pub mod grass;
pub mod grid;
pub use ecosim_prng as prng;
pub mod snapshot;
pub mod species;
pub mod terrain;
pub mod types;

pub use config::EcoConfig;
pub use engine::{EngineState, TickEngine};
pub use error::{ConfigError, SimError};
pub use snapshot::WorldSnapshot;
