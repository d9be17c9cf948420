// Tick orchestration and the engine state machine.
//
// `TickEngine` exclusively owns the whole run: config, `WorldGrid`,
// `GrassField`, `AgentPool`, and the engine `SimRng`. Callers only ever get
// owned `WorldSnapshot` values back.
//
// ## State machine
//
//   Idle --step()--> Running --pause()--> Idle
//   any  --stop()--> Stopped      (step() now fails with EngineStopped)
//
// `step()` from Idle starts (or resumes) the run. An internal invariant
// violation also moves the engine to Stopped, after logging a warning.
//
// ## One tick
//
//   1. Grass regrowth (`GrassField::tick_regrowth`).
//   2. Herbivore phase: live herbivore ids, shuffled fresh, each runs
//      `behavior::act`.
//   3. Predator phase: same, over the predators alive after phase 2, so
//      predators see where herbivores moved this tick.
//   4. Purge agents marked dead.
//   5. Invariant check: every pooled agent sits on the grid cell that names
//      it, and the grid holds no one else.
//   6. Build the snapshot.
//
// Agents born during a phase are not in that phase's id list and first act
// on the next tick.
//
// ## Save/load
//
// The engine derives serde in full (including the PRNG state), so
// `to_json()`/`from_json()` checkpoint a run mid-flight and the restored
// engine produces the same snapshots as the original. `from_json()`
// re-validates the config and the pool/grid invariant before handing the
// engine back.
//
// See also: `behavior.rs` for per-agent rules, `snapshot.rs` for the output
// type, `config.rs` for `EcoConfig`.
//
// **Critical constraint: determinism.** All randomness comes from one
// `SimRng` seeded from `EcoConfig::seed`; the terrain uses its own stream of
// the same seed. No clock, no OS entropy, no hash-ordered iteration.

use crate::agent::AgentPool;
use crate::behavior::{self, TickContext};
use crate::config::EcoConfig;
use crate::error::{CellError, ConfigError, SimError};
use crate::grass::GrassField;
use crate::grid::WorldGrid;
use crate::prng::SimRng;
use crate::snapshot::{AgentView, TickStats, WorldSnapshot, WorldView};
use crate::terrain::generate_rock_mask;
use crate::types::{AgentKind, Coord};
use serde::{Deserialize, Serialize};

/// Stream id for the engine's own PRNG (grass seeding, agent placement,
/// every per-tick decision).
pub const ENGINE_STREAM: u64 = 0xe4c0_5117;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Idle,
    Running,
    Stopped,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TickEngine {
    tick: u64,
    state: EngineState,
    rng: SimRng,
    config: EcoConfig,
    grid: WorldGrid,
    grass: GrassField,
    pool: AgentPool,
}

impl TickEngine {
    /// Build a world from `config`: terrain, grass, then the seed population
    /// on distinct random open cells (herbivores first).
    pub fn new(config: EcoConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mask = generate_rock_mask(
            config.grid_width,
            config.grid_height,
            &config.terrain,
            config.seed,
        )?;
        let mut grid = WorldGrid::new(&mask);
        let mut rng = SimRng::with_stream(config.seed, ENGINE_STREAM);
        let grass = GrassField::new(&grid, &config.grass, &mut rng);

        let mut open: Vec<Coord> = grid.coords().filter(|&c| grid.is_passable(c)).collect();
        let wanted = config.herbivore.initial_count as usize + config.predator.initial_count as usize;
        if wanted > open.len() {
            return Err(ConfigError::single(
                "initial_count",
                format!(
                    "{wanted} initial agents cannot fit on the {} open cells left by the terrain",
                    open.len()
                ),
            )
            .into());
        }
        rng.shuffle(&mut open);

        let mut pool = AgentPool::new();
        let mut spots = open.into_iter();
        for kind in AgentKind::ALL {
            let params = config.species(kind);
            for coord in spots.by_ref().take(params.initial_count as usize) {
                let id = pool.spawn(kind, coord, params.initial_energy);
                grid.place_agent(id, coord)?;
            }
        }

        let engine = Self {
            tick: 0,
            state: EngineState::Idle,
            rng,
            config,
            grid,
            grass,
            pool,
        };
        log::info!(
            "created {}x{} world (seed {}): {} rock cells, {} grass, {} herbivores, {} predators",
            engine.grid.width(),
            engine.grid.height(),
            engine.config.seed,
            engine.grid.rock_count(),
            engine.grass.count(),
            engine.pool.count(AgentKind::Herbivore),
            engine.pool.count(AgentKind::Predator),
        );
        Ok(engine)
    }

    /// Assemble an engine from hand-built parts. The config must be valid
    /// and match the grid's size, and every agent in `pool` must be alive
    /// and placed on the grid.
    pub fn from_parts(
        config: EcoConfig,
        grid: WorldGrid,
        grass: GrassField,
        pool: AgentPool,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let engine = Self {
            tick: 0,
            state: EngineState::Idle,
            rng: SimRng::with_stream(config.seed, ENGINE_STREAM),
            config,
            grid,
            grass,
            pool,
        };
        engine.check_layout()?;
        engine.check_invariants()?;
        Ok(engine)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EcoConfig {
        &self.config
    }

    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    pub fn grass(&self) -> &GrassField {
        &self.grass
    }

    pub fn pool(&self) -> &AgentPool {
        &self.pool
    }

    /// Advance one tick and return its snapshot.
    pub fn step(&mut self) -> Result<WorldSnapshot, SimError> {
        match self.state {
            EngineState::Stopped => return Err(SimError::EngineStopped),
            EngineState::Idle => self.state = EngineState::Running,
            EngineState::Running => {}
        }

        let herbivores_before = self.pool.count(AgentKind::Herbivore);
        let predators_before = self.pool.count(AgentKind::Predator);

        self.tick += 1;
        let mut stats = TickStats {
            grass_regrown: self.grass.tick_regrowth(),
            ..TickStats::default()
        };

        if let Err(err) = self.run_phases(&mut stats) {
            return Err(self.fail(err.into()));
        }
        self.pool.purge_dead();
        if let Err(err) = self.check_invariants() {
            return Err(self.fail(err));
        }

        let snapshot = self.snapshot(stats, self.config.full_snapshots);
        log::debug!(
            "tick {}: herbivores {} predators {} grass {} | {:?}",
            snapshot.tick(),
            snapshot.herbivores(),
            snapshot.predators(),
            snapshot.grass(),
            stats
        );
        if herbivores_before > 0 && snapshot.herbivores() == 0 {
            log::info!("tick {}: herbivores extinct", self.tick);
        }
        if predators_before > 0 && snapshot.predators() == 0 {
            log::info!("tick {}: predators extinct", self.tick);
        }
        Ok(snapshot)
    }

    fn run_phases(&mut self, stats: &mut TickStats) -> Result<(), CellError> {
        for kind in AgentKind::ALL {
            let mut order = self.pool.live_ids(kind);
            self.rng.shuffle(&mut order);
            let mut ctx = TickContext {
                config: &self.config,
                grid: &mut self.grid,
                grass: &mut self.grass,
                pool: &mut self.pool,
                rng: &mut self.rng,
                stats: &mut *stats,
            };
            for id in order {
                behavior::act(&mut ctx, id)?;
            }
        }
        Ok(())
    }

    fn fail(&mut self, err: SimError) -> SimError {
        log::warn!("tick {}: {err}; stopping engine", self.tick);
        self.state = EngineState::Stopped;
        err
    }

    /// Stop for good. Later `step()` calls fail with `EngineStopped`.
    pub fn stop(&mut self) {
        if self.state != EngineState::Stopped {
            log::info!("engine stopped at tick {}", self.tick);
        }
        self.state = EngineState::Stopped;
    }

    /// Running -> Idle. The next `step()` resumes.
    pub fn pause(&mut self) {
        if self.state == EngineState::Running {
            self.state = EngineState::Idle;
        }
    }

    /// Full snapshot of the current state, without advancing. Stats are
    /// zero since no tick ran.
    pub fn observe(&self) -> WorldSnapshot {
        self.snapshot(TickStats::default(), true)
    }

    fn snapshot(&self, stats: TickStats, full: bool) -> WorldSnapshot {
        let view = full.then(|| WorldView {
            width: self.grid.width(),
            height: self.grid.height(),
            terrain: self.grid.terrain_layer(),
            grass: self.grass.layer(),
            agents: self
                .pool
                .iter()
                .filter(|a| a.alive)
                .map(|a| AgentView {
                    id: a.id,
                    kind: a.kind,
                    position: a.position,
                    energy: a.energy,
                })
                .collect(),
        });
        WorldSnapshot::new(
            self.tick,
            self.pool.count(AgentKind::Herbivore),
            self.pool.count(AgentKind::Predator),
            self.grass.count(),
            stats,
            view,
        )
    }

    fn check_layout(&self) -> Result<(), SimError> {
        if self.grid.width() != self.config.grid_width
            || self.grid.height() != self.config.grid_height
        {
            return Err(ConfigError::single(
                "grid_width",
                format!(
                    "config says {}x{} but the grid is {}x{}",
                    self.config.grid_width,
                    self.config.grid_height,
                    self.grid.width(),
                    self.grid.height()
                ),
            )
            .into());
        }
        if self.grass.layer().len() != self.grid.cell_count() {
            return Err(SimError::InvariantViolation(
                "grass layer does not cover the grid".into(),
            ));
        }
        if self.grass.regrow_ticks() != self.config.grass.regrow_ticks {
            return Err(ConfigError::single(
                "grass.regrow_ticks",
                format!(
                    "config says {} but the grass layer counts down from {}",
                    self.config.grass.regrow_ticks,
                    self.grass.regrow_ticks()
                ),
            )
            .into());
        }
        if let Some(coord) = self.grid.coords().find(|&c| {
            let cell = self.grass.cell(c);
            cell.fertile == self.grid.terrain_at(c).is_rock()
                || (cell.is_present() && !cell.fertile)
        }) {
            return Err(SimError::InvariantViolation(format!(
                "grass cell {coord} disagrees with the terrain there"
            )));
        }
        // A stale counter would let `spawn` hand out a live agent's id.
        if let Some(last) = self.pool.iter().last() {
            if self.pool.next_id() <= last.id {
                return Err(SimError::InvariantViolation(format!(
                    "next agent id {} is not above stored {}",
                    self.pool.next_id(),
                    last.id
                )));
            }
        }
        Ok(())
    }

    /// Every pooled agent is alive and sits on the one cell naming it; no
    /// cell names anyone else.
    fn check_invariants(&self) -> Result<(), SimError> {
        for agent in self.pool.iter() {
            if !agent.alive {
                return Err(SimError::InvariantViolation(format!(
                    "{} is dead but still pooled",
                    agent.id
                )));
            }
            if self.grid.wrap_coord(agent.position) != agent.position
                || self.grid.occupant_at(agent.position) != Some(agent.id)
            {
                return Err(SimError::InvariantViolation(format!(
                    "{} records position {} but the grid holds {:?} there",
                    agent.id,
                    agent.position,
                    self.grid.occupant_at(agent.position)
                )));
            }
        }
        for (coord, id) in self.grid.occupants() {
            if self.pool.get(id).is_none_or(|a| a.position != coord) {
                return Err(SimError::InvariantViolation(format!(
                    "cell {coord} holds {id}, which the pool does not place there"
                )));
            }
        }
        Ok(())
    }

    /// Serialize the whole run, PRNG included.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a run saved with `to_json()`.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let engine: TickEngine = serde_json::from_str(json)?;
        engine.config.validate()?;
        engine.check_layout()?;
        engine.check_invariants()?;
        Ok(engine)
    }
}
