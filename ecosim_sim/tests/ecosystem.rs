// Whole-ecosystem tests through the public API.
//
// Runs complete worlds for hundreds of ticks under several configurations and
// checks the properties that must hold on every tick: one agent per cell, no
// agent or grass on rock, snapshot counts that agree with the full view, and
// byte-identical replays for identical configs.

use std::collections::BTreeSet;

use ecosim_sim::grid::WorldGrid;
use ecosim_sim::snapshot::WorldSnapshot;
use ecosim_sim::types::{AgentKind, Coord, Neighborhood, Terrain};
use ecosim_sim::{EcoConfig, EngineState, SimError, TickEngine};

fn config(seed: u64) -> EcoConfig {
    let mut config = EcoConfig::default();
    config.grid_width = 48;
    config.grid_height = 32;
    config.seed = seed;
    config.herbivore.initial_count = 60;
    config.predator.initial_count = 10;
    config.grass.regrow_ticks = 12;
    config.full_snapshots = true;
    config
}

/// Check one full snapshot for internal consistency.
fn check_view(snap: &WorldSnapshot) {
    let view = snap.view().expect("full snapshots enabled");
    let cells = (view.width * view.height) as usize;
    assert_eq!(view.terrain.len(), cells);
    assert_eq!(view.grass.len(), cells);

    let mut seen = BTreeSet::new();
    let mut herbivores = 0;
    let mut predators = 0;
    for agent in &view.agents {
        assert!(seen.insert(agent.position), "two agents on {}", agent.position);
        let i = (agent.position.x as u32 + agent.position.y as u32 * view.width) as usize;
        assert_eq!(view.terrain[i], Terrain::Open, "{} stands on rock", agent.id);
        match agent.kind {
            AgentKind::Herbivore => herbivores += 1,
            AgentKind::Predator => predators += 1,
        }
    }
    assert_eq!(herbivores, snap.herbivores());
    assert_eq!(predators, snap.predators());

    for (terrain, grass) in view.terrain.iter().zip(&view.grass) {
        assert!(!(terrain.is_rock() && *grass), "grass on rock");
    }
    assert_eq!(view.grass.iter().filter(|&&g| g).count(), snap.grass());
}

#[test]
fn wrap_is_periodic_in_both_axes() {
    let grid = WorldGrid::open(7, 5);
    for x in -20..20 {
        for y in -20..20 {
            let base = grid.wrap(x, y);
            for k in -3..=3 {
                assert_eq!(grid.wrap(x + k * 7, y + k * 5), base);
            }
            assert!((0..7).contains(&base.x) && (0..5).contains(&base.y));
        }
    }
}

#[test]
fn default_world_stays_consistent_for_many_ticks() {
    let mut engine = TickEngine::new(config(2024)).unwrap();
    check_view(&engine.observe());
    for tick in 1..=300 {
        let snap = engine.step().unwrap();
        assert_eq!(snap.tick(), tick);
        check_view(&snap);
    }
    assert_eq!(engine.state(), EngineState::Running);
}

#[test]
fn moore_neighborhood_world_stays_consistent() {
    let mut c = config(5);
    c.neighborhood = Neighborhood::Moore;
    let mut engine = TickEngine::new(c).unwrap();
    for _ in 0..150 {
        check_view(&engine.step().unwrap());
    }
}

#[test]
fn original_rules_world_stays_consistent() {
    let mut c = config(31);
    c.grass.regrow_needs_neighbor = true;
    c.grass.initial_coverage = 0.6;
    c.herbivore.digest_ticks = 1;
    c.predator.digest_ticks = 2;
    c.herbivore.reproduction_cost = 2;
    c.predator.reproduction_cost = 5;
    c.predator_pursuit_radius = 8;
    let mut engine = TickEngine::new(c).unwrap();
    for _ in 0..150 {
        check_view(&engine.step().unwrap());
    }
}

#[test]
fn replays_are_byte_identical() {
    let run = |seed| {
        let mut engine = TickEngine::new(config(seed)).unwrap();
        let snaps: Vec<WorldSnapshot> = (0..120).map(|_| engine.step().unwrap()).collect();
        bincode::serialize(&snaps).unwrap()
    };
    assert_eq!(run(77), run(77));
    assert_ne!(run(77), run(78));
}

#[test]
fn checkpoint_mid_run_matches_uninterrupted_run() {
    let mut straight = TickEngine::new(config(404)).unwrap();
    let mut resumed = TickEngine::new(config(404)).unwrap();
    for _ in 0..40 {
        straight.step().unwrap();
        resumed.step().unwrap();
    }
    let json = resumed.to_json().unwrap();
    drop(resumed);
    let mut resumed = TickEngine::from_json(&json).unwrap();
    for _ in 0..40 {
        assert_eq!(straight.step().unwrap(), resumed.step().unwrap());
    }
}

#[test]
fn births_and_deaths_balance_the_counts() {
    let mut c = config(8);
    c.full_snapshots = false;
    let mut engine = TickEngine::new(c).unwrap();
    let mut prev = engine.observe();
    for _ in 0..200 {
        let snap = engine.step().unwrap();
        let s = snap.stats();
        let herbivores = prev.herbivores() as i64 + s.herbivore_births as i64
            - s.herbivores_starved as i64
            - s.herbivores_eaten as i64;
        let predators =
            prev.predators() as i64 + s.predator_births as i64 - s.predators_starved as i64;
        assert_eq!(snap.herbivores() as i64, herbivores, "tick {}", snap.tick());
        assert_eq!(snap.predators() as i64, predators, "tick {}", snap.tick());
        let grass = prev.grass() as i64 + s.grass_regrown as i64 - s.grass_eaten as i64;
        assert_eq!(snap.grass() as i64, grass, "tick {}", snap.tick());
        prev = snap;
    }
}

#[test]
fn stopped_engine_refuses_to_step() {
    let mut engine = TickEngine::new(config(1)).unwrap();
    engine.step().unwrap();
    engine.stop();
    assert!(matches!(engine.step(), Err(SimError::EngineStopped)));
}

#[test]
fn config_file_drives_a_run() {
    let json = r#"{
        "grid_width": 20,
        "grid_height": 20,
        "seed": 3,
        "terrain": { "noise_scale": 5.0, "rock_threshold": 0.4, "octaves": 2,
                     "persistence": 0.5, "lacunarity": 2.0 },
        "grass": { "regrow_ticks": 8, "initial_coverage": 1.0,
                   "regrow_needs_neighbor": false },
        "herbivore": { "initial_count": 12, "initial_energy": 10, "metabolic_cost": 1,
                       "basal_cost": 0, "food_reward": 3, "digest_ticks": 0,
                       "reproduction_threshold": 25, "reproduction_cost": 0,
                       "reproduction_split": 0.5 },
        "predator": { "initial_count": 3, "initial_energy": 30, "metabolic_cost": 1,
                      "basal_cost": 0, "food_reward": 10, "digest_ticks": 0,
                      "reproduction_threshold": 70, "reproduction_cost": 0,
                      "reproduction_split": 0.5 }
    }"#;
    let c = EcoConfig::from_json(json).unwrap();
    let mut engine = TickEngine::new(c).unwrap();
    let first = engine.observe();
    assert_eq!((first.herbivores(), first.predators()), (12, 3));
    for _ in 0..50 {
        engine.step().unwrap();
    }
    assert_eq!(engine.tick(), 50);
    assert_eq!(engine.grid().wrap_coord(Coord::new(20, -1)), Coord::new(0, 19));
}
