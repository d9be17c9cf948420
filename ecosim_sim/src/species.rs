// Species data: per-kind energetics.
//
// Herbivores and predators share one `Agent` type and one behavior skeleton
// (see `behavior.rs`); everything that differs between them is a number in
// `SpeciesParams`, looked up by `AgentKind` through `EcoConfig::species()`.
// The only hard-coded difference is what each kind prefers to move toward
// (grass vs. prey).
//
// See also: `config.rs` where the two entries live, `behavior.rs` which reads
// them every tick.

use crate::error::Violations;
use serde::{Deserialize, Serialize};

/// Upper bound on every configured energy amount. Keeps per-tick arithmetic
/// far from `i64` overflow.
pub const MAX_ENERGY: i64 = 1_000_000_000_000;

/// Energetics for one species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Agents seeded at world creation.
    pub initial_count: u32,

    /// Energy of every seeded agent.
    pub initial_energy: i64,

    /// Energy paid every tick the agent is active (moving or trying to).
    pub metabolic_cost: i64,

    /// Energy paid per tick while resting after a meal (see `digest_ticks`).
    pub basal_cost: i64,

    /// Energy gained per meal: one grass cell for herbivores, one herbivore
    /// for predators.
    pub food_reward: i64,

    /// Ticks spent resting after each meal. 0 disables resting.
    pub digest_ticks: u32,

    /// Reproduction is attempted once energy reaches this value.
    pub reproduction_threshold: i64,

    /// Paid by the parent before the split.
    pub reproduction_cost: i64,

    /// Fraction of the parent's remaining energy handed to the offspring,
    /// strictly between 0 and 1.
    pub reproduction_split: f64,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            initial_count: 50,
            initial_energy: 10,
            metabolic_cost: 1,
            basal_cost: 0,
            food_reward: 3,
            digest_ticks: 0,
            reproduction_threshold: 25,
            reproduction_cost: 0,
            reproduction_split: 0.5,
        }
    }

    pub fn predator() -> Self {
        Self {
            initial_count: 10,
            initial_energy: 30,
            metabolic_cost: 1,
            basal_cost: 0,
            food_reward: 10,
            digest_ticks: 0,
            reproduction_threshold: 70,
            reproduction_cost: 0,
            reproduction_split: 0.5,
        }
    }

    /// Energy the offspring receives out of `energy`. The parent keeps the rest.
    pub fn offspring_share(&self, energy: i64) -> i64 {
        (energy as f64 * self.reproduction_split).floor() as i64
    }

    pub(crate) fn validate(&self, prefix: &str) -> Violations {
        let mut v = Violations::default();
        let field = |name: &str| format!("{prefix}.{name}");
        v.check(
            (1..=MAX_ENERGY).contains(&self.initial_energy),
            &field("initial_energy"),
            format!("must be in [1, {MAX_ENERGY}], got {}", self.initial_energy),
        );
        v.check(
            (0..=MAX_ENERGY).contains(&self.metabolic_cost),
            &field("metabolic_cost"),
            format!("must be in [0, {MAX_ENERGY}], got {}", self.metabolic_cost),
        );
        v.check(
            (0..=MAX_ENERGY).contains(&self.basal_cost),
            &field("basal_cost"),
            format!("must be in [0, {MAX_ENERGY}], got {}", self.basal_cost),
        );
        v.check(
            (0..=MAX_ENERGY).contains(&self.food_reward),
            &field("food_reward"),
            format!("must be in [0, {MAX_ENERGY}], got {}", self.food_reward),
        );
        v.check(
            (1..=MAX_ENERGY).contains(&self.reproduction_threshold),
            &field("reproduction_threshold"),
            format!(
                "must be in [1, {MAX_ENERGY}], got {}",
                self.reproduction_threshold
            ),
        );
        v.check(
            self.reproduction_cost >= 0 && self.reproduction_cost < self.reproduction_threshold,
            &field("reproduction_cost"),
            format!(
                "must be in [0, reproduction_threshold), got {}",
                self.reproduction_cost
            ),
        );
        v.check(
            self.reproduction_split > 0.0 && self.reproduction_split < 1.0,
            &field("reproduction_split"),
            format!("must be in (0, 1), got {}", self.reproduction_split),
        );
        v
    }
}
