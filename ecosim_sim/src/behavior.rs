// Per-agent behavior rules, run once per live agent per tick.
//
// Herbivores and predators share one skeleton, dispatched on `AgentKind`:
//
//   1. Metabolism: pay `metabolic_cost` (or `basal_cost` while resting after
//      a meal). Energy <= 0 means starvation: the agent is marked dead, its
//      cell released, and nothing else happens for it this tick.
//   2. Resting agents stop here.
//   3. Movement: candidate neighbors are split into preferred (grass for a
//      herbivore, a live herbivore for a predator) and other passable cells.
//      Each group is shuffled, preferred first. Candidates are tried in order
//      and the first claim that the grid accepts wins; an agent with no
//      acceptable candidate stays where it is.
//   4. Feeding: a herbivore eats grass on its destination cell; a predator
//      that moved onto a herbivore has already killed and eaten it. A meal
//      adds `food_reward` and starts `digest_ticks` of rest.
//   5. Reproduction: at `reproduction_threshold` or above, the parent pays
//      `reproduction_cost`, then hands `reproduction_split` of what is left to
//      an offspring placed on a random passable neighbor. No free neighbor,
//      or a share that rounds down to zero, means no birth and no energy
//      change.
//
// Predator pursuit: with `predator_pursuit_radius > 0` and no prey adjacent,
// the non-preferred candidates are stably re-ordered by distance to the
// nearest live herbivore within the radius (ties keep their shuffled order).
//
// Grid and grass failures surface as `CellError`; the engine treats any of
// them as an internal invariant violation.
//
// See also: `engine.rs` which builds the `TickContext` and decides the
// acting order, `species.rs` for the numbers used here.
//
// **Critical constraint: determinism.** Every random choice draws from the
// engine's `SimRng`, in a fixed order per agent.

use crate::agent::AgentPool;
use crate::config::EcoConfig;
use crate::error::CellError;
use crate::grass::GrassField;
use crate::grid::WorldGrid;
use crate::prng::SimRng;
use crate::snapshot::TickStats;
use crate::types::{AgentId, AgentKind, Coord};
use smallvec::SmallVec;

/// Mutable world borrowed from the engine for the duration of one phase.
pub(crate) struct TickContext<'a> {
    pub config: &'a EcoConfig,
    pub grid: &'a mut WorldGrid,
    pub grass: &'a mut GrassField,
    pub pool: &'a mut AgentPool,
    pub rng: &'a mut SimRng,
    pub stats: &'a mut TickStats,
}

/// What an agent ate on arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Meal {
    None,
    Grass,
    Prey,
}

/// Run one agent's turn. Agents that died earlier in the tick are skipped.
pub(crate) fn act(ctx: &mut TickContext<'_>, id: AgentId) -> Result<(), CellError> {
    let config = ctx.config;
    let Some(agent) = ctx.pool.get_mut(id) else {
        return Ok(());
    };
    if !agent.alive {
        return Ok(());
    }
    let kind = agent.kind;
    let params = config.species(kind);
    let from = agent.position;

    let resting = agent.is_resting();
    if resting {
        agent.energy -= params.basal_cost;
        agent.resting -= 1;
    } else {
        agent.energy -= params.metabolic_cost;
    }
    if agent.energy <= 0 {
        return starve(ctx, id, kind, from);
    }
    if resting {
        return Ok(());
    }

    let (dest, meal) = relocate(ctx, id, kind, from)?;
    let meal = match (kind, meal) {
        (AgentKind::Herbivore, Meal::None) if ctx.grass.has_grass(dest) => {
            ctx.grass.consume_grass(dest)?;
            ctx.stats.grass_eaten += 1;
            Meal::Grass
        }
        (_, meal) => meal,
    };
    if meal != Meal::None {
        if let Some(agent) = ctx.pool.get_mut(id) {
            agent.energy = agent.energy.saturating_add(params.food_reward);
            agent.resting = params.digest_ticks;
        }
    }

    reproduce(ctx, id, kind, dest)
}

fn starve(
    ctx: &mut TickContext<'_>,
    id: AgentId,
    kind: AgentKind,
    at: Coord,
) -> Result<(), CellError> {
    ctx.pool.kill(id);
    let removed = ctx.grid.remove_agent(at)?;
    if removed != id {
        return Err(CellError::NotOccupant {
            coord: at,
            expected: id,
        });
    }
    ctx.stats.record_starvation(kind);
    Ok(())
}

/// Ordered movement candidates: preferred cells first, each group shuffled.
fn candidates(ctx: &mut TickContext<'_>, kind: AgentKind, from: Coord) -> SmallVec<[Coord; 8]> {
    let mut preferred: SmallVec<[Coord; 8]> = SmallVec::new();
    let mut others: SmallVec<[Coord; 8]> = SmallVec::new();
    for n in ctx.grid.neighbors(from, ctx.config.neighborhood) {
        if ctx.grid.terrain_at(n).is_rock() {
            continue;
        }
        match (kind, ctx.grid.occupant_at(n)) {
            (AgentKind::Herbivore, None) if ctx.grass.has_grass(n) => preferred.push(n),
            (AgentKind::Predator, Some(prey)) if ctx.pool.is_live(prey, AgentKind::Herbivore) => {
                preferred.push(n)
            }
            (_, None) => others.push(n),
            (_, Some(_)) => {}
        }
    }
    ctx.rng.shuffle(&mut preferred);
    ctx.rng.shuffle(&mut others);

    if kind == AgentKind::Predator && preferred.is_empty() {
        if let Some(target) = nearest_prey(ctx, from) {
            let grid = &*ctx.grid;
            others.sort_by_key(|&c| grid.distance(c, target));
        }
    }

    preferred.extend(others);
    preferred
}

/// Closest live herbivore within the pursuit radius; lowest id on ties.
fn nearest_prey(ctx: &TickContext<'_>, from: Coord) -> Option<Coord> {
    let radius = ctx.config.predator_pursuit_radius;
    if radius == 0 {
        return None;
    }
    ctx.pool
        .live(AgentKind::Herbivore)
        .map(|h| (ctx.grid.distance(from, h.position), h.position))
        .filter(|&(d, _)| d <= radius)
        .min_by_key(|&(d, _)| d)
        .map(|(_, pos)| pos)
}

/// Try candidates in order until one move is accepted. Returns the cell the
/// agent ends up on and whether it caught prey there.
fn relocate(
    ctx: &mut TickContext<'_>,
    id: AgentId,
    kind: AgentKind,
    from: Coord,
) -> Result<(Coord, Meal), CellError> {
    for to in candidates(ctx, kind, from) {
        let mut meal = Meal::None;
        if let Some(occupant) = ctx.grid.occupant_at(to) {
            if kind != AgentKind::Predator || !ctx.pool.is_live(occupant, AgentKind::Herbivore) {
                continue;
            }
            ctx.pool.kill(occupant);
            ctx.grid.remove_agent(to)?;
            ctx.stats.herbivores_eaten += 1;
            meal = Meal::Prey;
        }
        match ctx.grid.move_agent(id, from, to) {
            Ok(()) => {}
            // Claimed since the candidate list was built: try the next one.
            Err(CellError::Occupied { .. }) if meal == Meal::None => continue,
            Err(e) => return Err(e),
        }
        if let Some(agent) = ctx.pool.get_mut(id) {
            agent.position = to;
        }
        return Ok((to, meal));
    }
    Ok((from, Meal::None))
}

fn reproduce(
    ctx: &mut TickContext<'_>,
    id: AgentId,
    kind: AgentKind,
    at: Coord,
) -> Result<(), CellError> {
    let config = ctx.config;
    let params = config.species(kind);
    let energy = match ctx.pool.get(id) {
        Some(agent) if agent.energy >= params.reproduction_threshold => agent.energy,
        _ => return Ok(()),
    };

    let free: SmallVec<[Coord; 8]> = ctx
        .grid
        .neighbors(at, config.neighborhood)
        .into_iter()
        .filter(|&c| ctx.grid.is_passable(c))
        .collect();
    let Some(&spot) = ctx.rng.choose(&free) else {
        return Ok(());
    };

    let remaining = energy - params.reproduction_cost;
    let child_energy = params.offspring_share(remaining);
    // Too little left to hand over: same as having no room.
    if child_energy <= 0 {
        return Ok(());
    }
    if let Some(parent) = ctx.pool.get_mut(id) {
        parent.energy = remaining - child_energy;
    }
    let child = ctx.pool.spawn(kind, spot, child_energy);
    ctx.grid.place_agent(child, spot)?;
    ctx.stats.record_birth(kind);
    Ok(())
}
