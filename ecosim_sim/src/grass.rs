// Vegetation layer over the grid.
//
// Each cell carries a `GrassCell`: present/absent, a regrow countdown, and a
// `fertile` flag (false on rock, so rock never grows grass). The layer is
// independent of mobile occupants: grass can regrow under a standing agent.
//
// Lifecycle of a fertile cell:
//   Present --consume_grass()--> Absent(countdown = regrow_ticks)
//   Absent(n > 0) --tick_regrowth()--> Absent(n - 1), or Present when n hits 0
// An Absent cell with countdown 0 is dormant and never regrows on its own;
// only `bare()` fields start that way (used to hand-build scenarios).
//
// With `regrow_needs_neighbor` set, a countdown only advances on ticks where
// an orthogonal neighbor held grass at the start of the regrowth pass, so
// grazed-out regions recover from their edges inward.
//
// See also: `config.rs` for `GrassParams`, `behavior.rs` where herbivores
// call `consume_grass()`, `engine.rs` which runs `tick_regrowth()` first in
// every tick.

use crate::config::GrassParams;
use crate::error::CellError;
use crate::grid::WorldGrid;
use crate::prng::SimRng;
use crate::types::Coord;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrassState {
    Absent,
    Present,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrassCell {
    pub state: GrassState,
    /// Ticks until an Absent cell turns Present. 0 while Present or dormant.
    pub countdown: u32,
    /// False on rock.
    pub fertile: bool,
}

impl GrassCell {
    const ROCK: GrassCell = GrassCell {
        state: GrassState::Absent,
        countdown: 0,
        fertile: false,
    };
    const BARE: GrassCell = GrassCell {
        state: GrassState::Absent,
        countdown: 0,
        fertile: true,
    };
    const GROWN: GrassCell = GrassCell {
        state: GrassState::Present,
        countdown: 0,
        fertile: true,
    };

    pub fn is_present(self) -> bool {
        self.state == GrassState::Present
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrassField {
    /// Same indexing as `WorldGrid`: x + y * width.
    cells: Vec<GrassCell>,
    width: u32,
    height: u32,
    regrow_ticks: u32,
    regrow_needs_neighbor: bool,
}

impl GrassField {
    /// Seed grass on a fraction `params.initial_coverage` of open cells.
    ///
    /// Unseeded open cells start Absent with a countdown drawn from
    /// `1..=regrow_ticks`, so they fill in over the first regrow period.
    pub fn new(grid: &WorldGrid, params: &GrassParams, rng: &mut SimRng) -> Self {
        let mut field = Self::bare(grid, params);
        let regrow = params.regrow_ticks.max(1) as u64;
        for cell in field.cells.iter_mut().filter(|c| c.fertile) {
            if params.initial_coverage >= 1.0 || rng.chance(params.initial_coverage) {
                *cell = GrassCell::GROWN;
            } else {
                cell.countdown = rng.range_u64(1, regrow + 1) as u32;
            }
        }
        field
    }

    /// No grass anywhere and nothing regrowing. Grass appears only where it
    /// is planted or, after being eaten, regrows.
    pub fn bare(grid: &WorldGrid, params: &GrassParams) -> Self {
        let cells = grid
            .terrain_layer()
            .into_iter()
            .map(|t| if t.is_rock() { GrassCell::ROCK } else { GrassCell::BARE })
            .collect();
        Self {
            cells,
            width: grid.width(),
            height: grid.height(),
            regrow_ticks: params.regrow_ticks,
            regrow_needs_neighbor: params.regrow_needs_neighbor,
        }
    }

    fn index(&self, coord: Coord) -> usize {
        let x = (coord.x as i64).rem_euclid(self.width as i64) as usize;
        let y = (coord.y as i64).rem_euclid(self.height as i64) as usize;
        x + y * self.width as usize
    }

    fn coord_of(&self, index: usize) -> Coord {
        let w = self.width as usize;
        Coord::new((index % w) as i32, (index / w) as i32)
    }

    /// Make a fertile cell Present immediately.
    pub fn plant(&mut self, coord: Coord) -> Result<(), CellError> {
        let i = self.index(coord);
        if !self.cells[i].fertile {
            return Err(CellError::Rock(self.coord_of(i)));
        }
        self.cells[i] = GrassCell::GROWN;
        Ok(())
    }

    pub fn has_grass(&self, coord: Coord) -> bool {
        self.cells[self.index(coord)].is_present()
    }

    pub fn cell(&self, coord: Coord) -> GrassCell {
        self.cells[self.index(coord)]
    }

    pub fn regrow_ticks(&self) -> u32 {
        self.regrow_ticks
    }

    /// Eat the grass on a cell and start its regrow countdown.
    pub fn consume_grass(&mut self, coord: Coord) -> Result<(), CellError> {
        let i = self.index(coord);
        let cell = &mut self.cells[i];
        if !cell.is_present() {
            return Err(CellError::NoGrass(Coord::new(
                (i % self.width as usize) as i32,
                (i / self.width as usize) as i32,
            )));
        }
        cell.state = GrassState::Absent;
        cell.countdown = self.regrow_ticks;
        Ok(())
    }

    /// Advance every active countdown by one tick. Returns how many cells
    /// turned Present.
    pub fn tick_regrowth(&mut self) -> u32 {
        // Decide against the pre-pass state so cells regrown this tick do not
        // feed the neighbor rule until the next one.
        let advancing: Vec<usize> = (0..self.cells.len())
            .filter(|&i| {
                let c = self.cells[i];
                c.fertile
                    && !c.is_present()
                    && c.countdown > 0
                    && (!self.regrow_needs_neighbor || self.has_grass_neighbor(i))
            })
            .collect();

        let mut regrown = 0;
        for i in advancing {
            let cell = &mut self.cells[i];
            cell.countdown -= 1;
            if cell.countdown == 0 {
                cell.state = GrassState::Present;
                regrown += 1;
            }
        }
        regrown
    }

    fn has_grass_neighbor(&self, index: usize) -> bool {
        let c = self.coord_of(index);
        [(0, -1), (1, 0), (0, 1), (-1, 0)]
            .iter()
            .any(|&(dx, dy)| self.has_grass(c.offset(dx, dy)))
    }

    /// Number of cells with grass.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_present()).count()
    }

    /// Presence of grass per cell, row-major.
    pub fn layer(&self) -> Vec<bool> {
        self.cells.iter().map(|c| c.is_present()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::RockMask;

    fn params(regrow: u32) -> GrassParams {
        GrassParams {
            regrow_ticks: regrow,
            initial_coverage: 1.0,
            regrow_needs_neighbor: false,
        }
    }

    fn grid_with_rock(rock: Coord) -> WorldGrid {
        let mut bits = vec![false; 25];
        bits[(rock.x + rock.y * 5) as usize] = true;
        WorldGrid::new(&RockMask::from_bits(5, 5, bits))
    }

    #[test]
    fn full_coverage_skips_rock() {
        let grid = grid_with_rock(Coord::new(2, 2));
        let field = GrassField::new(&grid, &params(5), &mut SimRng::new(1));
        assert_eq!(field.count(), 24);
        assert!(!field.has_grass(Coord::new(2, 2)));
        assert!(field.has_grass(Coord::new(0, 0)));
    }

    #[test]
    fn regrows_exactly_after_regrow_ticks() {
        let grid = WorldGrid::open(4, 4);
        let mut field = GrassField::new(&grid, &params(3), &mut SimRng::new(1));
        let c = Coord::new(1, 1);
        field.consume_grass(c).unwrap();
        assert!(!field.has_grass(c));

        assert_eq!(field.tick_regrowth(), 0);
        assert!(!field.has_grass(c));
        assert_eq!(field.tick_regrowth(), 0);
        assert!(!field.has_grass(c));
        assert_eq!(field.tick_regrowth(), 1);
        assert!(field.has_grass(c));
        assert_eq!(field.cell(c).countdown, 0);
    }

    #[test]
    fn consume_absent_fails() {
        let grid = WorldGrid::open(3, 3);
        let mut field = GrassField::new(&grid, &params(2), &mut SimRng::new(1));
        field.consume_grass(Coord::new(0, 0)).unwrap();
        assert_eq!(
            field.consume_grass(Coord::new(3, 3)),
            Err(CellError::NoGrass(Coord::new(0, 0)))
        );
    }

    #[test]
    fn rock_never_grows_grass() {
        let grid = grid_with_rock(Coord::new(0, 0));
        let mut field = GrassField::new(&grid, &params(1), &mut SimRng::new(1));
        assert_eq!(field.plant(Coord::new(0, 0)), Err(CellError::Rock(Coord::new(0, 0))));
        for _ in 0..10 {
            field.tick_regrowth();
            assert!(!field.has_grass(Coord::new(0, 0)));
        }
    }

    #[test]
    fn bare_field_stays_bare_until_planted() {
        let grid = WorldGrid::open(4, 4);
        let mut field = GrassField::bare(&grid, &params(2));
        for _ in 0..5 {
            assert_eq!(field.tick_regrowth(), 0);
        }
        assert_eq!(field.count(), 0);
        field.plant(Coord::new(0, 1)).unwrap();
        assert_eq!(field.count(), 1);
        assert!(field.has_grass(Coord::new(0, 1)));
    }

    #[test]
    fn zero_coverage_fills_in_within_one_period() {
        let grid = WorldGrid::open(10, 10);
        let p = GrassParams {
            regrow_ticks: 6,
            initial_coverage: 0.0,
            regrow_needs_neighbor: false,
        };
        let mut field = GrassField::new(&grid, &p, &mut SimRng::new(3));
        assert_eq!(field.count(), 0);
        for _ in 0..6 {
            field.tick_regrowth();
        }
        assert_eq!(field.count(), 100);
    }

    #[test]
    fn partial_coverage_is_roughly_proportional() {
        let grid = WorldGrid::open(50, 50);
        let p = GrassParams {
            regrow_ticks: 10,
            initial_coverage: 0.5,
            regrow_needs_neighbor: false,
        };
        let field = GrassField::new(&grid, &p, &mut SimRng::new(17));
        let frac = field.count() as f64 / 2500.0;
        assert!((0.4..0.6).contains(&frac), "coverage {frac}");
    }

    #[test]
    fn neighbor_rule_stalls_isolated_cells() {
        let grid = WorldGrid::open(3, 3);
        let mut p = params(2);
        p.regrow_needs_neighbor = true;
        let mut field = GrassField::new(&grid, &p, &mut SimRng::new(1));
        // Graze everything.
        for c in grid.coords() {
            field.consume_grass(c).unwrap();
        }
        for _ in 0..10 {
            assert_eq!(field.tick_regrowth(), 0);
        }
        assert_eq!(field.count(), 0);
    }

    #[test]
    fn neighbor_rule_regrows_next_to_grass() {
        let grid = WorldGrid::open(5, 1);
        let mut p = params(2);
        p.regrow_needs_neighbor = true;
        let mut field = GrassField::new(&grid, &p, &mut SimRng::new(1));
        field.consume_grass(Coord::new(2, 0)).unwrap();
        field.tick_regrowth();
        assert!(!field.has_grass(Coord::new(2, 0)));
        field.tick_regrowth();
        assert!(field.has_grass(Coord::new(2, 0)));
    }
}
