// Toroidal 2D grid: terrain plus at most one mobile occupant per cell.
//
// Cells are stored in a flat `Vec<Cell>` indexed by `x + y * width`, giving
// O(1) access. Unlike a bounded grid, there is no out-of-bounds case: every
// accessor first normalizes its `Coord` with `wrap()` (Euclidean remainder on
// each axis), so `(-1, 0)` is the last column and `(width, 0)` the first.
//
// Occupancy is the claim protocol. `place_agent()` and `move_agent()`
// re-validate the destination on every call and refuse rock or an occupied
// cell, so even if a caller skipped `is_passable()`, two agents can never end
// up in one cell. The grid only stores IDs; agent state lives in
// `agent::AgentPool`, and `engine.rs` keeps the two in agreement.
//
// See also: `terrain.rs` for the rock mask fed into `WorldGrid::new()`,
// `grass.rs` for the vegetation layer that shares this indexing, `engine.rs`
// which owns the grid for the whole run.
//
// **Critical constraint: determinism.** Neighbor lists come back in a fixed
// order (orthogonal N/E/S/W, then diagonals); any randomization happens in the
// caller with the simulation's `SimRng`.

use crate::error::CellError;
use crate::terrain::RockMask;
use crate::types::{AgentId, Coord, Neighborhood, Terrain};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    pub occupant: Option<AgentId>,
}

/// The wrap-around world grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldGrid {
    /// Flat storage: index = x + y * width.
    cells: Vec<Cell>,
    width: u32,
    height: u32,
}

impl WorldGrid {
    /// Create a grid of open cells. Panics on a zero dimension; configs are
    /// validated before a grid is ever built.
    pub fn open(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        Self {
            cells: vec![Cell::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    /// Create a grid whose terrain comes from a rock mask.
    pub fn new(mask: &RockMask) -> Self {
        let mut grid = Self::open(mask.width(), mask.height());
        for (cell, &rock) in grid.cells.iter_mut().zip(mask.bits()) {
            if rock {
                cell.terrain = Terrain::Rock;
            }
        }
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Normalize any integer pair onto the torus.
    pub fn wrap(&self, x: i64, y: i64) -> Coord {
        Coord::new(
            x.rem_euclid(self.width as i64) as i32,
            y.rem_euclid(self.height as i64) as i32,
        )
    }

    /// Normalize an existing coordinate.
    pub fn wrap_coord(&self, coord: Coord) -> Coord {
        self.wrap(coord.x as i64, coord.y as i64)
    }

    /// Flat index of a cell (after wrapping).
    pub fn index(&self, coord: Coord) -> usize {
        let c = self.wrap_coord(coord);
        c.x as usize + c.y as usize * self.width as usize
    }

    /// Coordinate of a flat index. Panics if `index >= cell_count()`.
    pub fn coord_of(&self, index: usize) -> Coord {
        assert!(index < self.cells.len(), "cell index out of range");
        let w = self.width as usize;
        Coord::new((index % w) as i32, (index / w) as i32)
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.cells.len()).map(|i| self.coord_of(i))
    }

    pub fn terrain_at(&self, coord: Coord) -> Terrain {
        self.cells[self.index(coord)].terrain
    }

    pub fn occupant_at(&self, coord: Coord) -> Option<AgentId> {
        self.cells[self.index(coord)].occupant
    }

    /// Open terrain and no occupant.
    pub fn is_passable(&self, coord: Coord) -> bool {
        let cell = &self.cells[self.index(coord)];
        !cell.terrain.is_rock() && cell.occupant.is_none()
    }

    /// Claim a cell for `id`. Refuses rock and occupied cells.
    pub fn place_agent(&mut self, id: AgentId, coord: Coord) -> Result<(), CellError> {
        let coord = self.wrap_coord(coord);
        let i = self.index(coord);
        let cell = &mut self.cells[i];
        if cell.terrain.is_rock() {
            return Err(CellError::Rock(coord));
        }
        if let Some(occupant) = cell.occupant {
            return Err(CellError::Occupied { coord, occupant });
        }
        cell.occupant = Some(id);
        Ok(())
    }

    /// Release a cell, returning who was there.
    pub fn remove_agent(&mut self, coord: Coord) -> Result<AgentId, CellError> {
        let coord = self.wrap_coord(coord);
        let i = self.index(coord);
        self.cells[i].occupant.take().ok_or(CellError::Empty(coord))
    }

    /// Move `id` from `from` to `to` in one step.
    ///
    /// Fails without changing anything if `from` does not hold `id` or `to`
    /// is not passable (this includes `to == from`).
    pub fn move_agent(&mut self, id: AgentId, from: Coord, to: Coord) -> Result<(), CellError> {
        let from = self.wrap_coord(from);
        let to = self.wrap_coord(to);
        if self.occupant_at(from) != Some(id) {
            return Err(CellError::NotOccupant {
                coord: from,
                expected: id,
            });
        }
        let dest = self.cells[self.index(to)];
        if dest.terrain.is_rock() {
            return Err(CellError::Rock(to));
        }
        if let Some(occupant) = dest.occupant {
            return Err(CellError::Occupied { coord: to, occupant });
        }
        let fi = self.index(from);
        let ti = self.index(to);
        self.cells[fi].occupant = None;
        self.cells[ti].occupant = Some(id);
        Ok(())
    }

    /// Distinct wrapped neighbors of `coord`, excluding `coord` itself.
    ///
    /// On very small grids several offsets can land on the same cell (or back
    /// on the origin); duplicates are dropped so each cell appears once.
    pub fn neighbors(&self, coord: Coord, policy: Neighborhood) -> SmallVec<[Coord; 8]> {
        let origin = self.wrap_coord(coord);
        let mut out: SmallVec<[Coord; 8]> = SmallVec::new();
        for (dx, dy) in policy.offsets() {
            let n = self.wrap(origin.x as i64 + dx as i64, origin.y as i64 + dy as i64);
            if n != origin && !out.contains(&n) {
                out.push(n);
            }
        }
        out
    }

    /// Shortest Manhattan distance between two cells on the torus.
    pub fn distance(&self, a: Coord, b: Coord) -> u32 {
        let a = self.wrap_coord(a);
        let b = self.wrap_coord(b);
        let dx = a.x.abs_diff(b.x);
        let dy = a.y.abs_diff(b.y);
        dx.min(self.width - dx) + dy.min(self.height - dy)
    }

    /// Number of rock cells.
    pub fn rock_count(&self) -> usize {
        self.cells.iter().filter(|c| c.terrain.is_rock()).count()
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupant.is_some()).count()
    }

    /// Iterate `(coord, occupant)` over every occupied cell, row-major.
    pub fn occupants(&self) -> impl Iterator<Item = (Coord, AgentId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.occupant.map(|id| (self.coord_of(i), id)))
    }

    /// Terrain of every cell in row-major order.
    pub fn terrain_layer(&self) -> Vec<Terrain> {
        self.cells.iter().map(|c| c.terrain).collect()
    }
}
