use std::collections::HashSet;

use log::debug;
use rand::{seq::SliceRandom, Rng};

use crate::error::CapacityError;

/// Smallest total width (border included) a grid may have.
pub const MIN_WIDTH: i32 = 10;
/// Smallest total height (border included) a grid may have.
pub const MIN_HEIGHT: i32 = 5;

/// Total size of a grid whose playing field is `height` x `width`, or `None`
/// if it does not fit an `i32`.
pub fn with_border(height: i32, width: i32) -> Option<(i32, i32)> {
    Some((height.checked_add(2)?, width.checked_add(2)?))
}

// Random probes before falling back to enumerating the free cells.
const SAMPLE_ATTEMPTS: usize = 64;

const UNIT_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A position on the grid, row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

/// The playable area: a `height` x `width` rectangle whose outermost ring is
/// the border, plus the static walls and teleporters loaded from a map.
#[derive(Debug, Clone, PartialEq)]
pub struct GridModel {
    height: i32,
    width: i32,
    walls: HashSet<Cell>,
    teleporters: Vec<Cell>,
}

impl GridModel {
    /// Creates a grid without obstacles. Dimensions include the border.
    pub fn new(height: i32, width: i32) -> Self {
        Self { height, width, walls: HashSet::new(), teleporters: Vec::new() }
    }

    pub fn with_walls(mut self, walls: impl IntoIterator<Item = Cell>) -> Self {
        self.walls.extend(walls);
        self
    }

    pub fn with_teleporters(mut self, teleporters: impl IntoIterator<Item = Cell>) -> Self {
        for cell in teleporters {
            if !self.teleporters.contains(&cell) {
                self.teleporters.push(cell);
            }
        }
        self
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn walls(&self) -> impl Iterator<Item = &Cell> {
        self.walls.iter()
    }

    pub fn teleporters(&self) -> &[Cell] {
        &self.teleporters
    }

    /// Teleporters only do anything when there is somewhere else to go.
    pub fn teleporters_active(&self) -> bool {
        self.teleporters.len() > 1
    }

    /// Number of interior cells.
    pub fn capacity(&self) -> usize {
        ((self.height - 2).max(0) * (self.width - 2).max(0)) as usize
    }

    pub fn contains_obstacle(&self, cell: Cell) -> bool {
        self.walls.contains(&cell)
    }

    pub fn is_teleporter(&self, cell: Cell) -> bool {
        self.teleporters.contains(&cell)
    }

    pub fn is_interior(&self, cell: Cell) -> bool {
        cell.row >= 1 && cell.row <= self.height - 2 && cell.col >= 1 && cell.col <= self.width - 2
    }

    pub fn is_border(&self, cell: Cell) -> bool {
        cell.row == 0 || cell.col == 0 || cell.row == self.height - 1 || cell.col == self.width - 1
    }

    /// Moves a cell sitting on the border to the opposite interior edge.
    /// Interior cells come back unchanged.
    pub fn wrap(&self, cell: Cell) -> Cell {
        let mut wrapped = cell;

        if wrapped.row <= 0 {
            wrapped.row = self.height - 2;
        } else if wrapped.row >= self.height - 1 {
            wrapped.row = 1;
        }

        if wrapped.col <= 0 {
            wrapped.col = self.width - 2;
        } else if wrapped.col >= self.width - 1 {
            wrapped.col = 1;
        }

        wrapped
    }

    /// Every static cell food may never land on: walls and teleporters.
    pub fn static_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.walls.iter().copied().chain(self.teleporters.iter().copied())
    }

    /// Picks an interior cell outside `excluded`, uniformly at random.
    pub fn random_free_cell<R: Rng + ?Sized>(
        &self,
        excluded: &HashSet<Cell>,
        rng: &mut R,
    ) -> Result<Cell, CapacityError> {
        if self.capacity() == 0 {
            return Err(CapacityError::Exhausted { capacity: 0 });
        }

        for _ in 0..SAMPLE_ATTEMPTS {
            let cell = Cell::new(
                rng.gen_range(1..=self.height - 2),
                rng.gen_range(1..=self.width - 2),
            );
            if !excluded.contains(&cell) {
                return Ok(cell);
            }
        }

        // The board is crowded, so choose among what is actually left
        let free: Vec<Cell> = self.interior_cells().filter(|c| !excluded.contains(c)).collect();
        free.choose(rng)
            .copied()
            .ok_or(CapacityError::Exhausted { capacity: self.capacity() })
    }

    /// Resolves a step onto `entry`. Returns the arrival cell next to one of
    /// the other teleporters, or `None` when no jump happens.
    pub fn teleport<R: Rng + ?Sized>(&self, entry: Cell, rng: &mut R) -> Option<Cell> {
        if !self.teleporters_active() || !self.is_teleporter(entry) {
            return None;
        }

        let targets: Vec<(Cell, Vec<Cell>)> = self
            .teleporters
            .iter()
            .filter(|&&t| t != entry)
            .map(|&t| {
                let arrivals = UNIT_OFFSETS
                    .iter()
                    .map(|&(dr, dc)| t.offset(dr, dc))
                    .filter(|&a| a != entry && self.is_interior(a))
                    .collect::<Vec<_>>();
                (t, arrivals)
            })
            .filter(|(_, arrivals)| !arrivals.is_empty())
            .collect();

        let (target, arrivals) = targets.choose(rng)?;
        let arrival = *arrivals.choose(rng)?;
        debug!("teleport {:?} -> {:?} via {:?}", entry, arrival, target);
        Some(arrival)
    }

    fn interior_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (1..self.height - 1).flat_map(move |row| (1..self.width - 1).map(move |col| Cell::new(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_capacity_excludes_border() {
        let grid = GridModel::new(12, 12);
        assert_eq!(grid.capacity(), 100);
    }

    #[test]
    fn test_border_and_interior() {
        let grid = GridModel::new(12, 12);
        assert!(grid.is_border(Cell::new(0, 5)));
        assert!(grid.is_border(Cell::new(5, 11)));
        assert!(!grid.is_border(Cell::new(1, 1)));
        assert!(grid.is_interior(Cell::new(10, 10)));
        assert!(!grid.is_interior(Cell::new(11, 10)));
    }

    #[test]
    fn test_wrap_to_opposite_edge() {
        let grid = GridModel::new(12, 14);
        assert_eq!(grid.wrap(Cell::new(4, 0)), Cell::new(4, 12));
        assert_eq!(grid.wrap(Cell::new(4, 13)), Cell::new(4, 1));
        assert_eq!(grid.wrap(Cell::new(0, 3)), Cell::new(10, 3));
        assert_eq!(grid.wrap(Cell::new(11, 3)), Cell::new(1, 3));
        assert_eq!(grid.wrap(Cell::new(5, 5)), Cell::new(5, 5));
    }

    #[test]
    fn test_obstacle_queries() {
        let grid = GridModel::new(12, 12)
            .with_walls(vec![Cell::new(3, 3)])
            .with_teleporters(vec![Cell::new(5, 5)]);
        assert!(grid.contains_obstacle(Cell::new(3, 3)));
        assert!(!grid.contains_obstacle(Cell::new(5, 5)));
        assert!(grid.is_teleporter(Cell::new(5, 5)));
        assert_eq!(grid.static_cells().count(), 2);
    }

    #[test]
    fn test_random_free_cell_avoids_excluded() {
        let grid = GridModel::new(5, 10);
        let mut rng = StdRng::seed_from_u64(7);
        // Leave exactly one free interior cell
        let mut excluded: HashSet<Cell> = grid.interior_cells().collect();
        excluded.remove(&Cell::new(2, 4));

        for _ in 0..20 {
            assert_eq!(grid.random_free_cell(&excluded, &mut rng), Ok(Cell::new(2, 4)));
        }
    }

    #[test]
    fn test_random_free_cell_full_grid() {
        let grid = GridModel::new(5, 10);
        let mut rng = StdRng::seed_from_u64(7);
        let excluded: HashSet<Cell> = grid.interior_cells().collect();

        assert_eq!(
            grid.random_free_cell(&excluded, &mut rng),
            Err(CapacityError::Exhausted { capacity: 24 })
        );
    }

    #[test]
    fn test_single_teleporter_is_inert() {
        let grid = GridModel::new(12, 12).with_teleporters(vec![Cell::new(5, 5)]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!grid.teleporters_active());
        assert_eq!(grid.teleport(Cell::new(5, 5), &mut rng), None);
    }

    #[test]
    fn test_teleport_lands_next_to_other_teleporter() {
        let a = Cell::new(3, 3);
        let b = Cell::new(8, 8);
        let c = Cell::new(3, 9);
        let grid = GridModel::new(12, 12).with_teleporters(vec![a, b, c]);
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..200 {
            let arrival = grid.teleport(a, &mut rng).unwrap();
            assert_ne!(arrival, a);
            let adjacent_to = |t: Cell| (arrival.row - t.row).abs() + (arrival.col - t.col).abs() == 1;
            assert!(adjacent_to(b) || adjacent_to(c));
        }
    }

    #[test]
    fn test_teleport_never_returns_entry() {
        // Two neighbouring teleporters: one offset of the target is the entry itself
        let a = Cell::new(4, 4);
        let b = Cell::new(4, 5);
        let grid = GridModel::new(12, 12).with_teleporters(vec![a, b]);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..200 {
            let arrival = grid.teleport(a, &mut rng).unwrap();
            assert_ne!(arrival, a);
            assert!(grid.is_interior(arrival));
        }
    }
}
