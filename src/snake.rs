use std::collections::VecDeque;

use crate::grid::{Cell, GridModel};
use Direction::*;

/// Segments the snake starts out with.
pub const INITIAL_SNAKE_LENGTH: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step as (rows, columns).
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }

    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Left, Right) | (Right, Left))
    }

    pub fn head_char(&self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// What happens when the head runs into the outer border.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoundaryMode {
    /// Reappear on the opposite side.
    Wrap,
    /// Die.
    Bounded,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MoveRules {
    pub boundary: BoundaryMode,
    /// When false a 180 degree turn is ignored and the snake keeps going.
    pub allow_reversal: bool,
}

impl Default for MoveRules {
    fn default() -> Self {
        MoveRules { boundary: BoundaryMode::Wrap, allow_reversal: false }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Collision {
    SelfCollision,
    WallCollision,
    BoundaryDeath,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Cell, old_head: Cell },
    Crashed(Collision),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Cell>,
    direction: Direction,
    growth: u32,
}

impl Snake {
    /// Builds a straight snake whose head sits at `head`, trailing away from `direction`.
    pub fn new(head: Cell, size: usize, direction: Direction) -> Self {
        let (d_row, d_col) = direction.delta();

        let body = (0..size.max(1) as i32)
            .map(|i| head.offset(-d_row * i, -d_col * i))
            .collect();
        Snake { body, direction, growth: 0 }
    }

    /// Builds a snake from explicit segments, head first.
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>, direction: Direction) -> Self {
        Snake { body: cells.into_iter().collect(), direction, growth: 0 }
    }

    /// The snake every game starts with: four segments heading right, near the
    /// top left corner and clamped into the grid.
    pub fn starting(grid: &GridModel) -> Self {
        let head = Cell::new(4.min(grid.height() - 2), 10.min(grid.width() - 2));
        Snake::new(head, INITIAL_SNAKE_LENGTH, Right)
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_growth(&self) -> u32 {
        self.growth
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    pub fn head_char(&self) -> char {
        self.direction.head_char()
    }

    /// Applies the reversal rule to a requested direction.
    pub fn resolve_direction(&self, requested: Direction, allow_reversal: bool) -> Direction {
        if !allow_reversal && requested.is_opposite(self.direction) {
            self.direction
        } else {
            requested
        }
    }

    /// Moves the head one cell. The tail is left in place until `settle`.
    /// A crash leaves the snake untouched.
    pub fn advance(&mut self, direction: Direction, grid: &GridModel, rules: MoveRules) -> MoveResult {
        let direction = self.resolve_direction(direction, rules.allow_reversal);
        let old_head = self.head();
        let (d_row, d_col) = direction.delta();
        let mut new_head = old_head.offset(d_row, d_col);

        if grid.is_border(new_head) {
            if rules.boundary == BoundaryMode::Bounded {
                return MoveResult::Crashed(Collision::BoundaryDeath);
            }
            new_head = grid.wrap(new_head);
        }

        if let Some(collision) = self.collision_at(new_head, grid, 0) {
            return MoveResult::Crashed(collision);
        }

        self.direction = direction;
        self.body.push_front(new_head);
        MoveResult::Moved { new_head, old_head }
    }

    /// Moves the freshly inserted head to `arrival` after a teleport.
    pub fn relocate_head(&mut self, arrival: Cell, grid: &GridModel) -> Result<(), Collision> {
        if let Some(collision) = self.collision_at(arrival, grid, 1) {
            return Err(collision);
        }
        self.body[0] = arrival;
        Ok(())
    }

    /// Finishes the move: the tail stays on growth or while queued growth
    /// remains, otherwise it is dropped and returned.
    pub fn settle(&mut self, grow: bool) -> Option<Cell> {
        if grow {
            None
        } else if self.growth > 0 {
            self.growth -= 1;
            None
        } else {
            self.body.pop_back()
        }
    }

    /// Drops the back half of the snake. The head always survives.
    pub fn halve(&mut self) -> Vec<Cell> {
        let cut = self.body.len() / 2;
        (0..cut).filter_map(|_| self.body.pop_back()).collect()
    }

    pub fn queue_growth(&mut self, segments: u32) {
        self.growth += segments;
    }

    // Segments from `skip` on are checked. Food never sits under the body, so
    // the tail moves away this tick unless queued growth holds it in place.
    fn collision_at(&self, cell: Cell, grid: &GridModel, skip: usize) -> Option<Collision> {
        let keep = if self.growth == 0 { self.body.len() - 1 } else { self.body.len() };

        if self.body.iter().take(keep).skip(skip).any(|&c| c == cell) {
            Some(Collision::SelfCollision)
        } else if grid.contains_obstacle(cell) {
            Some(Collision::WallCollision)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid() -> GridModel {
        GridModel::new(12, 12)
    }

    #[test]
    fn test_opposite_directions() {
        assert!(Up.is_opposite(Down));
        assert!(Left.is_opposite(Right));
        assert!(!Up.is_opposite(Left));
        assert!(!Right.is_opposite(Right));
    }

    #[test]
    fn test_starting_snake() {
        let snake = Snake::starting(&open_grid());
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Cell::new(4, 10));
        assert_eq!(snake.body()[3], Cell::new(4, 7));
        assert_eq!(snake.get_direction(), Right);
    }

    #[test]
    fn test_starting_snake_fits_minimum_grid() {
        let grid = GridModel::new(5, 10);
        let snake = Snake::starting(&grid);
        assert!(snake.body().iter().all(|&c| grid.is_interior(c)));
    }

    #[test]
    fn test_advance_then_settle_keeps_length() {
        let grid = open_grid();
        let mut snake = Snake::new(Cell::new(5, 5), 4, Right);

        let res = snake.advance(Down, &grid, MoveRules::default());
        assert_eq!(res, MoveResult::Moved { new_head: Cell::new(6, 5), old_head: Cell::new(5, 5) });
        assert_eq!(snake.len(), 5);

        assert_eq!(snake.settle(false), Some(Cell::new(5, 2)));
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.get_direction(), Down);
    }

    #[test]
    fn test_growth_keeps_tail() {
        let grid = open_grid();
        let mut snake = Snake::new(Cell::new(5, 5), 4, Right);

        snake.advance(Right, &grid, MoveRules::default());
        assert_eq!(snake.settle(true), None);
        assert_eq!(snake.len(), 5);
    }

    #[test]
    fn test_queued_growth_consumed_one_per_tick() {
        let grid = open_grid();
        let mut snake = Snake::new(Cell::new(5, 3), 1, Right);
        snake.queue_growth(2);

        for expected in [2, 3, 3] {
            snake.advance(Right, &grid, MoveRules::default());
            snake.settle(false);
            assert_eq!(snake.len(), expected);
        }
        assert_eq!(snake.pending_growth(), 0);
    }

    #[test]
    fn test_reversal_is_ignored() {
        let grid = open_grid();
        let mut snake = Snake::new(Cell::new(5, 5), 4, Right);

        let res = snake.advance(Left, &grid, MoveRules::default());
        assert_eq!(res, MoveResult::Moved { new_head: Cell::new(5, 6), old_head: Cell::new(5, 5) });
        assert_eq!(snake.get_direction(), Right);
    }

    #[test]
    fn test_reversal_kills_when_allowed() {
        let grid = open_grid();
        let mut snake = Snake::new(Cell::new(5, 5), 4, Right);
        let rules = MoveRules { allow_reversal: true, ..MoveRules::default() };

        assert_eq!(snake.advance(Left, &grid, rules), MoveResult::Crashed(Collision::SelfCollision));
    }

    #[test]
    fn test_wrap_left_edge() {
        let grid = open_grid();
        let mut snake = Snake::new(Cell::new(5, 1), 1, Left);

        let res = snake.advance(Left, &grid, MoveRules::default());
        assert_eq!(res, MoveResult::Moved { new_head: Cell::new(5, 10), old_head: Cell::new(5, 1) });
    }

    #[test]
    fn test_bounded_left_edge_dies_untouched() {
        let grid = open_grid();
        let mut snake = Snake::new(Cell::new(5, 1), 3, Up);
        let before = snake.clone();
        let rules = MoveRules { boundary: BoundaryMode::Bounded, allow_reversal: false };

        assert_eq!(snake.advance(Left, &grid, rules), MoveResult::Crashed(Collision::BoundaryDeath));
        assert_eq!(snake, before);
    }

    #[test]
    fn test_chasing_own_tail_is_safe() {
        let grid = open_grid();
        // A 2x2 loop: head (5,5) -> (5,4) -> (6,4) -> tail (6,5)
        let loop_cells = [Cell::new(5, 5), Cell::new(5, 4), Cell::new(6, 4), Cell::new(6, 5)];
        let mut snake = Snake::from_cells(loop_cells, Up);

        let res = snake.advance(Left, &grid, MoveRules::default());
        assert_eq!(res, MoveResult::Crashed(Collision::SelfCollision));

        // Turning into the tail cell is fine because it moves away this tick
        snake.direction = Right;
        let res = snake.advance(Down, &grid, MoveRules::default());
        assert_eq!(res, MoveResult::Moved { new_head: Cell::new(6, 5), old_head: Cell::new(5, 5) });
        snake.settle(false);
        assert_eq!(snake.len(), 4);
    }

    #[test]
    fn test_tail_blocks_while_growing() {
        let grid = open_grid();
        let loop_cells = [Cell::new(5, 5), Cell::new(5, 4), Cell::new(6, 4), Cell::new(6, 5)];
        let mut snake = Snake::from_cells(loop_cells, Right);
        snake.queue_growth(1);

        assert_eq!(snake.advance(Down, &grid, MoveRules::default()), MoveResult::Crashed(Collision::SelfCollision));
    }

    #[test]
    fn test_wall_collision() {
        let grid = open_grid().with_walls(vec![Cell::new(5, 6)]);
        let mut snake = Snake::new(Cell::new(5, 5), 4, Right);

        assert_eq!(snake.advance(Right, &grid, MoveRules::default()), MoveResult::Crashed(Collision::WallCollision));
        assert_eq!(snake.len(), 4);
    }

    #[test]
    fn test_relocate_head() {
        let grid = open_grid().with_walls(vec![Cell::new(9, 9)]);
        let mut snake = Snake::new(Cell::new(5, 5), 3, Right);
        snake.advance(Right, &grid, MoveRules::default());

        assert_eq!(snake.relocate_head(Cell::new(9, 9), &grid), Err(Collision::WallCollision));
        assert_eq!(snake.relocate_head(Cell::new(5, 4), &grid), Err(Collision::SelfCollision));
        assert_eq!(snake.relocate_head(Cell::new(2, 2), &grid), Ok(()));
        assert_eq!(snake.head(), Cell::new(2, 2));
    }

    #[test]
    fn test_halve_keeps_head() {
        let mut snake = Snake::new(Cell::new(5, 8), 7, Right);
        let removed = snake.halve();
        assert_eq!(removed.len(), 3);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Cell::new(5, 8));

        let mut single = Snake::new(Cell::new(5, 8), 1, Right);
        assert!(single.halve().is_empty());
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_head_char() {
        assert_eq!(Snake::new(Cell::new(5, 5), 1, Down).head_char(), 'v');
        assert_eq!(Snake::new(Cell::new(5, 5), 1, Left).head_char(), '<');
    }
}
