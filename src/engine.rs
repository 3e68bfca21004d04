//! The simulation core: one call to [`GameEngine::tick`] advances a
//! [`GameSession`] by exactly one step. Nothing in here draws, reads keys or
//! touches the filesystem.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::error::CapacityError;
use crate::food::{FoodEffect, FoodManager};
use crate::grid::{Cell, GridModel};
use crate::snake::{Collision, Direction, MoveResult, MoveRules, Snake};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    SelfCollision,
    WallCollision,
    BoundaryDeath,
    Quit,
    /// The board is full.
    Win,
}

impl From<Collision> for GameOverReason {
    fn from(collision: Collision) -> Self {
        match collision {
            Collision::SelfCollision => GameOverReason::SelfCollision,
            Collision::WallCollision => GameOverReason::WallCollision,
            Collision::BoundaryDeath => GameOverReason::BoundaryDeath,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    Paused,
    GameOver(GameOverReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    GameOver(GameOverReason),
}

/// Gameplay switches that stay fixed for a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub movement: MoveRules,
    /// Normal food kept on the board at all times.
    pub food_count: usize,
    pub special_food: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Rules { movement: MoveRules::default(), food_count: 1, special_food: false }
    }
}

/// Wall-clock survival time with pauses taken out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SurvivalClock {
    started: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl SurvivalClock {
    fn new(now: Instant) -> Self {
        SurvivalClock { started: now, paused_at: None, paused_total: Duration::ZERO }
    }

    fn pause(&mut self, now: Instant) {
        self.paused_at.get_or_insert(now);
    }

    fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    fn elapsed(&self, now: Instant) -> Duration {
        let ongoing = self.paused_at.map_or(Duration::ZERO, |p| now.saturating_duration_since(p));
        now.saturating_duration_since(self.started)
            .saturating_sub(self.paused_total)
            .saturating_sub(ongoing)
    }
}

/// Everything that changes during one game. Owned by the caller and handed
/// to the engine on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub snake: Snake,
    pub food: FoodManager,
    pub score: u32,
    pub frame: u64,
    pub state: GameState,
    clock: SurvivalClock,
}

impl GameSession {
    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::GameOver(_))
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        match self.state {
            GameState::GameOver(reason) => Some(reason),
            _ => None,
        }
    }

    /// Time spent playing, not counting pauses.
    pub fn survival_time(&self, now: Instant) -> Duration {
        self.clock.elapsed(now)
    }
}

pub struct GameEngine {
    grid: GridModel,
    rules: Rules,
    rng: StdRng,
}

impl GameEngine {
    pub fn new(grid: GridModel, rules: Rules) -> Self {
        GameEngine { grid, rules, rng: StdRng::from_entropy() }
    }

    /// Same engine with a reproducible random stream.
    pub fn with_seed(grid: GridModel, rules: Rules, seed: u64) -> Self {
        GameEngine { grid, rules, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Starts a game: the starting snake plus a full set of normal food.
    pub fn new_session(&mut self, now: Instant) -> Result<GameSession, CapacityError> {
        let snake = Snake::starting(&self.grid);
        let mut food = FoodManager::new(self.rules.food_count, self.rules.special_food);
        let occupied = self.occupied(&snake);
        food.fill(&occupied, &self.grid, &mut self.rng)?;

        info!(
            "new game on a {}x{} grid with {} food",
            self.grid.height(),
            self.grid.width(),
            self.rules.food_count
        );

        Ok(GameSession {
            snake,
            food,
            score: 0,
            frame: 0,
            state: GameState::Running,
            clock: SurvivalClock::new(now),
        })
    }

    /// Advances a running session by one step. `input` is the latest
    /// direction pressed, `None` keeps the current heading. Paused or finished
    /// sessions are left alone.
    pub fn tick(
        &mut self,
        session: &mut GameSession,
        input: Option<Direction>,
    ) -> Result<TickOutcome, CapacityError> {
        match session.state {
            GameState::Running => {}
            GameState::Paused => return Ok(TickOutcome::Continue),
            GameState::GameOver(reason) => return Ok(TickOutcome::GameOver(reason)),
        }

        let direction = input.unwrap_or_else(|| session.snake.get_direction());

        let new_head = match session.snake.advance(direction, &self.grid, self.rules.movement) {
            MoveResult::Moved { new_head, .. } => new_head,
            MoveResult::Crashed(collision) => return Ok(self.end(session, collision.into())),
        };

        if let Some(arrival) = self.grid.teleport(new_head, &mut self.rng) {
            if let Err(collision) = session.snake.relocate_head(arrival, &self.grid) {
                return Ok(self.end(session, collision.into()));
            }
        }

        // Only steps that land count as frames
        session.frame += 1;

        // The head is in but the tail has not moved yet, so a snake about to
        // fill the last free cell overflows the board here
        let taken = session.snake.len()
            + self.grid.static_cells().count()
            + session.food.len();
        if taken > self.grid.capacity() {
            return Ok(self.end(session, GameOverReason::Win));
        }

        session.food.tick();

        let head = session.snake.head();
        let consumed = session.food.try_consume(head);
        let mut grow = false;
        let mut halve = false;

        if let Some(consumption) = consumed {
            session.score += consumption.points;
            match consumption.effect {
                FoodEffect::Grow => grow = true,
                FoodEffect::Halve => halve = true,
                FoodEffect::QueueGrowth(segments) => session.snake.queue_growth(segments),
            }
        }

        session.snake.settle(grow);
        if halve {
            let cut = session.snake.halve();
            debug!("snake halved, lost {} segments", cut.len());
        }

        let occupied = self.occupied(&session.snake);
        session.food.fill(&occupied, &self.grid, &mut self.rng)?;
        session.food.roll_special(session.frame, &occupied, &self.grid, &mut self.rng);

        Ok(TickOutcome::Continue)
    }

    pub fn pause(&self, session: &mut GameSession, now: Instant) {
        if session.state == GameState::Running {
            session.state = GameState::Paused;
            session.clock.pause(now);
        }
    }

    pub fn resume(&self, session: &mut GameSession, now: Instant) {
        if session.state == GameState::Paused {
            session.state = GameState::Running;
            session.clock.resume(now);
        }
    }

    pub fn quit(&self, session: &mut GameSession, now: Instant) {
        if !session.is_over() {
            session.clock.resume(now);
            self.end(session, GameOverReason::Quit);
        }
    }

    fn end(&self, session: &mut GameSession, reason: GameOverReason) -> TickOutcome {
        info!("game over after {} frames: {:?}, score {}", session.frame, reason, session.score);
        session.state = GameState::GameOver(reason);
        TickOutcome::GameOver(reason)
    }

    fn occupied(&self, snake: &Snake) -> HashSet<Cell> {
        snake.body().iter().copied().chain(self.grid.static_cells()).collect()
    }
}
