use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind};
use crossterm::style::{Color, Stylize};

use crate::config::Setup;
use crate::engine::{GameEngine, GameOverReason, GameSession, TickOutcome};
use crate::food::FoodKind;
use crate::grid::Cell;
use crate::input::{InputEvent, InputHandler};
use crate::scores::ScoreLedger;
use crate::snake::Direction;
use crate::term::{Glyph, TermManager};
use crate::TermInt;

const TITLE: &str = "SNAKE";
const SNAKE_BODY_CHAR: char = ' ';
const TELEPORTER_CHAR: char = '?';
const DEAD_SNAKE_CHAR: char = 'X';

/// How a finished game went, for the report printed after the terminal is restored.
#[derive(Debug, Clone, PartialEq)]
pub struct GameReport {
    pub score: u32,
    pub reason: GameOverReason,
    pub survival: Duration,
    /// The window was resized, which ends the game.
    pub resized: bool,
    /// The player got past the intro screen.
    pub started: bool,
}

pub struct SnakeGame {
    setup: Setup,
    engine: GameEngine,
    input: InputHandler,
    term: TermManager,
    resized: bool,
}

impl SnakeGame {
    pub fn new(setup: Setup) -> Result<Self> {
        let engine = GameEngine::new(setup.grid.clone(), setup.config.rules);
        let input = InputHandler::new(setup.config.layout);
        let term = TermManager::new().context("Failed to read terminal size")?;
        Ok(SnakeGame { setup, engine, input, term, resized: false })
    }

    /// Plays one game in the alternate screen and always gives the terminal back.
    pub fn run(&mut self) -> Result<GameReport> {
        self.term.setup().context("Failed to set up terminal")?;
        let result = self.play();
        self.term.restore().context("Failed to restore terminal")?;
        result
    }

    fn play(&mut self) -> Result<GameReport> {
        self.term.clear()?;
        let field = (self.setup.config.width as TermInt, self.setup.config.height as TermInt);
        self.term.draw_borders(field, TITLE)?;

        let start_now = self.show_intro()?;
        let mut session = self.engine.new_session(Instant::now())?;
        if !start_now {
            self.engine.quit(&mut session, Instant::now());
        }
        self.draw_frame(&session)?;

        let tick = Duration::from_millis(self.setup.config.tick_interval_ms);
        let mut pending: Option<Direction> = None;

        while !session.is_over() {
            let deadline = Instant::now() + tick;

            // Collect input until the next step is due
            while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
                let event = match self.term.poll_event(remaining)? {
                    Some(event) => event,
                    None => break,
                };

                match self.input.handle_event(&event) {
                    InputEvent::Move(dir) => pending = Some(dir),
                    InputEvent::TogglePause => self.pause(&mut session)?,
                    InputEvent::Quit => self.engine.quit(&mut session, Instant::now()),
                    InputEvent::Resize => self.end_on_resize(&mut session),
                    InputEvent::None => {}
                }

                if session.is_over() {
                    break;
                }
            }

            if session.is_over() {
                break;
            }

            let outcome = self.engine.tick(&mut session, pending.take())?;
            self.draw_frame(&session)?;

            if let TickOutcome::GameOver(_) = outcome {
                break;
            }
        }

        let report = GameReport {
            score: session.score,
            reason: session.game_over_reason().unwrap_or(GameOverReason::Quit),
            survival: session.survival_time(Instant::now()),
            resized: self.resized,
            started: start_now,
        };

        if !matches!(report.reason, GameOverReason::Quit) {
            self.game_over(&session)?;
        }
        Ok(report)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn show_intro(&mut self) -> Result<bool> {
        let lines = &[
            self.input.describe(),
            "Space to pause",
            "q to quit",
            "",
            "Press any key to begin",
        ];

        self.term.show_message(lines)?;
        let begin = loop {
            let event = self.term.read_event_blocking()?;
            match self.input.handle_event(&event) {
                InputEvent::Quit => break false,
                InputEvent::Resize => {
                    self.resized = true;
                    break false;
                }
                _ if is_key_press(&event) => break true,
                _ => {}
            }
        };
        self.term.hide_message()?;

        Ok(begin)
    }

    fn pause(&mut self, session: &mut GameSession) -> Result<()> {
        self.engine.pause(session, Instant::now());
        self.term.show_message(&["Paused", "Space to resume", "or q to quit"])?;

        loop {
            match self.input.handle_event(&self.term.read_event_blocking()?) {
                InputEvent::TogglePause => {
                    self.engine.resume(session, Instant::now());
                    break;
                }
                InputEvent::Quit => {
                    self.engine.quit(session, Instant::now());
                    break;
                }
                _ => {}
            }
        }

        self.term.hide_message()?;
        Ok(())
    }

    fn end_on_resize(&mut self, session: &mut GameSession) {
        self.resized = true;
        self.engine.quit(session, Instant::now());
    }

    fn game_over(&mut self, session: &GameSession) -> Result<()> {
        let won = session.game_over_reason() == Some(GameOverReason::Win);
        let s = if won {"You won!"} else {"Game over!"};

        if !won {
            let dead = Glyph::new(DEAD_SNAKE_CHAR, Color::Yellow, Color::Red);
            for cell in session.snake.body() {
                self.term.print_at(to_coords(*cell), dead)?;
            }
        }

        self.term.show_message(&[s, &format!("Score: {}", session.score), "", "Press any key"])?;

        while !self.resized && !is_key_press(&self.term.read_event_blocking()?) {}
        Ok(())
    }

    fn draw_frame(&mut self, session: &GameSession) -> Result<()> {
        let config = &self.setup.config;
        let grid = self.engine.grid();
        let mut cells: HashMap<Cell, Glyph> = HashMap::new();

        for wall in grid.walls() {
            cells.insert(*wall, Glyph::new(' ', Color::White, Color::White));
        }
        if grid.teleporters_active() {
            for teleporter in grid.teleporters() {
                cells.insert(*teleporter, Glyph::new(TELEPORTER_CHAR, Color::Cyan, Color::Reset));
            }
        }
        for item in session.food.items() {
            cells.insert(item.cell, food_glyph(item.kind));
        }

        let body = Glyph::new(SNAKE_BODY_CHAR, Color::Yellow, Color::Red);
        for cell in session.snake.body().iter().skip(1) {
            cells.insert(*cell, body);
        }
        let head_char = if config.show_direction {session.snake.head_char()} else {SNAKE_BODY_CHAR};
        cells.insert(session.snake.head(), Glyph { ch: head_char, ..body });

        for row in 1..config.height - 1 {
            for col in 1..config.width - 1 {
                let cell = Cell::new(row, col);
                let glyph = cells.get(&cell).copied().unwrap_or(Glyph::BLANK);
                self.term.print_at(to_coords(cell), glyph)?;
            }
        }

        let score_line = format!("Score : {}", session.score);
        self.term.print_text((2, config.height as TermInt - 1), &score_line)?;
        self.term.flush()?;
        Ok(())
    }
}

impl GameReport {
    /// Games quit before they began stay out of the high-score table.
    pub fn counts_as_played(&self) -> bool {
        self.started
    }

    /// Prints the end-of-game summary and the high-score table to stdout.
    pub fn print(&self, setup: &Setup, ledger: &ScoreLedger) {
        let config = &setup.config;
        if self.resized {
            println!("Window may not be resized during gameplay.");
        }

        let high_score = ledger.best(&setup.fingerprint).unwrap_or(self.score);
        let score = self.score.to_string();
        if self.score >= high_score {
            println!("Score - {}", score.green());
        } else {
            println!("Score - {}", score.red());
        }

        let secs = self.survival.as_secs();
        println!("You survived {} seconds. ({:02}:{:02})", secs, secs / 60, secs % 60);
        if self.counts_as_played() && self.score == high_score {
            println!("New high score!");
        }

        if let Some(map) = &setup.map {
            println!(
                "Map file {} in use, CRC {}. Scores are attached to this map file and speed.",
                map.display(),
                setup.fingerprint
            );
        }
        println!(
            "High scores for games played with window dimensions of {}x{}, a speed of {} ({}) and {} special food enabled:",
            config.height,
            config.width,
            config.tick_interval_ms,
            config.difficulty(),
            if config.rules.special_food {"with"} else {"without"}
        );

        for (i, score) in ledger.scores(&setup.fingerprint).iter().enumerate() {
            println!("{}. {}", i + 1, score);
        }
    }
}

fn food_glyph(kind: FoodKind) -> Glyph {
    match kind {
        FoodKind::Normal => Glyph::new(kind.glyph(), Color::Green, Color::Reset),
        FoodKind::Cherry => Glyph::new(kind.glyph(), Color::Red, Color::Reset),
        FoodKind::IceCream => Glyph::new(kind.glyph(), Color::Black, Color::Magenta),
    }
}

fn is_key_press(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.kind != KeyEventKind::Release)
}

fn to_coords(cell: Cell) -> (TermInt, TermInt) {
    (cell.col as TermInt, cell.row as TermInt)
}
