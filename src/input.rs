use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::KeyLayout;
use crate::snake::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Move(Direction),
    /// Space bar: pause, or resume when paused.
    TogglePause,
    Quit,
    /// The terminal changed size mid-game.
    Resize,
    None,
}

/// Maps terminal events onto game input for one key layout.
#[derive(Debug, Clone, Copy)]
pub struct InputHandler {
    layout: KeyLayout,
}

impl InputHandler {
    pub fn new(layout: KeyLayout) -> Self {
        Self { layout }
    }

    pub fn handle_event(&self, event: &Event) -> InputEvent {
        match event {
            Event::Key(key) => self.handle_key_event(*key),
            Event::Resize(_, _) => InputEvent::Resize,
            _ => InputEvent::None,
        }
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> InputEvent {
        if key.kind == KeyEventKind::Release {
            return InputEvent::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return InputEvent::Quit;
        }

        match key.code {
            KeyCode::Char(' ') => return InputEvent::TogglePause,
            KeyCode::Char('q') => return InputEvent::Quit,
            _ => {}
        }

        self.direction_for(key.code).map_or(InputEvent::None, InputEvent::Move)
    }

    fn direction_for(&self, code: KeyCode) -> Option<Direction> {
        let dir = match (self.layout, code) {
            (KeyLayout::Arrows, KeyCode::Up) => Direction::Up,
            (KeyLayout::Arrows, KeyCode::Down) => Direction::Down,
            (KeyLayout::Arrows, KeyCode::Left) => Direction::Left,
            (KeyLayout::Arrows, KeyCode::Right) => Direction::Right,

            (KeyLayout::Wasd, KeyCode::Char('w')) => Direction::Up,
            (KeyLayout::Wasd, KeyCode::Char('s')) => Direction::Down,
            (KeyLayout::Wasd, KeyCode::Char('a')) => Direction::Left,
            (KeyLayout::Wasd, KeyCode::Char('d')) => Direction::Right,

            (KeyLayout::Vim, KeyCode::Char('k')) => Direction::Up,
            (KeyLayout::Vim, KeyCode::Char('j')) => Direction::Down,
            (KeyLayout::Vim, KeyCode::Char('h')) => Direction::Left,
            (KeyLayout::Vim, KeyCode::Char('l')) => Direction::Right,

            _ => return None,
        };
        Some(dir)
    }

    /// One-line reminder of the movement keys.
    pub fn describe(&self) -> &'static str {
        match self.layout {
            KeyLayout::Arrows => "Arrow keys to move",
            KeyLayout::Wasd => "WASD to move",
            KeyLayout::Vim => "HJKL to move",
        }
    }
}
