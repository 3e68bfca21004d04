//! A terminal snake game with maps, teleporters and special food.
//!
//! - `grid`, `snake`, `food` and `engine` hold the simulation and know
//!   nothing about terminals or files
//! - `config`, `map` and `scores` turn user choices, map files and the
//!   high-score file into values the engine understands
//! - `input`, `term` and `game` drive an interactive game in the terminal

pub mod config;
pub mod engine;
pub mod error;
pub mod food;
pub mod game;
pub mod grid;
pub mod input;
pub mod map;
pub mod scores;
pub mod snake;
pub mod term;

pub type TermInt = u16;
pub type Coords = (u16, u16);
