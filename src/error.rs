use std::{io, path::PathBuf};

use thiserror::Error;

use crate::grid::Cell;

/// Problems with the requested game setup. Raised before any game state exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("dimensions `{0}` are not usable, expected HEIGHTxWIDTH (e.g. 20x25)")]
    InvalidDimensions(String),

    #[error("specified dimensions {height}x{width} are bigger than the screen ({screen_height}x{screen_width})")]
    LargerThanScreen { height: i32, width: i32, screen_height: i32, screen_width: i32 },

    #[error("map too small: the playing field must be at least {min_height}x{min_width} including its border, got {height}x{width}")]
    TooSmall { height: i32, width: i32, min_height: i32, min_width: i32 },

    #[error("the game is unplayable with {requested} food on a board with {free} free cells")]
    TooMuchFood { requested: usize, free: usize },

    #[error("there must be at least one piece of food")]
    NoFood,

    #[error("the tick interval must be at least one millisecond")]
    ZeroSpeed,

    #[error("could not read map file {path}")]
    MapUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("map file {path} is not a valid map")]
    MapInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("obstacle at {0:?} lies outside the playing field")]
    ObstacleOutOfBounds(Cell),

    #[error("the snake's starting cells are blocked at {0:?}")]
    StartObstructed(Cell),
}

/// The board has no room left for a spawn that must happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("no free cell left on a board of {capacity} cells")]
    Exhausted { capacity: usize },
}

/// Failure to write the high-score file.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("could not write score file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not encode scores")]
    Encode(#[from] serde_json::Error),
}
