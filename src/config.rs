use std::path::PathBuf;

use clap::ValueEnum;
use log::info;

use crate::engine::Rules;
use crate::error::ConfigError;
use crate::grid::{with_border, GridModel, MIN_HEIGHT, MIN_WIDTH};
use crate::map::{self, LoadedMap};
use crate::scores::fingerprint;
use crate::snake::{BoundaryMode, MoveRules, Snake};

/// Which keys steer the snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum KeyLayout {
    /// Arrow keys
    #[default]
    Arrows,
    /// W A S D
    Wasd,
    /// H J K L
    Vim,
}

/// The choices a player can make before a game, unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub boundaries: bool,
    pub cross: bool,
    /// `HEIGHTxWIDTH` of the playing field, ignored when a map is loaded.
    pub dimensions: Option<String>,
    pub no_direction: bool,
    pub layout: KeyLayout,
    pub more_food_types: bool,
    pub number_of_food: usize,
    /// Milliseconds per tick.
    pub speed: u64,
    pub map: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            boundaries: false,
            cross: false,
            dimensions: None,
            no_direction: false,
            layout: KeyLayout::Arrows,
            more_food_types: false,
            number_of_food: 1,
            speed: 125,
            map: PathBuf::from("map"),
        }
    }
}

/// Validated settings for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub rules: Rules,
    pub tick_interval_ms: u64,
    pub show_direction: bool,
    pub layout: KeyLayout,
    /// Total grid height, border included.
    pub height: i32,
    /// Total grid width, border included.
    pub width: i32,
}

impl GameConfig {
    pub fn difficulty(&self) -> &'static str {
        match self.tick_interval_ms {
            0..=75 => "Hard",
            76..=125 => "Normal",
            _ => "Easy",
        }
    }
}

/// Everything needed to start playing.
#[derive(Debug, Clone)]
pub struct Setup {
    pub config: GameConfig,
    pub grid: GridModel,
    /// Key for the high-score ledger.
    pub fingerprint: String,
    /// Set when a map file was loaded.
    pub map: Option<PathBuf>,
}

impl Setup {
    /// Validates `options` against a screen of `screen` (rows, columns).
    pub fn build(options: &Options, screen: (i32, i32)) -> Result<Self, ConfigError> {
        let loaded = map::load(&options.map)?;
        Self::from_parts(options, loaded, screen)
    }

    pub fn from_parts(
        options: &Options,
        loaded: Option<LoadedMap>,
        screen: (i32, i32),
    ) -> Result<Self, ConfigError> {
        if options.speed == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if options.number_of_food == 0 {
            return Err(ConfigError::NoFood);
        }

        let (screen_height, screen_width) = screen;
        let requested = match (&loaded, &options.dimensions) {
            (Some(m), _) => Some(m.layout.grid_size()?),
            (None, Some(dims)) => {
                let (h, w) = parse_dimensions(dims)?;
                Some(with_border(h, w).ok_or_else(|| ConfigError::InvalidDimensions(dims.clone()))?)
            }
            (None, None) => None,
        };

        let (height, width) = requested.unwrap_or(screen);
        if requested.is_some() && (height > screen_height || width > screen_width) {
            return Err(ConfigError::LargerThanScreen { height, width, screen_height, screen_width });
        }
        if height < MIN_HEIGHT || width < MIN_WIDTH {
            return Err(ConfigError::TooSmall { height, width, min_height: MIN_HEIGHT, min_width: MIN_WIDTH });
        }

        let grid = match &loaded {
            Some(m) => m.layout.to_grid()?,
            None => GridModel::new(height, width),
        };

        let snake = Snake::starting(&grid);
        if let Some(&blocked) = snake.body().iter().find(|&&c| grid.contains_obstacle(c) || grid.is_teleporter(c)) {
            return Err(ConfigError::StartObstructed(blocked));
        }

        let free = grid
            .capacity()
            .saturating_sub(grid.static_cells().count())
            .saturating_sub(snake.len());
        if options.number_of_food >= free {
            return Err(ConfigError::TooMuchFood { requested: options.number_of_food, free });
        }

        let fingerprint = fingerprint(
            loaded.as_ref().map(|m| m.bytes.as_slice()),
            height,
            width,
            options.speed,
            options.more_food_types,
        );
        info!("playing {}x{} at {} ms per tick, score key {}", height, width, options.speed, fingerprint);

        let config = GameConfig {
            rules: Rules {
                movement: MoveRules {
                    boundary: if options.boundaries { BoundaryMode::Bounded } else { BoundaryMode::Wrap },
                    allow_reversal: options.cross,
                },
                food_count: options.number_of_food,
                special_food: options.more_food_types,
            },
            tick_interval_ms: options.speed,
            show_direction: !options.no_direction,
            layout: options.layout,
            height,
            width,
        };

        Ok(Setup {
            config,
            grid,
            fingerprint,
            map: loaded.map(|_| options.map.clone()),
        })
    }
}

/// Parses `HEIGHTxWIDTH`, e.g. `20x25`.
pub fn parse_dimensions(text: &str) -> Result<(i32, i32), ConfigError> {
    let invalid = || ConfigError::InvalidDimensions(text.to_owned());

    let (h, w) = text.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let h = h.trim().parse().map_err(|_| invalid())?;
    let w = w.trim().parse().map_err(|_| invalid())?;
    Ok((h, w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::map::MapLayout;

    const SCREEN: (i32, i32) = (40, 120);

    fn loaded(json: &str) -> Option<LoadedMap> {
        let bytes = json.as_bytes().to_vec();
        Some(LoadedMap { layout: MapLayout::parse(&bytes).unwrap(), bytes })
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("20x25").unwrap(), (20, 25));
        assert_eq!(parse_dimensions(" 8X30 ").unwrap(), (8, 30));
        assert!(matches!(parse_dimensions("20-25"), Err(ConfigError::InvalidDimensions(_))));
        assert!(matches!(parse_dimensions("axb"), Err(ConfigError::InvalidDimensions(_))));
    }

    #[test]
    fn test_screen_size_without_map_or_dimensions() {
        let setup = Setup::from_parts(&Options::default(), None, SCREEN).unwrap();
        assert_eq!((setup.config.height, setup.config.width), SCREEN);
        assert_eq!(setup.fingerprint, "N40x120@125");
        assert_eq!(setup.map, None);
        assert_eq!(setup.config.rules.movement.boundary, BoundaryMode::Wrap);
        assert!(setup.config.show_direction);
    }

    #[test]
    fn test_dimensions_add_border() {
        let options = Options { dimensions: Some("10x20".into()), boundaries: true, ..Options::default() };
        let setup = Setup::from_parts(&options, None, SCREEN).unwrap();

        assert_eq!((setup.grid.height(), setup.grid.width()), (12, 22));
        assert_eq!(setup.config.rules.movement.boundary, BoundaryMode::Bounded);
    }

    #[test]
    fn test_dimensions_must_fit_screen() {
        let options = Options { dimensions: Some("50x20".into()), ..Options::default() };
        assert!(matches!(
            Setup::from_parts(&options, None, SCREEN),
            Err(ConfigError::LargerThanScreen { .. })
        ));
    }

    #[test]
    fn test_dimensions_overflowing_border() {
        let options = Options { dimensions: Some("2147483647x20".into()), ..Options::default() };
        assert!(matches!(
            Setup::from_parts(&options, None, SCREEN),
            Err(ConfigError::InvalidDimensions(d)) if d == "2147483647x20"
        ));

        let json = r#"{"dimensions": [2147483647, 10]}"#;
        assert!(matches!(
            Setup::from_parts(&Options::default(), loaded(json), SCREEN),
            Err(ConfigError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_too_small() {
        let options = Options { dimensions: Some("2x20".into()), ..Options::default() };
        assert!(matches!(Setup::from_parts(&options, None, SCREEN), Err(ConfigError::TooSmall { .. })));

        let options = Options { dimensions: Some("3x8".into()), ..Options::default() };
        assert!(Setup::from_parts(&options, None, SCREEN).is_ok());
    }

    #[test]
    fn test_food_must_leave_room() {
        // 3x8 interior = 24 cells, snake takes 4
        let options = Options { dimensions: Some("3x8".into()), number_of_food: 20, ..Options::default() };
        assert!(matches!(
            Setup::from_parts(&options, None, SCREEN),
            Err(ConfigError::TooMuchFood { requested: 20, free: 20 })
        ));

        let options = Options { number_of_food: 19, ..options };
        assert!(Setup::from_parts(&options, None, SCREEN).is_ok());

        let options = Options { number_of_food: 0, ..options };
        assert!(matches!(Setup::from_parts(&options, None, SCREEN), Err(ConfigError::NoFood)));
    }

    #[test]
    fn test_map_overrides_dimensions() {
        let options = Options { dimensions: Some("5x10".into()), more_food_types: true, ..Options::default() };
        let json = r#"{"dimensions": [15, 30], "wall": [[8, 8]], "teleporter": [[2, 2], [12, 20]]}"#;
        let setup = Setup::from_parts(&options, loaded(json), SCREEN).unwrap();

        assert_eq!((setup.grid.height(), setup.grid.width()), (17, 32));
        assert!(setup.grid.contains_obstacle(Cell::new(8, 8)));
        assert_eq!(setup.map, Some(PathBuf::from("map")));
        assert_eq!(setup.fingerprint, fingerprint(Some(json.as_bytes()), 17, 32, 125, true));
    }

    #[test]
    fn test_wall_on_starting_snake() {
        let json = r#"{"dimensions": [15, 30], "wall": [[4, 9]]}"#;
        assert!(matches!(
            Setup::from_parts(&Options::default(), loaded(json), SCREEN),
            Err(ConfigError::StartObstructed(c)) if c == Cell::new(4, 9)
        ));
    }

    #[test]
    fn test_zero_speed_rejected() {
        let options = Options { speed: 0, ..Options::default() };
        assert!(matches!(Setup::from_parts(&options, None, SCREEN), Err(ConfigError::ZeroSpeed)));
    }

    #[test]
    fn test_difficulty() {
        let mut setup = Setup::from_parts(&Options::default(), None, SCREEN).unwrap();
        assert_eq!(setup.config.difficulty(), "Normal");
        setup.config.tick_interval_ms = 50;
        assert_eq!(setup.config.difficulty(), "Hard");
        setup.config.tick_interval_ms = 200;
        assert_eq!(setup.config.difficulty(), "Easy");
    }
}
