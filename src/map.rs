use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{with_border, Cell, GridModel};

/// On-disk map description. Dimensions are the playing field without its
/// border; obstacle coordinates are `[row, column]` pairs in grid space
/// (the border occupies row 0 and column 0).
///
/// ```json
/// {"dimensions": [20, 40], "wall": [[3, 4], [3, 5]], "teleporter": [[10, 2], [10, 38]]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLayout {
    pub dimensions: (i32, i32),
    #[serde(default)]
    pub wall: Vec<(i32, i32)>,
    #[serde(default)]
    pub teleporter: Vec<(i32, i32)>,
}

/// A map together with the exact bytes it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMap {
    pub layout: MapLayout,
    pub bytes: Vec<u8>,
}

impl MapLayout {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Total size including the border, as (height, width).
    pub fn grid_size(&self) -> Result<(i32, i32), ConfigError> {
        let (height, width) = self.dimensions;
        with_border(height, width).ok_or_else(|| ConfigError::InvalidDimensions(format!("{}x{}", height, width)))
    }

    pub fn walls(&self) -> impl Iterator<Item = Cell> + '_ {
        self.wall.iter().map(|&(row, col)| Cell::new(row, col))
    }

    pub fn teleporters(&self) -> impl Iterator<Item = Cell> + '_ {
        self.teleporter.iter().map(|&(row, col)| Cell::new(row, col))
    }

    /// Builds the grid, rejecting obstacles that are not strictly inside the border.
    pub fn to_grid(&self) -> Result<GridModel, ConfigError> {
        let (height, width) = self.grid_size()?;
        let grid = GridModel::new(height, width);

        if let Some(stray) = self.walls().chain(self.teleporters()).find(|&c| !grid.is_interior(c)) {
            return Err(ConfigError::ObstacleOutOfBounds(stray));
        }

        Ok(grid.with_walls(self.walls()).with_teleporters(self.teleporters()))
    }
}

/// Reads a map file. A missing file is not an error: the game is simply
/// played without a map.
pub fn load(path: &Path) -> Result<Option<LoadedMap>, ConfigError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ConfigError::MapUnreadable { path: path.to_path_buf(), source }),
    };

    let layout = MapLayout::parse(&bytes)
        .map_err(|source| ConfigError::MapInvalid { path: path.to_path_buf(), source })?;
    Ok(Some(LoadedMap { layout, bytes }))
}
