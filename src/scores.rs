//! High-score persistence. Scores are grouped by a fingerprint of everything
//! that makes two games comparable: the map, the speed and special food.

use std::{collections::BTreeMap, fs, path::Path};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Scores kept per fingerprint.
pub const MAX_SCORES: usize = 10;
pub const DEFAULT_SCORE_FILE: &str = ".snakescores";

/// Key under which a game's score is filed. With a map this is the CRC-32 of
/// the map bytes followed by the speed and an `F` for special food; without
/// one it spells out the grid size and speed.
pub fn fingerprint(map: Option<&[u8]>, height: i32, width: i32, speed_ms: u64, special_food: bool) -> String {
    let flag = if special_food { "F" } else { "" };

    match map {
        Some(bytes) => {
            let mut keyed = bytes.to_vec();
            keyed.extend_from_slice(speed_ms.to_string().as_bytes());
            keyed.extend_from_slice(flag.as_bytes());
            crc32(&keyed).to_string()
        }
        None => format!("N{}x{}@{}{}", height, width, speed_ms, flag),
    }
}

/// CRC-32 (IEEE 802.3, reflected), as used by zip and PNG.
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreLedger {
    scores: BTreeMap<String, Vec<u32>>,
}

impl ScoreLedger {
    /// Reads the ledger. A missing or corrupt file yields an empty ledger,
    /// which replaces the file on the next save.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                info!("no score file at {}: {}", path.display(), err);
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(ledger) => ledger,
            Err(err) => {
                warn!("discarding corrupt score file {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ScoreError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data).map_err(|source| ScoreError::Write { path: path.to_path_buf(), source })?;
        info!("saved scores to {}", path.display());
        Ok(())
    }

    /// Files a score and returns its 1-based place, or `None` when it did not
    /// make the list.
    pub fn record(&mut self, key: &str, score: u32) -> Option<usize> {
        let list = self.scores.entry(key.to_owned()).or_default();
        // Ties go after the older entries
        let place = list.iter().position(|&s| s < score).unwrap_or(list.len());
        list.insert(place, score);
        list.truncate(MAX_SCORES);

        (place < MAX_SCORES).then(|| place + 1)
    }

    pub fn scores(&self, key: &str) -> &[u32] {
        self.scores.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn best(&self, key: &str) -> Option<u32> {
        self.scores(key).first().copied()
    }
}
