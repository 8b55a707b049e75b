//! Session configuration
//!
//! Defaults come from the constants in `match3-types`; every value can be overridden
//! through `MATCH3_*` environment variables (see [`GameConfig::from_env`]).

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{ConfigError, RandomColors, ScoringRules};
use crate::types::{TileColor, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, MIN_MATCH};

/// Board size, palette, seed and scoring for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub palette: Vec<TileColor>,
    /// RNG seed for tile colors; `None` derives one from the clock
    pub seed: Option<u32>,
    pub scoring: ScoringRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            palette: TileColor::ALL.to_vec(),
            seed: None,
            scoring: ScoringRules::default(),
        }
    }
}

impl GameConfig {
    /// Read configuration from the environment.
    ///
    /// - `MATCH3_WIDTH` / `MATCH3_HEIGHT`: board size (default 8x8)
    /// - `MATCH3_SEED`: color RNG seed (default: clock-derived)
    /// - `MATCH3_PALETTE`: comma-separated color names (default: all six)
    ///
    /// Unparseable values fall back to the default and are logged. The result is not
    /// validated; call [`GameConfig::validate`] before use.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GameConfig::from_env`] with an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let width = parse_var(&lookup, "MATCH3_WIDTH").unwrap_or(defaults.width);
        let height = parse_var(&lookup, "MATCH3_HEIGHT").unwrap_or(defaults.height);
        let seed = parse_var(&lookup, "MATCH3_SEED");

        let palette = match lookup("MATCH3_PALETTE") {
            Some(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .filter_map(|name| {
                    let color = TileColor::from_str(name);
                    if color.is_none() {
                        warn!(name = name.trim(), "ignoring unknown palette color");
                    }
                    color
                })
                .collect(),
            _ => defaults.palette,
        };

        Self {
            width,
            height,
            palette,
            seed,
            scoring: defaults.scoring,
        }
    }

    /// Reject configurations no board can be built from, or no board can settle on.
    ///
    /// A single color on a board with a side of [`MIN_MATCH`] or more refills straight
    /// back into a run after every clear, so the cascade would never end.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let mut distinct = self.palette.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 2 && self.width.max(self.height) >= MIN_MATCH {
            return Err(ConfigError::TooFewColors {
                colors: distinct.len(),
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Seeded random color supplier for this configuration
    pub fn color_supplier(&self) -> Result<RandomColors, ConfigError> {
        RandomColors::new(self.palette.iter().copied(), self.effective_seed())
    }

    /// The configured seed, or one derived from the system clock
    pub fn effective_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = raw.as_str(), "ignoring malformed configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::from_lookup(lookup(&[]));
        assert_eq!(config.width, 8);
        assert_eq!(config.height, 8);
        assert_eq!(config.palette.len(), 6);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = GameConfig::from_lookup(lookup(&[
            ("MATCH3_WIDTH", "6"),
            ("MATCH3_HEIGHT", " 7 "),
            ("MATCH3_SEED", "99"),
            ("MATCH3_PALETTE", "red, blue,green"),
        ]));
        assert_eq!(config.width, 6);
        assert_eq!(config.height, 7);
        assert_eq!(config.seed, Some(99));
        assert_eq!(
            config.palette,
            vec![TileColor::Red, TileColor::Blue, TileColor::Green]
        );
        assert_eq!(config.effective_seed(), 99);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config =
            GameConfig::from_lookup(lookup(&[("MATCH3_WIDTH", "wide"), ("MATCH3_SEED", "-3")]));
        assert_eq!(config.width, 8);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_validate_fails_fast() {
        let zero = GameConfig {
            width: 0,
            ..GameConfig::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroWidth));

        let flat = GameConfig {
            height: 0,
            ..GameConfig::default()
        };
        assert_eq!(flat.validate(), Err(ConfigError::ZeroHeight));

        let colorless = GameConfig::from_lookup(lookup(&[("MATCH3_PALETTE", "teal,mauve")]));
        assert_eq!(colorless.validate(), Err(ConfigError::EmptyPalette));
        assert!(colorless.color_supplier().is_err());
    }

    #[test]
    fn test_single_color_palette_rejected() {
        let mono = GameConfig {
            width: 3,
            height: 3,
            palette: vec![TileColor::Red],
            seed: Some(1),
            ..GameConfig::default()
        };
        assert_eq!(
            mono.validate(),
            Err(ConfigError::TooFewColors {
                colors: 1,
                width: 3,
                height: 3,
            })
        );

        // Duplicates do not count as extra colors
        let repeated = GameConfig::from_lookup(lookup(&[("MATCH3_PALETTE", "blue,blue,blue")]));
        assert!(matches!(
            repeated.validate(),
            Err(ConfigError::TooFewColors { colors: 1, .. })
        ));

        // Too small for any run: one color is fine
        let tiny = GameConfig {
            width: 2,
            height: 2,
            palette: vec![TileColor::Red],
            ..GameConfig::default()
        };
        assert!(tiny.validate().is_ok());

        let two = GameConfig {
            palette: vec![TileColor::Red, TileColor::Blue],
            ..GameConfig::default()
        };
        assert!(two.validate().is_ok());
    }
}
