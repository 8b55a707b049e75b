//! RNG module - tile color suppliers
//!
//! The board never reaches for a global RNG. Every new tile color comes from a
//! [`ColorSupplier`] handed in by the caller, which keeps board construction and refill
//! reproducible: the same seed (or script) always produces the same board.
//!
//! Also provides a simple LCG so seeded games behave identically on every platform.

use crate::error::ConfigError;
use crate::types::TileColor;

/// Source of colors for freshly created tiles
pub trait ColorSupplier {
    /// Draw the next color
    fn next_color(&mut self) -> TileColor;
}

impl<S: ColorSupplier + ?Sized> ColorSupplier for &mut S {
    fn next_color(&mut self) -> TileColor {
        (**self).next_color()
    }
}

impl<S: ColorSupplier + ?Sized> ColorSupplier for Box<S> {
    fn next_color(&mut self) -> TileColor {
        (**self).next_color()
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits, which are far better distributed than the low bits of an LCG.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current generator state (reseeding with it continues the sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Uniform random colors drawn from a fixed palette
#[derive(Debug, Clone)]
pub struct RandomColors {
    palette: Vec<TileColor>,
    rng: SimpleRng,
}

impl RandomColors {
    /// Create a supplier over `palette` seeded with `seed`.
    ///
    /// Duplicate palette entries are dropped so every distinct color stays equally likely.
    pub fn new(
        palette: impl IntoIterator<Item = TileColor>,
        seed: u32,
    ) -> Result<Self, ConfigError> {
        let mut colors: Vec<TileColor> = Vec::new();
        for color in palette {
            if !colors.contains(&color) {
                colors.push(color);
            }
        }
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Self {
            palette: colors,
            rng: SimpleRng::new(seed),
        })
    }

    /// Supplier over the full six-color palette
    pub fn full_palette(seed: u32) -> Self {
        Self {
            palette: TileColor::ALL.to_vec(),
            rng: SimpleRng::new(seed),
        }
    }

    pub fn palette(&self) -> &[TileColor] {
        &self.palette
    }

    /// Get the current RNG state (for restarting a game with the same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl ColorSupplier for RandomColors {
    fn next_color(&mut self) -> TileColor {
        let idx = self.rng.next_range(self.palette.len() as u32) as usize;
        self.palette[idx]
    }
}

/// Replays a fixed color sequence, wrapping around at the end
///
/// Intended for tests and replays that need exact post-cascade boards.
#[derive(Debug, Clone)]
pub struct ScriptedColors {
    script: Vec<TileColor>,
    cursor: usize,
}

impl ScriptedColors {
    pub fn new(script: impl IntoIterator<Item = TileColor>) -> Result<Self, ConfigError> {
        let script: Vec<TileColor> = script.into_iter().collect();
        if script.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Self { script, cursor: 0 })
    }

    /// Build a script from glyphs (`"RGBY"`); whitespace is ignored
    pub fn from_glyphs(glyphs: &str) -> Result<Self, ConfigError> {
        let script = glyphs
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                TileColor::from_glyph(c).ok_or_else(|| ConfigError::UnknownColor(c.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(script)
    }

    /// Number of colors handed out so far
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl ColorSupplier for ScriptedColors {
    fn next_color(&mut self) -> TileColor {
        let color = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        color
    }
}
