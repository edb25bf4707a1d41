//! Per-label box colors.
//!
//! A label keeps the color it was first given for as long as the map lives,
//! so repeated object classes look the same across renders that share a map.

use std::collections::HashMap;
use std::fmt;

use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies colors for labels seen for the first time.
pub trait ColorSource: Send {
    fn next_color(&mut self) -> Rgb<u8>;
}

/// Uniformly random RGB colors.
pub struct RandomColors {
    rng: StdRng,
}

impl RandomColors {
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Reproducible sequence for tests and stable demo output.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl ColorSource for RandomColors {
    fn next_color(&mut self) -> Rgb<u8> {
        Rgb([
            self.rng.gen_range(0..=255),
            self.rng.gen_range(0..=255),
            self.rng.gen_range(0..=255),
        ])
    }
}

/// Caller-owned label → color cache. Grows monotonically; never evicts.
pub struct LabelColorMap {
    colors: HashMap<String, Rgb<u8>>,
    source: Box<dyn ColorSource>,
}

impl LabelColorMap {
    pub fn new() -> Self {
        Self::with_source(RandomColors::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_source(RandomColors::seeded(seed))
    }

    pub fn with_source(source: impl ColorSource + 'static) -> Self {
        Self { colors: HashMap::new(), source: Box::new(source) }
    }

    /// Cached color for `label`, drawing a new one on first sight.
    pub fn color_for(&mut self, label: &str) -> Rgb<u8> {
        if let Some(color) = self.colors.get(label) {
            return *color;
        }
        let color = self.source.next_color();
        self.colors.insert(label.to_string(), color);
        color
    }

    pub fn get(&self, label: &str) -> Option<Rgb<u8>> {
        self.colors.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for LabelColorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LabelColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelColorMap").field("colors", &self.colors).finish_non_exhaustive()
    }
}
