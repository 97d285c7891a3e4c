//! Configuration schema types for `pixeldrop.toml`
//!
//! Every field has a default, so an empty file (or no file) yields the
//! stock wall: gravity 0.002, two spawns per tick, a three second hold.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::color::Color;
use crate::particle::DropParams;
use crate::quantize::{QuantizeOptions, MAX_WIDTH, MIN_WIDTH};
use crate::renderer::RenderParams;
use crate::sequencer::SequencerConfig;

/// Physics, timing and drawing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallConfig {
    /// Velocity gained per elapsed millisecond
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// Pending pixels popped per building tick
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: u32,
    /// Hold after a matrix settles, in milliseconds
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    /// Share of the limiting surface dimension the grid may use
    #[serde(default = "default_fill_fraction")]
    pub fill_fraction: f64,
    #[serde(default = "default_reference_frame_ms")]
    pub reference_frame_ms: f64,
    /// Rows above the surface particles start at, `[min, max]`
    #[serde(default = "default_spawn_height")]
    pub spawn_height: [f64; 2],
    #[serde(default = "default_cell_gap")]
    pub cell_gap: f64,
    #[serde(default = "default_background")]
    pub background: String,
    /// Fixed RNG seed; unset means a new drop order every run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_gravity() -> f64 {
    0.002
}

fn default_spawn_rate() -> u32 {
    2
}

fn default_hold_ms() -> u64 {
    3000
}

fn default_fill_fraction() -> f64 {
    0.9
}

fn default_reference_frame_ms() -> f64 {
    16.0
}

fn default_spawn_height() -> [f64; 2] {
    [5.0, 15.0]
}

fn default_cell_gap() -> f64 {
    1.0
}

fn default_background() -> String {
    "#000000".to_string()
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            spawn_rate: default_spawn_rate(),
            hold_ms: default_hold_ms(),
            fill_fraction: default_fill_fraction(),
            reference_frame_ms: default_reference_frame_ms(),
            spawn_height: default_spawn_height(),
            cell_gap: default_cell_gap(),
            background: default_background(),
            seed: None,
        }
    }
}

/// Image converter defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Target grid width, 8 to 128
    #[serde(default = "default_converter_width")]
    pub width: u32,
    /// Cells are kept when alpha is strictly greater than this
    #[serde(default)]
    pub alpha_threshold: u8,
}

fn default_converter_width() -> u32 {
    32
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self { width: default_converter_width(), alpha_threshold: 0 }
    }
}

/// Where the collection lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Store directory (default: the user data directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Key the collection is saved under
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    crate::store::DEFAULT_KEY.to_string()
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self { dir: None, key: default_key() }
    }
}

/// Complete pixeldrop.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelDropConfig {
    #[serde(default)]
    pub wall: WallConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "wall.fill_fraction")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pixeldrop.toml: '{}' {}", self.field, self.message)
    }
}

impl PixelDropConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: message.to_string(),
            });
        };

        let wall = &self.wall;
        if !(wall.gravity > 0.0 && wall.gravity.is_finite()) {
            push("wall.gravity", "must be a positive number");
        }
        if wall.spawn_rate == 0 {
            push("wall.spawn_rate", "must be at least 1");
        }
        if !(wall.fill_fraction > 0.0 && wall.fill_fraction <= 1.0) {
            push("wall.fill_fraction", "must be greater than 0 and at most 1");
        }
        if !(wall.reference_frame_ms > 0.0 && wall.reference_frame_ms.is_finite()) {
            push("wall.reference_frame_ms", "must be a positive number");
        }
        let [low, high] = wall.spawn_height;
        if !(low >= 0.0 && low <= high && high.is_finite()) {
            push("wall.spawn_height", "must be [min, max] with 0 <= min <= max");
        }
        if !(wall.cell_gap >= 0.0 && wall.cell_gap.is_finite()) {
            push("wall.cell_gap", "must not be negative");
        }
        if wall.background.parse::<Color>().is_err() {
            push("wall.background", "must be a hex color like #000000");
        }

        if !(MIN_WIDTH..=MAX_WIDTH).contains(&self.converter.width) {
            push("converter.width", "must be between 8 and 128");
        }

        if self.collection.key.trim().is_empty() {
            push("collection.key", "must be a non-empty string");
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    pub fn drop_params(&self) -> DropParams {
        DropParams {
            gravity: self.wall.gravity,
            spawn_rate: self.wall.spawn_rate,
            reference_frame_ms: self.wall.reference_frame_ms,
            spawn_height: self.wall.spawn_height,
        }
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig { drop: self.drop_params(), hold_ms: self.wall.hold_ms as f64 }
    }

    /// Drawing settings. An unparseable background falls back to black;
    /// [`validate`](Self::validate) reports it.
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            fill_fraction: self.wall.fill_fraction,
            cell_gap: self.wall.cell_gap,
            background: self.wall.background.parse().unwrap_or(Color::BLACK),
        }
    }

    pub fn quantize_options(&self) -> QuantizeOptions {
        QuantizeOptions {
            width: self.converter.width,
            alpha_threshold: self.converter.alpha_threshold,
        }
    }
}
