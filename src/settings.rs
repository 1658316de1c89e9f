//! Game settings and balancing
//!
//! Every geometry and balancing constant lives here so it can be tuned from a
//! JSON file without touching game logic.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::lane::TickTiming;
use crate::sim::LaneGeometry;

/// Number of conveyor lanes on the playfield
pub const LANE_COUNT: usize = 3;

/// Game settings/balancing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    /// Playfield width; items past this edge are lost
    pub width: f32,
    /// Playfield height
    pub height: f32,

    // === Lanes ===
    /// Belt height
    pub lane_height: f32,
    /// Y of the center belt's top edge
    pub lane_center_y: f32,
    /// Vertical space between belts
    pub lane_gap: f32,
    /// Worker tick length in milliseconds
    pub tick_ms: u64,

    // === Items ===
    /// Item edge length
    pub item_size: f32,
    /// Item start x
    pub item_start_x: f32,
    /// Starting item speed (units/s)
    pub speed_base: f32,
    /// Speed added per score threshold reached
    pub speed_increment: f32,
    /// Score step for speed and spawn scaling
    pub score_threshold: u32,

    // === Spawning ===
    /// Starting seconds between spawns
    pub spawn_interval_base: f32,
    /// Seconds removed from the interval per threshold reached
    pub spawn_interval_decrement: f32,
    /// Floor for the spawn interval
    pub spawn_interval_min: f32,

    // === Player ===
    pub player_size: f32,
    /// Horizontal speed (units/s)
    pub player_speed: f32,
    /// Gap between belt bottom and player top
    pub player_offset_y: f32,
    pub max_lives: u32,

    /// RNG seed for lane selection (random when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,

            lane_height: 80.0,
            lane_center_y: 250.0,
            lane_gap: 100.0,
            tick_ms: 16,

            item_size: 50.0,
            item_start_x: 0.0,
            speed_base: 150.0,
            speed_increment: 20.0,
            score_threshold: 5,

            spawn_interval_base: 2.0,
            spawn_interval_decrement: 0.2,
            spawn_interval_min: 0.5,

            player_size: 50.0,
            player_speed: 200.0,
            player_offset_y: 10.0,
            max_lives: 3,

            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from a file, falling back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Using default settings ({err})");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the game cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("lane_height", self.lane_height),
            ("item_size", self.item_size),
            ("player_size", self.player_size),
            ("spawn_interval_base", self.spawn_interval_base),
            ("spawn_interval_min", self.spawn_interval_min),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        let non_negative = [
            ("speed_base", self.speed_base),
            ("speed_increment", self.speed_increment),
            ("spawn_interval_decrement", self.spawn_interval_decrement),
            ("player_speed", self.player_speed),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be non-negative, got {value}"),
                });
            }
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.score_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "score_threshold",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_lives == 0 {
            return Err(ConfigError::Invalid {
                field: "max_lives",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Top edge of each belt, top to bottom
    pub fn lane_ys(&self) -> [f32; LANE_COUNT] {
        let step = self.lane_height + self.lane_gap;
        [
            self.lane_center_y - step,
            self.lane_center_y,
            self.lane_center_y + step,
        ]
    }

    /// Geometry for lane `index` (top = 0)
    pub fn lane_geometry(&self, index: usize) -> LaneGeometry {
        LaneGeometry {
            y: self.lane_ys()[index.min(LANE_COUNT - 1)],
            height: self.lane_height,
            playfield_width: self.width,
            item_size: self.item_size,
            start_x: self.item_start_x,
        }
    }

    /// Worker tick; the simulated step always matches the wall-clock interval
    pub fn tick_timing(&self) -> TickTiming {
        TickTiming::fixed(Duration::from_millis(self.tick_ms))
    }

    /// Item speed for a given score
    pub fn speed_for_score(&self, score: u32) -> f32 {
        let steps = score / self.score_threshold.max(1);
        self.speed_base + steps as f32 * self.speed_increment
    }
}
