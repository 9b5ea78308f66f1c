//! Gameplay tuning values
//!
//! Every field has a default, so a settings file only needs the values it
//! changes. Durations are in seconds and converted to ticks on use.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::secs_to_ticks;

/// Settings loading failures
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Crossing detection ===
    /// Crossings with an endpoint pair closer than this are ignored
    pub near_node_radius: f32,

    // === Win check ===
    /// No win can be scheduled before this much time has passed
    pub win_grace_secs: f32,
    /// Delay between "all green" and the win notification
    pub win_confirm_delay_secs: f32,

    // === Dragging ===
    /// Center of the work area nodes are confined to
    pub area_center: Vec2,
    pub area_width: f32,
    pub area_height: f32,
    /// Pick radius for grabbing a node
    pub node_radius: f32,
    /// Scale applied to a node while it is dragged
    pub drag_scale: f32,

    // === Score / win presentation ===
    pub win_score: u32,
    pub score_count_secs: f32,
    pub banner_fade_secs: f32,
    pub stars_delay_secs: f32,
    /// World width of one rope texture tile
    pub rope_tile_width: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            near_node_radius: NEAR_NODE_RADIUS,

            win_grace_secs: WIN_GRACE_SECS,
            win_confirm_delay_secs: WIN_CONFIRM_DELAY_SECS,

            area_center: Vec2::ZERO,
            area_width: WORK_AREA_WIDTH,
            area_height: WORK_AREA_HEIGHT,
            node_radius: NODE_RADIUS,
            drag_scale: DRAG_SCALE,

            win_score: WIN_SCORE,
            score_count_secs: 1.5,
            banner_fade_secs: 2.0,
            stars_delay_secs: 1.5,
            rope_tile_width: 0.5,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn grace_ticks(&self) -> u64 {
        secs_to_ticks(self.win_grace_secs)
    }

    pub fn confirm_delay_ticks(&self) -> u64 {
        secs_to_ticks(self.win_confirm_delay_secs)
    }

    /// Lower-left and upper-right corners of the work area
    pub fn area_bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.area_width, self.area_height) * 0.5;
        (self.area_center - half, self.area_center + half)
    }
}
