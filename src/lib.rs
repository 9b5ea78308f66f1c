//! Untangle - drag the nodes until no rope crosses another
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rope geometry, drag handling, win latch)
//! - `scene`: Owns a running level and dispatches win notifications to observers
//! - `score`: Score controller that reacts to the win
//! - `persistence`: Key-value prefs used to carry the score across reloads
//! - `settings`: Data-driven tuning values

pub mod persistence;
pub mod scene;
pub mod score;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use scene::{Scene, WinObserver};
pub use score::ScoreBoard;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Ropes whose endpoints are closer than this are treated as meeting at a node
    pub const NEAR_NODE_RADIUS: f32 = 0.5;
    /// Win checks are suppressed for this long after the level starts
    pub const WIN_GRACE_SECS: f32 = 1.0;
    /// Delay between all ropes turning green and the win notification
    pub const WIN_CONFIRM_DELAY_SECS: f32 = 0.5;

    /// Work area the nodes are clamped to (world units)
    pub const WORK_AREA_WIDTH: f32 = 5.0;
    pub const WORK_AREA_HEIGHT: f32 = 5.0;

    /// Node pick radius and drag enlargement
    pub const NODE_RADIUS: f32 = 0.25;
    pub const DRAG_SCALE: f32 = 1.5;

    /// Points awarded per solved level
    pub const WIN_SCORE: u32 = 350;
}

/// Convert a duration in seconds to a whole number of simulation ticks (rounded up)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    if secs <= 0.0 {
        return 0;
    }
    // Small bias keeps exact multiples of SIM_DT from rounding up an extra tick
    (secs / consts::SIM_DT - 1e-4).ceil() as u64
}

/// Clamp a point into the rectangle `[min, max]`
#[inline]
pub fn clamp_to_area(point: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    // glam's clamp asserts min <= max; fall back to the center for degenerate areas
    if min.x > max.x || min.y > max.y {
        return (min + max) * 0.5;
    }
    point.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_to_ticks() {
        assert_eq!(secs_to_ticks(0.0), 0);
        assert_eq!(secs_to_ticks(-1.0), 0);
        assert_eq!(secs_to_ticks(1.0), 60);
        assert_eq!(secs_to_ticks(0.5), 30);
    }

    #[test]
    fn test_clamp_to_area() {
        let min = Vec2::new(-1.0, -1.0);
        let max = Vec2::new(1.0, 1.0);
        assert_eq!(clamp_to_area(Vec2::new(5.0, 0.5), min, max), Vec2::new(1.0, 0.5));
        assert_eq!(clamp_to_area(Vec2::new(-3.0, -3.0), min, max), min);

        // Degenerate area collapses to its center
        let p = clamp_to_area(Vec2::ZERO, Vec2::new(1.0, 1.0), Vec2::new(-1.0, -1.0));
        assert_eq!(p, Vec2::ZERO);
    }
}
