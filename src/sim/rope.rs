//! Per-rope crossing evaluation
//!
//! Every tick each rope is tested against every other rope: O(n^2) over the
//! full rope set, with no dirty tracking. Fine for hand-sized levels; a level
//! with hundreds of ropes would want a sweep or spatial grid instead.

use serde::{Deserialize, Serialize};

use super::geom::Segment;
use super::state::{PuzzleState, RopeColor};

/// Texture placement for drawing a tiled rope between its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RopeTexture {
    /// Horizontal repeat count along the rope
    pub tiling: f32,
    /// Horizontal texture offset, derived from the rope angle
    pub offset: f32,
}

impl RopeTexture {
    pub fn for_segment(segment: &Segment, tile_width: f32) -> Self {
        let tiling = if tile_width > 0.0 {
            segment.length() / tile_width
        } else {
            1.0
        };
        Self {
            tiling,
            offset: segment.angle_degrees() / 360.0,
        }
    }
}

/// Whether the rope at `index` crosses any other resolved rope
///
/// `segments[i]` is `None` for ropes that contribute no geometry.
pub fn rope_crosses_any(segments: &[Option<Segment>], index: usize, near_node_radius: f32) -> bool {
    let Some(this) = segments.get(index).copied().flatten() else {
        return false;
    };

    segments.iter().enumerate().any(|(other_index, other)| {
        other_index != index
            && other
                .as_ref()
                .is_some_and(|other| this.crosses(other, near_node_radius))
    })
}

/// Recolor every rope from the current node positions.
///
/// Returns the number of ropes whose color changed.
pub fn evaluate_ropes(state: &mut PuzzleState, near_node_radius: f32) -> usize {
    let segments: Vec<Option<Segment>> = state
        .ropes
        .iter()
        .map(|rope| state.rope_segment(rope))
        .collect();

    let mut changed = 0;
    for (index, rope) in state.ropes.iter_mut().enumerate() {
        let color = if rope_crosses_any(&segments, index, near_node_radius) {
            RopeColor::Red
        } else {
            RopeColor::Green
        };
        if rope.color != color {
            log::trace!("Rope {} -> {:?}", rope.id.0, color);
            rope.color = color;
            changed += 1;
        }
    }
    changed
}
