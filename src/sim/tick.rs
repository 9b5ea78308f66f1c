//! Fixed timestep simulation tick
//!
//! One tick = one frame: drag input first, then rope recoloring, then the win
//! check. All delays are tick deadlines held in the state.

use glam::Vec2;

use super::rope::evaluate_ropes;
use super::state::{Drag, GameEvent, GamePhase, NodeId, PuzzleState};
use crate::clamp_to_area;
use crate::settings::Settings;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in world coordinates, if known this frame
    pub pointer: Option<Vec2>,
    /// Pointer went down this frame
    pub press: bool,
    /// Pointer went up this frame
    pub release: bool,
}

impl TickInput {
    pub fn hover(pointer: Vec2) -> Self {
        Self {
            pointer: Some(pointer),
            ..Default::default()
        }
    }

    pub fn press_at(pointer: Vec2) -> Self {
        Self {
            pointer: Some(pointer),
            press: true,
            ..Default::default()
        }
    }

    pub fn release_at(pointer: Vec2) -> Self {
        Self {
            pointer: Some(pointer),
            release: true,
            ..Default::default()
        }
    }
}

/// Advance the puzzle by one fixed timestep (`SIM_DT`).
///
/// Grace and confirmation delays are tick deadlines, so the step length is
/// implied rather than passed in.
pub fn tick(state: &mut PuzzleState, settings: &Settings, input: &TickInput) {
    state.time_ticks += 1;

    handle_drag(state, settings, input);

    // Late update: recolor against the positions just written
    evaluate_ropes(state, settings.near_node_radius);

    check_win(state, settings);
}

/// Node under `pointer`, preferring the one drawn last (on top)
pub fn pick_node(state: &PuzzleState, pointer: Vec2, node_radius: f32) -> Option<NodeId> {
    state
        .nodes
        .iter()
        .rev()
        .find(|n| n.contains(pointer, node_radius))
        .map(|n| n.id)
}

fn handle_drag(state: &mut PuzzleState, settings: &Settings, input: &TickInput) {
    if !state.is_win_active() {
        if let Some(pointer) = input.pointer {
            if input.press && state.drag.is_none() {
                if let Some(id) = pick_node(state, pointer, settings.node_radius) {
                    if let Some(node) = state.node_mut(id) {
                        node.scale = settings.drag_scale;
                        let offset = node.pos - pointer;
                        state.drag = Some(Drag { node: id, offset });
                        log::debug!("Drag started on node {}", id.0);
                        state.events.push(GameEvent::DragStarted(id));
                    }
                }
            }

            if let Some(drag) = state.drag {
                let (area_min, area_max) = settings.area_bounds();
                if let Some(node) = state.node_mut(drag.node) {
                    let min = area_min + node.half_extent;
                    let max = area_max - node.half_extent;
                    node.pos = clamp_to_area(pointer + drag.offset, min, max);
                }
            }
        }
    }

    // Release comes after press so a tap within one tick lets go again.
    // It is honored even after the win so a held node shrinks back.
    if input.release {
        if let Some(drag) = state.drag.take() {
            if let Some(node) = state.node_mut(drag.node) {
                node.scale = 1.0;
            }
            log::debug!("Drag ended on node {}", drag.node.0);
            state.events.push(GameEvent::DragEnded(drag.node));
        }
    }
}

fn check_win(state: &mut PuzzleState, settings: &Settings) {
    let now = state.time_ticks;
    // Ropes without geometry are never evaluated, so they alone can't win
    let any_attached = state.ropes.iter().any(|r| state.rope_segment(r).is_some());
    let all_green = any_attached && state.all_green();

    if state.win.observe(
        all_green,
        now,
        settings.grace_ticks(),
        settings.confirm_delay_ticks(),
    ) {
        log::debug!("All ropes green at tick {}, confirming", now);
        state.phase = GamePhase::Confirming;
    }

    if state.win.advance(now) {
        log::info!("Puzzle solved at tick {}", now);
        state.phase = GamePhase::Won;
        state.drag = None;
        state.events.push(GameEvent::Won);
    }
}
