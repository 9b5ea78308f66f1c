//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by node/rope index)
//! - No rendering or platform dependencies

pub mod geom;
pub mod level;
pub mod rope;
pub mod state;
pub mod tick;
pub mod win;

pub use geom::{Orientation, Segment, near_shared_node, orientation, segments_intersect};
pub use level::{AnchorDef, LevelDef, LevelError, NodeDef, RopeDef, generate_level};
pub use rope::{RopeTexture, evaluate_ropes};
pub use state::{
    Anchor, GameEvent, GamePhase, Node, NodeId, PuzzleState, Rope, RopeColor, RopeId,
};
pub use tick::{TickInput, pick_node, tick};
pub use win::WinLatch;
