//! Puzzle state and core simulation types
//!
//! Everything that changes while a level is played lives here. Rebuilding a
//! `PuzzleState` (scene reload) is the only way to clear the win latch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Segment;
use super::win::WinLatch;
use crate::consts::*;

/// Stable node identifier (index into `PuzzleState::nodes`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Stable rope identifier (index into `PuzzleState::ropes`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RopeId(pub u32);

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Player is untangling
    Playing,
    /// All ropes went green; the win is scheduled but not yet announced
    Confirming,
    /// Win announced, input locked until reload
    Won,
}

/// Events produced by a tick, drained by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    DragStarted(NodeId),
    DragEnded(NodeId),
    /// All ropes stayed green through the confirmation delay (fires once)
    Won,
}

/// A draggable point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub pos: Vec2,
    /// Position restored by `reset_positions`
    pub initial_pos: Vec2,
    /// Current visual/pick scale (enlarged while dragged)
    pub scale: f32,
    /// Extent kept inside the work area on each axis
    pub half_extent: Vec2,
}

impl Node {
    pub fn new(id: NodeId, pos: Vec2, node_radius: f32) -> Self {
        Self {
            id,
            pos,
            initial_pos: pos,
            scale: 1.0,
            half_extent: Vec2::splat(node_radius),
        }
    }

    /// Whether `point` falls inside this node's pick circle
    pub fn contains(&self, point: Vec2, node_radius: f32) -> bool {
        self.pos.distance(point) <= node_radius * self.scale
    }
}

/// Where a rope's near endpoint sits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    /// Mounted on a node and moves with it
    Node(NodeId),
    /// Pinned to a fixed point
    Point(Vec2),
}

/// Rope color derived from the crossing test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RopeColor {
    #[default]
    Green,
    Red,
}

/// An edge from its anchor to a far node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rope {
    pub id: RopeId,
    pub anchor: Anchor,
    /// Far endpoint; `None` renders nothing and never crosses anything
    pub far: Option<NodeId>,
    pub color: RopeColor,
}

impl Rope {
    pub fn new(id: RopeId, anchor: Anchor, far: Option<NodeId>) -> Self {
        Self {
            id,
            anchor,
            far,
            color: RopeColor::Green,
        }
    }

    #[inline]
    pub fn is_red(&self) -> bool {
        self.color == RopeColor::Red
    }
}

/// An in-progress drag
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Drag {
    pub node: NodeId,
    /// Node position minus pointer position at grab time
    pub offset: Vec2,
}

/// Complete puzzle state for one level instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleState {
    pub nodes: Vec<Node>,
    pub ropes: Vec<Rope>,
    /// Simulation tick counter since level start
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub win: WinLatch,
    pub drag: Option<Drag>,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl PuzzleState {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            ropes: Vec::new(),
            time_ticks: 0,
            phase: GamePhase::Playing,
            win: WinLatch::default(),
            drag: None,
            events: Vec::new(),
        }
    }

    /// Add a node at `pos` with the default radius
    pub fn add_node(&mut self, pos: Vec2) -> NodeId {
        self.add_node_sized(pos, NODE_RADIUS)
    }

    /// Add a node at `pos` that stays `node_radius` inside the work area
    pub fn add_node_sized(&mut self, pos: Vec2, node_radius: f32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, pos, node_radius));
        id
    }

    /// Add a rope from `anchor` to `far`
    pub fn add_rope(&mut self, anchor: Anchor, far: Option<NodeId>) -> RopeId {
        let id = RopeId(self.ropes.len() as u32);
        self.ropes.push(Rope::new(id, anchor, far));
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn rope(&self, id: RopeId) -> Option<&Rope> {
        self.ropes.get(id.0 as usize)
    }

    /// Move a node directly (scripted input, level editing)
    pub fn set_node_pos(&mut self, id: NodeId, pos: Vec2) {
        if let Some(node) = self.node_mut(id) {
            node.pos = pos;
        }
    }

    /// Resolve an anchor to a world position
    pub fn anchor_pos(&self, anchor: Anchor) -> Option<Vec2> {
        match anchor {
            Anchor::Node(id) => self.node(id).map(|n| n.pos),
            Anchor::Point(p) => Some(p),
        }
    }

    /// Resolve a rope's geometry; `None` if either end is missing
    pub fn rope_segment(&self, rope: &Rope) -> Option<Segment> {
        let far = self.node(rope.far?)?.pos;
        let start = self.anchor_pos(rope.anchor)?;
        Some(Segment::new(start, far))
    }

    /// True when every rope is green
    pub fn all_green(&self) -> bool {
        self.ropes.iter().all(|r| !r.is_red())
    }

    pub fn red_count(&self) -> usize {
        self.ropes.iter().filter(|r| r.is_red()).count()
    }

    /// Whether player input is locked by the win
    pub fn is_win_active(&self) -> bool {
        self.phase == GamePhase::Won
    }

    /// Restore nodes to their initial positions and ropes to green.
    ///
    /// The win latch is untouched: a full reset requires rebuilding the state.
    pub fn reset_positions(&mut self) {
        for node in &mut self.nodes {
            node.pos = node.initial_pos;
            node.scale = 1.0;
        }
        for rope in &mut self.ropes {
            rope.color = RopeColor::Green;
        }
        self.drag = None;
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for PuzzleState {
    fn default() -> Self {
        Self::new()
    }
}
