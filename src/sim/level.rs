//! Level definitions and the seeded level generator
//!
//! Levels are plain JSON:
//!
//! ```json
//! {
//!   "nodes": [{ "x": 0.0, "y": 1.0 }, { "x": 1.0, "y": -1.0 }],
//!   "ropes": [{ "anchor": { "node": 0 }, "to": 1 }],
//!   "solution": [[0.0, 1.0], [1.0, 1.0]]
//! }
//! ```

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rope::evaluate_ropes;
use super::state::{Anchor, NodeId, PuzzleState};
use crate::settings::Settings;

/// Level loading failures
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("invalid level json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read level: {0}")]
    Io(#[from] std::io::Error),
    #[error("rope {rope} references node {node}, but the level has {count} nodes")]
    BadNodeIndex { rope: usize, node: usize, count: usize },
    #[error("solution has {got} positions, expected {expected}")]
    SolutionLength { got: usize, expected: usize },
    #[error("level has no ropes")]
    NoRopes,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorDef {
    Node(usize),
    Point([f32; 2]),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RopeDef {
    pub anchor: AnchorDef,
    /// Far node index; absent means the rope is unattached
    #[serde(default)]
    pub to: Option<usize>,
}

/// A playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub nodes: Vec<NodeDef>,
    pub ropes: Vec<RopeDef>,
    /// Known untangled node layout, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<Vec<[f32; 2]>>,
}

impl LevelDef {
    /// Parse and validate a level
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: LevelDef = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        let level = Self::from_json(&json)?;
        log::info!(
            "Loaded level {} ({} nodes, {} ropes)",
            path.display(),
            level.nodes.len(),
            level.ropes.len()
        );
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.ropes.is_empty() {
            return Err(LevelError::NoRopes);
        }

        let count = self.nodes.len();
        for (rope, def) in self.ropes.iter().enumerate() {
            let anchor_node = match def.anchor {
                AnchorDef::Node(i) => Some(i),
                AnchorDef::Point(_) => None,
            };
            for node in anchor_node.into_iter().chain(def.to) {
                if node >= count {
                    return Err(LevelError::BadNodeIndex { rope, node, count });
                }
            }
        }

        if let Some(solution) = &self.solution {
            if solution.len() != count {
                return Err(LevelError::SolutionLength {
                    got: solution.len(),
                    expected: count,
                });
            }
        }
        Ok(())
    }

    /// Build a fresh puzzle state for this level.
    ///
    /// `node_radius` is the pick radius from `Settings`; dragged nodes are
    /// kept that far inside the work area.
    pub fn build(&self, node_radius: f32) -> PuzzleState {
        let mut state = PuzzleState::new();
        for node in &self.nodes {
            state.add_node_sized(Vec2::new(node.x, node.y), node_radius);
        }
        for rope in &self.ropes {
            let anchor = match rope.anchor {
                AnchorDef::Node(i) => Anchor::Node(NodeId(i as u32)),
                AnchorDef::Point([x, y]) => Anchor::Point(Vec2::new(x, y)),
            };
            state.add_rope(anchor, rope.to.map(|i| NodeId(i as u32)));
        }
        state
    }

    /// Solution positions as vectors
    pub fn solution_positions(&self) -> Option<Vec<Vec2>> {
        self.solution
            .as_ref()
            .map(|s| s.iter().map(|&[x, y]| Vec2::new(x, y)).collect())
    }
}

/// Minimum nodes for a generated level; a triangle can never start tangled
pub const MIN_GENERATED_NODES: usize = 4;

/// Random start layouts tried before falling back to a fixed crossing
const MAX_SCRAMBLE_ATTEMPTS: u32 = 32;

/// Generate a deterministic level from a seed.
///
/// Nodes are laid out on a circle and connected as a ring plus a fan of
/// chords from node 0, which is planar. That layout is kept as the solution;
/// the starting positions are scattered across the work area until at least
/// one rope starts red.
pub fn generate_level(seed: u64, node_count: usize, settings: &Settings) -> LevelDef {
    let node_count = node_count.max(MIN_GENERATED_NODES);
    let mut rng = Pcg32::seed_from_u64(seed);

    let (area_min, area_max) = settings.area_bounds();
    let margin = Vec2::splat(settings.node_radius);
    let inner_min = area_min + margin;
    let inner_max = area_max - margin;

    let radius = (inner_max - inner_min).min_element() * 0.5 * 0.9;
    let center = (inner_min + inner_max) * 0.5;
    let phase: f32 = rng.random_range(0.0..std::f32::consts::TAU);

    let solution: Vec<[f32; 2]> = (0..node_count)
        .map(|i| {
            let theta = phase + i as f32 / node_count as f32 * std::f32::consts::TAU;
            let p = center + Vec2::new(theta.cos(), theta.sin()) * radius;
            [p.x, p.y]
        })
        .collect();

    let mut ropes: Vec<RopeDef> = (0..node_count)
        .map(|i| RopeDef {
            anchor: AnchorDef::Node(i),
            to: Some((i + 1) % node_count),
        })
        .collect();

    // Fan chords 0 -> 2..n-2 stay inside the convex ring
    for j in 2..node_count.saturating_sub(1) {
        if rng.random_bool(0.5) {
            ropes.push(RopeDef {
                anchor: AnchorDef::Node(0),
                to: Some(j),
            });
        }
    }

    let mut level = LevelDef {
        nodes: Vec::new(),
        ropes,
        solution: Some(solution),
    };

    let tangled = (1..=MAX_SCRAMBLE_ATTEMPTS).any(|attempt| {
        level.nodes = (0..node_count)
            .map(|_| NodeDef {
                x: rng.random_range(inner_min.x..=inner_max.x),
                y: rng.random_range(inner_min.y..=inner_max.y),
            })
            .collect();
        let found = starts_tangled(&level, settings);
        if found {
            log::debug!("Scrambled start found after {} attempt(s)", attempt);
        }
        found
    });

    if !tangled {
        log::warn!(
            "No tangled start after {} attempts (seed={}), crossing nodes 0-3",
            MAX_SCRAMBLE_ATTEMPTS,
            seed
        );
        level.nodes = crossed_start(&level, center, radius * 0.5);
    }

    log::info!(
        "Generated level seed={} ({} nodes, {} ropes)",
        seed,
        node_count,
        level.ropes.len()
    );

    level
}

/// Whether the level's current node positions leave at least one rope red
fn starts_tangled(level: &LevelDef, settings: &Settings) -> bool {
    let mut state = level.build(settings.node_radius);
    evaluate_ropes(&mut state, settings.near_node_radius);
    !state.all_green()
}

/// Solution layout with nodes 0-3 pulled into an X around `center`.
///
/// Ring ropes 0-1 and 2-3 become the two diagonals, with every endpoint at
/// least `2 * half` from the others, so they cross outside the near-node
/// exclusion.
fn crossed_start(level: &LevelDef, center: Vec2, half: f32) -> Vec<NodeDef> {
    let corners = [
        Vec2::new(-half, -half),
        Vec2::new(half, half),
        Vec2::new(-half, half),
        Vec2::new(half, -half),
    ];
    level
        .solution_positions()
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let p = corners.get(i).map_or(p, |&c| center + c);
            NodeDef { x: p.x, y: p.y }
        })
        .collect()
}
