//! Browser binding
//!
//! JS owns the canvas and the animation frame loop; it feeds pointer events in
//! world coordinates and pulls a JSON frame snapshot to draw.

use glam::Vec2;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::Scene;
use crate::persistence::{LocalStoragePrefs, MemoryPrefs, Prefs};
use crate::settings::Settings;
use crate::sim::{LevelDef, RopeColor, RopeTexture, TickInput, generate_level};

const STORAGE_PREFIX: &str = "untangle_";

#[derive(Serialize)]
struct NodeView {
    x: f32,
    y: f32,
    scale: f32,
}

#[derive(Serialize)]
struct RopeView {
    start: [f32; 2],
    end: [f32; 2],
    red: bool,
    texture: RopeTexture,
}

#[derive(Serialize)]
struct FrameView {
    nodes: Vec<NodeView>,
    ropes: Vec<RopeView>,
    score: String,
    won: bool,
    banner_alpha: f32,
    stars: bool,
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Untangle starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    scene: Scene,
    input: TickInput,
}

fn open_prefs() -> Box<dyn Prefs> {
    match LocalStoragePrefs::open(STORAGE_PREFIX) {
        Ok(prefs) => Box::new(prefs),
        Err(e) => {
            log::warn!("{e}, score will not survive reloads");
            Box::new(MemoryPrefs::new())
        }
    }
}

impl WebGame {
    fn with_level(level: LevelDef) -> WebGame {
        WebGame {
            scene: Scene::new(Settings::default(), level, open_prefs()),
            input: TickInput::default(),
        }
    }
}

#[wasm_bindgen]
impl WebGame {
    /// Start with a level given as JSON
    #[wasm_bindgen(constructor)]
    pub fn new(level_json: &str) -> Result<WebGame, JsError> {
        let level = LevelDef::from_json(level_json)?;
        Ok(Self::with_level(level))
    }

    /// Start with a generated level; seeded from the clock when `seed` is 0
    pub fn generated(seed: u64, nodes: usize) -> WebGame {
        let seed = if seed == 0 { js_sys::Date::now() as u64 } else { seed };
        let level = generate_level(seed, nodes, &Settings::default());
        Self::with_level(level)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.input.pointer = Some(Vec2::new(x, y));
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.input.pointer = Some(Vec2::new(x, y));
        self.input.press = true;
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.input.pointer = Some(Vec2::new(x, y));
        self.input.release = true;
    }

    /// Advance by the frame's elapsed seconds
    pub fn tick(&mut self, dt: f32) {
        if self.scene.frame(dt, &self.input) > 0 {
            // Clear one-shot inputs after processing
            self.input.press = false;
            self.input.release = false;
        }
    }

    pub fn reset_positions(&mut self) {
        self.scene.reset_positions();
    }

    pub fn reload(&mut self) -> Result<(), JsError> {
        self.scene.reload()?;
        Ok(())
    }

    /// JSON snapshot of everything needed to draw the frame
    pub fn frame_json(&self) -> Result<String, JsError> {
        let state = &self.scene.state;
        let tile = self.scene.settings.rope_tile_width;
        let view = FrameView {
            nodes: state
                .nodes
                .iter()
                .map(|n| NodeView {
                    x: n.pos.x,
                    y: n.pos.y,
                    scale: n.scale,
                })
                .collect(),
            ropes: state
                .ropes
                .iter()
                .filter_map(|rope| {
                    let seg = state.rope_segment(rope)?;
                    Some(RopeView {
                        start: seg.start.to_array(),
                        end: seg.end.to_array(),
                        red: rope.color == RopeColor::Red,
                        texture: RopeTexture::for_segment(&seg, tile),
                    })
                })
                .collect(),
            score: self.scene.score.label(),
            won: self.scene.is_won(),
            banner_alpha: self.scene.score.banner_alpha,
            stars: self.scene.score.stars_visible,
        };
        Ok(serde_json::to_string(&view)?)
    }
}
