//! Scene coordinator
//!
//! Owns everything that lives for one level instance: the settings, the level
//! definition, the live puzzle state, the score board and any extra win
//! observers. Replaces global events and singletons with explicit ownership;
//! dropping or reloading the scene discards every pending deadline.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::persistence::{Prefs, PrefsError};
use crate::score::ScoreBoard;
use crate::settings::Settings;
use crate::sim::{GameEvent, LevelDef, PuzzleState, TickInput, tick};

/// Subscriber to the one-shot win notification
pub trait WinObserver {
    fn on_win(&mut self);

    /// Per-frame update with the frame's elapsed seconds
    fn update(&mut self, _dt: f32) {}
}

/// A running level
pub struct Scene {
    pub settings: Settings,
    pub level: LevelDef,
    pub state: PuzzleState,
    pub score: ScoreBoard,
    prefs: Box<dyn Prefs>,
    observers: Vec<Box<dyn WinObserver>>,
    accumulator: f32,
}

impl Scene {
    pub fn new(settings: Settings, level: LevelDef, prefs: Box<dyn Prefs>) -> Self {
        let state = level.build(settings.node_radius);
        let score = ScoreBoard::load(&settings, prefs.as_ref());
        log::info!(
            "Scene started ({} nodes, {} ropes)",
            state.nodes.len(),
            state.ropes.len()
        );
        Self {
            settings,
            level,
            state,
            score,
            prefs,
            observers: Vec::new(),
            accumulator: 0.0,
        }
    }

    /// Register an additional win observer
    pub fn subscribe(&mut self, observer: Box<dyn WinObserver>) {
        self.observers.push(observer);
    }

    pub fn is_won(&self) -> bool {
        self.state.is_win_active()
    }

    /// Run one fixed simulation step and dispatch its events
    pub fn step(&mut self, input: &TickInput) -> Vec<GameEvent> {
        tick(&mut self.state, &self.settings, input);
        let events = self.state.drain_events();
        for event in &events {
            if *event == GameEvent::Won {
                self.score.on_win();
                for observer in &mut self.observers {
                    observer.on_win();
                }
            }
        }
        self.update_observers(SIM_DT);
        events
    }

    /// Advance by a variable frame time using fixed substeps.
    ///
    /// One-shot input (press/release) is applied to the first substep only.
    /// Returns the number of substeps run.
    pub fn frame(&mut self, dt: f32, input: &TickInput) -> u32 {
        self.accumulator += dt.min(0.1);

        let mut input = input.clone();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step(&input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            input.press = false;
            input.release = false;
        }
        substeps
    }

    fn update_observers(&mut self, dt: f32) {
        self.score.update(dt);
        for observer in &mut self.observers {
            observer.update(dt);
        }
    }

    /// Put nodes back where the level started and all ropes to green.
    ///
    /// Does not clear the win; use `reload` for a full reset.
    pub fn reset_positions(&mut self) {
        self.state.reset_positions();
        log::info!("Node positions reset");
    }

    /// Rebuild the level from scratch, carrying the score over
    pub fn reload(&mut self) -> Result<(), PrefsError> {
        self.score.carry_over(self.prefs.as_mut())?;
        self.state = self.level.build(self.settings.node_radius);
        self.score = ScoreBoard::load(&self.settings, self.prefs.as_ref());
        self.accumulator = 0.0;
        log::info!("Scene reloaded");
        Ok(())
    }

    /// Swap in a new level, carrying the score over
    pub fn load_level(&mut self, level: LevelDef) -> Result<(), PrefsError> {
        self.level = level;
        self.reload()
    }

    /// Application shutdown: the carried score does not outlive the session
    pub fn quit(mut self) -> Result<(), PrefsError> {
        ScoreBoard::clear(self.prefs.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryPrefs;
    use crate::score::SCORE_KEY;
    use crate::sim::{AnchorDef, NodeDef, NodeId, RopeDef};
    use glam::Vec2;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Two crossing ropes; moving node 3 to (1, 1.8) and node 2 to (-1, 1.8) solves it
    fn crossed_level() -> LevelDef {
        let nodes = [(-1.0, -1.0), (1.0, 1.0), (-1.0, 1.0), (1.0, -1.0)]
            .into_iter()
            .map(|(x, y)| NodeDef { x, y })
            .collect();
        LevelDef {
            nodes,
            ropes: vec![
                RopeDef {
                    anchor: AnchorDef::Node(0),
                    to: Some(1),
                },
                RopeDef {
                    anchor: AnchorDef::Node(2),
                    to: Some(3),
                },
            ],
            solution: None,
        }
    }

    struct Counter(Rc<Cell<u32>>);

    impl WinObserver for Counter {
        fn on_win(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    /// Prefs the test can still read after the scene owns them
    #[derive(Clone, Default)]
    struct SharedPrefs(Rc<RefCell<MemoryPrefs>>);

    impl Prefs for SharedPrefs {
        fn get_int(&self, key: &str) -> Option<i64> {
            self.0.borrow().get_int(key)
        }

        fn set_int(&mut self, key: &str, value: i64) {
            self.0.borrow_mut().set_int(key, value);
        }

        fn remove(&mut self, key: &str) {
            self.0.borrow_mut().remove(key);
        }

        fn flush(&mut self) -> Result<(), PrefsError> {
            self.0.borrow_mut().flush()
        }
    }

    fn solve(scene: &mut Scene) {
        scene.state.set_node_pos(NodeId(2), Vec2::new(-1.0, 1.8));
        scene.state.set_node_pos(NodeId(3), Vec2::new(1.0, 1.8));
    }

    fn run(scene: &mut Scene, ticks: u32) {
        for _ in 0..ticks {
            scene.step(&TickInput::default());
        }
    }

    #[test]
    fn test_win_dispatched_once() {
        let mut scene = Scene::new(Settings::default(), crossed_level(), Box::new(MemoryPrefs::new()));
        let wins = Rc::new(Cell::new(0));
        scene.subscribe(Box::new(Counter(wins.clone())));

        run(&mut scene, 120);
        assert!(!scene.is_won());
        assert_eq!(wins.get(), 0);

        solve(&mut scene);
        run(&mut scene, 600);
        assert!(scene.is_won());
        assert_eq!(wins.get(), 1);
        assert_eq!(scene.score.score, scene.settings.win_score);
    }

    #[test]
    fn test_reset_positions_keeps_win() {
        let mut scene = Scene::new(Settings::default(), crossed_level(), Box::new(MemoryPrefs::new()));
        solve(&mut scene);
        run(&mut scene, 200);
        assert!(scene.is_won());

        scene.reset_positions();
        assert_eq!(scene.state.nodes[2].pos, Vec2::new(-1.0, 1.0));
        assert!(scene.is_won());
    }

    #[test]
    fn test_reload_clears_win_and_keeps_score() {
        let mut scene = Scene::new(Settings::default(), crossed_level(), Box::new(MemoryPrefs::new()));
        solve(&mut scene);
        run(&mut scene, 200);
        assert!(scene.is_won());

        scene.reload().unwrap();
        assert!(!scene.is_won());
        assert_eq!(scene.state.time_ticks, 0);
        assert_eq!(scene.score.score, scene.settings.win_score);

        // A second solve adds on top of the carried score
        solve(&mut scene);
        run(&mut scene, 300);
        assert_eq!(scene.score.score, scene.settings.win_score * 2);
    }

    #[test]
    fn test_frame_substeps() {
        let mut scene = Scene::new(Settings::default(), crossed_level(), Box::new(MemoryPrefs::new()));
        assert_eq!(scene.frame(SIM_DT * 0.5, &TickInput::default()), 0);
        assert_eq!(scene.frame(SIM_DT * 0.6, &TickInput::default()), 1);
        // Long frames are capped
        let substeps = scene.frame(10.0, &TickInput::default());
        assert!(substeps > 0 && substeps <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_frame_press_applies_once() {
        let mut scene = Scene::new(Settings::default(), crossed_level(), Box::new(MemoryPrefs::new()));
        let grab = Vec2::new(-1.0, 1.0);
        scene.frame(SIM_DT * 3.0, &TickInput::press_at(grab));
        assert_eq!(scene.state.drag.map(|d| d.node), Some(NodeId(2)));
    }

    #[test]
    fn test_quit_clears_carried_score() {
        let prefs = SharedPrefs::default();
        let mut scene = Scene::new(Settings::default(), crossed_level(), Box::new(prefs.clone()));
        solve(&mut scene);
        run(&mut scene, 200);
        assert!(scene.is_won());

        scene.reload().unwrap();
        let win_score = i64::from(scene.settings.win_score);
        assert_eq!(prefs.get_int(SCORE_KEY), Some(win_score));

        scene.quit().unwrap();
        assert_eq!(prefs.get_int(SCORE_KEY), None);
    }

    #[test]
    fn test_frame_tap_does_not_stick() {
        let mut scene = Scene::new(Settings::default(), crossed_level(), Box::new(MemoryPrefs::new()));
        let grab = Vec2::new(-1.0, 1.0);
        let tap = TickInput {
            pointer: Some(grab),
            press: true,
            release: true,
        };
        scene.frame(SIM_DT * 1.5, &tap);
        assert!(scene.state.drag.is_none());

        scene.frame(SIM_DT, &TickInput::hover(Vec2::new(2.0, 2.0)));
        assert_eq!(scene.state.nodes[2].pos, grab);
    }

    #[test]
    fn test_drag_clamp_uses_settings_radius() {
        let settings = Settings {
            node_radius: 0.5,
            ..Settings::default()
        };
        let mut scene = Scene::new(settings, crossed_level(), Box::new(MemoryPrefs::new()));
        assert_eq!(scene.state.nodes[0].half_extent, Vec2::splat(0.5));

        scene.step(&TickInput::press_at(Vec2::new(-1.0, -1.0)));
        scene.step(&TickInput::hover(Vec2::new(100.0, 100.0)));
        assert_eq!(scene.state.nodes[0].pos, Vec2::new(2.0, 2.0));

        scene.reload().unwrap();
        assert_eq!(scene.state.nodes[0].half_extent, Vec2::splat(0.5));
    }
}
