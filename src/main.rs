//! Untangle entry point
//!
//! The browser build is driven through `untangle::web`. Natively this runs a
//! headless session: load or generate a level, solve it by dragging each node
//! to its solution position, and report the result.
//!
//! Usage: `untangle [level.json] [--seed N] [--nodes K] [--settings file.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use glam::Vec2;
    use untangle::Scene;
    use untangle::persistence::JsonFilePrefs;
    use untangle::settings::Settings;
    use untangle::sim::{LevelDef, NodeId, TickInput, generate_level};

    /// Ticks spent moving each node to its target
    const DRAG_TICKS: u32 = 20;
    /// Give up if the win hasn't fired after this many extra ticks
    const SETTLE_TICKS: u32 = 600;

    const PREFS_FILE: &str = "untangle_prefs.json";

    #[derive(Debug, Default)]
    struct Args {
        level: Option<PathBuf>,
        seed: Option<u64>,
        nodes: usize,
        settings: Option<PathBuf>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = Args {
            nodes: 6,
            ..Default::default()
        };
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--seed" => {
                    let v = iter.next().ok_or("--seed needs a value")?;
                    args.seed = Some(v.parse().map_err(|_| format!("bad seed: {v}"))?);
                }
                "--nodes" => {
                    let v = iter.next().ok_or("--nodes needs a value")?;
                    args.nodes = v.parse().map_err(|_| format!("bad node count: {v}"))?;
                }
                "--settings" => {
                    let v = iter.next().ok_or("--settings needs a value")?;
                    args.settings = Some(PathBuf::from(v));
                }
                other if other.starts_with("--") => return Err(format!("unknown flag: {other}")),
                path => args.level = Some(PathBuf::from(path)),
            }
        }
        Ok(args)
    }

    fn load_level(args: &Args, settings: &Settings) -> Result<LevelDef, Box<dyn std::error::Error>> {
        match &args.level {
            Some(path) => Ok(LevelDef::load(path)?),
            None => {
                let seed = args.seed.unwrap_or_else(|| {
                    std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_millis() as u64)
                        .unwrap_or(0)
                });
                Ok(generate_level(seed, args.nodes, settings))
            }
        }
    }

    /// Drag one node to `target` through pointer input
    fn drag_node(scene: &mut Scene, id: NodeId, target: Vec2) {
        let Some(start) = scene.state.node(id).map(|n| n.pos) else {
            return;
        };

        scene.step(&TickInput::press_at(start));
        if scene.state.drag.map(|d| d.node) != Some(id) {
            // Another node sits on top of this one; place it directly
            log::warn!("Node {} is covered, placing it directly", id.0);
            scene.step(&TickInput::release_at(start));
            scene.state.set_node_pos(id, target);
            return;
        }

        for i in 1..=DRAG_TICKS {
            let t = i as f32 / DRAG_TICKS as f32;
            scene.step(&TickInput::hover(start.lerp(target, t)));
        }
        scene.step(&TickInput::release_at(target));
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let args = parse_args()?;
        let settings = match &args.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let level = load_level(&args, &settings)?;
        let Some(solution) = level.solution_positions() else {
            return Err("level has no solution to play back".into());
        };

        let prefs = JsonFilePrefs::open(PREFS_FILE)?;
        let mut scene = Scene::new(settings, level, Box::new(prefs));

        // Let the first frame color the ropes
        scene.step(&TickInput::default());
        log::info!(
            "Start: {} of {} ropes red",
            scene.state.red_count(),
            scene.state.ropes.len()
        );

        for (i, target) in solution.into_iter().enumerate() {
            drag_node(&mut scene, NodeId(i as u32), target);
            log::debug!("Placed node {i}, {} ropes red", scene.state.red_count());
        }

        for _ in 0..SETTLE_TICKS {
            if scene.is_won() && !scene.score.is_animating() {
                break;
            }
            scene.step(&TickInput::default());
        }

        if scene.is_won() {
            println!("Solved at tick {}. {}", scene.state.time_ticks, scene.score.label());
        } else {
            println!(
                "Not solved: {} ropes still red after {} ticks",
                scene.state.red_count(),
                scene.state.time_ticks
            );
        }

        // Session over: the carried score does not outlive it
        scene.quit()?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Untangle (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is untangle::web, this is just to satisfy the compiler
}
