//! Lane Brawler headless runner
//!
//! Plays one run on autopilot at a fixed 60 Hz frame delta and prints the
//! final HUD as JSON. `RUST_LOG=debug` shows spawns and kills.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use thiserror::Error;

    use lane_brawler::audio::{LogSink, dispatch_sounds};
    use lane_brawler::consts::FRAME_DT;
    use lane_brawler::sim::{GamePhase, GameState, PlayerClass, TickInput, tick};
    use lane_brawler::{Tuning, TuningError};

    #[derive(Debug, Error)]
    pub enum RunError {
        #[error("failed to read {path}: {source}")]
        Read {
            path: PathBuf,
            source: std::io::Error,
        },
        #[error(transparent)]
        Tuning(#[from] TuningError),
        #[error("failed to encode snapshot: {0}")]
        Encode(#[from] serde_json::Error),
    }

    #[derive(Parser, Debug)]
    #[command(name = "lane-brawler")]
    #[command(about = "Run the brawler simulation headless on autopilot")]
    struct Args {
        /// Player class
        #[arg(long, default_value = "knight")]
        class: PlayerClass,
        /// RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Simulated seconds before giving up
        #[arg(long, default_value_t = 180.0)]
        seconds: f32,
        /// JSON balance overrides
        #[arg(long)]
        tuning: Option<PathBuf>,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning, RunError> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| RunError::Read {
            path: path.clone(),
            source,
        })?;
        let tuning = Tuning::from_json(&text)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn run() -> Result<(), RunError> {
        env_logger::init();
        let args = Args::parse();
        let tuning = load_tuning(args.tuning.as_ref())?;

        let mut state = GameState::new(args.seed, tuning);
        state.selected_class = args.class;
        let mut sink = LogSink::default();
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        let max_frames = (args.seconds.max(0.0) / FRAME_DT) as u64;
        for _ in 0..max_frames {
            tick(&mut state, &idle, FRAME_DT);
            dispatch_sounds(&state.drain_events(), &mut sink);
            if matches!(state.phase, GamePhase::Victory | GamePhase::GameOver) {
                break;
            }
        }

        match state.phase {
            GamePhase::Victory => log::info!("Victory in {} frames", state.frames),
            GamePhase::GameOver => log::info!("Defeated at x = {:.0}", state.player.pos.x),
            _ => log::warn!("No outcome after {:.0}s of play", args.seconds),
        }
        log::debug!("{} sound triggers played", sink.played);

        println!("{}", serde_json::to_string_pretty(&state.snapshot().hud)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), native::RunError> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web; nothing to run here
}
