//! Seed Drop entry point
//!
//! Headless autoplay: runs a session against the sandbox physics with a
//! scripted player and logs what the HUD would show.
//!
//! Usage: `seed-drop [config.json] [max-seconds] [active|any]`

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use seed_drop::consts::SIM_DT;
use seed_drop::sandbox::SandboxWorld;
use seed_drop::sim::{GameEvent, SessionState, TickInput, tick};
use seed_drop::{FirstContactPolicy, GameConfig, Hud};

/// Scripted player: holds the button for a random number of frames, then
/// releases, then waits for the next seed
struct AutoPlayer {
    rng: Pcg32,
    hold_frames: u32,
    held_for: u32,
    sweep: f32,
}

impl AutoPlayer {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            hold_frames: 0,
            held_for: 0,
            sweep: 0.0,
        }
    }

    fn input<P: seed_drop::sim::PhysicsWorld>(&mut self, state: &SessionState<P>) -> TickInput {
        let camera = &state.config().camera;
        self.sweep += SIM_DT;
        let pointer_x = camera.width * (0.5 + 0.04 * (self.sweep * 0.7).sin());

        if state.held_seed().is_none() {
            self.held_for = 0;
            self.hold_frames = 0;
            return TickInput {
                charge_held: false,
                pointer_x: Some(pointer_x),
            };
        }
        if self.hold_frames == 0 {
            self.hold_frames = self.rng.random_range(6..60);
        }
        self.held_for += 1;
        TickInput {
            charge_held: self.held_for <= self.hold_frames,
            pointer_x: Some(pointer_x),
        }
    }
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mut config = match args.next() {
        Some(path) => GameConfig::load(Path::new(&path)),
        None => GameConfig::default(),
    };
    let max_seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(180.0);
    if let Some(policy) = args.next() {
        match FirstContactPolicy::from_str(&policy) {
            Some(policy) => config.first_contact_policy = policy,
            None => log::warn!("Unknown first-contact policy {policy:?}, keeping default"),
        }
    }
    log::info!(
        "{} tiers, {} lives, first contact: {}",
        config.tiers.len(),
        config.max_lives,
        config.first_contact_policy.as_str()
    );

    let mut hud = Hud::new(config.hud.clone());
    let mut player = AutoPlayer::new(config.rng_seed ^ 0xa11ce);
    let mut state = SessionState::new(config, SandboxWorld::basket());
    state.start();

    while !state.is_terminal() && state.elapsed_time() < max_seconds {
        let input = player.input(&state);
        tick(&mut state, &input, SIM_DT);

        let reports = state.physics_mut().step(SIM_DT);
        for report in reports {
            state.handle_contact(report);
        }

        for event in state.drain_events() {
            if matches!(
                event,
                GameEvent::MergeEffect { .. } | GameEvent::GameOver { .. }
            ) {
                match serde_json::to_string(&event) {
                    Ok(json) => log::info!("{json}"),
                    Err(e) => log::warn!("Could not encode event: {e}"),
                }
            }
            hud.apply(&event);
        }
        hud.advance(SIM_DT, state.elapsed_time());
        hud.merge_effects.clear();
        hud.sounds.clear();
    }

    match &hud.game_over {
        Some(panel) => println!("GAME OVER  time {}  score {}", panel.time_text, panel.score_text),
        None => println!(
            "{} | {} | {}",
            hud.score_text.replace('\n', " "),
            hud.life_text.replace('\n', " "),
            hud.timer_text.replace('\n', " ")
        ),
    }
}
