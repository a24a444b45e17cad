//! Per-frame simulation tick
//!
//! Advances the session clock, polls the throw controller, fires due deferred
//! actions and keeps the held seed under the pointer.

use glam::Vec3;

use super::arena::SeedId;
use super::body::PhysicsWorld;
use super::state::{DeferredAction, GameEvent, SessionState, SoundCue};
use super::throw::{ThrowOutcome, throw_direction};

/// Input sampled for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Charge button currently down
    pub charge_held: bool,
    /// Pointer x in screen pixels, if the pointer is over the viewport
    pub pointer_x: Option<f32>,
}

/// Advance the session by one frame. Does nothing once the session is over.
pub fn tick<P: PhysicsWorld>(state: &mut SessionState<P>, input: &TickInput, dt: f32) {
    if state.terminal {
        return;
    }

    state.elapsed_time += dt as f64;
    if input.pointer_x.is_some() {
        state.pointer_x = input.pointer_x;
    }

    match state.throw.handle_input(input.charge_held, dt, &mut state.held) {
        ThrowOutcome::Charging {
            seed, normalized, ..
        } => {
            if let Some(seed) = state.seeds.get_mut(seed) {
                seed.shake = normalized;
            }
            state.events.push(GameEvent::PowerMeter { normalized });
        }
        ThrowOutcome::Released { seed, power } => {
            state.events.push(GameEvent::PowerMeter { normalized: 0.0 });
            state.throw_seed(seed, power);
        }
        ThrowOutcome::None => {}
    }

    for action in state.scheduler.advance(dt) {
        state.run_deferred(action);
    }

    state.follow_pointer();
}

impl<P: PhysicsWorld> SessionState<P> {
    /// Throw a held seed with `power`. A seed that was already thrown is left alone.
    pub fn throw_seed(&mut self, id: SeedId, power: f32) -> bool {
        let Some(seed) = self.seeds.get_mut(id) else {
            return false;
        };
        if !seed.start_throw() {
            return false;
        }
        let body = seed.body;
        if self.held == Some(id) {
            self.held = None;
        }

        self.events.push(GameEvent::Sound(SoundCue::Throw));
        self.events.push(GameEvent::SeedThrown { seed: id, power });

        let Some(body) = body else {
            log::warn!("{id} has no physics body; throw impulse skipped");
            return true;
        };
        let direction = throw_direction(
            self.config.camera.forward(),
            power,
            self.config.power_upper_bound,
        );
        self.physics.set_kinematic(body, false);
        self.physics.apply_impulse(body, direction, power);
        log::info!("Threw {id} with power {power:.2}");
        true
    }

    pub(crate) fn run_deferred(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::SpawnNext => {
                self.spawn_pending = false;
                self.spawn_held_seed();
            }
            DeferredAction::ResolveMerge {
                a,
                b,
                tier,
                velocity,
            } => self.resolve_merge(a, b, tier, velocity),
        }
    }

    /// Slide the held seed to the pointer along its spawn screen row.
    ///
    /// Only the position is written; the body's velocity is untouched.
    fn follow_pointer(&mut self) {
        let (Some(id), Some(pointer_x)) = (self.held, self.pointer_x) else {
            return;
        };
        let Some(seed) = self.seeds.get(id) else {
            return;
        };
        let (Some(anchor), Some(body)) = (seed.anchor, seed.body) else {
            return;
        };
        let shaking = seed.shake > 0.0;

        let base = self
            .config
            .camera
            .screen_to_world(Vec3::new(pointer_x, anchor.screen_y, anchor.depth));
        let offset = if shaking {
            let sample = self.unit_sphere_sample();
            self.seeds
                .get(id)
                .map(|s| s.shake_offset(self.config.max_shake, sample))
                .unwrap_or(Vec3::ZERO)
        } else {
            Vec3::ZERO
        };
        self.physics.set_position(body, base + offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::consts::SIM_DT;
    use crate::sandbox::SandboxWorld;
    use crate::sim::body::Velocity;
    use crate::sim::seed::SeedPhase;

    fn started() -> (SessionState<SandboxWorld>, SeedId) {
        let mut state = SessionState::new(GameConfig::default(), SandboxWorld::new());
        let id = state.start().unwrap();
        (state, id)
    }

    fn hold(charge_held: bool) -> TickInput {
        TickInput {
            charge_held,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_advances_clock() {
        let (mut state, _) = started();
        tick(&mut state, &TickInput::default(), 0.5);
        tick(&mut state, &TickInput::default(), 0.25);
        assert!((state.elapsed_time() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_charge_and_release_throws() {
        let (mut state, id) = started();
        for _ in 0..10 {
            tick(&mut state, &hold(true), SIM_DT);
        }
        assert!(state.seed(id).unwrap().shake > 0.0);
        assert!(state.seed(id).unwrap().is_held());

        tick(&mut state, &hold(false), SIM_DT);
        let seed = state.seed(id).unwrap();
        assert_eq!(seed.phase, SeedPhase::InFlight);
        assert_eq!(seed.shake, 0.0);
        assert_eq!(state.held_seed(), None);

        let body = seed.body.unwrap();
        assert!(!state.physics().is_kinematic(body));
        let v = state.physics().velocity(body).unwrap();
        assert!(v.linear.z > 0.0);
        assert!(v.linear.y > 0.0);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Sound(SoundCue::Throw)));
        assert!(events.contains(&GameEvent::PowerMeter { normalized: 0.0 }));
    }

    #[test]
    fn test_throw_seed_twice_is_noop() {
        let (mut state, id) = started();
        assert!(state.throw_seed(id, 3.0));
        let body = state.seed(id).unwrap().body.unwrap();
        let first = state.physics().velocity(body).unwrap();
        assert!(!state.throw_seed(id, 3.0));
        assert_eq!(state.physics().velocity(body).unwrap(), first);
    }

    #[test]
    fn test_held_seed_follows_pointer_without_velocity() {
        let (mut state, id) = started();
        let body = state.seed(id).unwrap().body.unwrap();
        let start = state.physics().position(body).unwrap();
        let anchor = state.config().camera.world_to_screen(start);

        let input = TickInput {
            charge_held: false,
            pointer_x: Some(anchor.x + 150.0),
        };
        tick(&mut state, &input, SIM_DT);

        let moved = state.physics().position(body).unwrap();
        assert!(moved.x < start.x, "screen-right is world -x for a +z camera");
        let screen = state.config().camera.world_to_screen(moved);
        assert!((screen.y - anchor.y).abs() < 1e-2);
        assert!((screen.z - anchor.z).abs() < 1e-3);
        assert_eq!(state.physics().velocity(body), Some(Velocity::ZERO));
    }

    #[test]
    fn test_terminal_session_ignores_input() {
        let mut state = SessionState::new(
            GameConfig {
                max_lives: 1,
                ..Default::default()
            },
            SandboxWorld::new(),
        );
        let id = state.start().unwrap();
        state.lose_life();
        let before = state.elapsed_time();

        tick(&mut state, &hold(true), SIM_DT);
        tick(&mut state, &hold(false), SIM_DT);
        assert_eq!(state.elapsed_time(), before);
        assert!(state.seed(id).unwrap().is_held());
    }

    #[test]
    fn test_spawn_after_delay() {
        let (mut state, id) = started();
        tick(&mut state, &hold(true), SIM_DT);
        tick(&mut state, &hold(false), SIM_DT);
        state.on_collide(id, crate::sim::body::Contact::Other);

        let frames = (state.config().spawn_delay / SIM_DT).ceil() as usize + 1;
        for _ in 0..frames {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let next = state.held_seed().unwrap();
        assert_ne!(next, id);
        assert_eq!(state.seed_count(), 2);
    }
}
