//! Session state and core simulation types
//!
//! The session is the ledger (score, lives, elapsed time) and the only place
//! seeds are created or retired. Every cross-seed effect goes through it.

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::{Arena, SeedId};
use super::body::{BodySpec, PhysicsWorld, Velocity};
use super::catalog::{Tier, TierCatalog};
use super::scheduler::Scheduler;
use super::seed::{ScreenAnchor, Seed, SeedPhase};
use super::throw::ThrowController;
use crate::config::{FirstContactPolicy, GameConfig};

/// One-shot audio cues for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Throw,
    Merge,
    GameOver,
}

/// Things the presentation layer reacts to. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SeedSpawned {
        seed: SeedId,
        tier: Tier,
        position: Vec3,
        held: bool,
    },
    SeedThrown {
        seed: SeedId,
        power: f32,
    },
    /// Power meter fill in [0, 1]; 0 when idle
    PowerMeter {
        normalized: f32,
    },
    SeedScored {
        seed: SeedId,
        tier: Tier,
        points: u64,
    },
    MergeEffect {
        position: Vec3,
        tier: Tier,
    },
    SeedRetired {
        seed: SeedId,
    },
    ScoreChanged {
        score: u64,
    },
    LivesChanged {
        lives: u8,
        max_lives: u8,
    },
    GameOver {
        score: u64,
        elapsed: f64,
    },
    Sound(SoundCue),
}

/// Work deferred through the scheduler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeferredAction {
    SpawnNext,
    ResolveMerge {
        a: SeedId,
        b: SeedId,
        tier: Tier,
        velocity: Velocity,
    },
}

/// One play session
pub struct SessionState<P: PhysicsWorld> {
    pub(crate) config: GameConfig,
    pub(crate) physics: P,
    pub(crate) seeds: Arena<Seed>,
    pub(crate) scheduler: Scheduler<DeferredAction>,
    pub(crate) throw: ThrowController,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,

    pub(crate) score: u64,
    pub(crate) lives: u8,
    pub(crate) elapsed_time: f64,
    /// The single seed in the player's hand
    pub(crate) held: Option<SeedId>,
    /// A `SpawnNext` is already queued
    pub(crate) spawn_pending: bool,
    pub(crate) terminal: bool,
    /// Last reported pointer x (pixels)
    pub(crate) pointer_x: Option<f32>,
}

impl<P: PhysicsWorld> SessionState<P> {
    /// Create a session. Call [`SessionState::start`] to put the first seed in hand.
    pub fn new(config: GameConfig, physics: P) -> Self {
        let config = config.validate();
        let throw = ThrowController::new(config.charge_tuning());
        Self {
            rng: Pcg32::seed_from_u64(config.rng_seed),
            lives: config.max_lives,
            throw,
            config,
            physics,
            seeds: Arena::new(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            score: 0,
            elapsed_time: 0.0,
            held: None,
            spawn_pending: false,
            terminal: false,
            pointer_x: None,
        }
    }

    /// Announce the initial ledger and spawn the first held seed
    pub fn start(&mut self) -> Option<SeedId> {
        self.events.push(GameEvent::ScoreChanged { score: self.score });
        self.events.push(GameEvent::LivesChanged {
            lives: self.lives,
            max_lives: self.config.max_lives,
        });
        self.spawn_held_seed()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn held_seed(&self) -> Option<SeedId> {
        self.held
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.config.tiers
    }

    pub fn seed(&self, id: SeedId) -> Option<&Seed> {
        self.seeds.get(id)
    }

    pub fn seeds(&self) -> impl Iterator<Item = (SeedId, &Seed)> {
        self.seeds.iter()
    }

    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    pub fn throw_controller(&self) -> &ThrowController {
        &self.throw
    }

    pub fn pending_actions(&self) -> impl Iterator<Item = &DeferredAction> {
        self.scheduler.pending()
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Create a seed and its body
    pub(crate) fn insert_seed(
        &mut self,
        tier: Tier,
        phase: SeedPhase,
        position: Vec3,
        rotation: Quat,
    ) -> SeedId {
        let id = self.seeds.insert_with(|id| Seed::new(id, tier, phase));
        let spec = BodySpec {
            owner: id,
            position,
            rotation,
            radius: self.config.tiers.radius(tier),
            kinematic: phase != SeedPhase::InFlight,
        };
        let body = self.physics.create_body(spec);
        if body.is_none() {
            log::warn!("No physics body for {id}; physics steps will be skipped");
        }
        if let Some(seed) = self.seeds.get_mut(id) {
            seed.body = body;
        }
        self.events.push(GameEvent::SeedSpawned {
            seed: id,
            tier,
            position,
            held: phase == SeedPhase::Held,
        });
        id
    }

    /// Put a new random-tier seed in the player's hand
    pub(crate) fn spawn_held_seed(&mut self) -> Option<SeedId> {
        if self.terminal {
            log::debug!("Spawn refused: session is over");
            return None;
        }
        if self.held.is_some() {
            log::debug!("Spawn refused: a seed is already held");
            return None;
        }
        if !self.config.tiers.is_playable() {
            log::debug!("Spawn refused: tier catalog needs at least 2 entries");
            return None;
        }

        let tier = self.rng.random_range(0..self.config.tiers.spawnable_tiers());
        let position = self.config.spawn_position;
        let id = self.insert_seed(tier, SeedPhase::Held, position, self.config.spawn_rotation);
        let screen = self.config.camera.world_to_screen(position);
        if let Some(seed) = self.seeds.get_mut(id) {
            seed.active_throw = true;
            seed.anchor = Some(ScreenAnchor {
                screen_y: screen.y,
                depth: screen.z,
            });
        }
        self.held = Some(id);
        log::info!("Spawned held {id} (tier {tier})");
        Some(id)
    }

    /// Drop a free seed of `tier` into play at `position`, already thrown.
    ///
    /// Used for pre-filled layouts and scripted scenarios; it never scores
    /// on creation and never requests a spawn.
    pub fn place_seed(&mut self, tier: Tier, position: Vec3) -> Option<SeedId> {
        if self.terminal || self.config.tiers.get(tier).is_none() {
            return None;
        }
        Some(self.insert_seed(tier, SeedPhase::InFlight, position, Quat::IDENTITY))
    }

    /// Queue the next held seed after the spawn delay
    pub fn proceed_next(&mut self) -> bool {
        if self.terminal {
            log::debug!("ProceedNext refused: session is over");
            return false;
        }
        if self.held.is_some() || self.spawn_pending {
            log::debug!("ProceedNext refused: a seed is already held or queued");
            return false;
        }
        if !self.config.tiers.is_playable() {
            log::debug!("ProceedNext refused: tier catalog needs at least 2 entries");
            return false;
        }
        self.spawn_pending = true;
        self.scheduler
            .after(self.config.spawn_delay, DeferredAction::SpawnNext);
        true
    }

    /// Add points to the running score. Ignored once the session is over.
    pub fn add_score(&mut self, amount: u64) {
        if self.terminal {
            log::debug!("AddScore({amount}) ignored: session is over");
            return;
        }
        self.score = self.score.saturating_add(amount);
        self.events.push(GameEvent::ScoreChanged { score: self.score });
    }

    /// Take one life. Returns false when refused.
    pub fn lose_life(&mut self) -> bool {
        if self.terminal || self.lives == 0 {
            log::debug!("LoseLife refused: no lives left");
            return false;
        }
        self.lives -= 1;
        self.events.push(GameEvent::LivesChanged {
            lives: self.lives,
            max_lives: self.config.max_lives,
        });
        log::info!("Life lost, {} remaining", self.lives);
        if self.lives == 0 {
            self.game_over();
        }
        true
    }

    fn game_over(&mut self) {
        if self.terminal {
            return;
        }
        self.terminal = true;
        self.throw.reset();
        log::info!(
            "Game over: score {} after {:.1}s",
            self.score,
            self.elapsed_time
        );
        self.events.push(GameEvent::Sound(SoundCue::GameOver));
        self.events.push(GameEvent::GameOver {
            score: self.score,
            elapsed: self.elapsed_time,
        });
    }

    /// Destroy a seed and its body.
    ///
    /// A pending merge it was locked into is cancelled and the partner is
    /// released back into simulation.
    pub(crate) fn retire_seed(&mut self, id: SeedId) -> Option<Seed> {
        let seed = self.seeds.remove(id)?;
        if let Some(body) = seed.body {
            self.physics.destroy_body(body);
        }
        if self.held == Some(id) {
            self.held = None;
            self.throw.reset();
        }
        let cancelled = seed
            .merge_timer
            .is_some_and(|timer| self.scheduler.cancel(timer));
        if cancelled {
            if let Some(partner) = seed.merge_partner {
                self.release_merge_partner(partner);
            }
        }
        self.events.push(GameEvent::SeedRetired { seed: id });
        log::debug!("Retired {id}");
        Some(seed)
    }

    fn release_merge_partner(&mut self, id: SeedId) {
        let Some(seed) = self.seeds.get_mut(id) else {
            return;
        };
        seed.release_merge_lock();
        if let Some(body) = seed.body {
            self.physics.set_kinematic(body, false);
        }
        log::debug!("Released {id} from a cancelled merge");
    }

    /// Whether a merge product should request the next spawn on first contact
    pub(crate) fn merge_products_spawn_next(&self) -> bool {
        self.config.first_contact_policy == FirstContactPolicy::AnySeed
    }

    /// Random point inside the unit sphere
    pub(crate) fn unit_sphere_sample(&mut self) -> Vec3 {
        loop {
            let v = Vec3::new(
                self.rng.random_range(-1.0..=1.0),
                self.rng.random_range(-1.0..=1.0),
                self.rng.random_range(-1.0..=1.0),
            );
            if v.length_squared() <= 1.0 {
                return v;
            }
        }
    }
}
