//! Contact rules and merge orchestration
//!
//! Every inbound collision runs the same three rules in order: first-contact
//! spawn, floor penalty, same-tier merge. Merges lock both seeds in the same
//! call that matched them, then resolve through the scheduler.

use glam::{Quat, Vec3};

use super::arena::SeedId;
use super::body::{Contact, ContactReport, PhysicsWorld, Trigger, Velocity};
use super::catalog::Tier;
use super::seed::SeedPhase;
use super::state::{DeferredAction, GameEvent, SessionState, SoundCue};

impl<P: PhysicsWorld> SessionState<P> {
    /// Route a report from the physics collaborator
    pub fn handle_contact(&mut self, report: ContactReport) {
        match report {
            ContactReport::Collision { seed, other } => self.on_collide(seed, other),
            ContactReport::TriggerEnter { seed, other } => self.on_trigger_enter(seed, other),
            ContactReport::OutOfPlay { seed } => self.retire_out_of_play(seed),
        }
    }

    /// A seed's collider touched something
    pub fn on_collide(&mut self, id: SeedId, other: Contact) {
        if self.terminal {
            return;
        }
        let Some(seed) = self.seeds.get_mut(id) else {
            log::debug!("Collision for retired {id} ignored");
            return;
        };

        let first_contact = seed.consume_first_contact();
        let hit_floor = other == Contact::Ground && seed.consume_life_loss();

        if first_contact {
            self.proceed_next();
        }
        if hit_floor {
            self.lose_life();
        }
        if let Contact::Seed(other_id) = other {
            self.try_begin_merge(id, other_id);
        }
    }

    /// A seed's collider entered a trigger region
    pub fn on_trigger_enter(&mut self, id: SeedId, other: Trigger) {
        if self.terminal {
            return;
        }
        let scoring_region = match other {
            Trigger::Scoreable => true,
            Trigger::Seed(other_id) => self.seeds.get(other_id).is_some_and(|s| s.scored),
            Trigger::Other => false,
        };
        if !scoring_region {
            return;
        }

        let Some(seed) = self.seeds.get_mut(id) else {
            return;
        };
        if !seed.consume_score() {
            return;
        }
        let tier = seed.tier;
        let points = self.config.tiers.score(tier);
        self.events.push(GameEvent::SeedScored {
            seed: id,
            tier,
            points,
        });
        self.add_score(points);
    }

    /// Retire a seed that left the play volume.
    ///
    /// A thrown seed that never touched anything would otherwise leave the
    /// player with nothing to throw, so it requests the next spawn itself.
    pub fn retire_out_of_play(&mut self, id: SeedId) {
        let Some(seed) = self.retire_seed(id) else {
            return;
        };
        let stalled = seed.is_held() || (seed.active_throw && !seed.first_contact_consumed);
        if stalled {
            self.proceed_next();
        }
    }

    /// Lock two same-tier seeds into a merge. Returns false if either is
    /// gone, held, already locked, of a different tier or at the top tier.
    pub fn try_begin_merge(&mut self, a: SeedId, b: SeedId) -> bool {
        if self.terminal {
            return false;
        }
        let (Some(seed_a), Some(seed_b)) = (self.seeds.get(a), self.seeds.get(b)) else {
            return false;
        };
        if seed_a.is_held() || seed_b.is_held() {
            return false;
        }
        if !seed_a.can_merge_with(seed_b, self.config.tiers.max_tier()) {
            return false;
        }

        let tier = seed_a.tier;
        let (body_a, body_b) = (seed_a.body, seed_b.body);

        // Capture velocities before freezing, while both bodies still exist
        let va = body_a.and_then(|h| self.physics.velocity(h));
        let vb = body_b.and_then(|h| self.physics.velocity(h));
        let velocity = match (va, vb) {
            (Some(va), Some(vb)) => Velocity::blend(va, vb),
            (Some(v), None) | (None, Some(v)) => v,
            (None, None) => Velocity::ZERO,
        };
        for body in [body_a, body_b].into_iter().flatten() {
            self.physics.set_kinematic(body, true);
        }

        let timer = self.scheduler.after(
            self.config.merge_delay,
            DeferredAction::ResolveMerge {
                a,
                b,
                tier,
                velocity,
            },
        );
        if let Some(seed) = self.seeds.get_mut(a) {
            seed.lock_for_merge(timer, b);
        }
        if let Some(seed) = self.seeds.get_mut(b) {
            seed.lock_for_merge(timer, a);
        }
        log::debug!("Merge pending: {a} + {b} (tier {tier})");
        true
    }

    /// Deferred half of a merge. No-op if either parent is already gone.
    pub(crate) fn resolve_merge(&mut self, a: SeedId, b: SeedId, tier: Tier, velocity: Velocity) {
        let (Some(seed_a), Some(seed_b)) = (self.seeds.get(a), self.seeds.get(b)) else {
            log::debug!("Merge {a} + {b} dropped: a parent was retired");
            return;
        };
        let pa = seed_a.body.and_then(|h| self.physics.position(h));
        let pb = seed_b.body.and_then(|h| self.physics.position(h));
        let point = match (pa, pb) {
            (Some(pa), Some(pb)) => pa.lerp(pb, 0.5),
            (Some(p), None) | (None, Some(p)) => p,
            (None, None) => self.config.spawn_position,
        };
        self.merge(point, tier, velocity, &[a, b]);
    }

    /// Replace `to_destroy` with one seed of `tier + 1` at `point`.
    ///
    /// Refused past the top tier (or once the session is over): nothing is
    /// destroyed and the score does not change.
    pub fn merge(
        &mut self,
        point: Vec3,
        tier: Tier,
        velocity: Velocity,
        to_destroy: &[SeedId],
    ) -> Option<SeedId> {
        if self.terminal {
            log::debug!("Merge refused: session is over");
            return None;
        }
        let next = tier + 1;
        if self.config.tiers.get(next).is_none() {
            log::debug!("Merge refused: tier {tier} is the top tier");
            return None;
        }

        self.events.push(GameEvent::Sound(SoundCue::Merge));
        self.events.push(GameEvent::MergeEffect {
            position: point,
            tier: next,
        });

        let id = self.insert_seed(next, SeedPhase::InFlight, point, Quat::IDENTITY);
        let prescored = self.config.merged_seed_prescored;
        let spawns_next = self.merge_products_spawn_next();
        let body = self.seeds.get_mut(id).and_then(|seed| {
            seed.scored = prescored;
            seed.active_throw = spawns_next;
            seed.body
        });
        if let Some(body) = body {
            self.physics.set_kinematic(body, false);
            self.physics.set_velocity(body, velocity);
        }

        for &parent in to_destroy {
            self.retire_seed(parent);
        }

        self.add_score(self.config.tiers.score(next));
        log::info!("Merged into {id} (tier {next}), score {}", self.score);
        Some(id)
    }
}
