//! Seed entity and its per-instance latches
//!
//! A seed moves `Held -> InFlight -> Merging` and is retired by removing it
//! from the session arena. The latches below are one-way: once consumed they
//! never reset for the lifetime of the instance.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::arena::SeedId;
use super::body::BodyHandle;
use super::catalog::Tier;
use super::scheduler::TimerId;

/// Lifecycle phase of a live seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedPhase {
    /// In the player's hand, body frozen, following the pointer
    Held,
    /// Thrown or released by a merge, body simulated
    InFlight,
    /// Locked into a pending merge, body frozen
    Merging,
}

/// Screen anchor captured at spawn; a held seed slides along screen x only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenAnchor {
    pub screen_y: f32,
    pub depth: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    pub id: SeedId,
    pub tier: Tier,
    pub phase: SeedPhase,
    /// Physics body, `None` when the collaborator could not create one
    pub body: Option<BodyHandle>,
    pub merge_locked: bool,
    pub scored: bool,
    /// Player-thrown seed whose first contact requests the next spawn
    pub active_throw: bool,
    pub first_contact_consumed: bool,
    pub lost_life_consumed: bool,
    pub anchor: Option<ScreenAnchor>,
    /// Charge shake intensity in [0, 1]
    pub shake: f32,
    /// Pending merge resolution this seed is locked into
    #[serde(skip)]
    pub merge_timer: Option<TimerId>,
    pub merge_partner: Option<SeedId>,
}

impl Seed {
    pub fn new(id: SeedId, tier: Tier, phase: SeedPhase) -> Self {
        Self {
            id,
            tier,
            phase,
            body: None,
            merge_locked: false,
            scored: false,
            active_throw: false,
            first_contact_consumed: false,
            lost_life_consumed: false,
            anchor: None,
            shake: 0.0,
            merge_timer: None,
            merge_partner: None,
        }
    }

    pub fn is_held(&self) -> bool {
        self.phase == SeedPhase::Held
    }

    pub fn is_thrown(&self) -> bool {
        self.phase != SeedPhase::Held
    }

    /// Mark the seed thrown. Returns false if it already was.
    pub fn start_throw(&mut self) -> bool {
        if self.is_thrown() {
            return false;
        }
        self.phase = SeedPhase::InFlight;
        self.shake = 0.0;
        true
    }

    /// First contact after being thrown, consumed exactly once
    pub fn consume_first_contact(&mut self) -> bool {
        if !self.active_throw || self.first_contact_consumed || self.is_held() {
            return false;
        }
        self.first_contact_consumed = true;
        true
    }

    /// Floor penalty, consumed exactly once
    pub fn consume_life_loss(&mut self) -> bool {
        if self.lost_life_consumed {
            return false;
        }
        self.lost_life_consumed = true;
        true
    }

    /// Score latch, set exactly once
    pub fn consume_score(&mut self) -> bool {
        if self.scored {
            return false;
        }
        self.scored = true;
        true
    }

    /// Whether this seed and `other` may start a merge together
    pub fn can_merge_with(&self, other: &Seed, max_tier: Option<Tier>) -> bool {
        self.id != other.id
            && self.tier == other.tier
            && !self.merge_locked
            && !other.merge_locked
            && max_tier.is_some_and(|max| self.tier < max)
    }

    /// Lock into a pending merge with `partner`
    pub fn lock_for_merge(&mut self, timer: TimerId, partner: SeedId) {
        self.merge_locked = true;
        self.phase = SeedPhase::Merging;
        self.merge_timer = Some(timer);
        self.merge_partner = Some(partner);
    }

    /// Undo a merge lock whose partner disappeared
    pub fn release_merge_lock(&mut self) {
        self.merge_locked = false;
        self.phase = SeedPhase::InFlight;
        self.merge_timer = None;
        self.merge_partner = None;
    }

    /// Random offset inside a sphere scaled by the current shake
    pub fn shake_offset(&self, max_shake: f32, unit_sphere_sample: Vec3) -> Vec3 {
        if self.shake <= 0.0 {
            return Vec3::ZERO;
        }
        unit_sphere_sample * self.shake * max_shake
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::Arena;

    fn two_seeds(tier: Tier) -> (Seed, Seed) {
        let mut arena = Arena::new();
        let a = arena.insert_with(|id| Seed::new(id, tier, SeedPhase::InFlight));
        let b = arena.insert_with(|id| Seed::new(id, tier, SeedPhase::InFlight));
        (
            arena.get(a).cloned().unwrap(),
            arena.get(b).cloned().unwrap(),
        )
    }

    #[test]
    fn test_start_throw_is_guarded() {
        let (mut seed, _) = two_seeds(0);
        seed.phase = SeedPhase::Held;
        seed.shake = 0.7;
        assert!(seed.start_throw());
        assert_eq!(seed.phase, SeedPhase::InFlight);
        assert_eq!(seed.shake, 0.0);
        assert!(!seed.start_throw());
    }

    #[test]
    fn test_latches_fire_once() {
        let (mut seed, _) = two_seeds(0);
        seed.active_throw = true;
        assert!(seed.consume_first_contact());
        assert!(!seed.consume_first_contact());
        assert!(seed.consume_life_loss());
        assert!(!seed.consume_life_loss());
        assert!(seed.consume_score());
        assert!(!seed.consume_score());
    }

    #[test]
    fn test_first_contact_needs_active_throw_in_flight() {
        let (mut seed, _) = two_seeds(0);
        assert!(!seed.consume_first_contact());

        seed.active_throw = true;
        seed.phase = SeedPhase::Held;
        assert!(!seed.consume_first_contact());
        assert!(!seed.first_contact_consumed);
    }

    #[test]
    fn test_merge_eligibility() {
        let (a, mut b) = two_seeds(1);
        assert!(a.can_merge_with(&b, Some(4)));
        assert!(!a.can_merge_with(&a, Some(4)));
        assert!(!a.can_merge_with(&b, Some(1)));
        assert!(!a.can_merge_with(&b, None));

        b.tier = 2;
        assert!(!a.can_merge_with(&b, Some(4)));

        b.tier = 1;
        b.merge_locked = true;
        assert!(!a.can_merge_with(&b, Some(4)));
    }

    #[test]
    fn test_shake_offset_scales() {
        let (mut seed, _) = two_seeds(0);
        assert_eq!(seed.shake_offset(0.1, Vec3::X), Vec3::ZERO);
        seed.shake = 0.5;
        let offset = seed.shake_offset(0.1, Vec3::X);
        assert!((offset.x - 0.05).abs() < 1e-6);
    }
}
