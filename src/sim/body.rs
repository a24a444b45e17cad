//! Physics collaborator surface
//!
//! The gameplay core never integrates bodies itself. It creates one body per
//! seed, freezes/unfreezes it, reads and writes velocity and issues impulses.
//! Contact detection happens on the other side and comes back as
//! [`ContactReport`]s.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::arena::SeedId;

/// Opaque body handle issued by the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Linear and angular velocity pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub const ZERO: Self = Self {
        linear: Vec3::ZERO,
        angular: Vec3::ZERO,
    };

    /// Component-wise average of two velocities
    pub fn blend(a: Velocity, b: Velocity) -> Velocity {
        Velocity {
            linear: (a.linear + b.linear) * 0.5,
            angular: (a.angular + b.angular) * 0.5,
        }
    }
}

/// Everything the physics world needs to create a seed's body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub owner: SeedId,
    pub position: Vec3,
    pub rotation: Quat,
    pub radius: f32,
    /// Frozen bodies do not simulate until unfrozen
    pub kinematic: bool,
}

/// Body commands issued by the core.
///
/// Every accessor returns `None`/`false` when the handle no longer refers to a
/// live body; callers skip the physics-dependent step and carry on.
pub trait PhysicsWorld {
    fn create_body(&mut self, spec: BodySpec) -> Option<BodyHandle>;
    fn destroy_body(&mut self, body: BodyHandle);

    fn position(&self, body: BodyHandle) -> Option<Vec3>;
    fn set_position(&mut self, body: BodyHandle, position: Vec3) -> bool;

    fn velocity(&self, body: BodyHandle) -> Option<Velocity>;
    fn set_velocity(&mut self, body: BodyHandle, velocity: Velocity) -> bool;

    fn set_kinematic(&mut self, body: BodyHandle, kinematic: bool) -> bool;
    fn apply_impulse(&mut self, body: BodyHandle, direction: Vec3, magnitude: f32) -> bool;
}

/// What a seed collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    /// Floor outside the basket; touching it costs a life
    Ground,
    /// Another seed
    Seed(SeedId),
    Scoreable,
    /// Walls, basket geometry, anything uncategorised
    Other,
}

/// What region a seed's collider entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    Scoreable,
    /// Another seed's trigger volume; propagates an existing score latch
    Seed(SeedId),
    Other,
}

/// Inbound event from the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactReport {
    Collision { seed: SeedId, other: Contact },
    TriggerEnter { seed: SeedId, other: Trigger },
    /// The seed left the play volume
    OutOfPlay { seed: SeedId },
}
