//! Deterministic gameplay core
//!
//! All gameplay rules live here. This module must stay deterministic:
//! - Frame clock only (no wall time)
//! - Seeded RNG only
//! - Stable iteration order (by arena slot)
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod body;
pub mod camera;
pub mod catalog;
pub mod contact;
pub mod scheduler;
pub mod seed;
pub mod state;
pub mod throw;
pub mod tick;

pub use arena::{Arena, SeedId};
pub use body::{BodyHandle, BodySpec, Contact, ContactReport, PhysicsWorld, Trigger, Velocity};
pub use camera::Camera;
pub use catalog::{Tier, TierCatalog, TierDef};
pub use scheduler::{Scheduler, TimerId};
pub use seed::{ScreenAnchor, Seed, SeedPhase};
pub use state::{DeferredAction, GameEvent, SessionState, SoundCue};
pub use throw::{ChargeTuning, ThrowController, ThrowOutcome, ThrowPhase, throw_direction};
pub use tick::{TickInput, tick};
