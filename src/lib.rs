//! Seed Drop - charge, throw and merge tiered seeds into a basket
//!
//! Core modules:
//! - `sim`: Deterministic gameplay core (seed lifecycle, throwing, merging, session ledger)
//! - `config`: Data-driven tuning and tier catalog
//! - `hud`: Presentation adapter (HUD text, power meter, fades)
//! - `sandbox`: Minimal in-memory physics collaborator for the demo and tests

pub mod config;
pub mod hud;
pub mod sandbox;
pub mod sim;

pub use config::{FirstContactPolicy, GameConfig};
pub use hud::Hud;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz frame clock)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Delay before the next held seed appears after a throw lands
    pub const SPAWN_DELAY: f32 = 1.0;
    /// Delay between two seeds locking and their merge resolving
    pub const MERGE_DELAY: f32 = 0.2;
    /// Lives at session start
    pub const MAX_LIVES: u8 = 5;

    /// Charge oscillation speed (ping-pong units per second)
    pub const CHARGE_SPEED: f32 = 5.0;
    /// Ping-pong range of the raw charge value
    pub const CHARGE_RANGE: f32 = 4.0;
    /// Power reported on the press-down frame before any charge accumulates
    pub const POWER_MIN: f32 = 1.0;
    pub const POWER_LOWER_BOUND: f32 = 1.0;
    pub const POWER_UPPER_BOUND: f32 = 5.0;

    /// Upward bias of the throw direction at zero and full power
    pub const THROW_UP_WEIGHT_MIN: f32 = 0.15;
    pub const THROW_UP_WEIGHT_MAX: f32 = 0.45;

    /// Maximum positional shake of a fully charged held seed (world units)
    pub const MAX_SHAKE: f32 = 0.1;
}

/// Linear interpolation, `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Triangle wave bouncing between 0 and `length`
///
/// `ping_pong(0) == 0`, `ping_pong(length) == length`, `ping_pong(2 * length) == 0`.
#[inline]
pub fn ping_pong(t: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return 0.0;
    }
    let period = length * 2.0;
    let wrapped = t - (t / period).floor() * period;
    length - (wrapped - length).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_pong_peaks_and_troughs() {
        assert_eq!(ping_pong(0.0, 4.0), 0.0);
        assert!((ping_pong(4.0, 4.0) - 4.0).abs() < 1e-6);
        assert!(ping_pong(8.0, 4.0).abs() < 1e-6);
        assert!((ping_pong(5.0, 4.0) - 3.0).abs() < 1e-6);
        assert!((ping_pong(-1.0, 4.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lerp_clamps() {
        assert_eq!(lerp(1.0, 5.0, 0.0), 1.0);
        assert_eq!(lerp(1.0, 5.0, 1.0), 5.0);
        assert_eq!(lerp(1.0, 5.0, 2.0), 5.0);
        assert!((lerp(0.15, 0.45, 0.5) - 0.3).abs() < 1e-6);
    }
}
