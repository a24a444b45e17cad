//! Charge-and-release throwing
//!
//! Holding the charge button drives a ping-pong power meter; releasing it
//! throws the held seed with whatever power the meter showed.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::arena::SeedId;
use crate::consts::*;
use crate::{lerp, ping_pong};

/// Charge curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeTuning {
    pub charge_speed: f32,
    pub power_min: f32,
    pub power_lower_bound: f32,
    pub power_upper_bound: f32,
}

impl Default for ChargeTuning {
    fn default() -> Self {
        Self {
            charge_speed: CHARGE_SPEED,
            power_min: POWER_MIN,
            power_lower_bound: POWER_LOWER_BOUND,
            power_upper_bound: POWER_UPPER_BOUND,
        }
    }
}

impl ChargeTuning {
    /// Meter position in [0, 1] and resulting throw power for a charge time.
    ///
    /// The meter bounces over `[0, CHARGE_RANGE]`; squaring the normalized
    /// value flattens the middle so only well-timed releases reach the top.
    pub fn curve(&self, charge_timer: f32) -> (f32, f32) {
        let raw = 1.0 + ping_pong(charge_timer * self.charge_speed, CHARGE_RANGE);
        let normalized = (raw - 1.0) / CHARGE_RANGE;
        let curved = normalized * normalized;
        (
            normalized,
            lerp(self.power_lower_bound, self.power_upper_bound, curved),
        )
    }
}

/// Impulse direction for a throw.
///
/// Camera forward flattened onto the ground plane, tilted up more the
/// harder the throw.
pub fn throw_direction(camera_forward: Vec3, power: f32, power_upper_bound: f32) -> Vec3 {
    let forward_xz = Vec3::new(camera_forward.x, 0.0, camera_forward.z).normalize_or(Vec3::Z);
    let ratio = if power_upper_bound > 0.0 {
        power / power_upper_bound
    } else {
        1.0
    };
    let up_weight = lerp(THROW_UP_WEIGHT_MIN, THROW_UP_WEIGHT_MAX, ratio);
    (forward_xz + Vec3::Y * up_weight).normalize()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThrowPhase {
    Idle,
    Charging { timer: f32 },
}

/// Result of one frame of input handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrowOutcome {
    None,
    /// Still charging; `normalized` drives shake and the power meter
    Charging { seed: SeedId, normalized: f32, power: f32 },
    /// Button released; the held slot has been cleared
    Released { seed: SeedId, power: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrowController {
    pub tuning: ChargeTuning,
    phase: ThrowPhase,
    current_power: f32,
    button_was_down: bool,
}

impl ThrowController {
    pub fn new(tuning: ChargeTuning) -> Self {
        Self {
            tuning,
            phase: ThrowPhase::Idle,
            current_power: tuning.power_min,
            button_was_down: false,
        }
    }

    pub fn phase(&self) -> ThrowPhase {
        self.phase
    }

    pub fn current_power(&self) -> f32 {
        self.current_power
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.phase, ThrowPhase::Charging { .. })
    }

    /// Drop any charge in progress (held seed vanished, session ended)
    pub fn reset(&mut self) {
        self.phase = ThrowPhase::Idle;
        self.current_power = self.tuning.power_min;
    }

    /// Poll the charge button for one frame.
    ///
    /// Press and release edges come from comparing against last frame's
    /// button state. Without a held seed nothing happens beyond tracking the
    /// button, so a press that started before the seed appeared never charges.
    pub fn handle_input(
        &mut self,
        button_down: bool,
        dt: f32,
        held: &mut Option<SeedId>,
    ) -> ThrowOutcome {
        let pressed = button_down && !self.button_was_down;
        let released = !button_down && self.button_was_down;
        self.button_was_down = button_down;

        let Some(seed) = *held else {
            if self.is_charging() {
                self.reset();
            }
            return ThrowOutcome::None;
        };

        if pressed {
            self.phase = ThrowPhase::Charging { timer: 0.0 };
            self.current_power = self.tuning.power_min;
        }

        match self.phase {
            ThrowPhase::Charging { timer } if button_down => {
                let timer = timer + dt;
                self.phase = ThrowPhase::Charging { timer };
                let (normalized, power) = self.tuning.curve(timer);
                self.current_power = power;
                ThrowOutcome::Charging {
                    seed,
                    normalized,
                    power,
                }
            }
            ThrowPhase::Charging { .. } if released => {
                let power = self.current_power;
                log::debug!("Throw power: {power:.2}");
                self.phase = ThrowPhase::Idle;
                *held = None;
                ThrowOutcome::Released { seed, power }
            }
            _ => ThrowOutcome::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::Arena;

    fn held_seed() -> Option<SeedId> {
        let mut arena = Arena::new();
        Some(arena.insert_with(|_| ()))
    }

    #[test]
    fn test_curve_endpoints() {
        let tuning = ChargeTuning::default();
        let (n, p) = tuning.curve(0.0);
        assert_eq!(n, 0.0);
        assert_eq!(p, tuning.power_lower_bound);

        // First peak: timer * speed == 4
        let (n, p) = tuning.curve(4.0 / tuning.charge_speed);
        assert!((n - 1.0).abs() < 1e-5);
        assert!((p - tuning.power_upper_bound).abs() < 1e-4);

        // Back to the trough
        let (n, _) = tuning.curve(8.0 / tuning.charge_speed);
        assert!(n.abs() < 1e-5);
    }

    #[test]
    fn test_curve_squares_midpoint() {
        let tuning = ChargeTuning::default();
        let (n, p) = tuning.curve(2.0 / tuning.charge_speed);
        assert!((n - 0.5).abs() < 1e-5);
        // lerp(1, 5, 0.25) == 2
        assert!((p - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_throw_direction_tilts_with_power() {
        let soft = throw_direction(Vec3::new(0.0, -0.5, 1.0), 0.0, 5.0);
        let hard = throw_direction(Vec3::new(0.0, -0.5, 1.0), 5.0, 5.0);
        assert!((soft.length() - 1.0).abs() < 1e-5);
        assert!((soft.y - 0.15 / (1.0f32 + 0.15 * 0.15).sqrt()).abs() < 1e-5);
        assert!(hard.y > soft.y);
        assert_eq!(soft.x, 0.0);
    }

    #[test]
    fn test_throw_direction_straight_down_camera() {
        let dir = throw_direction(Vec3::NEG_Y, 1.0, 5.0);
        assert!(dir.z > 0.0);
    }

    #[test]
    fn test_press_hold_release() {
        let mut controller = ThrowController::new(ChargeTuning::default());
        let mut held = held_seed();
        let seed = held.unwrap();

        let outcome = controller.handle_input(true, 0.1, &mut held);
        assert!(matches!(outcome, ThrowOutcome::Charging { .. }));
        assert_eq!(controller.phase(), ThrowPhase::Charging { timer: 0.1 });

        controller.handle_input(true, 0.1, &mut held);
        let expected = controller.tuning.curve(0.2).1;
        assert!((controller.current_power() - expected).abs() < 1e-5);

        let outcome = controller.handle_input(false, 0.1, &mut held);
        assert_eq!(
            outcome,
            ThrowOutcome::Released {
                seed,
                power: expected
            }
        );
        assert!(held.is_none());
        assert_eq!(controller.phase(), ThrowPhase::Idle);
    }

    #[test]
    fn test_no_held_seed_is_noop() {
        let mut controller = ThrowController::new(ChargeTuning::default());
        let mut held = None;
        assert_eq!(controller.handle_input(true, 0.1, &mut held), ThrowOutcome::None);
        assert_eq!(controller.handle_input(false, 0.1, &mut held), ThrowOutcome::None);
        assert!(!controller.is_charging());
    }

    #[test]
    fn test_press_before_spawn_does_not_charge() {
        let mut controller = ThrowController::new(ChargeTuning::default());
        let mut empty = None;
        controller.handle_input(true, 0.1, &mut empty);

        let mut held = held_seed();
        assert_eq!(controller.handle_input(true, 0.1, &mut held), ThrowOutcome::None);
        assert_eq!(controller.handle_input(false, 0.1, &mut held), ThrowOutcome::None);
        assert!(held.is_some());
    }
}
