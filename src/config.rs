//! Game configuration
//!
//! Tuning, tier catalog and HUD parameters, loaded from a JSON file on native
//! builds. Missing fields fall back to defaults.

use std::path::Path;

use glam::{Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::camera::Camera;
use crate::sim::catalog::TierCatalog;
use crate::sim::throw::ChargeTuning;

/// Which seeds request the next spawn on their first contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FirstContactPolicy {
    /// Only seeds the player spawned and threw
    #[default]
    ActiveThrowOnly,
    /// Merge products as well
    AnySeed,
}

impl FirstContactPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirstContactPolicy::ActiveThrowOnly => "active-throw-only",
            FirstContactPolicy::AnySeed => "any-seed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active-throw-only" | "active" => Some(FirstContactPolicy::ActiveThrowOnly),
            "any-seed" | "any" => Some(FirstContactPolicy::AnySeed),
            _ => None,
        }
    }
}

/// Presentation-side tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    /// Power meter bar width at full charge (pixels)
    pub power_meter_max_width: f32,
    /// Bar colour at zero and full charge (RGBA)
    pub power_low_color: Vec4,
    pub power_high_color: Vec4,
    /// Intro overlay fade-out / title text ping duration
    pub intro_fade_duration: f32,
    /// Fade-to-black before leaving the scene
    pub scene_fade_duration: f32,
    /// Background music volume once faded in
    pub bgm_volume: f32,
    pub bgm_fade_in_duration: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            power_meter_max_width: 200.0,
            power_low_color: Vec4::new(0.0, 0.0, 1.0, 1.0),
            power_high_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            intro_fade_duration: 0.5,
            scene_fade_duration: 0.5,
            bgm_volume: 1.0,
            bgm_fade_in_duration: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Session ===
    /// Seconds between a thrown seed's first contact and the next held seed
    pub spawn_delay: f32,
    /// Seconds between two seeds locking and their merge resolving
    pub merge_delay: f32,
    pub max_lives: u8,
    /// Seed for spawn-tier rolls and charge shake
    pub rng_seed: u64,

    // === Throwing ===
    pub charge_speed: f32,
    pub power_min: f32,
    pub power_lower_bound: f32,
    pub power_upper_bound: f32,
    pub max_shake: f32,

    // === Spawning ===
    pub spawn_position: Vec3,
    pub spawn_rotation: Quat,
    pub camera: Camera,

    // === Rules ===
    /// Merge products start with their score latch set, so the merge award
    /// is the only score they ever produce
    pub merged_seed_prescored: bool,
    pub first_contact_policy: FirstContactPolicy,

    pub tiers: TierCatalog,
    pub hud: HudConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_delay: SPAWN_DELAY,
            merge_delay: MERGE_DELAY,
            max_lives: MAX_LIVES,
            rng_seed: 0x5eed,

            charge_speed: CHARGE_SPEED,
            power_min: POWER_MIN,
            power_lower_bound: POWER_LOWER_BOUND,
            power_upper_bound: POWER_UPPER_BOUND,
            max_shake: MAX_SHAKE,

            spawn_position: Vec3::new(0.0, 1.5, 0.0),
            spawn_rotation: Quat::IDENTITY,
            camera: Camera::default(),

            merged_seed_prescored: true,
            first_contact_policy: FirstContactPolicy::ActiveThrowOnly,

            tiers: TierCatalog::default(),
            hud: HudConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON config; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validate())
    }

    /// Load a JSON config from disk, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json_str(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => log::warn!("Invalid config {}: {e}", path.display()),
            },
            Err(e) => log::warn!("Could not read config {}: {e}", path.display()),
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Clamp values into ranges the simulation can work with
    pub fn validate(mut self) -> Self {
        self.spawn_delay = self.spawn_delay.max(0.0);
        self.merge_delay = self.merge_delay.max(0.0);
        self.max_lives = self.max_lives.max(1);
        self.charge_speed = self.charge_speed.max(0.0);
        self.max_shake = self.max_shake.max(0.0);
        if self.power_lower_bound > self.power_upper_bound {
            std::mem::swap(&mut self.power_lower_bound, &mut self.power_upper_bound);
        }
        self.spawn_rotation = self.spawn_rotation.normalize();
        if !self.tiers.is_playable() {
            log::warn!(
                "Tier catalog has {} entries; at least 2 are needed to spawn seeds",
                self.tiers.len()
            );
        }
        self
    }

    pub fn charge_tuning(&self) -> ChargeTuning {
        ChargeTuning {
            charge_speed: self.charge_speed,
            power_min: self.power_min,
            power_lower_bound: self.power_lower_bound,
            power_upper_bound: self.power_upper_bound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{ "max_lives": 1, "merge_delay": 0.5 }"#).unwrap();
        assert_eq!(config.max_lives, 1);
        assert_eq!(config.merge_delay, 0.5);
        assert_eq!(config.spawn_delay, SPAWN_DELAY);
        assert_eq!(config.tiers.len(), 5);
        assert!(config.merged_seed_prescored);
    }

    #[test]
    fn test_validate_repairs_bounds() {
        let config = GameConfig {
            power_lower_bound: 6.0,
            power_upper_bound: 2.0,
            max_lives: 0,
            merge_delay: -1.0,
            ..Default::default()
        }
        .validate();
        assert_eq!(config.power_lower_bound, 2.0);
        assert_eq!(config.power_upper_bound, 6.0);
        assert_eq!(config.max_lives, 1);
        assert_eq!(config.merge_delay, 0.0);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(
            FirstContactPolicy::from_str("ANY"),
            Some(FirstContactPolicy::AnySeed)
        );
        assert_eq!(
            FirstContactPolicy::from_str(FirstContactPolicy::ActiveThrowOnly.as_str()),
            Some(FirstContactPolicy::ActiveThrowOnly)
        );
        assert_eq!(FirstContactPolicy::from_str("sometimes"), None);
    }

    #[test]
    fn test_policy_serializes_by_name() {
        let json = r#"{ "first_contact_policy": "AnySeed", "tiers": [{"name":"a","score":1},{"name":"b","score":5}] }"#;
        let config = GameConfig::from_json_str(json).unwrap();
        assert_eq!(config.first_contact_policy, FirstContactPolicy::AnySeed);
        assert_eq!(config.tiers.score(1), 5);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = GameConfig::load(Path::new("/definitely/not/here.json"));
        assert_eq!(config.max_lives, MAX_LIVES);
    }
}
