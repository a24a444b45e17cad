//! HUD presentation adapter
//!
//! Folds the session's [`GameEvent`] stream into the strings, bar geometry
//! and fade alphas a renderer draws. Nothing here feeds back into the sim.

use glam::{Vec3, Vec4};

use crate::config::HudConfig;
use crate::sim::{GameEvent, SoundCue, Tier};

/// Linear fade driven by frame time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    elapsed: f32,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Progress in [0, 1]. A zero-length fade is complete immediately.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn value(&self) -> f32 {
        crate::lerp(self.from, self.to, self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.value()
    }
}

/// Power meter bar geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerMeter {
    pub width: f32,
    pub color: Vec4,
}

/// End-of-session summary panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverPanel {
    pub time_text: String,
    pub score_text: String,
}

pub fn format_score(score: u64) -> String {
    format!("SCORE\n{score:04}")
}

pub fn format_lives(lives: u8, max_lives: u8) -> String {
    format!("LIFE\n{lives}/{max_lives}")
}

/// `mm:ss`, minutes not wrapped at the hour
pub fn format_clock(total_seconds: f64) -> String {
    let total = total_seconds.max(0.0);
    let minutes = (total / 60.0).floor() as u64;
    let seconds = (total % 60.0).floor() as u64;
    format!("{minutes:02}:{seconds:02}")
}

pub fn format_timer(total_seconds: f64) -> String {
    format!("TIME\n{}", format_clock(total_seconds))
}

#[derive(Debug, Clone)]
pub struct Hud {
    config: HudConfig,
    pub score_text: String,
    pub life_text: String,
    pub timer_text: String,
    /// Score/life/timer hidden once the game-over panel is up
    pub counters_visible: bool,
    pub power_meter: PowerMeter,
    pub game_over: Option<GameOverPanel>,
    /// Merge bursts waiting to be spawned by the renderer
    pub merge_effects: Vec<(Vec3, Tier)>,
    /// Sound cues waiting to be played
    pub sounds: Vec<SoundCue>,
    overlay: Fade,
    title_in: Fade,
    title_out: Fade,
    scene_exit: Option<Fade>,
    bgm: Fade,
}

impl Hud {
    pub fn new(config: HudConfig) -> Self {
        let intro = config.intro_fade_duration;
        let mut hud = Self {
            score_text: format_score(0),
            life_text: String::new(),
            timer_text: format_timer(0.0),
            counters_visible: true,
            power_meter: PowerMeter {
                width: 0.0,
                color: config.power_low_color,
            },
            game_over: None,
            merge_effects: Vec::new(),
            sounds: Vec::new(),
            overlay: Fade::new(1.0, 0.0, intro),
            title_in: Fade::new(0.0, 1.0, intro),
            title_out: Fade::new(1.0, 0.0, intro),
            scene_exit: None,
            bgm: Fade::new(0.0, config.bgm_volume, config.bgm_fade_in_duration),
            config,
        };
        hud.set_power(0.0);
        hud
    }

    fn set_power(&mut self, normalized: f32) {
        let t = normalized.clamp(0.0, 1.0);
        self.power_meter = PowerMeter {
            width: self.config.power_meter_max_width * t,
            color: self
                .config
                .power_low_color
                .lerp(self.config.power_high_color, t),
        };
    }

    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ScoreChanged { score } => self.score_text = format_score(*score),
            GameEvent::LivesChanged { lives, max_lives } => {
                self.life_text = format_lives(*lives, *max_lives)
            }
            GameEvent::PowerMeter { normalized } => self.set_power(*normalized),
            GameEvent::MergeEffect { position, tier } => {
                self.merge_effects.push((*position, *tier))
            }
            GameEvent::Sound(cue) => self.sounds.push(*cue),
            GameEvent::GameOver { score, elapsed } => {
                self.game_over = Some(GameOverPanel {
                    time_text: format_clock(*elapsed),
                    score_text: format!("{score:04}"),
                });
                self.counters_visible = false;
            }
            GameEvent::SeedSpawned { .. }
            | GameEvent::SeedThrown { .. }
            | GameEvent::SeedScored { .. }
            | GameEvent::SeedRetired { .. } => {}
        }
    }

    /// Advance fades and refresh the clock readout
    pub fn advance(&mut self, dt: f32, elapsed_time: f64) {
        if self.game_over.is_none() {
            self.timer_text = format_timer(elapsed_time);
        }
        self.overlay.advance(dt);
        if self.title_in.is_finished() {
            self.title_out.advance(dt);
        } else {
            self.title_in.advance(dt);
        }
        if let Some(fade) = &mut self.scene_exit {
            fade.advance(dt);
        }
        self.bgm.advance(dt);
    }

    /// Background music volume: fades in at start, out with the scene exit
    pub fn bgm_volume(&self) -> f32 {
        self.bgm.value()
    }

    /// Black overlay alpha: intro fade-out, or the scene-exit fade once started
    pub fn overlay_alpha(&self) -> f32 {
        match &self.scene_exit {
            Some(fade) => fade.value(),
            None => self.overlay.value(),
        }
    }

    /// Title text alpha; `None` once the fade in/out has played
    pub fn title_alpha(&self) -> Option<f32> {
        if !self.title_in.is_finished() {
            Some(self.title_in.value())
        } else if !self.title_out.is_finished() {
            Some(self.title_out.value())
        } else {
            None
        }
    }

    /// Start fading to black before restarting or leaving
    pub fn begin_scene_exit(&mut self) {
        if self.scene_exit.is_none() {
            let from = self.overlay_alpha();
            self.scene_exit = Some(Fade::new(from, 1.0, self.config.scene_fade_duration));
            self.bgm = Fade::new(self.bgm.value(), 0.0, self.config.scene_fade_duration);
        }
    }

    /// The scene-exit fade has fully covered the screen
    pub fn scene_exit_ready(&self) -> bool {
        self.scene_exit.is_some_and(|f| f.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        assert_eq!(format_score(42), "SCORE\n0042");
        assert_eq!(format_lives(3, 5), "LIFE\n3/5");
        assert_eq!(format_timer(125.9), "TIME\n02:05");
        assert_eq!(format_clock(3600.0), "60:00");
    }

    #[test]
    fn test_fade_accumulates_and_clamps() {
        let mut fade = Fade::new(1.0, 0.0, 0.5);
        assert_eq!(fade.value(), 1.0);
        fade.advance(0.25);
        assert!((fade.value() - 0.5).abs() < 1e-6);
        fade.advance(1.0);
        assert_eq!(fade.value(), 0.0);
        assert!(fade.is_finished());

        let instant = Fade::new(0.0, 1.0, 0.0);
        assert!(instant.is_finished());
        assert_eq!(instant.value(), 1.0);
    }

    #[test]
    fn test_power_meter_geometry() {
        let mut hud = Hud::new(HudConfig::default());
        hud.apply(&GameEvent::PowerMeter { normalized: 0.5 });
        assert_eq!(hud.power_meter.width, 100.0);
        assert_eq!(hud.power_meter.color, Vec4::new(0.5, 0.0, 0.5, 1.0));

        hud.apply(&GameEvent::PowerMeter { normalized: 3.0 });
        assert_eq!(hud.power_meter.width, 200.0);
    }

    #[test]
    fn test_game_over_hides_counters() {
        let mut hud = Hud::new(HudConfig::default());
        hud.apply(&GameEvent::GameOver {
            score: 7,
            elapsed: 61.0,
        });
        assert!(!hud.counters_visible);
        let panel = hud.game_over.clone().unwrap();
        assert_eq!(panel.time_text, "01:01");
        assert_eq!(panel.score_text, "0007");

        hud.advance(1.0, 99.0);
        assert_eq!(hud.timer_text, format_timer(0.0));
    }

    #[test]
    fn test_title_ping_then_hidden() {
        let mut hud = Hud::new(HudConfig::default());
        assert_eq!(hud.title_alpha(), Some(0.0));
        hud.advance(0.5, 0.5);
        hud.advance(0.25, 0.75);
        assert!((hud.title_alpha().unwrap() - 0.5).abs() < 1e-6);
        hud.advance(0.25, 1.0);
        assert_eq!(hud.title_alpha(), None);
        assert_eq!(hud.overlay_alpha(), 0.0);
    }

    #[test]
    fn test_bgm_fades_in_then_out_on_exit() {
        let mut hud = Hud::new(HudConfig::default());
        assert_eq!(hud.bgm_volume(), 0.0);
        hud.advance(0.25, 0.25);
        assert!((hud.bgm_volume() - 0.5).abs() < 1e-6);

        // Leaving mid fade-in starts the fade-out from the current volume
        hud.begin_scene_exit();
        assert!((hud.bgm_volume() - 0.5).abs() < 1e-6);
        hud.advance(0.25, 0.5);
        assert!((hud.bgm_volume() - 0.25).abs() < 1e-6);
        hud.advance(0.25, 0.75);
        assert_eq!(hud.bgm_volume(), 0.0);
    }

    #[test]
    fn test_bgm_zero_duration_is_instant() {
        let config = HudConfig {
            bgm_volume: 0.8,
            bgm_fade_in_duration: 0.0,
            ..Default::default()
        };
        let hud = Hud::new(config);
        assert_eq!(hud.bgm_volume(), 0.8);
    }

    #[test]
    fn test_scene_exit_fade() {
        let mut hud = Hud::new(HudConfig::default());
        hud.advance(1.0, 1.0);
        hud.begin_scene_exit();
        assert!(!hud.scene_exit_ready());
        hud.advance(0.5, 1.5);
        assert!(hud.scene_exit_ready());
        assert_eq!(hud.overlay_alpha(), 1.0);
    }
}
