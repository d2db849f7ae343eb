//! Configuration loading and defaults for dvd-idle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use bevy::prelude::{Resource, Vec2};
use serde::Deserialize;

/// Main configuration, inserted into the app as a resource.
#[derive(Debug, Clone, Deserialize, Resource)]
#[serde(default)]
pub struct Config {
    /// Quiet period before the screensaver shows up (default: 5000).
    pub idle_delay_ms: u64,

    /// Interval between movement steps (default: 30).
    pub tick_interval_ms: u64,

    /// Pixels moved per step along each axis (default: 8).
    pub speed: f32,

    /// Two bounces closer than this count as a corner hit (default: 25).
    pub corner_window_ms: u64,

    /// Bouncing box size in logical pixels (default: 200x175).
    pub box_width: f32,
    pub box_height: f32,

    /// Particles per confetti burst (default: 500).
    pub confetti_particles: usize,

    /// Delay before the triumph sound after a corner hit (default: 500).
    pub triumph_delay_ms: u64,

    /// Delay before the mascot slides back out (default: 1500).
    pub mascot_hide_delay_ms: u64,

    /// Drop pending celebration cues when the screensaver is destroyed.
    /// Off by default: cues already scheduled keep running.
    pub cancel_celebration_on_destroy: bool,

    /// Initial window size in logical pixels (default: 1000x800).
    pub window_width: f32,
    pub window_height: f32,

    /// Directory images and sounds are loaded from (default: "assets").
    pub asset_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_delay_ms: 5000,
            tick_interval_ms: 30,
            speed: 8.0,
            corner_window_ms: 25,
            box_width: 200.0,
            box_height: 175.0,
            confetti_particles: 500,
            triumph_delay_ms: 500,
            mascot_hide_delay_ms: 1500,
            cancel_celebration_on_destroy: false,
            window_width: 1000.0,
            window_height: 800.0,
            asset_dir: "assets".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from the given path, the default path, or fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load(p);
        }

        if let Some(default_path) = default_path() {
            if default_path.exists() {
                return Self::load(&default_path);
            }
        }

        Ok(Self::default())
    }

    /// Reject values that would stall or break the animation.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.idle_delay_ms > 0, "idle_delay_ms must be greater than zero");
        ensure!(
            self.tick_interval_ms > 0,
            "tick_interval_ms must be greater than zero"
        );
        ensure!(
            self.corner_window_ms < self.tick_interval_ms,
            "corner_window_ms ({}) must be shorter than tick_interval_ms ({})",
            self.corner_window_ms,
            self.tick_interval_ms
        );
        ensure!(self.speed > 0.0, "speed must be positive");
        ensure!(
            self.box_width > 0.0 && self.box_height > 0.0,
            "box_width and box_height must be positive"
        );
        ensure!(
            self.window_width > 0.0 && self.window_height > 0.0,
            "window_width and window_height must be positive"
        );
        Ok(())
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn corner_window(&self) -> Duration {
        Duration::from_millis(self.corner_window_ms)
    }

    pub fn triumph_delay(&self) -> Duration {
        Duration::from_millis(self.triumph_delay_ms)
    }

    pub fn mascot_hide_delay(&self) -> Duration {
        Duration::from_millis(self.mascot_hide_delay_ms)
    }

    pub fn box_size(&self) -> Vec2 {
        Vec2::new(self.box_width, self.box_height)
    }

    pub fn window_size(&self) -> Vec2 {
        Vec2::new(self.window_width, self.window_height)
    }
}

/// `<config_dir>/dvd-idle/config.toml`, if the platform has a config dir.
fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dvd-idle").join("config.toml"))
}
