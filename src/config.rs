//! Runtime configuration loaded from `assets/warlords.toml`.
//!
//! Every field has a compiled default, so the file may set only the values
//! it cares about. A missing file means "use the defaults"; a file that
//! exists but does not parse or validate stops the game at startup.

use std::io::ErrorKind;
use std::path::Path;

use rapier2d::prelude::*;
use serde::Deserialize;

use crate::coords::WorldConfig;
use crate::error::ConfigError;
use crate::input::AxisMapper;
use crate::physics::SolverSettings;

/// Default location of the configuration file.
pub const CONFIG_PATH: &str = "assets/warlords.toml";

/// Narrowest screen whose bullet (width / 160 pixels) is still visible.
const MIN_SCREEN_WIDTH: u32 = 160;
/// Keeps pixel arithmetic well inside `i32`.
const MAX_SCREEN_SIZE: u32 = 16384;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Screen / world ───────────────────────────────────────────────────────
    pub screen_width: u32,
    pub screen_height: u32,
    /// Width of the arena in meters; fixes the pixel scale.
    pub world_width_m: f32,

    // ── Physics ──────────────────────────────────────────────────────────────
    /// World gravity in m/s². The arena is seen from above, so zero.
    pub gravity: [f32; 2],
    /// Physics steps per simulated second.
    pub tick_rate: u32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    /// Most steps taken in a single frame before surplus time is dropped.
    pub max_substeps: u32,

    // ── Shields ──────────────────────────────────────────────────────────────
    pub axis_sensitivity: f32,
    pub shield_sweep_degrees: f32,
    pub arc_tessellation_points: usize,

    // ── Bullet ───────────────────────────────────────────────────────────────
    /// Impulse applied to the bullet at spawn, in N·s.
    pub bullet_impulse: [f32; 2],
    pub bullet_density: f32,

    // ── Keyboard axes ────────────────────────────────────────────────────────
    /// Axis units per second while a rotate key is held.
    pub keyboard_axis_rate: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 800,
            screen_height: 600,
            world_width_m: 80.0,
            gravity: [0.0, 0.0],
            tick_rate: 60,
            velocity_iterations: 6,
            position_iterations: 2,
            max_substeps: 8,
            axis_sensitivity: 2.0,
            shield_sweep_degrees: 90.0,
            arc_tessellation_points: 16,
            bullet_impulse: [-10.0, -10.0],
            bullet_density: 1.0,
            keyboard_axis_rate: 32768.0,
        }
    }
}

impl GameConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No {} found; using compiled defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::from_toml(&contents)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> ConfigError {
            ConfigError::Invalid {
                field,
                value: value.to_string(),
                reason,
            }
        }

        if !(MIN_SCREEN_WIDTH..=MAX_SCREEN_SIZE).contains(&self.screen_width) {
            return Err(invalid("screen_width", self.screen_width, "must be in [160, 16384] so the bullet is at least one pixel"));
        }
        if !(1..=MAX_SCREEN_SIZE).contains(&self.screen_height) {
            return Err(invalid("screen_height", self.screen_height, "must be in [1, 16384]"));
        }
        // Shields wrap the castles: outer radius height / 10, inner width / 16
        if self.screen_height / 10 <= self.screen_width / 16 {
            return Err(invalid("screen_height", self.screen_height, "must exceed 10 * (screen_width / 16) so shields are wider than castles"));
        }
        if !(self.world_width_m > 0.0) {
            return Err(invalid("world_width_m", self.world_width_m, "must be positive"));
        }
        if self.tick_rate == 0 {
            return Err(invalid("tick_rate", self.tick_rate, "must be positive"));
        }
        if self.velocity_iterations == 0 {
            return Err(invalid("velocity_iterations", self.velocity_iterations, "must be positive"));
        }
        if self.max_substeps == 0 {
            return Err(invalid("max_substeps", self.max_substeps, "must be positive"));
        }
        if !(self.axis_sensitivity > 0.0) {
            return Err(invalid("axis_sensitivity", self.axis_sensitivity, "must be positive"));
        }
        if !(self.shield_sweep_degrees > 0.0 && self.shield_sweep_degrees <= 360.0) {
            return Err(invalid("shield_sweep_degrees", self.shield_sweep_degrees, "must be in (0, 360]"));
        }
        if self.arc_tessellation_points == 0 {
            return Err(invalid("arc_tessellation_points", self.arc_tessellation_points, "must be positive"));
        }
        if !(self.bullet_density > 0.0) {
            return Err(invalid("bullet_density", self.bullet_density, "must be positive"));
        }
        if !(self.keyboard_axis_rate >= 0.0) {
            return Err(invalid("keyboard_axis_rate", self.keyboard_axis_rate, "must not be negative"));
        }
        Ok(())
    }

    pub fn world(&self) -> WorldConfig {
        WorldConfig::new(self.screen_width, self.screen_height, self.world_width_m)
    }

    pub fn timestep(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    pub fn solver(&self) -> SolverSettings {
        SolverSettings {
            velocity_iterations: self.velocity_iterations,
            position_iterations: self.position_iterations,
        }
    }

    pub fn axis_mapper(&self) -> AxisMapper {
        AxisMapper::new(self.axis_sensitivity)
    }

    pub fn gravity(&self) -> Vector<Real> {
        vector![self.gravity[0], self.gravity[1]]
    }

    pub fn bullet_impulse(&self) -> Vector<Real> {
        vector![self.bullet_impulse[0], self.bullet_impulse[1]]
    }
}
