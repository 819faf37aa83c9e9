//! Startup error types.
//!
//! Everything that can fail happens before the first frame: reading the
//! configuration, generating shield outlines and turning them into
//! colliders. The running loop has no error path, so these types only ever
//! travel up to `main`, which logs them and exits.

use std::path::PathBuf;

use thiserror::Error;

use crate::input::Player;

/// Problems with `assets/warlords.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration value '{field}' = {value} is invalid: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// An arc outline that cannot become a collision polygon.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("arc radii must satisfy 0 <= inner < outer (got inner {inner}, outer {outer})")]
    InvalidRadii { inner: f32, outer: f32 },

    #[error("arc sweep must be in (0, 2π] radians (got {0})")]
    InvalidSweep(f32),

    #[error("arc needs at least one tessellation point")]
    NoTessellation,

    #[error("{tessellation_points} tessellation points give chords of {step} radians, which must stay below π")]
    CoarseTessellation { step: f32, tessellation_points: usize },

    #[error("arc outline collapses to {vertices} distinct vertices or zero area")]
    Degenerate { vertices: usize },

    #[error("arc outline segments {first} and {second} cross")]
    SelfIntersecting { first: usize, second: usize },
}

/// Failures while assembling the physics scene.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("shield geometry for {player} is invalid: {source}")]
    Geometry {
        player: Player,
        #[source]
        source: GeometryError,
    },

    #[error("arc piece {piece} has no convex hull")]
    ConvexPiece { piece: usize },

    #[error("bullet of radius {radius} m has mass {mass} kg; it cannot take a launch impulse")]
    MasslessBullet { radius: f32, mass: f32 },
}

/// Anything that stops the game from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),
}
