//! Warlords arena
//!
//! Two castles, each guarded by a curved shield that turns with its
//! player's axis, and a bullet bouncing around a walled arena.
//!
//! - `arc`: procedural shield outlines
//! - `coords`: pixel/meter conversion
//! - `input`: axis events and the axis-to-angle mapping
//! - `physics`: the rapier2d world
//! - `world`: builds the arena bodies
//! - `simulation`: the fixed-timestep loop state
//! - `render`: pixel-space frame data and drawing

pub mod arc;
pub mod config;
pub mod coords;
pub mod error;
pub mod input;
pub mod physics;
pub mod render;
pub mod simulation;
pub mod world;

pub use config::GameConfig;
pub use error::StartupError;
pub use simulation::{LoopState, SimulationContext};
