//! # Fishtank
//!
//! The simulation core of a boids fish tank: agents with a position and
//! orientation, a set of flocking rules that turn neighbourhoods into a
//! desired heading, and an octree that keeps neighbour lookups cheap as the
//! flock grows.
//!
//! Rendering, windowing and UI are someone else's job. Each frame the
//! caller hands the simulation a delta time and, optionally, a position to
//! avoid (the camera); the simulation updates every agent in place and the
//! renderer reads the result back through [`Simulation::agents`] or
//! [`instance::write_instances`].
//!
//! ## Quick Start
//!
//! ```
//! use fishtank::prelude::*;
//!
//! let config = FlockConfig::default().with_min_boid_distance(2.0);
//! let mut sim = Simulation::new(config).unwrap();
//! let mut population = PopulationController::new(
//!     PopulationConfig::default().with_target(64).with_groups(2),
//! ).unwrap();
//!
//! for _ in 0..10 {
//!     sim.apply_population(&mut population);
//!     sim.tick(1.0 / 60.0, Some(Vec3::new(0.0, 0.0, 30.0))).unwrap();
//! }
//! assert_eq!(sim.agents().len(), 64);
//! ```
//!
//! ## Tick Order
//!
//! A tick reads a snapshot taken before any agent moves, so the result for
//! one agent never depends on where another agent landed this tick. Add or
//! remove agents only between ticks.
//!
//! ## Rules
//!
//! | Rule | Effect |
//! |------|--------|
//! | [`Rule::Cohesion`] | toward the centre of nearby flockmates |
//! | [`Rule::Separation`] | away from neighbours that are too close |
//! | [`Rule::Alignment`] | toward flockmates' headings |
//! | [`Rule::Centering`] | weak pull to the world origin |
//! | [`Rule::Avoidance`] | away from the avoid target |

pub mod agent;
pub mod config;
pub mod error;
pub mod instance;
pub mod neighborhood;
pub mod octree;
pub mod population;
pub mod rules;
mod simulation;
pub mod time;

pub use agent::{Agent, BoidView};
pub use config::{FlockConfig, Kinematics, NeighborPolicy, RuleWeights};
pub use error::{ConfigError, OctreeError, SimulationError};
pub use glam::{Quat, Vec3};
pub use instance::AgentInstance;
pub use octree::{Cube, Octree};
pub use population::{PopulationConfig, PopulationController, PopulationDelta};
pub use rules::Rule;
pub use simulation::{integrate, Simulation, TickStats};
pub use time::Clock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use fishtank::prelude::*;
/// ```
pub mod prelude {
    pub use crate::agent::{Agent, FORWARD, UP};
    pub use crate::config::{FlockConfig, Kinematics, NeighborPolicy, RuleWeights};
    pub use crate::instance::AgentInstance;
    pub use crate::population::{PopulationConfig, PopulationController};
    pub use crate::rules::Rule;
    pub use crate::simulation::{Simulation, TickStats};
    pub use crate::time::Clock;
    pub use crate::{Quat, Vec3};
}
