//! Error types for Fishtank.
//!
//! Octree invariant violations, configuration validation, and the
//! simulation-level error that wraps both.

use glam::Vec3;

/// Errors raised by the octree.
///
/// Every variant is an invariant violation rather than a normal outcome:
/// the tick that hits one is abandoned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OctreeError {
    /// The point lies outside the root cube.
    #[error("position {position} lies outside the octree root cube")]
    OutOfBounds {
        /// Offending position.
        position: Vec3,
    },
    /// A leaf below capacity had no free occupant slot.
    #[error("octree node {node} reports spare capacity but has no free slot")]
    NoFreeSlot {
        /// Arena index of the node.
        node: usize,
    },
    /// An occupant was routed into a node whose cube does not contain it.
    #[error("position {position} was routed into node {node} which does not contain it")]
    Misplaced {
        /// Offending position.
        position: Vec3,
        /// Arena index of the node.
        node: usize,
    },
}

/// Errors from loading or validating a [`FlockConfig`](crate::FlockConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A distance or radius was negative or not finite.
    #[error("`{field}` must be a finite, non-negative distance (got {value})")]
    InvalidDistance {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A neighbour cap was zero.
    #[error("`{field}` must be at least 1")]
    ZeroNeighborCap {
        /// Field name.
        field: &'static str,
    },
    /// A rate, scale or weight was negative or not finite.
    #[error("`{field}` must be finite and non-negative (got {value})")]
    InvalidFactor {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// Agents must move to have a heading.
    #[error("`cruise_speed` must be positive (got {0})")]
    InvalidCruiseSpeed(f32),
    /// Population must have at least one group.
    #[error("population needs at least one group")]
    NoGroups,
    /// Failed to read or write a config file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// Config file was not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when stepping a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The spatial index hit an invariant violation.
    #[error("spatial index error: {0}")]
    Octree(#[from] OctreeError),
    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Tick was called with a non-positive or non-finite delta.
    #[error("delta time must be finite and positive (got {0})")]
    InvalidDelta(f32),
}
