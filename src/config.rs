//! Flocking configuration.
//!
//! Everything the rules engine and integrator read is carried in a
//! [`FlockConfig`] value handed to the simulation, so any number of
//! simulations with different parameters can coexist. Configurations
//! round-trip through JSON for tuning sessions.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How each agent's neighbour candidates are found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// Sort every other agent by distance. Quadratic, needs no index.
    Sorted,
    /// Radius query against the per-tick octree, then sort the hits.
    #[default]
    Octree,
}

/// How steering turns into motion.
///
/// The two policies are exclusive: a simulation uses one for its whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum Kinematics {
    /// Velocity is `heading * cruise_speed`, recomputed every tick.
    #[default]
    Derived,
    /// Steering accumulates into velocity, slowed by quadratic drag.
    /// Orientation follows the velocity.
    Accumulated {
        /// Acceleration per unit of steering.
        steering_gain: f32,
        /// Drag coefficient: deceleration is `drag * speed²`.
        drag: f32,
    },
}

/// Relative weight of each steering rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleWeights {
    /// Pull toward the flock's centre of mass.
    pub cohesion: f32,
    /// Push away from crowding neighbours.
    pub separation: f32,
    /// Turn to match neighbours' headings.
    pub alignment: f32,
    /// Pull toward the world origin.
    pub centering: f32,
    /// Push away from the avoid target.
    pub avoidance: f32,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            cohesion: 1.0,
            separation: 1.0,
            alignment: 1.0,
            centering: 0.05,
            avoidance: 1.0,
        }
    }
}

/// Parameters for the rules engine and integrator.
///
/// # Example
///
/// ```
/// use fishtank::FlockConfig;
///
/// let config = FlockConfig::default()
///     .with_group_size(6)
///     .with_min_boid_distance(2.0)
///     .with_time_scale(0.5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    /// Most same-group neighbours considered for cohesion and alignment.
    pub group_size: usize,
    /// Most neighbours of any group considered for separation.
    pub boid_avoid: usize,
    /// Neighbours closer than this push the agent away.
    pub min_boid_distance: f32,
    /// The avoid target pushes agents closer than this away.
    pub min_camera_distance: f32,
    /// Radius of the octree neighbour query.
    pub perception_radius: f32,
    /// Multiplier on every delta time.
    pub time_scale: f32,
    /// Fraction of the way to the target heading turned per scaled second.
    pub turn_rate: f32,
    /// Forward speed under [`Kinematics::Derived`], spawn speed otherwise.
    pub cruise_speed: f32,
    /// Steering shorter than this leaves the heading alone.
    pub steer_epsilon: f32,
    /// Rule weights.
    pub weights: RuleWeights,
    /// Neighbour lookup strategy.
    pub neighbors: NeighborPolicy,
    /// Velocity update policy.
    pub kinematics: Kinematics,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            group_size: 10,
            boid_avoid: 10,
            min_boid_distance: 3.0,
            min_camera_distance: 5.0,
            perception_radius: 20.0,
            time_scale: 1.0,
            turn_rate: 2.0,
            cruise_speed: 5.0,
            steer_epsilon: 0.01,
            weights: RuleWeights::default(),
            neighbors: NeighborPolicy::default(),
            kinematics: Kinematics::default(),
        }
    }
}

impl FlockConfig {
    /// Set the cohesion/alignment neighbour cap.
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size;
        self
    }

    /// Set the separation neighbour cap.
    pub fn with_boid_avoid(mut self, boid_avoid: usize) -> Self {
        self.boid_avoid = boid_avoid;
        self
    }

    /// Set the separation threshold.
    pub fn with_min_boid_distance(mut self, distance: f32) -> Self {
        self.min_boid_distance = distance;
        self
    }

    /// Set the avoid-target threshold.
    pub fn with_min_camera_distance(mut self, distance: f32) -> Self {
        self.min_camera_distance = distance;
        self
    }

    /// Set the octree query radius.
    pub fn with_perception_radius(mut self, radius: f32) -> Self {
        self.perception_radius = radius;
        self
    }

    /// Set the time scale.
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    /// Set the turn rate.
    pub fn with_turn_rate(mut self, rate: f32) -> Self {
        self.turn_rate = rate;
        self
    }

    /// Set the cruise speed.
    pub fn with_cruise_speed(mut self, speed: f32) -> Self {
        self.cruise_speed = speed;
        self
    }

    /// Replace the rule weights.
    pub fn with_weights(mut self, weights: RuleWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Choose the neighbour lookup strategy.
    pub fn with_neighbors(mut self, policy: NeighborPolicy) -> Self {
        self.neighbors = policy;
        self
    }

    /// Choose the velocity policy.
    pub fn with_kinematics(mut self, kinematics: Kinematics) -> Self {
        self.kinematics = kinematics;
        self
    }

    /// Radius the octree query must cover so every rule sees its neighbours.
    pub fn query_radius(&self) -> f32 {
        self.perception_radius.max(self.min_boid_distance)
    }

    /// Reject values the engine does not handle per tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_size == 0 {
            return Err(ConfigError::ZeroNeighborCap { field: "group_size" });
        }
        if self.boid_avoid == 0 {
            return Err(ConfigError::ZeroNeighborCap { field: "boid_avoid" });
        }

        for (field, value) in [
            ("min_boid_distance", self.min_boid_distance),
            ("min_camera_distance", self.min_camera_distance),
            ("perception_radius", self.perception_radius),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDistance { field, value });
            }
        }

        let mut factors = vec![
            ("time_scale", self.time_scale),
            ("turn_rate", self.turn_rate),
            ("steer_epsilon", self.steer_epsilon),
            ("weights.cohesion", self.weights.cohesion),
            ("weights.separation", self.weights.separation),
            ("weights.alignment", self.weights.alignment),
            ("weights.centering", self.weights.centering),
            ("weights.avoidance", self.weights.avoidance),
        ];
        if let Kinematics::Accumulated { steering_gain, drag } = self.kinematics {
            factors.push(("kinematics.steering_gain", steering_gain));
            factors.push(("kinematics.drag", drag));
        }
        for (field, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidFactor { field, value });
            }
        }

        if !(self.cruise_speed.is_finite() && self.cruise_speed > 0.0) {
            return Err(ConfigError::InvalidCruiseSpeed(self.cruise_speed));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json_str(&fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), "loaded flock config");
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
