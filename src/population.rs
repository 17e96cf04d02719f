//! Population management.
//!
//! The simulation consumes whatever agents exist at tick start. This
//! controller is the collaborator that keeps that set at a target size:
//! a deficit spawns new agents, a surplus removes the newest ones.
//! Apply it only between ticks.
//!
//! # Example
//!
//! ```
//! use fishtank::{FlockConfig, PopulationConfig, PopulationController, Simulation};
//!
//! let mut sim = Simulation::new(FlockConfig::default()).unwrap();
//! let mut population = PopulationController::new(PopulationConfig::default().with_target(8)).unwrap();
//!
//! sim.apply_population(&mut population);
//! assert_eq!(sim.agents().len(), 8);
//! ```

use crate::agent::{look_rotation, Agent};
use crate::error::ConfigError;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Target size and spawn shape of the flock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of agents to maintain.
    pub target: usize,
    /// Number of flocks; agents are dealt round-robin.
    pub groups: u32,
    /// Agents spawn uniformly inside a sphere of this radius around the origin.
    pub spawn_radius: f32,
    /// RNG seed, so repeated runs spawn the same flock.
    pub seed: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            target: 32,
            groups: 1,
            spawn_radius: 10.0,
            seed: 0x5eed,
        }
    }
}

impl PopulationConfig {
    /// Set the target size.
    pub fn with_target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    /// Set the number of flocks.
    pub fn with_groups(mut self, groups: u32) -> Self {
        self.groups = groups;
        self
    }

    /// Set the spawn radius.
    pub fn with_spawn_radius(mut self, radius: f32) -> Self {
        self.spawn_radius = radius;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject unusable values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.groups == 0 {
            return Err(ConfigError::NoGroups);
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return Err(ConfigError::InvalidDistance {
                field: "spawn_radius",
                value: self.spawn_radius,
            });
        }
        Ok(())
    }
}

/// What a reconcile pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopulationDelta {
    /// Already at target.
    Unchanged,
    /// This many agents were created.
    Spawned(usize),
    /// This many agents were removed.
    Despawned(usize),
}

/// Spawns and removes agents to track [`PopulationConfig::target`].
#[derive(Debug)]
pub struct PopulationController {
    config: PopulationConfig,
    rng: SmallRng,
    spawned: u64,
}

impl PopulationController {
    /// Create a controller, validating `config`.
    pub fn new(config: PopulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = SmallRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rng,
            spawned: 0,
        })
    }

    /// Current configuration.
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Change the target size; takes effect at the next reconcile.
    pub fn set_target(&mut self, target: usize) {
        self.config.target = target;
    }

    /// Total agents ever spawned by this controller.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Bring `agents` to the target size.
    ///
    /// New agents face a random direction and start moving at `cruise_speed`.
    pub fn reconcile(&mut self, agents: &mut Vec<Agent>, cruise_speed: f32) -> PopulationDelta {
        let current = agents.len();
        let target = self.config.target;

        if current < target {
            let deficit = target - current;
            agents.reserve(deficit);
            for _ in 0..deficit {
                let agent = self.spawn(cruise_speed);
                agents.push(agent);
            }
            tracing::debug!(deficit, total = agents.len(), "spawned agents");
            PopulationDelta::Spawned(deficit)
        } else if current > target {
            let surplus = current - target;
            agents.truncate(target);
            tracing::debug!(surplus, total = agents.len(), "despawned agents");
            PopulationDelta::Despawned(surplus)
        } else {
            PopulationDelta::Unchanged
        }
    }

    fn spawn(&mut self, cruise_speed: f32) -> Agent {
        let group = (self.spawned % u64::from(self.config.groups)) as u32;
        self.spawned += 1;

        let position = self.random_in_sphere(self.config.spawn_radius);
        let orientation = look_rotation(self.random_direction());
        let phase = self.rng.gen::<f32>();

        let agent = Agent::new(position, orientation, group, phase);
        agent.with_velocity(agent.heading() * cruise_speed)
    }

    /// Uniform point inside a sphere centred at the origin.
    fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        let direction = self.random_direction();
        // Cube root for uniform volume distribution
        direction * radius * self.rng.gen::<f32>().cbrt()
    }

    /// Uniform unit vector.
    fn random_direction(&mut self) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let z: f32 = self.rng.gen_range(-1.0..1.0);
        let ring = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(ring * theta.cos(), ring * theta.sin(), z)
    }
}
