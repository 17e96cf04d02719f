//! Simulation tick.
//!
//! One call to [`Simulation::tick`] runs a whole frame of the flock:
//!
//! 1. Snapshot every agent's position, heading and group.
//! 2. Rebuild the octree from the snapshot (when the octree policy is on
//!    and some neighbour rule has a nonzero weight).
//! 3. For every agent, gather neighbours and sum the rules into a desired
//!    direction. Only the snapshot is read, so per-agent results do not
//!    depend on iteration order.
//! 4. Write each agent's new orientation, velocity and position.
//!
//! Nothing is written until step 3 has finished for every agent, and an
//! index error in step 2 abandons the tick with the flock untouched.

use crate::agent::{look_rotation, Agent, BoidView, FORWARD};
use crate::config::{FlockConfig, Kinematics, NeighborPolicy};
use crate::error::SimulationError;
use crate::neighborhood::{indexed_neighbors, sorted_neighbors, Neighbor};
use crate::octree::{Cube, Octree};
use crate::population::{PopulationController, PopulationDelta};
use crate::rules::{steer, Rule, SteeringContext};
use glam::Vec3;

/// Counters from one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickStats {
    /// Agents stepped.
    pub agents: usize,
    /// Nodes in the tick's octree (0 under the sorted policy).
    pub octree_nodes: usize,
    /// Depth of the tick's octree.
    pub octree_depth: u32,
    /// Neighbour candidates examined, summed over agents.
    pub candidates: usize,
    /// Agents whose steering exceeded the epsilon.
    pub steered: usize,
    /// Scaled time advanced.
    pub step: f32,
}

/// A flock and the parameters it runs under.
#[derive(Debug)]
pub struct Simulation {
    agents: Vec<Agent>,
    config: FlockConfig,
    snapshot: Vec<BoidView>,
    index: Octree<usize>,
    directions: Vec<Vec3>,
    ticks: u64,
}

impl Simulation {
    /// Create an empty simulation, validating `config`.
    pub fn new(config: FlockConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            agents: Vec::new(),
            config,
            snapshot: Vec::new(),
            index: Octree::new(Cube::enclosing(std::iter::empty())),
            directions: Vec::new(),
            ticks: 0,
        })
    }

    /// Start from an existing set of agents.
    pub fn with_agents(mut self, agents: Vec<Agent>) -> Self {
        self.agents = agents;
        self
    }

    /// The flock, for rendering.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable access for population changes between ticks.
    pub fn agents_mut(&mut self) -> &mut Vec<Agent> {
        &mut self.agents
    }

    /// Current parameters.
    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Replace the parameters between ticks.
    pub fn set_config(&mut self, config: FlockConfig) -> Result<(), SimulationError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Ticks completed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Let `controller` add or remove agents. Call between ticks.
    pub fn apply_population(&mut self, controller: &mut PopulationController) -> PopulationDelta {
        controller.reconcile(&mut self.agents, self.config.cruise_speed)
    }

    /// Mean agent position, or `None` for an empty flock.
    pub fn centroid(&self) -> Option<Vec3> {
        if self.agents.is_empty() {
            return None;
        }
        let sum: Vec3 = self.agents.iter().map(|a| a.position).sum();
        Some(sum / self.agents.len() as f32)
    }

    /// Advance the flock by `delta` seconds of wall-clock time.
    ///
    /// `avoid` is the position agents keep clear of, typically the camera.
    pub fn tick(&mut self, delta: f32, avoid: Option<Vec3>) -> Result<TickStats, SimulationError> {
        if !(delta.is_finite() && delta > 0.0) {
            return Err(SimulationError::InvalidDelta(delta));
        }
        let step = delta * self.config.time_scale;
        let mut stats = TickStats {
            agents: self.agents.len(),
            step,
            ..TickStats::default()
        };

        self.snapshot.clear();
        self.snapshot.extend(self.agents.iter().map(Agent::view));

        let gather = Rule::ALL
            .iter()
            .any(|rule| rule.requires_neighbors() && rule.weight(&self.config.weights) != 0.0);

        if gather && self.config.neighbors == NeighborPolicy::Octree {
            self.rebuild_index()?;
            stats.octree_nodes = self.index.node_count();
            stats.octree_depth = self.index.depth();
        }

        self.directions.clear();
        let mut neighbors: Vec<Neighbor> = Vec::new();
        for subject in 0..self.snapshot.len() {
            match self.config.neighbors {
                _ if !gather => neighbors.clear(),
                NeighborPolicy::Sorted => sorted_neighbors(&self.snapshot, subject, &mut neighbors),
                NeighborPolicy::Octree => indexed_neighbors(
                    &self.snapshot,
                    &self.index,
                    subject,
                    self.config.query_radius(),
                    &mut neighbors,
                ),
            }
            stats.candidates += neighbors.len();

            self.directions.push(steer(&SteeringContext {
                subject: self.snapshot[subject],
                neighbors: &neighbors,
                avoid,
                config: &self.config,
            }));
        }

        for (agent, direction) in self.agents.iter_mut().zip(&self.directions) {
            if integrate(agent, *direction, step, &self.config) {
                stats.steered += 1;
            }
        }

        self.ticks += 1;
        tracing::trace!(
            tick = self.ticks,
            agents = stats.agents,
            nodes = stats.octree_nodes,
            depth = stats.octree_depth,
            candidates = stats.candidates,
            steered = stats.steered,
            "tick complete"
        );
        Ok(stats)
    }

    fn rebuild_index(&mut self) -> Result<(), SimulationError> {
        self.index
            .reset(Cube::enclosing(self.snapshot.iter().map(|v| v.position)));
        for (i, view) in self.snapshot.iter().enumerate() {
            self.index.add(i, view.position)?;
        }
        Ok(())
    }
}

/// Apply one agent's steering and move it. Returns whether it turned.
pub fn integrate(agent: &mut Agent, direction: Vec3, step: f32, config: &FlockConfig) -> bool {
    let turn = (config.turn_rate * step).clamp(0.0, 1.0);

    match config.kinematics {
        Kinematics::Derived => {
            let steered = direction.length() > config.steer_epsilon;
            if steered {
                agent.orientation = agent
                    .orientation
                    .slerp(look_rotation(direction), turn)
                    .normalize();
            }
            agent.velocity = agent.orientation * FORWARD * config.cruise_speed;
            agent.position += agent.velocity * step;
            steered
        }
        Kinematics::Accumulated { steering_gain, drag } => {
            let steered = direction.length() > config.steer_epsilon;
            if steered {
                agent.velocity += direction * steering_gain * step;
            }

            let speed = agent.velocity.length();
            let slowed = (speed - drag * speed * speed * step).max(0.0);
            agent.velocity = agent.velocity.normalize_or_zero() * slowed;

            if slowed > config.steer_epsilon {
                agent.orientation = agent
                    .orientation
                    .slerp(look_rotation(agent.velocity), turn)
                    .normalize();
            }
            agent.position += agent.velocity * step;
            steered
        }
    }
}
