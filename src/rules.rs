//! Flocking rules.
//!
//! Each rule maps an agent and its neighbourhood to a steering vector.
//! The engine sums the weighted contributions of every rule into one
//! desired direction per agent per tick; only the direction matters to
//! the integrator, so weights are relative.
//!
//! # Rules
//!
//! | Rule | Neighbours | Contribution |
//! |------|------------|--------------|
//! | [`Rule::Cohesion`] | up to `group_size`, same group | `mean(neighbour) - self` |
//! | [`Rule::Separation`] | up to `boid_avoid`, any group | `Σ -normalize(gap) * (min_boid_distance - len(gap))` for close ones |
//! | [`Rule::Alignment`] | up to `group_size`, same group | `mean(heading) - own heading` |
//! | [`Rule::Centering`] | none | `-self` |
//! | [`Rule::Avoidance`] | avoid target | `(self - target) * (min_camera_distance - distance)` when close |
//!
//! Neighbour lists are nearest first and never contain the subject, so
//! "up to K" means "the K nearest".

use crate::agent::BoidView;
use crate::config::{FlockConfig, RuleWeights};
use crate::neighborhood::Neighbor;
use glam::Vec3;

/// A steering rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Steer toward the centre of mass of nearby flockmates.
    ///
    /// Averages the positions of up to `group_size` nearest neighbours
    /// sharing the agent's group. With no flockmates in range it
    /// contributes nothing.
    Cohesion,

    /// Steer away from neighbours closer than `min_boid_distance`.
    ///
    /// Looks at the `boid_avoid` nearest neighbours of any group. Each one
    /// inside the threshold pushes directly away with a strength equal to
    /// how far it intrudes; a neighbour at exactly the same position has no
    /// defined direction and is skipped.
    Separation,

    /// Steer to match the heading of nearby flockmates.
    ///
    /// Uses the same neighbours as [`Rule::Cohesion`].
    Alignment,

    /// Weak pull toward the world origin so flocks do not drift away.
    Centering,

    /// Steer away from the avoid target (usually the camera) when it is
    /// closer than `min_camera_distance`. Without a target it contributes
    /// nothing.
    Avoidance,
}

impl Rule {
    /// Every rule, in evaluation order.
    pub const ALL: [Rule; 5] = [
        Rule::Cohesion,
        Rule::Separation,
        Rule::Alignment,
        Rule::Centering,
        Rule::Avoidance,
    ];

    /// Returns `true` if this rule reads the neighbour list.
    pub fn requires_neighbors(&self) -> bool {
        matches!(self, Rule::Cohesion | Rule::Separation | Rule::Alignment)
    }

    /// This rule's weight.
    pub fn weight(&self, weights: &RuleWeights) -> f32 {
        match self {
            Rule::Cohesion => weights.cohesion,
            Rule::Separation => weights.separation,
            Rule::Alignment => weights.alignment,
            Rule::Centering => weights.centering,
            Rule::Avoidance => weights.avoidance,
        }
    }

    /// Unweighted contribution of this rule.
    pub fn contribution(&self, ctx: &SteeringContext<'_>) -> Vec3 {
        let me = ctx.subject;
        let config = ctx.config;
        match self {
            Rule::Cohesion => {
                let (sum, count) = flockmates(ctx)
                    .fold((Vec3::ZERO, 0u32), |(sum, n), nb| (sum + nb.position, n + 1));
                if count == 0 {
                    return Vec3::ZERO;
                }
                sum / count as f32 - me.position
            }
            Rule::Separation => ctx
                .neighbors
                .iter()
                .take(config.boid_avoid)
                .filter(|nb| nb.distance < config.min_boid_distance)
                .map(|nb| {
                    let gap = nb.position - me.position;
                    -gap.normalize_or_zero() * (config.min_boid_distance - nb.distance)
                })
                .sum(),
            Rule::Alignment => {
                let (sum, count) = flockmates(ctx)
                    .fold((Vec3::ZERO, 0u32), |(sum, n), nb| (sum + nb.heading, n + 1));
                if count == 0 {
                    return Vec3::ZERO;
                }
                sum / count as f32 - me.heading
            }
            Rule::Centering => -me.position,
            Rule::Avoidance => match ctx.avoid {
                Some(target) => {
                    let gap = me.position - target;
                    let distance = gap.length();
                    if distance < config.min_camera_distance {
                        gap * (config.min_camera_distance - distance)
                    } else {
                        Vec3::ZERO
                    }
                }
                None => Vec3::ZERO,
            },
        }
    }
}

/// Everything a rule may read for one agent.
#[derive(Clone, Copy, Debug)]
pub struct SteeringContext<'a> {
    /// The agent being steered.
    pub subject: BoidView,
    /// Candidates nearest first, subject excluded.
    pub neighbors: &'a [Neighbor],
    /// Position to keep clear of, if any.
    pub avoid: Option<Vec3>,
    /// Parameters.
    pub config: &'a FlockConfig,
}

/// Weighted sum of every rule's contribution.
pub fn steer(ctx: &SteeringContext<'_>) -> Vec3 {
    Rule::ALL
        .iter()
        .map(|rule| {
            let weight = rule.weight(&ctx.config.weights);
            if weight == 0.0 {
                Vec3::ZERO
            } else {
                rule.contribution(ctx) * weight
            }
        })
        .sum()
}

fn flockmates<'a>(ctx: &'a SteeringContext<'a>) -> impl Iterator<Item = &'a Neighbor> + 'a {
    let group = ctx.subject.group;
    ctx.neighbors
        .iter()
        .filter(move |nb| nb.group == group)
        .take(ctx.config.group_size)
}
