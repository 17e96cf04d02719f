//! The agent record and heading helpers.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Local axis an agent swims along (right-handed, OpenGL convention).
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// World up used when building facing rotations.
pub const UP: Vec3 = Vec3::Y;

/// A single boid.
///
/// `group` and `phase` are fixed at creation; the simulation only ever
/// writes `position`, `orientation` and `velocity`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    /// World-space location.
    pub position: Vec3,
    /// Facing direction.
    pub orientation: Quat,
    /// Current velocity. Derived from `orientation` each tick under
    /// [`Kinematics::Derived`](crate::Kinematics::Derived), carried over and
    /// dragged under [`Kinematics::Accumulated`](crate::Kinematics::Accumulated).
    pub velocity: Vec3,
    group: u32,
    phase: f32,
}

impl Agent {
    /// Create an agent at rest.
    pub fn new(position: Vec3, orientation: Quat, group: u32, phase: f32) -> Self {
        Self {
            position,
            orientation,
            velocity: Vec3::ZERO,
            group,
            phase,
        }
    }

    /// Set the initial velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Flock the agent belongs to.
    #[inline]
    pub fn group(&self) -> u32 {
        self.group
    }

    /// Per-agent constant used to desynchronise animation and colour.
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Unit vector the agent is facing.
    #[inline]
    pub fn heading(&self) -> Vec3 {
        self.orientation * FORWARD
    }

    /// `translation(position) * rotation(orientation)`.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// Read-only copy of what neighbours may observe during a tick.
    pub fn view(&self) -> BoidView {
        BoidView {
            position: self.position,
            heading: self.heading(),
            group: self.group,
        }
    }
}

/// Snapshot of an agent taken at the start of a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoidView {
    /// Position at tick start.
    pub position: Vec3,
    /// Unit heading at tick start.
    pub heading: Vec3,
    /// Flock id.
    pub group: u32,
}

/// Rotation that turns [`FORWARD`] onto `direction` while keeping [`UP`] up.
///
/// Falls back to the shortest arc when `direction` is (anti)parallel to up,
/// and to the identity for a zero vector.
pub fn look_rotation(direction: Vec3) -> Quat {
    let forward = direction.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let right = forward.cross(UP);
    if right.length_squared() < 1e-6 {
        return Quat::from_rotation_arc(FORWARD, forward);
    }
    let right = right.normalize();
    let up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}
