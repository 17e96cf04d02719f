//! Octree spatial index for neighbour queries.
//!
//! The tree partitions a cube recursively. Leaves hold up to
//! [`MAX_OCCUPANTS`] occupants; inserting past that splits the leaf into
//! eight children that tile it exactly, and every existing occupant is
//! pushed down into the child whose cube contains it.
//!
//! Nodes live in a flat arena (`Vec`) and refer to their children by
//! index, so rebuilding the whole tree every tick is a `clear` plus a run
//! of inserts with no per-node allocation churn. There is no removal: the
//! simulation discards the tree at the end of each tick and builds a fresh
//! one from the next snapshot.
//!
//! # Octant layout
//!
//! A point picks its child by comparing against the node origin on each
//! axis. A coordinate strictly below the origin sets the bit for that axis:
//!
//! | bit | axis |
//! |-----|------|
//! | 0   | x    |
//! | 1   | y    |
//! | 2   | z    |
//!
//! Child 0 is the span from the origin up to the maximum corner on every
//! axis, child 7 the span from the minimum corner up to the origin.
//!
//! # Example
//!
//! ```
//! use fishtank::octree::{Cube, Octree};
//! use glam::Vec3;
//!
//! let mut tree = Octree::new(Cube::new(Vec3::ZERO, 100.0));
//! tree.add(0usize, Vec3::new(1.0, 2.0, 3.0)).unwrap();
//! tree.add(1usize, Vec3::new(40.0, 0.0, 0.0)).unwrap();
//!
//! let near = tree.radius_search(Vec3::ZERO, 5.0);
//! assert_eq!(near, vec![0]);
//! ```

use crate::error::OctreeError;
use glam::Vec3;

/// Occupants a leaf holds before it subdivides.
pub const MAX_OCCUPANTS: usize = 10;

/// Depth at which leaves stop subdividing.
///
/// Leaves at this depth accept occupants past [`MAX_OCCUPANTS`]; without
/// the cap, more than `MAX_OCCUPANTS` coincident points would split forever.
pub const MAX_DEPTH: u32 = 16;

/// Extra room added around the points when sizing a root cube.
const ENCLOSING_PADDING: f32 = 1.0;

/// An axis-aligned cube, stored by its corners.
///
/// Children are cut from their parent's corners and split point directly,
/// so a child's faces are bit-identical to the planes that route points
/// into it. Recomputing child centres as `origin ± length / 4` would round
/// at the scale of the origin and drift away from those planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cube {
    min: Vec3,
    max: Vec3,
}

/// How a query sphere relates to a cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlap {
    /// No point of the cube is within the sphere.
    Disjoint,
    /// The sphere crosses at least one face of the cube.
    Partial,
    /// The whole cube lies inside the sphere.
    Enclosed,
}

impl Cube {
    /// Create a cube centred on `origin` with side `length`.
    pub fn new(origin: Vec3, length: f32) -> Self {
        let half = Vec3::splat(length * 0.5);
        Self::from_corners(origin - half, origin + half)
    }

    /// Create a cube from its minimum and maximum corners.
    #[inline]
    pub fn from_corners(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest padded cube around a set of points.
    ///
    /// The cube is centred on the points' bounding box and its side is the
    /// largest box extent plus padding. The corners are then widened to the
    /// box itself, so every point is inside whatever the rounding.
    /// An empty set yields a unit-padded cube at the world origin.
    pub fn enclosing<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for point in points {
            min = min.min(point);
            max = max.max(point);
        }
        if min.x > max.x {
            return Self::new(Vec3::ZERO, 2.0 * ENCLOSING_PADDING);
        }

        let extent = (max - min).max_element();
        let padded = Self::new((min + max) * 0.5, extent + 2.0 * ENCLOSING_PADDING);
        Self::from_corners(padded.min.min(min), padded.max.max(max))
    }

    /// Centre of the cube, which is also the plane its children split on.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Side length.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.max - self.min).max_element()
    }

    /// Half the side length.
    #[inline]
    pub fn half(&self) -> f32 {
        self.length() * 0.5
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Whether `position` is within the cube (faces included).
    ///
    /// NaN coordinates are never contained.
    pub fn contains(&self, position: Vec3) -> bool {
        position.cmpge(self.min).all() && position.cmple(self.max).all()
    }

    /// Index of the octant `position` falls in.
    #[inline]
    pub fn octant(&self, position: Vec3) -> usize {
        let origin = self.origin();
        let mut index = 0;
        if position.x < origin.x {
            index |= 1;
        }
        if position.y < origin.y {
            index |= 2;
        }
        if position.z < origin.z {
            index |= 4;
        }
        index
    }

    /// The cube of child `octant` (0..8).
    ///
    /// A set bit takes the span below the split plane, a clear bit the
    /// span above it, matching [`octant`](Self::octant).
    pub fn child(&self, octant: usize) -> Cube {
        let split = self.origin();
        let mut min = split;
        let mut max = self.max;
        for (axis, bit) in [1, 2, 4].into_iter().enumerate() {
            if octant & bit != 0 {
                min[axis] = self.min[axis];
                max[axis] = split[axis];
            }
        }
        Cube::from_corners(min, max)
    }

    /// Classify a sphere against this cube.
    ///
    /// Walks the three pairs of face planes, accumulating the distance from
    /// `center` to the nearest point of the cube and to its farthest corner.
    pub fn classify_sphere(&self, center: Vec3, radius: f32) -> Overlap {
        let min = self.min();
        let max = self.max();
        let mut near_sq = 0.0;
        let mut far_sq = 0.0;

        for axis in 0..3 {
            let (c, lo, hi) = (center[axis], min[axis], max[axis]);
            let near = if c < lo {
                lo - c
            } else if c > hi {
                c - hi
            } else {
                0.0
            };
            let far = (c - lo).abs().max((hi - c).abs());
            near_sq += near * near;
            far_sq += far * far;
        }

        let radius_sq = radius * radius;
        if near_sq > radius_sq {
            Overlap::Disjoint
        } else if far_sq <= radius_sq {
            Overlap::Enclosed
        } else {
            Overlap::Partial
        }
    }
}

/// A stored point and the item it locates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Occupant<T> {
    /// Where the item was inserted.
    pub position: Vec3,
    /// Caller payload, typically an index into the agent list.
    pub item: T,
}

#[derive(Clone, Debug)]
enum Contents<T> {
    Leaf(Vec<Occupant<T>>),
    /// Arena index of the first of eight contiguous children.
    Branch(usize),
}

#[derive(Clone, Debug)]
struct Node<T> {
    cube: Cube,
    depth: u32,
    contents: Contents<T>,
}

impl<T> Node<T> {
    fn leaf(cube: Cube, depth: u32) -> Self {
        Self {
            cube,
            depth,
            contents: Contents::Leaf(Vec::with_capacity(MAX_OCCUPANTS)),
        }
    }
}

enum Step {
    Descend(usize),
    Split,
    Store,
}

/// Arena-backed octree over items of type `T`.
#[derive(Clone, Debug)]
pub struct Octree<T> {
    nodes: Vec<Node<T>>,
    len: usize,
}

impl<T: Copy> Octree<T> {
    /// Create an empty tree covering `root`.
    pub fn new(root: Cube) -> Self {
        Self {
            nodes: vec![Node::leaf(root, 0)],
            len: 0,
        }
    }

    /// Drop every node and start over with a new root, keeping the arena allocation.
    pub fn reset(&mut self, root: Cube) {
        self.nodes.clear();
        self.nodes.push(Node::leaf(root, 0));
        self.len = 0;
    }

    /// The root cube.
    pub fn root(&self) -> Cube {
        self.nodes[0].cube
    }

    /// Number of occupants stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no occupants.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes in the arena, leaves and branches alike.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest node depth (the root is depth 0).
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Insert `item` at `position`.
    ///
    /// Full leaves subdivide before the insert completes, so a leaf above
    /// [`MAX_DEPTH`] never holds more than [`MAX_OCCUPANTS`].
    pub fn add(&mut self, item: T, position: Vec3) -> Result<(), OctreeError> {
        if !self.nodes[0].cube.contains(position) {
            return Err(OctreeError::OutOfBounds { position });
        }

        let mut index = 0;
        loop {
            let node = &self.nodes[index];
            let step = match &node.contents {
                Contents::Branch(first) => Step::Descend(first + node.cube.octant(position)),
                Contents::Leaf(occupants)
                    if occupants.len() >= MAX_OCCUPANTS && node.depth < MAX_DEPTH =>
                {
                    Step::Split
                }
                Contents::Leaf(_) => Step::Store,
            };

            match step {
                Step::Descend(child) => {
                    Self::check_placement(&self.nodes[child], child, position)?;
                    index = child;
                }
                Step::Split => self.subdivide(index)?,
                Step::Store => return self.store(index, Occupant { position, item }),
            }
        }
    }

    /// Every item whose position is within `radius` of `center`.
    pub fn radius_search(&self, center: Vec3, radius: f32) -> Vec<T> {
        let mut found = Vec::new();
        self.for_each_in_radius(center, radius, |occupant| found.push(occupant.item));
        found
    }

    /// Visit every occupant within `radius` of `center`.
    ///
    /// Subtrees whose cube misses the sphere are skipped. Subtrees entirely
    /// inside the sphere are visited without per-occupant distance checks.
    pub fn for_each_in_radius<F>(&self, center: Vec3, radius: f32, mut visit: F)
    where
        F: FnMut(&Occupant<T>),
    {
        if !(radius >= 0.0) {
            return;
        }
        let radius_sq = radius * radius;
        let mut stack = vec![0];

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            match node.cube.classify_sphere(center, radius) {
                Overlap::Disjoint => {}
                Overlap::Enclosed => self.visit_subtree(index, &mut visit),
                Overlap::Partial => match &node.contents {
                    Contents::Leaf(occupants) => occupants
                        .iter()
                        .filter(|o| o.position.distance_squared(center) <= radius_sq)
                        .for_each(&mut visit),
                    Contents::Branch(first) => stack.extend(*first..*first + 8),
                },
            }
        }
    }

    /// Iterate leaves as `(cube, occupants)` pairs.
    pub fn leaves(&self) -> impl Iterator<Item = (Cube, &[Occupant<T>])> + '_ {
        self.nodes.iter().filter_map(|node| match &node.contents {
            Contents::Leaf(occupants) => Some((node.cube, occupants.as_slice())),
            Contents::Branch(_) => None,
        })
    }

    fn visit_subtree<F>(&self, index: usize, visit: &mut F)
    where
        F: FnMut(&Occupant<T>),
    {
        let mut stack = vec![index];
        while let Some(index) = stack.pop() {
            match &self.nodes[index].contents {
                Contents::Leaf(occupants) => occupants.iter().for_each(&mut *visit),
                Contents::Branch(first) => stack.extend(*first..*first + 8),
            }
        }
    }

    fn subdivide(&mut self, index: usize) -> Result<(), OctreeError> {
        let Node { cube, depth, .. } = self.nodes[index];
        let first = self.nodes.len();
        let mut children: Vec<Node<T>> =
            (0..8).map(|octant| Node::leaf(cube.child(octant), depth + 1)).collect();

        // Route into the detached children first so a failure leaves the tree untouched.
        if let Contents::Leaf(occupants) = &self.nodes[index].contents {
            for occupant in occupants {
                let octant = cube.octant(occupant.position);
                let child = &mut children[octant];
                Self::check_placement(child, first + octant, occupant.position)?;
                if let Contents::Leaf(slots) = &mut child.contents {
                    slots.push(*occupant);
                }
            }
        }

        self.nodes[index].contents = Contents::Branch(first);
        self.nodes.extend(children);
        Ok(())
    }

    fn store(&mut self, index: usize, occupant: Occupant<T>) -> Result<(), OctreeError> {
        let node = &mut self.nodes[index];
        let unbounded = node.depth >= MAX_DEPTH;
        match &mut node.contents {
            Contents::Leaf(occupants) if occupants.len() < MAX_OCCUPANTS || unbounded => {
                occupants.push(occupant);
                self.len += 1;
                Ok(())
            }
            _ => Err(OctreeError::NoFreeSlot { node: index }),
        }
    }

    fn check_placement(node: &Node<T>, index: usize, position: Vec3) -> Result<(), OctreeError> {
        let contained = node.cube.contains(position);
        debug_assert!(
            contained,
            "octant selection routed {position} into node {index} which does not contain it"
        );
        if contained {
            Ok(())
        } else {
            Err(OctreeError::Misplaced { position, node: index })
        }
    }
}
