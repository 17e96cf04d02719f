//! Neighbour gathering.
//!
//! Both strategies produce the same shape: every candidate other than the
//! subject, nearest first, with ties broken by index so results do not
//! depend on traversal order.

use crate::agent::BoidView;
use crate::octree::Octree;
use glam::Vec3;

/// One candidate neighbour as seen from the subject.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Index into the tick snapshot.
    pub index: usize,
    /// Position at tick start.
    pub position: Vec3,
    /// Heading at tick start.
    pub heading: Vec3,
    /// Flock id.
    pub group: u32,
    /// Distance from the subject.
    pub distance: f32,
}

impl Neighbor {
    fn new(index: usize, view: &BoidView, from: Vec3) -> Self {
        Self {
            index,
            position: view.position,
            heading: view.heading,
            group: view.group,
            distance: view.position.distance(from),
        }
    }
}

/// Every other agent in `snapshot`, nearest first.
pub fn sorted_neighbors(snapshot: &[BoidView], subject: usize, out: &mut Vec<Neighbor>) {
    out.clear();
    let from = snapshot[subject].position;
    out.extend(
        snapshot
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != subject)
            .map(|(i, view)| Neighbor::new(i, view, from)),
    );
    sort_by_distance(out);
}

/// Agents within `radius` of the subject according to `index`, nearest first.
///
/// `index` must have been built from `snapshot`, storing snapshot indices.
pub fn indexed_neighbors(
    snapshot: &[BoidView],
    index: &Octree<usize>,
    subject: usize,
    radius: f32,
    out: &mut Vec<Neighbor>,
) {
    out.clear();
    let from = snapshot[subject].position;
    index.for_each_in_radius(from, radius, |occupant| {
        if occupant.item != subject {
            out.push(Neighbor::new(occupant.item, &snapshot[occupant.item], from));
        }
    });
    sort_by_distance(out);
}

fn sort_by_distance(neighbors: &mut [Neighbor]) {
    neighbors.sort_unstable_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.index.cmp(&b.index))
    });
}
