//! Force passes for the layout engine.
//!
//! Spring attraction over the edge list (Hooke's law) plus two repulsion
//! paths sharing one force law: the exact `O(N²)` pairwise sum and the
//! Barnes-Hut approximation. The tree path is the one driving the live
//! viewer; the direct path is the reference for benchmarks and accuracy
//! checks.

use crate::layout::octree::{Bounds, Octree, MIN_SEPARATION};
use crate::layout::settings::LayoutSettings;
use crate::layout::states::{Body, Edge};

/// Accumulate spring forces along every edge.
///
/// For an edge with current length `d`, both endpoints feel
/// `k * weight * (d - rest_length)` along the edge direction, pulling them
/// together when stretched and apart when compressed. Edges shorter than the
/// separation floor have no usable direction and contribute nothing.
pub fn apply_spring_forces(bodies: &mut [Body], edges: &[Edge], settings: &LayoutSettings) {
    for edge in edges {
        let difference = bodies[edge.dest].position - bodies[edge.source].position;
        let magnitude = difference.norm();
        if magnitude < MIN_SEPARATION {
            continue;
        }
        let direction = difference / magnitude;

        let displacement = magnitude - settings.spring_length;
        let force = direction * (settings.spring_constant * edge.weight * displacement);

        bodies[edge.source].force += force;
        bodies[edge.dest].force -= force;
    }
}

/// Accumulate repulsive forces with the exact all-pairs sum.
///
/// Every unordered pair `(i, j)` contributes
/// `charge * m_i * m_j / r³` along the displacement, equal and opposite.
/// With a negative charge the force pushes the pair apart.
pub fn apply_repulsive_forces_direct(bodies: &mut [Body], settings: &LayoutSettings) {
    let n = bodies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let d = bodies[j].position - bodies[i].position;
            let r = d.norm().max(MIN_SEPARATION);
            let v = settings.charge * bodies[i].mass * bodies[j].mass / (r * r * r);
            let f = d * v;

            bodies[i].force += f;
            bodies[j].force -= f;
        }
    }
}

/// Accumulate repulsive forces through the Barnes-Hut tree.
///
/// Rebuilds the tree from the tracked bounds, then queries it once per body.
pub fn apply_repulsive_forces(
    bodies: &mut [Body],
    tree: &mut Octree,
    bounds: &Bounds,
    settings: &LayoutSettings,
) {
    tree.build(bodies, bounds);
    for i in 0..bodies.len() {
        let f = tree.repulsive_force(bodies, i, settings.charge, settings.theta);
        bodies[i].force += f;
    }
}
