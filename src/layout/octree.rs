//! # Barnes-Hut octree
//!
//! Spatial approximation tree for the repulsion pass of the layout. Distant
//! groups of bodies are treated as a single pseudo-body at their center of
//! mass, replacing the naive `O(N²)` all-pairs sum with an approximate
//! `O(N log N)` one controlled by the opening ratio `theta`.
//!
//! - Space is recursively subdivided into 8 cubical octants.
//! - A leaf octant holds at most one body; occupied leaves split on insert.
//! - Internal octants carry the aggregate mass and mass-weighted position sum
//!   of their subtree, accumulated during insertion.
//!
//! The tree is rebuilt from scratch every frame and both insertion and the
//! force query run on an explicit worklist rather than native recursion, so
//! degenerate graphs cannot overflow the stack.

use tracing::warn;

use crate::layout::states::{Body, NVec3};

/// Floor on pair distances inside the force laws. Bodies closer than this are
/// treated as being this far apart so forces stay finite.
pub const MIN_SEPARATION: f64 = 0.1;

/// Hard ceiling on subdivision. An occupied leaf at this depth holds a body
/// effectively coincident with the incoming one; the incoming body is nudged
/// into a neighboring octant instead of splitting forever.
const SUBDIVISION_LIMIT: usize = 32;

/// Root half-extent used when the tracked bounds are degenerate.
const MIN_ROOT_RADIUS: f64 = 1.0;

/// Offset from a parent's center to each child octant center, in units of the
/// parent radius. Indexed by the 3-bit octant code (bit 0: +X, bit 1: +Y,
/// bit 2: +Z).
const OCTANT_OFFSETS: [[f64; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [-0.5, 0.5, 0.5],
    [0.5, 0.5, 0.5],
];

/// Axis-aligned bounds accumulated while integrating body positions.
///
/// The integration pass of frame N measures these; the tree build of frame
/// N+1 sizes its root cube from them, one frame behind.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Default for Bounds {
    /// Wide initial bound so the first build (before any integration pass has
    /// measured real positions) encloses everything.
    fn default() -> Self {
        Self {
            min_x: -1_000_000.0,
            max_x: 1_000_000.0,
            min_y: -1_000_000.0,
            max_y: 1_000_000.0,
            min_z: -1_000_000.0,
            max_z: 1_000_000.0,
        }
    }
}

impl Bounds {
    /// Collapse to the origin before re-measuring a frame's positions.
    pub fn reset(&mut self) {
        *self = Self {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
            min_z: 0.0,
            max_z: 0.0,
        };
    }

    pub fn include(&mut self, p: &NVec3) {
        if p.x < self.min_x {
            self.min_x = p.x;
        }
        if p.x > self.max_x {
            self.max_x = p.x;
        }
        if p.y < self.min_y {
            self.min_y = p.y;
        }
        if p.y > self.max_y {
            self.max_y = p.y;
        }
        if p.z < self.min_z {
            self.min_z = p.z;
        }
        if p.z > self.max_z {
            self.max_z = p.z;
        }
    }

    /// Measure tight bounds directly from a body slice. Used where no prior
    /// integration pass has tracked them (tests, benchmarks).
    pub fn from_bodies(bodies: &[Body]) -> Self {
        let mut bounds = Self {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
            min_z: 0.0,
            max_z: 0.0,
        };
        for body in bodies {
            bounds.include(&body.position);
        }
        bounds
    }

    /// Largest absolute value among the six extents; the root cube half-size.
    pub fn max_abs_extent(&self) -> f64 {
        let mut max = self.max_x.abs();
        for v in [self.min_x, self.max_y, self.min_y, self.max_z, self.min_z] {
            if v.abs() > max {
                max = v.abs();
            }
        }
        max
    }
}

/// A single octant of the tree.
///
/// Leaves (`is_internal == false`) hold zero or one body. Internal octants
/// hold none directly but at least two transitively, and carry the subtree
/// aggregates used by the approximation.
pub struct OctreeNode {
    pub center: NVec3,
    pub radius: f64,
    pub depth: usize,
    pub is_internal: bool, // once set, never reverts within a build
    pub body: Option<usize>, // leaf payload: index into the body slice
    pub octants: [Option<usize>; 8], // arena handles, created lazily
    pub center_of_mass: NVec3, // mass-weighted position sum; divide by `mass` to read
    pub mass: f64, // aggregate mass of the subtree
}

impl OctreeNode {
    fn leaf(center: NVec3, radius: f64, depth: usize) -> Self {
        Self {
            center,
            radius,
            depth,
            is_internal: false,
            body: None,
            octants: [None; 8],
            center_of_mass: NVec3::zeros(),
            mass: 0.0,
        }
    }

    /// Aggregate center of mass of the subtree. Internal octants only.
    pub fn com(&self) -> NVec3 {
        self.center_of_mass / self.mass
    }
}

/// The Barnes-Hut tree over the current body set.
///
/// Octants live in a flat arena (`nodes`) addressed by index, refilled on
/// every build; nothing persists across frames.
pub struct Octree {
    pub nodes: Vec<OctreeNode>,
    pub root: usize,
    center: NVec3,
    max_depth: usize,
    built_depth: usize,
    deepest_warned: usize,
}

impl Octree {
    pub fn new(center: NVec3, max_depth: usize) -> Self {
        Self {
            nodes: Vec::new(),
            root: 0,
            center,
            max_depth,
            built_depth: 0,
            deepest_warned: 0,
        }
    }

    /// Rebuild the tree from the current body positions.
    ///
    /// The root cube is centered on the tree's configured center with a
    /// half-size taken from the previous frame's bounds, and every body is
    /// inserted in turn. Insertion may nudge effectively-coincident body
    /// positions (see [`Octree::insert`]), which is why the slice is mutable.
    pub fn build(&mut self, bodies: &mut [Body], bounds: &Bounds) {
        let radius = bounds.max_abs_extent().max(MIN_ROOT_RADIUS);

        self.nodes.clear();
        self.nodes.push(OctreeNode::leaf(self.center, radius, 0));
        self.root = 0;
        self.built_depth = 0;

        for i in 0..bodies.len() {
            self.insert(bodies, i);
        }

        if self.built_depth > self.max_depth && self.built_depth > self.deepest_warned {
            self.deepest_warned = self.built_depth;
            warn!(
                depth = self.built_depth,
                advisory = self.max_depth,
                "octree grew past the advisory depth limit"
            );
        }
    }

    /// Insert one body, walking the tree with an explicit worklist.
    ///
    /// Each `(body, octant)` pair lands in one of three cases:
    /// 1. empty leaf: the body is stored there, done;
    /// 2. internal octant: the octant's aggregates absorb the body, and the
    ///    pair descends into the child octant matching the body's position;
    /// 3. occupied leaf: the leaf subdivides, and both the incoming and the
    ///    evicted body are re-queued against the now-internal octant.
    fn insert(&mut self, bodies: &mut [Body], body_idx: usize) {
        let mut worklist = vec![(body_idx, self.root)];

        while let Some((body, node_idx)) = worklist.pop() {
            let node = &self.nodes[node_idx];
            if node.depth > self.built_depth {
                self.built_depth = node.depth;
            }

            if node.is_internal {
                let position = bodies[body].position;
                let mass = bodies[body].mass;
                let center = node.center;

                let node = &mut self.nodes[node_idx];
                node.center_of_mass += position * mass;
                node.mass += mass;

                let code = octant_code(&position, &center);
                let child = match self.nodes[node_idx].octants[code] {
                    Some(idx) => idx,
                    None => self.add_child(node_idx, code),
                };
                worklist.push((body, child));
            } else if let Some(existing) = self.nodes[node_idx].body {
                let node = &mut self.nodes[node_idx];
                node.body = None;
                let center = node.center;
                let radius = node.radius;
                let depth = node.depth;

                if depth >= SUBDIVISION_LIMIT {
                    // The two bodies are effectively coincident. Move the
                    // incoming one into a neighboring octant so the split
                    // below separates them instead of recursing forever.
                    let taken = octant_code(&bodies[existing].position, &center);
                    let forced = (taken + 1) % 8;
                    let off = OCTANT_OFFSETS[forced];
                    bodies[body].position = center + NVec3::new(off[0], off[1], off[2]) * (radius * 0.5);
                    warn!(body, existing, "coincident bodies at subdivision limit, nudging");
                }

                self.subdivide(node_idx);
                worklist.push((body, node_idx));
                worklist.push((existing, node_idx));
            } else {
                self.nodes[node_idx].body = Some(body);
            }
        }
    }

    /// Approximate repulsive force on `source` from every other body.
    ///
    /// Worklist traversal from the root:
    /// - a leaf holding another body contributes the exact pair force;
    /// - an internal octant whose extent-to-distance ratio `2r / d` is within
    ///   `theta` contributes once as an aggregate pseudo-body and is not
    ///   descended; otherwise its children are queued individually.
    pub fn repulsive_force(&self, bodies: &[Body], source: usize, charge: f64, theta: f64) -> NVec3 {
        let mut force = NVec3::zeros();
        if self.nodes.is_empty() {
            return force;
        }

        let src_position = bodies[source].position;
        let src_mass = bodies[source].mass;
        let mut worklist = vec![self.root];

        while let Some(node_idx) = worklist.pop() {
            let node = &self.nodes[node_idx];

            if !node.is_internal {
                if let Some(other) = node.body {
                    if other != source {
                        let d = bodies[other].position - src_position;
                        let r = d.norm().max(MIN_SEPARATION);
                        let v = charge * bodies[other].mass * src_mass / (r * r * r);
                        force += d * v;
                    }
                }
            } else {
                if node.mass == 0.0 {
                    continue;
                }
                let d = node.com() - src_position;
                let r = d.norm().max(MIN_SEPARATION);

                if (node.radius * 2.0) / r <= theta {
                    let v = charge * node.mass * src_mass / (r * r * r);
                    force += d * v;
                } else {
                    for child in node.octants.iter().flatten() {
                        worklist.push(*child);
                    }
                }
            }
        }

        force
    }

    /// Deepest octant reached during the last build.
    pub fn built_depth(&self) -> usize {
        self.built_depth
    }

    /// Create the child octant for `code` under `parent`. The slot must be
    /// empty; child centers come from the fixed offset table and the radius
    /// halves per level.
    fn add_child(&mut self, parent: usize, code: usize) -> usize {
        debug_assert!(self.nodes[parent].octants[code].is_none());

        let (center, radius, depth) = {
            let p = &self.nodes[parent];
            (p.center, p.radius, p.depth)
        };
        let off = OCTANT_OFFSETS[code];
        let child_center = center + NVec3::new(off[0], off[1], off[2]) * radius;

        let idx = self.nodes.len();
        self.nodes.push(OctreeNode::leaf(child_center, radius * 0.5, depth + 1));
        self.nodes[parent].octants[code] = Some(idx);
        idx
    }

    /// Turn a leaf into an internal octant. Must be called at most once per
    /// node per build; a second call would wipe live children.
    fn subdivide(&mut self, node_idx: usize) {
        let node = &mut self.nodes[node_idx];
        debug_assert!(!node.is_internal);
        node.is_internal = true;
        node.octants = [None; 8];
    }
}

/// 3-bit child code for a position relative to an octant center.
/// Bit k is set when the coordinate on axis k exceeds the center's.
fn octant_code(position: &NVec3, center: &NVec3) -> usize {
    let mut code = 0;
    if position.x > center.x {
        code |= 1;
    }
    if position.y > center.y {
        code |= 2;
    }
    if position.z > center.z {
        code |= 4;
    }
    code
}
