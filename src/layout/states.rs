//! Core graph state for the force-directed layout.
//!
//! Defines the body/edge structs consumed by the layout engine:
//! - `Body`  – a point mass (one graph node) carrying its motion state
//! - `Edge`  – a spring between two bodies, referenced by index
//! - `GraphState` – the node and edge arrays, owned by the caller
//!
//! The layout engine mutates body positions in place once per frame; the
//! renderer only reads them after the pass completes.

use std::collections::HashMap;

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone)]
pub struct Body {
    pub position: NVec3, // mutated every frame by integration
    pub velocity: NVec3,
    pub acceleration: NVec3,
    pub force: NVec3, // transient accumulator, zeroed after each integration step
    pub mass: f64, // constant, used in F = ma and center-of-mass weighting
    pub size: f64, // visual radius (rendering only)
}

impl Body {
    /// Body of unit mass at the given position, at rest.
    pub fn at(position: NVec3) -> Self {
        Self {
            position,
            velocity: NVec3::zeros(),
            acceleration: NVec3::zeros(),
            force: NVec3::zeros(),
            mass: 1.0,
            size: 1.0,
        }
    }

    pub fn with_mass(position: NVec3, mass: f64) -> Self {
        Self {
            mass,
            ..Self::at(position)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub source: usize, // index into GraphState::bodies
    pub dest: usize,
    pub weight: f64, // scales spring stiffness for this edge
}

/// The node and edge arrays driving the simulation.
///
/// Bodies are addressed by index everywhere (edges, octree leaves, render
/// hooks); `labels` runs parallel to `bodies` and only matters for display.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    pub bodies: Vec<Body>,
    pub edges: Vec<Edge>,
    pub labels: Vec<String>,
    index: HashMap<String, usize>, // node id -> body slot
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its body slot. Ids are unique: re-adding an
    /// existing id returns the slot already assigned to it.
    pub fn add_node(&mut self, id: impl Into<String>, body: Body) -> usize {
        let id = id.into();
        if let Some(&slot) = self.index.get(&id) {
            return slot;
        }
        let slot = self.bodies.len();
        self.bodies.push(body);
        self.labels.push(id.clone());
        self.index.insert(id, slot);
        slot
    }

    pub fn add_edge(&mut self, source: usize, dest: usize, weight: f64) {
        self.edges.push(Edge {
            source,
            dest,
            weight,
        });
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
