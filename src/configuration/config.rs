//! Configuration types for loading graph scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`LayoutConfig`] – force-directed layout constants (all optional)
//! - [`GraphConfig`]  – an explicit node/edge list, a generator, or both
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! layout:
//!   spring_constant: 0.008
//!   spring_length: 30.0
//!   charge: -1200.0
//!   damping: 0.9
//!   theta: 1.2
//!   max_depth: 5
//!
//! graph:
//!   seed: 42
//!   generator:
//!     kind: random
//!     nodes: 200
//!     edges: 300
//!
//! render_node_labels: false
//! ```
//!
//! Explicit graphs list nodes by id and wire edges by those ids:
//!
//! ```yaml
//! graph:
//!   nodes:
//!     - id: hub
//!       mass: 2.0
//!     - id: leaf
//!       position: [40.0, 0.0, 0.0]
//!   edges:
//!     - source: hub
//!       dest: leaf
//!       weight: 1.5
//! ```
//!
//! Values are validated when the runtime scenario is built; bad physics
//! constants fail fast instead of producing a silently-wrong layout.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("damping must lie in (0, 1), got {0}")]
    Damping(f64),

    #[error("charge must be negative so nodes repel, got {0}")]
    Charge(f64),

    #[error("theta must be positive, got {0}")]
    Theta(f64),

    #[error("spring length must be positive, got {0}")]
    SpringLength(f64),

    #[error("spring constant must be non-negative, got {0}")]
    SpringConstant(f64),

    #[error("edge references unknown node id `{0}`")]
    UnknownNode(String),

    #[error("graph section defines neither nodes nor a generator")]
    EmptyGraph,
}

/// Layout constants. Unset fields fall back to the engine defaults.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct LayoutConfig {
    pub spring_constant: Option<f64>, // k in F = -kx
    pub spring_length: Option<f64>, // spring rest length
    pub charge: Option<f64>, // node charge, negative for repulsion
    pub damping: Option<f64>, // velocity retention per step
    pub theta: Option<f64>, // Barnes-Hut opening ratio
    pub max_depth: Option<usize>, // advisory octree depth
    pub stable_energy_threshold: Option<f64>,
}

/// Initial state for one explicitly-listed node.
#[derive(Deserialize, Debug, Clone)]
pub struct NodeConfig {
    pub id: String,
    pub mass: Option<f64>, // defaults to 1.0
    pub size: Option<f64>, // visual radius, defaults to 1.0
    pub position: Option<[f64; 3]>, // spawn position; scattered when unset
}

/// One explicitly-listed edge, wired by node id.
#[derive(Deserialize, Debug, Clone)]
pub struct EdgeConfig {
    pub source: String,
    pub dest: String,
    pub weight: Option<f64>, // defaults to 1.0
}

/// Procedural graph shapes.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GeneratorConfig {
    /// N nodes in a cycle.
    Loop { nodes: usize },
    /// extent × extent lattice with 4-neighbor edges.
    Grid { extent: usize },
    /// N nodes, E distinct random edges.
    Random { nodes: usize, edges: usize },
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GraphConfig {
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub edges: Vec<EdgeConfig>,
    pub generator: Option<GeneratorConfig>,
    pub seed: Option<u64>, // drives spawn scatter and the random generator
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    pub graph: GraphConfig,
    #[serde(default)]
    pub render_node_labels: bool,
}
