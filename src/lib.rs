pub mod layout;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use layout::states::{Body, Edge, GraphState, NVec3};
pub use layout::settings::LayoutSettings;
pub use layout::octree::{Bounds, Octree, OctreeNode};
pub use layout::engine::{ForceDirectedLayout, NullSink, RenderSink};
pub use layout::scenario::Scenario;

pub use configuration::config::{ConfigError, GraphConfig, LayoutConfig, ScenarioConfig};

pub use visualization::viewer::run_viewer;

pub use benchmark::benchmark::{bench_repulsion, bench_step_curve};
