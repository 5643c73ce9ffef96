//! Build fully-initialized scenarios from configuration.
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! consumed by the viewer and the benchmarks:
//! - graph state (`GraphState` with bodies at their spawn positions)
//! - the layout engine (`ForceDirectedLayout` with validated settings)
//!
//! The bundle is inserted into Bevy as a `Resource` and driven by the
//! per-frame layout system.

use bevy::prelude::Resource;

use crate::configuration::config::{ConfigError, GeneratorConfig, ScenarioConfig};
use crate::layout::engine::ForceDirectedLayout;
use crate::layout::generator;
use crate::layout::settings::LayoutSettings;
use crate::layout::states::{Body, GraphState, NVec3};

/// A fully-initialized scenario: the graph plus its layout engine.
#[derive(Resource)]
pub struct Scenario {
    pub graph: GraphState,
    pub layout: ForceDirectedLayout,
    pub render_labels: bool,
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        // Settings: fill unset fields from the engine defaults, then validate
        let defaults = LayoutSettings::default();
        let l = cfg.layout;
        let settings = LayoutSettings {
            spring_constant: l.spring_constant.unwrap_or(defaults.spring_constant),
            spring_length: l.spring_length.unwrap_or(defaults.spring_length),
            charge: l.charge.unwrap_or(defaults.charge),
            damping: l.damping.unwrap_or(defaults.damping),
            theta: l.theta.unwrap_or(defaults.theta),
            max_depth: l.max_depth.unwrap_or(defaults.max_depth),
            stable_energy_threshold: l
                .stable_energy_threshold
                .unwrap_or(defaults.stable_energy_threshold),
        };
        settings.validate()?;

        if cfg.graph.nodes.is_empty() && cfg.graph.generator.is_none() {
            return Err(ConfigError::EmptyGraph);
        }

        let seed = cfg.graph.seed.unwrap_or(42);
        let mut graph = GraphState::new();

        // Explicit nodes first, then the generator (either may be absent)
        for (i, nc) in cfg.graph.nodes.iter().enumerate() {
            let position = match nc.position {
                Some([x, y, z]) => NVec3::new(x, y, z),
                None => generator::scatter_position(i, seed),
            };
            let mut body = Body::with_mass(position, nc.mass.unwrap_or(1.0));
            body.size = nc.size.unwrap_or(1.0);
            graph.add_node(nc.id.clone(), body);
        }

        for ec in &cfg.graph.edges {
            let source = graph
                .node_index(&ec.source)
                .ok_or_else(|| ConfigError::UnknownNode(ec.source.clone()))?;
            let dest = graph
                .node_index(&ec.dest)
                .ok_or_else(|| ConfigError::UnknownNode(ec.dest.clone()))?;
            graph.add_edge(source, dest, ec.weight.unwrap_or(1.0));
        }

        match cfg.graph.generator {
            Some(GeneratorConfig::Loop { nodes }) => generator::create_loop(&mut graph, nodes, seed),
            Some(GeneratorConfig::Grid { extent }) => generator::create_grid(&mut graph, extent, seed),
            Some(GeneratorConfig::Random { nodes, edges }) => {
                generator::create_random(&mut graph, nodes, edges, seed)
            }
            None => {}
        }

        Ok(Self {
            graph,
            layout: ForceDirectedLayout::new(settings),
            render_labels: cfg.render_node_labels,
        })
    }
}
