//! Per-frame driver for the force-directed layout.
//!
//! `ForceDirectedLayout` owns everything the simulation mutates across
//! frames: settings, the Barnes-Hut tree, the tracked bounds and the running
//! kinetic energy. The caller owns the graph and invokes [`step`] once per
//! render tick; positions flow back out through a [`RenderSink`].
//!
//! [`step`]: ForceDirectedLayout::step

use crate::layout::forces::{apply_repulsive_forces, apply_spring_forces};
use crate::layout::octree::{Bounds, Octree};
use crate::layout::settings::LayoutSettings;
use crate::layout::states::{GraphState, NVec3};

/// Write-through boundary to the renderer.
///
/// The engine calls `set_world_position` for every body after integrating
/// it, so the render layer can refresh its GPU-resident vertex data without
/// re-walking the graph. Label placement is opt-in; the sink owns the
/// world-to-screen projection.
pub trait RenderSink {
    fn set_world_position(&mut self, index: usize, position: &NVec3);

    fn wants_labels(&self) -> bool {
        false
    }

    fn place_label(&mut self, _index: usize, _position: &NVec3) {}
}

/// Sink for headless runs (tests, benchmarks).
pub struct NullSink;

impl RenderSink for NullSink {
    fn set_world_position(&mut self, _index: usize, _position: &NVec3) {}
}

pub struct ForceDirectedLayout {
    pub settings: LayoutSettings,
    pub paused: bool,
    pub total_kinetic_energy: f64,
    octree: Octree,
    bounds: Bounds,
}

impl ForceDirectedLayout {
    pub fn new(settings: LayoutSettings) -> Self {
        let octree = Octree::new(NVec3::zeros(), settings.max_depth);
        Self {
            settings,
            paused: false,
            // starts far above any stabilization threshold so `is_stable`
            // cannot report true before the first step
            total_kinetic_energy: f64::INFINITY,
            octree,
            bounds: Bounds::default(),
        }
    }

    /// Advance the simulation by exactly one time step. No-op while paused.
    ///
    /// 1. Spring pass over the edges (direct, `O(E)`).
    /// 2. Repulsion pass: rebuild the octree from the bounds measured last
    ///    frame, then accumulate the Barnes-Hut force per body.
    /// 3. Integration: force to acceleration to damped velocity to position,
    ///    re-measuring bounds and kinetic energy along the way.
    /// 4. Write-through notification per body via the sink.
    pub fn step(&mut self, graph: &mut GraphState, sink: &mut dyn RenderSink) {
        if self.paused {
            return;
        }

        apply_spring_forces(&mut graph.bodies, &graph.edges, &self.settings);
        apply_repulsive_forces(&mut graph.bodies, &mut self.octree, &self.bounds, &self.settings);
        self.integrate(graph, sink);
    }

    fn integrate(&mut self, graph: &mut GraphState, sink: &mut dyn RenderSink) {
        self.total_kinetic_energy = 0.0;
        self.bounds.reset();

        let damping = self.settings.damping;
        let wants_labels = sink.wants_labels();

        for (i, body) in graph.bodies.iter_mut().enumerate() {
            body.acceleration = body.force / body.mass;
            body.force = NVec3::zeros();

            body.velocity = (body.velocity + body.acceleration) * damping;
            body.position += body.velocity;

            self.bounds.include(&body.position);

            let speed = body.velocity.norm();
            self.total_kinetic_energy += body.mass * speed * speed;

            sink.set_world_position(i, &body.position);
            if wants_labels {
                sink.place_label(i, &body.position);
            }
        }
    }

    /// Whether the system's kinetic energy has fallen under the configured
    /// stabilization threshold. Informational; stepping never stops on its
    /// own.
    pub fn is_stable(&self) -> bool {
        self.total_kinetic_energy < self.settings.stable_energy_threshold
    }

    /// Deepest octant reached in the most recent tree build.
    pub fn built_depth(&self) -> usize {
        self.octree.built_depth()
    }
}
