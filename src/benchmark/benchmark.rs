use std::time::Instant;

use crate::layout::engine::{ForceDirectedLayout, NullSink};
use crate::layout::forces::{apply_repulsive_forces, apply_repulsive_forces_direct};
use crate::layout::generator;
use crate::layout::octree::{Bounds, Octree};
use crate::layout::settings::LayoutSettings;
use crate::layout::states::{GraphState, NVec3};

/// Helper to build a random graph of `n` nodes with loop edges
fn make_graph(n: usize) -> GraphState {
    let mut graph = GraphState::new();
    generator::create_loop(&mut graph, n, 42);
    graph
}

fn clear_forces(graph: &mut GraphState) {
    for body in &mut graph.bodies {
        body.force = NVec3::zeros();
    }
}

/// Compare the direct O(N²) repulsion pass against the Barnes-Hut pass for a
/// range of graph sizes.
pub fn bench_repulsion() {
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let settings = LayoutSettings::default();

    for n in ns {
        let mut graph = make_graph(n);
        let bounds = Bounds::from_bodies(&graph.bodies);
        let mut tree = Octree::new(NVec3::zeros(), settings.max_depth);

        // Warm up
        apply_repulsive_forces_direct(&mut graph.bodies, &settings);
        clear_forces(&mut graph);
        apply_repulsive_forces(&mut graph.bodies, &mut tree, &bounds, &settings);
        clear_forces(&mut graph);

        let t0 = Instant::now();
        apply_repulsive_forces_direct(&mut graph.bodies, &settings);
        let dt_direct = t0.elapsed().as_secs_f64();
        clear_forces(&mut graph);

        let t1 = Instant::now();
        apply_repulsive_forces(&mut graph.bodies, &mut tree, &bounds, &settings);
        let dt_bh = t1.elapsed().as_secs_f64();
        clear_forces(&mut graph);

        println!("N = {n:5}, direct = {dt_direct:8.6} s, BH = {dt_bh:8.6} s");
    }
}

/// Benchmark the full layout step for a range of n.
/// Paste output directly into a spreadsheet to graph.
pub fn bench_step_curve() {
    println!("N,step_ms");

    for n in (200..=12800).step_by(200) {
        // Small n: average over a few steps to smooth noise
        // Large n: only 1 step to avoid minutes of runtime
        let steps = if n <= 2000 { 5 } else { 1 };

        let mut graph = make_graph(n);
        let mut layout = ForceDirectedLayout::new(LayoutSettings::default());
        let mut sink = NullSink;

        // Warm-up step also replaces the default wide bounds with measured ones
        layout.step(&mut graph, &mut sink);

        let t0 = Instant::now();
        for _ in 0..steps {
            layout.step(&mut graph, &mut sink);
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{n},{ms:.6}");
    }
}
