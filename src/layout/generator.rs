//! Deterministic graph generators for scenarios and benchmarks.
//!
//! All generators seed positions through [`scatter_position`], so two runs of
//! the same scenario produce the same initial layout without pulling in an
//! RNG dependency. Edges are wired through the body slots returned by
//! `add_node`, so generated nodes compose with explicitly-listed ones.

use crate::layout::states::{Body, GraphState, NVec3};

/// Deterministic pseudo-random spawn position inside a ±50 cube.
pub fn scatter_position(index: usize, seed: u64) -> NVec3 {
    let t = index as f64 + (seed % 1024) as f64 * 0.618;
    NVec3::new(
        (t * 0.37).sin() * 50.0,
        (t * 0.13).cos() * 50.0,
        (t * 0.07).sin() * 50.0,
    )
}

/// N nodes connected in a cycle.
pub fn create_loop(graph: &mut GraphState, num_nodes: usize, seed: u64) {
    let slots = spawn_nodes(graph, num_nodes, seed);
    for pair in slots.windows(2) {
        graph.add_edge(pair[0], pair[1], 1.0);
    }
    if num_nodes > 2 {
        graph.add_edge(slots[num_nodes - 1], slots[0], 1.0);
    }
}

/// extent × extent lattice with 4-neighbor edges.
pub fn create_grid(graph: &mut GraphState, extent: usize, seed: u64) {
    let slots = spawn_nodes(graph, extent * extent, seed);
    for row in 0..extent {
        for col in 0..extent {
            let here = row * extent + col;
            if col + 1 < extent {
                graph.add_edge(slots[here], slots[here + 1], 1.0);
            }
            if row + 1 < extent {
                graph.add_edge(slots[here], slots[here + extent], 1.0);
            }
        }
    }
}

/// N nodes and up to E distinct random edges (no self-loops, no duplicates).
pub fn create_random(graph: &mut GraphState, num_nodes: usize, num_edges: usize, seed: u64) {
    let slots = spawn_nodes(graph, num_nodes, seed);
    if num_nodes < 2 {
        return;
    }

    let mut taken = std::collections::HashSet::new();
    let mut state = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15).max(1);
    let mut attempts = num_edges * 16;

    while taken.len() < num_edges && attempts > 0 {
        attempts -= 1;
        state = xorshift(state);
        let a = (state % num_nodes as u64) as usize;
        state = xorshift(state);
        let b = (state % num_nodes as u64) as usize;

        if a == b {
            continue;
        }
        let key = (a.min(b), a.max(b));
        if taken.insert(key) {
            graph.add_edge(slots[key.0], slots[key.1], 1.0);
        }
    }
}

fn spawn_nodes(graph: &mut GraphState, count: usize, seed: u64) -> Vec<usize> {
    (0..count)
        .map(|i| graph.add_node(i.to_string(), Body::at(scatter_position(i, seed))))
        .collect()
}

fn xorshift(mut state: u64) -> u64 {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    state
}
