use fdgraph::configuration::config::ConfigError;
use fdgraph::layout::engine::{ForceDirectedLayout, NullSink, RenderSink};
use fdgraph::layout::forces::{apply_repulsive_forces_direct, apply_spring_forces};
use fdgraph::layout::generator;
use fdgraph::layout::octree::{Bounds, Octree};
use fdgraph::layout::settings::LayoutSettings;
use fdgraph::layout::states::{Body, Edge, GraphState, NVec3};
use fdgraph::{Scenario, ScenarioConfig};

/// Body of unit mass at the given coordinates, at rest
fn body_at(x: f64, y: f64, z: f64) -> Body {
    Body::at(NVec3::new(x, y, z))
}

/// Deterministic cloud of n distinct body positions
fn cloud(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            body_at(
                (t * 0.37).sin() * 40.0,
                (t * 0.13).cos() * 40.0,
                (t * 0.07).sin() * 40.0,
            )
        })
        .collect()
}

/// Build a tree over the bodies with tight measured bounds
fn build_tree(bodies: &mut [Body], max_depth: usize) -> Octree {
    let bounds = Bounds::from_bodies(bodies);
    let mut tree = Octree::new(NVec3::zeros(), max_depth);
    tree.build(bodies, &bounds);
    tree
}

fn parse_scenario(yaml: &str) -> ScenarioConfig {
    serde_yaml::from_str(yaml).expect("scenario yaml should parse")
}

// ==================================================================================
// Octree tests
// ==================================================================================

#[test]
fn tree_conserves_total_mass() {
    let mut bodies = cloud(32);
    let tree = build_tree(&mut bodies, 5);

    let root = &tree.nodes[tree.root];
    assert!(root.is_internal);
    assert!(
        (root.mass - 32.0).abs() < 1e-9,
        "root mass {} != body count",
        root.mass
    );
}

#[test]
fn center_of_mass_of_two_equal_bodies() {
    let mut bodies = vec![body_at(0.0, 0.0, 0.0), body_at(10.0, 0.0, 0.0)];
    let tree = build_tree(&mut bodies, 5);

    let com = tree.nodes[tree.root].com();
    assert!((com - NVec3::new(5.0, 0.0, 0.0)).norm() < 1e-12, "com {com:?}");
}

#[test]
fn center_of_mass_weights_by_mass() {
    let mut bodies = vec![
        Body::with_mass(NVec3::new(0.0, 0.0, 0.0), 1.0),
        Body::with_mass(NVec3::new(10.0, 0.0, 0.0), 3.0),
    ];
    let tree = build_tree(&mut bodies, 5);

    let root = &tree.nodes[tree.root];
    assert!((root.mass - 4.0).abs() < 1e-12);
    assert!((root.com() - NVec3::new(7.5, 0.0, 0.0)).norm() < 1e-12);
}

#[test]
fn single_body_tree_is_a_leaf() {
    let mut bodies = vec![body_at(1.0, 2.0, 3.0)];
    let tree = build_tree(&mut bodies, 5);

    let root = &tree.nodes[tree.root];
    assert!(!root.is_internal);
    assert_eq!(root.body, Some(0));

    let force = tree.repulsive_force(&bodies, 0, -1200.0, 1.2);
    assert_eq!(force.norm(), 0.0);
}

#[test]
fn rebuild_reproduces_aggregates() {
    let mut bodies = cloud(16);

    let first = build_tree(&mut bodies, 5);
    let second = build_tree(&mut bodies, 5);

    assert_eq!(first.nodes.len(), second.nodes.len());
    for (a, b) in first.nodes.iter().zip(&second.nodes) {
        assert_eq!(a.is_internal, b.is_internal);
        assert_eq!(a.mass, b.mass);
        assert_eq!(a.center_of_mass, b.center_of_mass);
    }
}

#[test]
fn coincident_bodies_terminate_and_keep_mass() {
    let mut bodies = vec![
        body_at(1.0, 1.0, 1.0),
        body_at(1.0, 1.0, 1.0),
        body_at(1.0, 1.0, 1.0),
    ];
    // Termination itself is the property under test here
    let tree = build_tree(&mut bodies, 5);

    assert!((tree.nodes[tree.root].mass - 3.0).abs() < 1e-12);
}

// ==================================================================================
// Repulsion tests
// ==================================================================================

#[test]
fn barnes_hut_matches_direct_sum_as_theta_vanishes() {
    let settings = LayoutSettings::default();

    let mut direct = cloud(8);
    apply_repulsive_forces_direct(&mut direct, &settings);

    let mut approximated = cloud(8);
    let tree = build_tree(&mut approximated, 5);

    for i in 0..approximated.len() {
        let f = tree.repulsive_force(&approximated, i, settings.charge, 1e-9);
        let diff = (f - direct[i].force).norm();
        assert!(diff < 1e-6, "body {i}: bh {f:?} vs direct {:?}", direct[i].force);
    }
}

#[test]
fn barnes_hut_stays_close_at_moderate_theta() {
    let settings = LayoutSettings::default();

    let mut direct = cloud(8);
    apply_repulsive_forces_direct(&mut direct, &settings);

    let mut approximated = cloud(8);
    let tree = build_tree(&mut approximated, 5);

    for i in 0..approximated.len() {
        let f = tree.repulsive_force(&approximated, i, settings.charge, 0.5);
        let reference = direct[i].force.norm().max(1e-12);
        let relative = (f - direct[i].force).norm() / reference;
        assert!(relative < 0.25, "body {i}: relative error {relative}");
    }
}

#[test]
fn two_body_repulsion_force_magnitude() {
    let mut bodies = vec![body_at(0.0, 0.0, 0.0), body_at(1.0, 0.0, 0.0)];
    let tree = build_tree(&mut bodies, 5);

    // |F| = |charge| * m_i * m_j / r^2 with r = 1
    let f0 = tree.repulsive_force(&bodies, 0, -120.0, 1.2);
    assert!((f0.norm() - 120.0).abs() < 1e-9, "|f| = {}", f0.norm());
    assert!(f0.x < 0.0, "force must push body 0 away from body 1");

    let f1 = tree.repulsive_force(&bodies, 1, -120.0, 1.2);
    assert!((f0 + f1).norm() < 1e-9, "pair forces must be equal and opposite");
}

#[test]
fn two_body_step_moves_bodies_apart_symmetrically() {
    let mut graph = GraphState::new();
    graph.add_node("a", body_at(0.0, 0.0, 0.0));
    graph.add_node("b", body_at(1.0, 0.0, 0.0));

    let settings = LayoutSettings {
        charge: -120.0,
        ..Default::default()
    };
    let mut layout = ForceDirectedLayout::new(settings);
    layout.step(&mut graph, &mut NullSink);

    let v0 = graph.bodies[0].velocity;
    let v1 = graph.bodies[1].velocity;

    // a = F / m = -120, then damped: v = (0 + a) * 0.9
    assert!((v0.x + 108.0).abs() < 1e-9, "v0 = {v0:?}");
    assert!((v1.x - 108.0).abs() < 1e-9, "v1 = {v1:?}");
    assert!((v0 + v1).norm() < 1e-9);

    // the accumulator must not leak into the next frame
    assert_eq!(graph.bodies[0].force.norm(), 0.0);
    assert_eq!(graph.bodies[1].force.norm(), 0.0);
}

// ==================================================================================
// Spring tests
// ==================================================================================

#[test]
fn stretched_spring_pulls_endpoints_together() {
    let settings = LayoutSettings::default();
    let mut bodies = vec![body_at(0.0, 0.0, 0.0), body_at(40.0, 0.0, 0.0)];
    let edges = vec![Edge {
        source: 0,
        dest: 1,
        weight: 1.0,
    }];

    apply_spring_forces(&mut bodies, &edges, &settings);

    // extension 10 beyond the rest length of 30, k = 0.008
    assert!((bodies[0].force.x - 0.08).abs() < 1e-12, "f0 = {:?}", bodies[0].force);
    assert!((bodies[1].force.x + 0.08).abs() < 1e-12, "f1 = {:?}", bodies[1].force);
}

#[test]
fn zero_length_spring_contributes_nothing() {
    let settings = LayoutSettings::default();
    let mut bodies = vec![body_at(3.0, 3.0, 3.0), body_at(3.0, 3.0, 3.0)];
    let edges = vec![Edge {
        source: 0,
        dest: 1,
        weight: 1.0,
    }];

    apply_spring_forces(&mut bodies, &edges, &settings);

    assert_eq!(bodies[0].force.norm(), 0.0);
    assert_eq!(bodies[1].force.norm(), 0.0);
}

#[test]
fn damped_spring_energy_decays_to_rest() {
    let mut graph = GraphState::new();
    graph.add_node("a", body_at(-20.0, 0.0, 0.0));
    graph.add_node("b", body_at(20.0, 0.0, 0.0));
    graph.add_edge(0, 1, 1.0);

    // repulsion off: the system is a pure damped spring oscillator
    let settings = LayoutSettings {
        charge: 0.0,
        ..Default::default()
    };
    let mut layout = ForceDirectedLayout::new(settings);

    let mut energies = Vec::new();
    for _ in 0..600 {
        layout.step(&mut graph, &mut NullSink);
        energies.push(layout.total_kinetic_energy);
    }

    let early_peak = energies[..100].iter().cloned().fold(0.0, f64::max);
    let late_peak = energies[500..].iter().cloned().fold(0.0, f64::max);
    assert!(late_peak < early_peak, "energy must decay: {early_peak} -> {late_peak}");
    assert!(*energies.last().unwrap() < 1e-6);
    assert!(layout.is_stable());
}

// ==================================================================================
// Engine tests
// ==================================================================================

struct RecordingSink {
    positions: Vec<NVec3>,
}

impl RenderSink for RecordingSink {
    fn set_world_position(&mut self, index: usize, position: &NVec3) {
        self.positions[index] = *position;
    }
}

#[test]
fn step_writes_positions_through_the_sink() {
    let mut graph = GraphState::new();
    graph.add_node("a", body_at(0.0, 0.0, 0.0));
    graph.add_node("b", body_at(10.0, 0.0, 0.0));

    let mut layout = ForceDirectedLayout::new(LayoutSettings::default());
    let mut sink = RecordingSink {
        positions: vec![NVec3::zeros(); 2],
    };
    layout.step(&mut graph, &mut sink);

    for (body, recorded) in graph.bodies.iter().zip(&sink.positions) {
        assert_eq!(body.position, *recorded);
    }
}

#[test]
fn paused_engine_leaves_the_graph_untouched() {
    let mut graph = GraphState::new();
    graph.add_node("a", body_at(0.0, 0.0, 0.0));
    graph.add_node("b", body_at(1.0, 0.0, 0.0));

    let mut layout = ForceDirectedLayout::new(LayoutSettings::default());
    layout.paused = true;

    let before: Vec<NVec3> = graph.bodies.iter().map(|b| b.position).collect();
    layout.step(&mut graph, &mut NullSink);

    for (body, position) in graph.bodies.iter().zip(&before) {
        assert_eq!(body.position, *position);
    }
}

// ==================================================================================
// Configuration and generator tests
// ==================================================================================

#[test]
fn bad_physics_constants_fail_fast() {
    let bad_damping = parse_scenario(
        "layout:\n  damping: 1.5\ngraph:\n  generator:\n    kind: loop\n    nodes: 4\n",
    );
    assert!(matches!(
        Scenario::build(bad_damping),
        Err(ConfigError::Damping(_))
    ));

    let bad_charge = parse_scenario(
        "layout:\n  charge: 50.0\ngraph:\n  generator:\n    kind: loop\n    nodes: 4\n",
    );
    assert!(matches!(
        Scenario::build(bad_charge),
        Err(ConfigError::Charge(_))
    ));

    let bad_theta = parse_scenario(
        "layout:\n  theta: 0.0\ngraph:\n  generator:\n    kind: loop\n    nodes: 4\n",
    );
    assert!(matches!(
        Scenario::build(bad_theta),
        Err(ConfigError::Theta(_))
    ));
}

#[test]
fn explicit_graph_wires_edges_by_id() {
    let cfg = parse_scenario(
        "graph:\n  nodes:\n    - id: hub\n      mass: 2.0\n    - id: leaf\n      position: [40.0, 0.0, 0.0]\n  edges:\n    - source: hub\n      dest: leaf\n      weight: 1.5\n",
    );
    let scenario = Scenario::build(cfg).expect("valid scenario");

    let graph = &scenario.graph;
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);

    let hub = graph.node_index("hub").unwrap();
    let leaf = graph.node_index("leaf").unwrap();
    assert_eq!(graph.edges[0].source, hub);
    assert_eq!(graph.edges[0].dest, leaf);
    assert!((graph.edges[0].weight - 1.5).abs() < 1e-12);
    assert!((graph.bodies[hub].mass - 2.0).abs() < 1e-12);
    assert_eq!(graph.bodies[leaf].position, NVec3::new(40.0, 0.0, 0.0));
}

#[test]
fn edge_to_unknown_node_is_rejected() {
    let cfg = parse_scenario(
        "graph:\n  nodes:\n    - id: a\n  edges:\n    - source: a\n      dest: ghost\n",
    );
    assert!(matches!(
        Scenario::build(cfg),
        Err(ConfigError::UnknownNode(id)) if id == "ghost"
    ));
}

#[test]
fn empty_graph_is_rejected() {
    let cfg = parse_scenario("graph: {}\n");
    assert!(matches!(Scenario::build(cfg), Err(ConfigError::EmptyGraph)));
}

#[test]
fn random_generator_is_deterministic() {
    let mut first = GraphState::new();
    generator::create_random(&mut first, 50, 80, 7);

    let mut second = GraphState::new();
    generator::create_random(&mut second, 50, 80, 7);

    assert_eq!(first.edge_count(), second.edge_count());
    for (a, b) in first.edges.iter().zip(&second.edges) {
        assert_eq!((a.source, a.dest), (b.source, b.dest));
    }
    for (a, b) in first.bodies.iter().zip(&second.bodies) {
        assert_eq!(a.position, b.position);
    }
}

#[test]
fn generators_produce_expected_shapes() {
    let mut ring = GraphState::new();
    generator::create_loop(&mut ring, 10, 1);
    assert_eq!(ring.node_count(), 10);
    assert_eq!(ring.edge_count(), 10);

    let mut lattice = GraphState::new();
    generator::create_grid(&mut lattice, 4, 1);
    assert_eq!(lattice.node_count(), 16);
    assert_eq!(lattice.edge_count(), 24);
}
