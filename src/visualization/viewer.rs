//! Interactive 3D viewer for the graph layout.
//!
//! Spawns one sphere per node and a gizmo line per edge, steps the layout
//! engine once per frame, and pulls the resulting positions into the Bevy
//! transforms through the engine's write-through sink. Space toggles the
//! simulation; node labels are projected to screen space when enabled.

use bevy::prelude::*;
use bevy::ecs::system::Local;
use bevy::math::primitives::{Cuboid, Sphere};

use crate::layout::engine::RenderSink;
use crate::layout::scenario::Scenario;
use crate::layout::states::NVec3;

/// Component tagging each sphere with its body index into Scenario::graph
#[derive(Component)]
struct BodyIndex(pub usize);

/// Component tagging each label with its body index
#[derive(Component)]
struct NodeLabel(pub usize);

/// World-space → render-space scaling factor for positions and radii
const SCALE: f32 = 1.0;

/// Distance of the camera from the origin along +Z
const CAMERA_DISTANCE: f32 = 900.0;

/// Visual radius of a node sphere per unit of body size
const NODE_RADIUS: f32 = 3.0;

/// Buffered write-through target for the layout engine.
///
/// The engine pushes world positions (and label positions, when enabled)
/// in here during its pass; the sync and label systems consume them after
/// the pass completes.
#[derive(Resource, Default)]
struct RenderPositions {
    world: Vec<Vec3>,
    label_world: Vec<Vec3>,
    labels_enabled: bool,
}

impl RenderSink for RenderPositions {
    fn set_world_position(&mut self, index: usize, position: &NVec3) {
        self.world[index] = to_render(position);
    }

    fn wants_labels(&self) -> bool {
        self.labels_enabled
    }

    fn place_label(&mut self, index: usize, position: &NVec3) {
        self.label_world[index] = to_render(position);
    }
}

fn to_render(p: &NVec3) -> Vec3 {
    Vec3::new(p.x as f32, p.y as f32, p.z as f32) * SCALE
}

pub fn run_viewer(scenario: Scenario) {
    // Bevy's LogPlugin is not installed yet at this point
    println!(
        "run_viewer: starting with {} nodes, {} edges",
        scenario.graph.node_count(),
        scenario.graph.edge_count()
    );

    App::new()
        .insert_resource(scenario)
        .insert_resource(RenderPositions::default())
        .add_plugins(DefaultPlugins)
        .add_systems(Startup, setup_scene)
        .add_systems(
            Update,
            (toggle_pause, layout_step, sync_transforms, draw_edges, place_labels).chain(),
        )
        .run();
}

/// Startup system: camera, light, axes, one sphere per node, one label per
/// node when labels are enabled.
fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut positions: ResMut<RenderPositions>,
    scenario: Res<Scenario>,
) {
    commands.spawn(Camera3dBundle {
        camera: Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.0, 0.0, 0.0)),
            ..Default::default()
        },
        transform: Transform::from_xyz(150.0, 100.0, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
        ..Default::default()
    });

    commands.spawn(PointLightBundle {
        point_light: PointLight {
            intensity: 1500.0,
            range: 10000.0,
            ..Default::default()
        },
        transform: Transform::from_xyz(100.0, 100.0, CAMERA_DISTANCE),
        ..Default::default()
    });

    spawn_axes(&mut commands, &mut meshes, &mut materials);

    let n = scenario.graph.node_count();
    positions.labels_enabled = scenario.render_labels;
    positions.world = Vec::with_capacity(n);
    positions.label_world = vec![Vec3::ZERO; n];

    for (i, body) in scenario.graph.bodies.iter().enumerate() {
        let spawn = to_render(&body.position);
        positions.world.push(spawn);

        commands.spawn((
            PbrBundle {
                mesh: meshes.add(Sphere::new((body.size as f32).max(0.2) * NODE_RADIUS).mesh()),
                material: materials.add(StandardMaterial {
                    base_color: Color::srgb(1.0, 1.0, 1.0),
                    unlit: true,
                    ..Default::default()
                }),
                transform: Transform::from_translation(spawn),
                ..Default::default()
            },
            BodyIndex(i),
        ));

        if scenario.render_labels {
            commands.spawn((
                TextBundle::from_section(
                    scenario.graph.labels[i].clone(),
                    TextStyle {
                        font_size: 14.0,
                        color: Color::srgb(0.8, 0.8, 0.8),
                        ..Default::default()
                    },
                )
                .with_style(Style {
                    position_type: PositionType::Absolute,
                    ..Default::default()
                }),
                NodeLabel(i),
            ));
        }
    }
}

/// Per-frame layout step, writing positions through the buffered sink
fn layout_step(mut scenario: ResMut<Scenario>, mut positions: ResMut<RenderPositions>) {
    let Scenario { graph, layout, .. } = &mut *scenario;
    layout.step(graph, &mut *positions);
}

fn toggle_pause(keys: Res<ButtonInput<KeyCode>>, mut scenario: ResMut<Scenario>) {
    if keys.just_pressed(KeyCode::Space) {
        scenario.layout.paused = !scenario.layout.paused;
        info!(paused = scenario.layout.paused, "toggled simulation");
    }
}

// ========================================================================================
// Node color follows speed so settling is visible: fast nodes glow red,
// slow ones fade to blue. The per-frame max speed is smoothed with an EMA
// so the gradient doesn't pulse.
// ========================================================================================

#[derive(Default)]
struct VelocityColorState {
    smoothed_max: f32,
}

fn speed_to_color(speed: f32, max_speed: f32) -> Color {
    if max_speed <= 0.0 {
        return Color::srgb(1.0, 1.0, 1.0);
    }

    let t = (speed / max_speed).clamp(0.0, 1.0);
    Color::srgb(t, 0.2, 1.0 - t)
}

fn sync_transforms(
    scenario: Res<Scenario>,
    positions: Res<RenderPositions>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut query: Query<(&BodyIndex, &mut Transform, &Handle<StandardMaterial>)>,
    mut vel_state: Local<VelocityColorState>,
) {
    let bodies = &scenario.graph.bodies;

    let mut max_speed_frame: f32 = 0.0;
    for b in bodies {
        let s = b.velocity.norm() as f32;
        if s > max_speed_frame {
            max_speed_frame = s;
        }
    }

    if vel_state.smoothed_max == 0.0 {
        vel_state.smoothed_max = max_speed_frame.max(1e-6);
    }

    // Cap outlier influence before folding this frame into the EMA
    let capped_max = if max_speed_frame > 0.0 {
        max_speed_frame.min(vel_state.smoothed_max * 3.0)
    } else {
        vel_state.smoothed_max
    };

    let alpha = 0.01;
    vel_state.smoothed_max = (1.0 - alpha) * vel_state.smoothed_max + alpha * capped_max;
    let v_norm = vel_state.smoothed_max.max(1e-6);

    for (BodyIndex(i), mut transform, mat_handle) in &mut query {
        if let Some(world) = positions.world.get(*i) {
            transform.translation = *world;
        }
        if let Some(b) = bodies.get(*i) {
            let speed = b.velocity.norm() as f32;
            if let Some(mat) = materials.get_mut(mat_handle) {
                mat.base_color = speed_to_color(speed, v_norm);
            }
        }
    }
}

/// Gizmo line per edge, drawn from the buffered world positions
fn draw_edges(scenario: Res<Scenario>, positions: Res<RenderPositions>, mut gizmos: Gizmos) {
    for edge in &scenario.graph.edges {
        let (Some(a), Some(b)) = (
            positions.world.get(edge.source),
            positions.world.get(edge.dest),
        ) else {
            continue;
        };
        gizmos.line(*a, *b, Color::srgba(0.4, 0.4, 0.5, 0.8));
    }
}

/// Project label anchor positions to the viewport; labels behind the camera
/// are hidden.
fn place_labels(
    positions: Res<RenderPositions>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    mut labels: Query<(&NodeLabel, &mut Style, &mut Visibility)>,
) {
    if labels.is_empty() {
        return;
    }
    let Ok((camera, cam_transform)) = camera_q.get_single() else {
        return;
    };

    for (NodeLabel(i), mut style, mut visibility) in &mut labels {
        let Some(world) = positions.label_world.get(*i) else {
            continue;
        };
        match camera.world_to_viewport(cam_transform, *world) {
            Some(screen) => {
                style.left = Val::Px(screen.x);
                style.top = Val::Px(screen.y);
                *visibility = Visibility::Visible;
            }
            None => {
                *visibility = Visibility::Hidden;
            }
        }
    }
}

// =========================================================================================
// Draw 3D axes for visual reference
// =========================================================================================

fn spawn_axes(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let axis_len = 500.0 * SCALE;
    let axis_thickness = 0.45 * SCALE;

    let mut axis = |dims: Vec3, color: Color| {
        commands.spawn(PbrBundle {
            mesh: meshes.add(Cuboid::new(dims.x, dims.y, dims.z).mesh()),
            material: materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..Default::default()
            }),
            transform: Transform::from_xyz(0.0, 0.0, 0.0),
            ..Default::default()
        });
    };

    axis(
        Vec3::new(axis_len, axis_thickness, axis_thickness),
        Color::srgb(1.0, 0.0, 0.0),
    );
    axis(
        Vec3::new(axis_thickness, axis_len, axis_thickness),
        Color::srgb(0.0, 1.0, 0.0),
    );
    axis(
        Vec3::new(axis_thickness, axis_thickness, axis_len),
        Color::srgb(0.0, 0.0, 1.0),
    );
}
