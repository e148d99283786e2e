//! Startup load path and resource ownership.
//!
//! Decode, normalize and expand run synchronously before the first frame;
//! a failed load is fatal and exits the app. All GPU-side handles are owned
//! by [`SplatResources`] and released in reverse creation order on exit.

use bevy::{
    prelude::*,
    render::view::{NoFrustumCulling, RenderLayers},
    window::PrimaryWindow,
};
use surfel_format::{SplatGeometry, decode_file, expand_points, expand_quads, normalize_in_place};

use crate::engine::camera::OrbitCamera;
use crate::engine::config::{SplatConfig, SplatTechnique};
use crate::engine::splat_material::SplatMaterial;
use crate::engine::splat_mesh::build_splat_mesh;
use crate::engine::two_pass::{
    COLOR_PASS_ORDER, ColorPassSplat, ENVELOPE_LAYER, MainPassCamera, create_dummy_envelope,
    create_envelope_target, spawn_envelope_camera,
};

pub const RSF_FILE_NAME: &str = "painted_santa_kd.rsf";

/// Single owner of every handle the pipeline creates. Nothing else holds a
/// strong handle to these assets, so release order is fully determined here.
#[derive(Resource, Default)]
pub struct SplatResources {
    pub mesh: Option<Handle<Mesh>>,
    pub dummy_envelope: Option<Handle<Image>>,
    pub envelope_target: Option<Handle<Image>>,
    pub depth_material: Option<Handle<SplatMaterial>>,
    pub color_material: Option<Handle<SplatMaterial>>,
    pub entities: Vec<Entity>,
}

fn rsf_path() -> String {
    format!("{}/assets/{}", env!("CARGO_MANIFEST_DIR"), RSF_FILE_NAME)
}

pub fn setup_splat_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<SplatMaterial>>,
    mut images: ResMut<Assets<Image>>,
    config: Res<SplatConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut exit: EventWriter<AppExit>,
) {
    let mut resources = SplatResources::default();

    let path = rsf_path();
    let mut dataset = match decode_file(&path) {
        Ok(dataset) => dataset,
        Err(err) => {
            error!("failed to load {path}: {err}");
            exit.write(AppExit::error());
            return;
        }
    };
    info!("loaded {} surfels from {path}", dataset.len());

    let outcome = normalize_in_place(&mut dataset);
    if outcome.has_degenerate_axis() && !dataset.is_empty() {
        warn!(
            "degenerate bounds on axes {:?}, collapsed to cube centre",
            outcome.degenerate_axes
        );
    }

    let geometry = match config.technique {
        SplatTechnique::Points => expand_points(&dataset),
        SplatTechnique::QuadSplat { .. } => expand_quads(&dataset),
    };
    info!(
        "expanded to {} vertices / {} indices",
        geometry.vertices.len(),
        geometry.indices.len()
    );

    // The main camera always exists, even for an empty dataset: both passes
    // then simply draw zero primitives.
    let main_camera = commands
        .spawn((
            Camera3d::default(),
            Camera {
                order: COLOR_PASS_ORDER,
                ..Default::default()
            },
            Msaa::Off,
            Transform::default(),
            MainPassCamera,
        ))
        .id();
    resources.entities.push(main_camera);
    commands.insert_resource(OrbitCamera::framing_cube());

    if geometry.is_empty() {
        info!("empty dataset, nothing to draw");
        commands.insert_resource(resources);
        return;
    }

    spawn_splat_passes(
        &mut commands,
        &mut meshes,
        &mut materials,
        &mut images,
        &config,
        &windows,
        geometry,
        &mut resources,
    );
    commands.insert_resource(resources);
}

fn spawn_splat_passes(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<SplatMaterial>,
    images: &mut Assets<Image>,
    config: &SplatConfig,
    windows: &Query<&Window, With<PrimaryWindow>>,
    geometry: SplatGeometry,
    resources: &mut SplatResources,
) {
    let mesh = meshes.add(build_splat_mesh(&geometry));
    resources.mesh = Some(mesh.clone());

    let dummy = create_dummy_envelope(images);
    resources.dummy_envelope = Some(dummy.clone());

    let two_pass = config.technique.uses_depth_prepass();

    if two_pass {
        // The envelope target matches the window so the colour pass can
        // look up its own pixel position directly.
        let (width, height) = windows
            .single()
            .map(|w| (w.physical_width().max(1), w.physical_height().max(1)))
            .unwrap_or((1280, 720));
        let envelope = create_envelope_target(images, width, height);
        resources.envelope_target = Some(envelope.clone());

        let envelope_camera = spawn_envelope_camera(commands, envelope.clone());
        resources.entities.push(envelope_camera);

        let depth_material = materials.add(SplatMaterial::depth_variant(config, dummy.clone()));
        resources.depth_material = Some(depth_material.clone());

        let depth_entity = commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(depth_material),
                RenderLayers::layer(ENVELOPE_LAYER),
                Transform::default(),
                NoFrustumCulling,
            ))
            .id();
        resources.entities.push(depth_entity);

        let color_material = materials.add(SplatMaterial::color_variant(config, envelope));
        resources.color_material = Some(color_material.clone());

        // Hidden until the depth-ready signal fires.
        let color_entity = commands
            .spawn((
                Mesh3d(mesh),
                MeshMaterial3d(color_material),
                Transform::default(),
                Visibility::Hidden,
                NoFrustumCulling,
                ColorPassSplat,
            ))
            .id();
        resources.entities.push(color_entity);
    } else {
        // Single pass: the colour variant with a zero-coverage envelope
        // accepts every covered fragment.
        let color_material = materials.add(SplatMaterial::color_variant(config, dummy.clone()));
        resources.color_material = Some(color_material.clone());

        let color_entity = commands
            .spawn((
                Mesh3d(mesh),
                MeshMaterial3d(color_material),
                Transform::default(),
                NoFrustumCulling,
            ))
            .id();
        resources.entities.push(color_entity);
    }
}

/// Release everything in reverse creation order: entities first, then the
/// material instances, the offscreen targets, and finally the geometry.
pub fn cleanup_on_exit(
    mut exit_events: EventReader<AppExit>,
    mut commands: Commands,
    resources: Option<ResMut<SplatResources>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<SplatMaterial>>,
) {
    if exit_events.is_empty() {
        return;
    }
    exit_events.clear();
    let Some(mut resources) = resources else {
        return;
    };

    for entity in resources.entities.drain(..).rev() {
        commands.entity(entity).despawn();
    }
    if let Some(handle) = resources.color_material.take() {
        materials.remove(&handle);
    }
    if let Some(handle) = resources.depth_material.take() {
        materials.remove(&handle);
    }
    if let Some(handle) = resources.envelope_target.take() {
        images.remove(&handle);
    }
    if let Some(handle) = resources.dummy_envelope.take() {
        images.remove(&handle);
    }
    if let Some(handle) = resources.mesh.take() {
        meshes.remove(&handle);
    }
    info!("splat resources released");
}
