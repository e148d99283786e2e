//! Surfel splatting demo: loads an `.rsf` point cloud, normalizes it into
//! the canonical cube and renders it with the two-pass splat technique.
//!
//! Controls: right-drag orbits, mouse wheel dollies, arrow keys adjust the
//! radius scale (up/down) and forward factor (left/right).

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::PresentMode;

mod engine;

use engine::camera::camera_controller;
use engine::config::{SplatConfig, adjust_config};
use engine::scene::{cleanup_on_exit, setup_splat_scene};
use engine::splat_material::SplatMaterial;
use engine::two_pass::{
    DepthPrepassReady, resize_envelope_target, signal_depth_ready, sync_material_params,
    sync_pass_cameras,
};

fn main() {
    create_app().run();
}

fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(MaterialPlugin::<SplatMaterial>::default())
        .add_plugins(FrameTimeDiagnosticsPlugin::default());

    app.insert_resource(ClearColor(Color::srgb(0.1, 0.125, 0.25)))
        .init_resource::<SplatConfig>()
        .init_resource::<DepthPrepassReady>()
        .add_systems(Startup, (setup_splat_scene, spawn_ui))
        .add_systems(
            Update,
            (
                camera_controller,
                sync_pass_cameras.after(camera_controller),
                adjust_config,
                sync_material_params.after(adjust_config),
                resize_envelope_target,
                signal_depth_ready,
                fps_text_update_system,
            ),
        )
        .add_systems(Last, cleanup_on_exit);

    app
}

fn create_default_plugins() -> impl PluginGroup {
    DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "surfel splatting".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    })
}

#[derive(Component)]
struct FpsText;

fn spawn_ui(mut commands: Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 1.0, 1.0)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                text.0 = format!("FPS: {value:.1}");
            }
        }
    }
}
