use bevy::{
    input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
};

use crate::engine::two_pass::MainPassCamera;

/// Orbit camera around the normalized splat cube. Right-drag orbits,
/// mouse wheel dollies.
#[derive(Resource)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl OrbitCamera {
    /// Frame a dataset: the normalized cube has half-diagonal sqrt(3), the
    /// camera starts at 2.5x that radius, matching the reference framing.
    pub fn framing_cube() -> Self {
        Self {
            focus: Vec3::ZERO,
            distance: 3f32.sqrt() * 2.5,
            yaw: 0.6,
            pitch: -0.4,
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::framing_cube()
    }
}

pub fn camera_controller(
    mut orbit: ResMut<OrbitCamera>,
    mut camera_query: Query<&mut Transform, With<MainPassCamera>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        orbit.yaw -= mouse_delta.x * 0.0035;
        orbit.pitch = (orbit.pitch - mouse_delta.y * 0.0030).clamp(-1.55, 1.55);
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y * 1.0,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        let dolly_speed = (orbit.distance * 0.1).clamp(0.05, 5.0);
        orbit.distance = (orbit.distance - scroll_accum * dolly_speed).clamp(0.2, 50.0);
    }

    let rotation = Quat::from_euler(EulerRot::YXZ, orbit.yaw, orbit.pitch, 0.0);
    transform.translation = orbit.focus + rotation * (Vec3::Z * orbit.distance);
    transform.rotation = rotation;
}
