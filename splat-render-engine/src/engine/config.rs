use bevy::prelude::*;

/// Default knob values, matching the reference dataset tuning.
pub const DEFAULT_RADIUS_SCALE: f32 = 0.25;
pub const DEFAULT_FORWARD_FACTOR: f32 = 0.5;

pub const RADIUS_SCALE_STEP: f32 = 0.01;
pub const FORWARD_FACTOR_STEP: f32 = 0.05;

/// Startup technique. Also supported: `Points` for 1:1 point rendering and
/// `QuadSplat { two_pass: false }` for quad splats without the pre-pass.
pub const DEFAULT_TECHNIQUE: SplatTechnique = SplatTechnique::QuadSplat { two_pass: true };

/// Closed set of splat techniques, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplatTechnique {
    /// 1:1 point-primitive rendering, single pass.
    Points,
    /// Camera-facing quad per surfel; optionally with the depth pre-pass
    /// that feeds the colour pass occlusion test.
    QuadSplat { two_pass: bool },
}

impl SplatTechnique {
    pub fn uses_depth_prepass(&self) -> bool {
        matches!(self, SplatTechnique::QuadSplat { two_pass: true })
    }
}

/// The three per-instance knobs, shared by both pass materials. A single
/// sync system pushes changes into both material instances so the occlusion
/// test and the visible geometry never drift apart.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SplatConfig {
    pub technique: SplatTechnique,
    pub radius_scale: f32,
    pub forward_factor: f32,
}

impl Default for SplatConfig {
    fn default() -> Self {
        Self {
            technique: DEFAULT_TECHNIQUE,
            radius_scale: DEFAULT_RADIUS_SCALE,
            forward_factor: DEFAULT_FORWARD_FACTOR,
        }
    }
}

/// Runtime knob adjustment, arrow keys. Up/Down scale the splat radius,
/// Left/Right the forward depth bias.
pub fn adjust_config(keyboard: Res<ButtonInput<KeyCode>>, mut config: ResMut<SplatConfig>) {
    let mut radius = config.radius_scale;
    let mut forward = config.forward_factor;

    if keyboard.pressed(KeyCode::ArrowUp) {
        radius += RADIUS_SCALE_STEP;
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        radius -= RADIUS_SCALE_STEP;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        forward += FORWARD_FACTOR_STEP;
    }
    if keyboard.pressed(KeyCode::ArrowLeft) {
        forward -= FORWARD_FACTOR_STEP;
    }

    let radius = radius.clamp(0.01, 10.0);
    let forward = forward.clamp(0.0, 10.0);

    // Only touch the resource when a key changed something, so resource
    // change detection keeps the material sync system idle otherwise.
    if radius != config.radius_scale || forward != config.forward_factor {
        config.radius_scale = radius;
        config.forward_factor = forward;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_the_declared_startup_technique() {
        let config = SplatConfig::default();
        assert_eq!(config.technique, DEFAULT_TECHNIQUE);
        assert_eq!(config.radius_scale, DEFAULT_RADIUS_SCALE);
        assert_eq!(config.forward_factor, DEFAULT_FORWARD_FACTOR);
    }

    #[test]
    fn only_two_pass_quads_request_the_depth_prepass() {
        assert!(SplatTechnique::QuadSplat { two_pass: true }.uses_depth_prepass());
        assert!(!SplatTechnique::QuadSplat { two_pass: false }.uses_depth_prepass());
        assert!(!SplatTechnique::Points.uses_depth_prepass());
    }
}
