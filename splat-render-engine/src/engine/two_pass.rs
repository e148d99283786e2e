//! Two-pass orchestration: the depth pre-pass camera renders the splat
//! envelope into an offscreen target, the main camera composites colour
//! against it. Pass order is explicit (camera order plus a depth-ready
//! signal), not an implicit registration convention.

use bevy::{
    core_pipeline::tonemapping::Tonemapping,
    image::{ImageAddressMode, ImageFilterMode, ImageSampler, ImageSamplerDescriptor},
    prelude::*,
    render::{
        camera::RenderTarget,
        render_asset::RenderAssetUsages,
        render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages},
        view::RenderLayers,
    },
    window::{PrimaryWindow, WindowResized},
};

use crate::engine::config::SplatConfig;
use crate::engine::scene::SplatResources;
use crate::engine::splat_material::{SplatMaterial, apply_config};

/// The pre-pass camera renders strictly before the main camera.
pub const ENVELOPE_PASS_ORDER: isize = 0;
pub const COLOR_PASS_ORDER: isize = 1;

/// Render layer carrying the depth-variant splat entity; the main camera
/// never sees it, and the pre-pass camera sees nothing else.
pub const ENVELOPE_LAYER: usize = 1;

#[derive(Component)]
pub struct EnvelopePassCamera;

#[derive(Component)]
pub struct MainPassCamera;

/// Marks the colour-pass splat entity that must wait for the envelope.
#[derive(Component)]
pub struct ColorPassSplat;

/// Explicit "depth attachment has been written" signal. The colour-pass
/// entity stays hidden until the pre-pass camera has completed a frame, so
/// the occlusion texture is never sampled before it holds real data.
#[derive(Resource, Default)]
pub struct DepthPrepassReady {
    pub ready: bool,
    frames_rendered: u32,
}

/// Offscreen envelope target. Camera-space splat depth is encoded in the
/// red channel, coverage in alpha; cleared to zero each frame.
pub fn create_envelope_target(images: &mut Assets<Image>, width: u32, height: u32) -> Handle<Image> {
    let size = Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    // Rgba16Float matches the HDR view-target format of the pre-pass camera.
    let mut image = Image::new_fill(
        size,
        TextureDimension::D2,
        &[0u8; 8],
        TextureFormat::Rgba16Float,
        RenderAssetUsages::default(),
    );
    image.texture_descriptor.usage =
        TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST | TextureUsages::RENDER_ATTACHMENT;
    image.sampler = ImageSampler::Descriptor(nearest_clamp_sampler());
    images.add(image)
}

/// 1x1 zero-coverage image bound where no envelope is sampled: the depth
/// variant, and the colour variant in single-pass techniques.
pub fn create_dummy_envelope(images: &mut Assets<Image>) -> Handle<Image> {
    let mut image = Image::new_fill(
        Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0u8; 8],
        TextureFormat::Rgba16Float,
        RenderAssetUsages::default(),
    );
    image.sampler = ImageSampler::Descriptor(nearest_clamp_sampler());
    images.add(image)
}

fn nearest_clamp_sampler() -> ImageSamplerDescriptor {
    ImageSamplerDescriptor {
        label: Some("envelope_nearest_clamp".into()),
        address_mode_u: ImageAddressMode::ClampToEdge,
        address_mode_v: ImageAddressMode::ClampToEdge,
        mag_filter: ImageFilterMode::Nearest,
        min_filter: ImageFilterMode::Nearest,
        ..Default::default()
    }
}

/// Spawn the pre-pass camera rendering the envelope layer into the
/// offscreen target. HDR keeps the encoded depth linear; tonemapping is
/// disabled for the same reason.
pub fn spawn_envelope_camera(commands: &mut Commands, target: Handle<Image>) -> Entity {
    commands
        .spawn((
            Camera3d::default(),
            Camera {
                order: ENVELOPE_PASS_ORDER,
                target: RenderTarget::Image(target.into()),
                clear_color: ClearColorConfig::Custom(Color::NONE),
                hdr: true,
                ..Default::default()
            },
            Tonemapping::None,
            Msaa::Off,
            RenderLayers::layer(ENVELOPE_LAYER),
            Transform::default(),
            EnvelopePassCamera,
        ))
        .id()
}

/// The pre-pass camera shadows the main camera's view exactly; a depth
/// envelope from a different viewpoint would invalidate the occlusion test.
pub fn sync_pass_cameras(
    main: Query<&Transform, (With<MainPassCamera>, Without<EnvelopePassCamera>)>,
    mut envelope: Query<&mut Transform, With<EnvelopePassCamera>>,
) {
    let Ok(main_transform) = main.single() else {
        return;
    };
    for mut transform in &mut envelope {
        *transform = *main_transform;
    }
}

/// Flip the depth-ready signal once the pre-pass camera has rendered, then
/// reveal the colour-pass geometry.
pub fn signal_depth_ready(
    mut ready: ResMut<DepthPrepassReady>,
    envelope_cameras: Query<(), With<EnvelopePassCamera>>,
    mut color_splats: Query<&mut Visibility, With<ColorPassSplat>>,
) {
    if ready.ready || envelope_cameras.is_empty() {
        return;
    }
    // One full schedule pass with the camera alive means its view has been
    // submitted ahead of the main camera.
    ready.frames_rendered += 1;
    if ready.frames_rendered > 1 {
        ready.ready = true;
        for mut visibility in &mut color_splats {
            *visibility = Visibility::Visible;
        }
        info!("depth pre-pass ready, colour pass enabled");
    }
}

/// Recreate the envelope target when the window size changes. The colour
/// pass looks up its own pixel in the target, so a stale size misaligns the
/// occlusion test across the whole frame.
pub fn resize_envelope_target(
    mut resize_events: EventReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<SplatMaterial>>,
    mut envelope_cameras: Query<&mut Camera, With<EnvelopePassCamera>>,
    resources: Option<ResMut<SplatResources>>,
) {
    if resize_events.is_empty() {
        return;
    }
    resize_events.clear();

    // envelope_target is only set on the two-pass path.
    let Some(mut resources) = resources else {
        return;
    };
    let Some(old_target) = resources.envelope_target.clone() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };

    let width = window.physical_width().max(1);
    let height = window.physical_height().max(1);
    if let Some(image) = images.get(&old_target) {
        if image.width() == width && image.height() == height {
            return;
        }
    }

    let new_target = create_envelope_target(&mut images, width, height);
    for mut camera in &mut envelope_cameras {
        camera.target = RenderTarget::Image(new_target.clone().into());
    }
    if let Some(color_handle) = &resources.color_material {
        if let Some(material) = materials.get_mut(color_handle) {
            material.envelope_texture = new_target.clone();
        }
    }
    resources.envelope_target = Some(new_target);
    images.remove(&old_target);
    info!("envelope target resized to {width}x{height}");
}

/// Push knob changes into both material instances in the same frame so the
/// occlusion test and the visible geometry never disagree.
pub fn sync_material_params(
    config: Res<SplatConfig>,
    mut materials: ResMut<Assets<SplatMaterial>>,
) {
    if !config.is_changed() {
        return;
    }
    // Both variants exist in this arena; there are at most two.
    for (_, material) in materials.iter_mut() {
        apply_config(&mut material.params, &config);
    }
}
