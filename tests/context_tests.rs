// Host-side tests for the scene context: asset continuation and frame gating.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod page {
    pub mod animation {
        include!("../src/core/animation.rs");
    }
    pub mod asset {
        include!("../src/core/asset.rs");
    }
    pub mod constants {
        include!("../src/core/constants.rs");
    }
    pub mod context {
        include!("../src/core/context.rs");
    }
    pub mod controller {
        include!("../src/core/controller.rs");
    }
    pub mod easing {
        include!("../src/core/easing.rs");
    }
    pub mod scene {
        include!("../src/core/scene.rs");
    }
    pub mod scroll {
        include!("../src/core/scroll.rs");
    }
    pub mod timeline {
        include!("../src/core/timeline.rs");
    }
}

use glam::{Quat, Vec3};
use page::animation::*;
use page::asset::{LoadError, ModelAsset, Node};
use page::constants::*;
use page::context::*;
use page::scene::{LightPositionQuirk, Scene, Viewport};
use page::scroll::ElementBox;

#[derive(Default)]
struct CountingRenderer {
    frames: usize,
}

impl FrameRenderer for CountingRenderer {
    fn render(&mut self, scene: &Scene) -> anyhow::Result<()> {
        assert_eq!(scene.model_count(), 1);
        self.frames += 1;
        Ok(())
    }
}

struct FailingRenderer;

impl FrameRenderer for FailingRenderer {
    fn render(&mut self, _scene: &Scene) -> anyhow::Result<()> {
        anyhow::bail!("surface gone")
    }
}

const VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
};

fn spin_clip() -> AnimationClip {
    let mut clip = AnimationClip::new("spin");
    clip.add_channel(AnimationChannel {
        node: 0,
        property: Property::Rotation,
        sampler: Sampler {
            times: vec![0.0, 1.0],
            values: Keyframes::Quat(vec![Quat::IDENTITY, Quat::from_rotation_y(1.0)]),
            interpolation: Interpolation::Linear,
        },
    });
    clip
}

fn asset(clips: Vec<AnimationClip>) -> ModelAsset {
    ModelAsset {
        nodes: vec![Node::default()],
        roots: vec![0],
        clips,
        ..ModelAsset::default()
    }
}

fn context() -> SceneContext {
    SceneContext::bootstrap(SceneConfig::default(), VIEWPORT)
}

fn fetch_failure() -> LoadError {
    LoadError::Http {
        url: MODEL_URL.to_string(),
        status: 404,
    }
}

fn layout(selector: &str) -> Option<ElementBox> {
    match selector {
        TRIGGER_1 => Some(ElementBox {
            top: 0.0,
            height: 2000.0,
        }),
        _ => None,
    }
}

#[test]
fn defaults_follow_the_page() {
    let config = SceneConfig::default();
    assert_eq!(config.model_url, "/model/can10jul.glb");
    assert_eq!(
        config.clock,
        FrameClock::Elapsed {
            max_step: MAX_FRAME_STEP_SEC
        }
    );
    assert_eq!(config.light_quirk, LightPositionQuirk::Preserve);
    assert!(config.handle_resize);

    let ctx = context();
    assert_eq!(*ctx.stage(), Stage::Loading);
    assert_eq!(ctx.scene.model_count(), 0);
    assert!((ctx.scene.camera.aspect - 1280.0 / 720.0).abs() < 1e-6);
}

#[test]
fn nothing_renders_while_loading() {
    let mut ctx = context();
    let mut renderer = CountingRenderer::default();
    assert!(!ctx.frame(0.016, &mut renderer).unwrap());
    assert_eq!(renderer.frames, 0);
}

#[test]
fn failed_fetch_leaves_scene_empty_and_never_renders() {
    let mut ctx = context();
    let err = ctx.attach_model(Err(fetch_failure())).unwrap_err();
    assert!(matches!(err, LoadError::Http { status: 404, .. }));
    assert!(matches!(ctx.stage(), Stage::Failed(msg) if msg.contains("404")));
    assert_eq!(ctx.scene.model_count(), 0);
    assert!(ctx.scroll.bindings().is_empty());

    let mut renderer = CountingRenderer::default();
    for _ in 0..5 {
        assert!(!ctx.frame(0.016, &mut renderer).unwrap());
    }
    assert_eq!(renderer.frames, 0);
    assert_eq!(ctx.frames_rendered(), 0);
}

#[test]
fn asset_with_clips_attaches_once_and_plays_clip_zero() {
    let mut ctx = context();
    ctx.attach_model(Ok(asset(vec![spin_clip(), spin_clip()])))
        .unwrap();
    assert!(ctx.is_running());
    assert_eq!(ctx.scene.model_count(), 1);
    assert!(ctx.mixer.is_playing());
    assert_eq!(ctx.mixer.action().unwrap().clip, NATIVE_CLIP_INDEX);
    assert_eq!(ctx.scroll.bindings().len(), 4);

    let model = ctx.scene.model().unwrap();
    let t = *model.transform.borrow();
    assert_eq!(t.scale, Vec3::splat(MODEL_SCALE));
    assert_eq!(t.position.y, MODEL_Y_OFFSET);

    let mut renderer = CountingRenderer::default();
    assert!(ctx.frame(0.016, &mut renderer).unwrap());
    assert!(ctx.frame(0.016, &mut renderer).unwrap());
    assert_eq!(renderer.frames, 2);
    assert_eq!(ctx.frames_rendered(), 2);

    let again = ctx.attach_model(Ok(asset(vec![spin_clip()])));
    assert!(matches!(again, Err(LoadError::AlreadyAttached)));
    assert_eq!(ctx.scene.model_count(), 1);
}

#[test]
fn asset_without_clips_runs_static() {
    let mut ctx = context();
    ctx.attach_model(Ok(asset(Vec::new()))).unwrap();
    assert!(ctx.is_running());
    assert!(!ctx.mixer.is_playing());
    assert!(ctx.mixer.action().is_none());

    let mut renderer = CountingRenderer::default();
    assert!(ctx.frame(0.016, &mut renderer).unwrap());
    assert_eq!(renderer.frames, 1);
    let pose = &ctx.scene.model().unwrap().pose;
    assert_eq!(pose.locals[0].rotation, Quat::IDENTITY);
}

#[test]
fn frame_advances_clip_by_clamped_elapsed_time() {
    let mut ctx = context();
    ctx.attach_model(Ok(asset(vec![spin_clip()]))).unwrap();
    let mut renderer = CountingRenderer::default();
    // a long stall advances at most one max step
    ctx.frame(2.0, &mut renderer).unwrap();
    let time = ctx.mixer.action().unwrap().time;
    assert!((time - MAX_FRAME_STEP_SEC).abs() < 1e-6);
    let rot = ctx.scene.model().unwrap().pose.locals[0].rotation;
    assert!(rot.angle_between(Quat::from_rotation_y(MAX_FRAME_STEP_SEC)) < 1e-4);
}

#[test]
fn fixed_clock_ignores_elapsed_time() {
    let config = SceneConfig {
        clock: FrameClock::Fixed(LEGACY_MIXER_STEP_SEC),
        ..SceneConfig::default()
    };
    let mut ctx = SceneContext::bootstrap(config, VIEWPORT);
    ctx.attach_model(Ok(asset(vec![spin_clip()]))).unwrap();
    let mut renderer = CountingRenderer::default();
    for elapsed in [0.001, 0.05, 0.5] {
        ctx.frame(elapsed, &mut renderer).unwrap();
    }
    let time = ctx.mixer.action().unwrap().time;
    assert!((time - 3.0 * LEGACY_MIXER_STEP_SEC).abs() < 1e-6);
}

#[test]
fn renderer_errors_propagate_without_counting_the_frame() {
    let mut ctx = context();
    ctx.attach_model(Ok(asset(Vec::new()))).unwrap();
    assert!(ctx.frame(0.016, &mut FailingRenderer).is_err());
    assert_eq!(ctx.frames_rendered(), 0);
}

#[test]
fn scroll_bindings_drive_the_attached_model() {
    let mut ctx = context();
    ctx.attach_model(Ok(asset(Vec::new()))).unwrap();
    ctx.refresh_scroll(layout, VIEWPORT.height);
    ctx.scroll.on_scroll(1000.0);
    let rot = ctx.scene.model().unwrap().transform.borrow().rotation;
    assert!((rot.x - std::f32::consts::TAU).abs() < 1e-4);
    assert!((rot.z - 0.5).abs() < 1e-4);
}

#[test]
fn resize_updates_camera_aspect() {
    let mut ctx = context();
    ctx.resize(Viewport {
        width: 600.0,
        height: 900.0,
    });
    assert!((ctx.scene.camera.aspect - 600.0 / 900.0).abs() < 1e-6);
}
