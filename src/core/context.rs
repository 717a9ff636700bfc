// The scene context: everything the page owns, assembled once and handed to
// the loader continuation, the scroll listeners and the render loop.

use super::animation::{AnimationMixer, FrameClock};
use super::asset::{LoadError, ModelAsset};
use super::constants::*;
use super::controller::{page_bindings, LayerTransform, ScrollController};
use super::scene::{LightPositionQuirk, Model, Scene, Viewport};
use super::scroll::ElementBox;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub model_url: String,
    pub clock: FrameClock,
    pub light_quirk: LightPositionQuirk,
    pub handle_resize: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_url: MODEL_URL.to_string(),
            clock: FrameClock::Elapsed {
                max_step: MAX_FRAME_STEP_SEC,
            },
            light_quirk: LightPositionQuirk::Preserve,
            handle_resize: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    Loading,
    Running,
    Failed(String),
}

/// Draws one frame of the scene.
pub trait FrameRenderer {
    fn render(&mut self, scene: &Scene) -> anyhow::Result<()>;
}

pub struct SceneContext {
    pub config: SceneConfig,
    pub scene: Scene,
    pub mixer: AnimationMixer,
    pub scroll: ScrollController,
    pub parallax: Rc<RefCell<LayerTransform>>,
    stage: Stage,
    frames: u64,
}

impl SceneContext {
    pub fn bootstrap(config: SceneConfig, viewport: Viewport) -> Self {
        log::info!(
            "[scene] bootstrap {}x{} (clock {:?}, lights {:?})",
            viewport.width,
            viewport.height,
            config.clock,
            config.light_quirk
        );
        Self {
            scene: Scene::new(viewport, config.light_quirk),
            config,
            mixer: AnimationMixer::default(),
            scroll: ScrollController::new(),
            parallax: Rc::new(RefCell::new(LayerTransform::default())),
            stage: Stage::Loading,
            frames: 0,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn is_running(&self) -> bool {
        self.stage == Stage::Running
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Continuation of the asset fetch. On success the model is placed and
    /// attached, its native clip started (when it has one) and the scroll
    /// bindings armed; the caller then starts the render loop. On failure the
    /// scene stays empty and the context is marked failed.
    pub fn attach_model(&mut self, loaded: Result<ModelAsset, LoadError>) -> Result<(), LoadError> {
        let asset = match loaded {
            Ok(asset) => asset,
            Err(e) => {
                log::error!("[scene] model load failed: {}", e);
                self.stage = Stage::Failed(e.to_string());
                return Err(e);
            }
        };
        let model = match self.scene.attach(Model::place(asset)) {
            Ok(model) => model,
            Err(_) => return Err(LoadError::AlreadyAttached),
        };
        if !self.mixer.play(NATIVE_CLIP_INDEX, &model.asset.clips) {
            log::warn!("[scene] model has no native animation; showing it static");
        }
        let transform = model.transform.clone();
        match page_bindings(transform, self.parallax.clone()) {
            Ok(controller) => self.scroll = controller,
            Err(e) => log::error!("[scroll] invalid marker: {}", e),
        }
        self.stage = Stage::Running;
        Ok(())
    }

    /// Re-measure trigger elements and re-apply the current scroll offset.
    pub fn refresh_scroll(&mut self, layout: impl Fn(&str) -> Option<ElementBox>, viewport_height: f32) {
        self.scroll.refresh(layout, viewport_height);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.scene.resize(viewport);
    }

    /// Advance animation and scroll smoothing by one frame and draw it.
    /// Returns `Ok(false)` without drawing until a model is running.
    pub fn frame(
        &mut self,
        elapsed_sec: f32,
        renderer: &mut dyn FrameRenderer,
    ) -> anyhow::Result<bool> {
        if !self.is_running() {
            return Ok(false);
        }
        let dt = self.config.clock.step(elapsed_sec);
        if let Some(model) = self.scene.model_mut() {
            self.mixer
                .update(dt, &model.asset.clips, &mut model.pose.locals);
            model.pose.update_globals(&model.asset);
        }
        self.scroll.tick(elapsed_sec.clamp(0.0, MAX_FRAME_STEP_SEC));
        renderer.render(&self.scene)?;
        self.frames += 1;
        Ok(true)
    }
}
