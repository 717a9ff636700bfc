// Scene graph state: camera, lighting rig and the single attached model.
//
// These types avoid referencing platform-specific APIs; the web frontend
// reads them each frame to build its uniforms.

use super::animation::NodeTransform;
use super::asset::{ModelAsset, Skin};
use super::constants::*;
use super::timeline::{Channel, TweenTarget};
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width.max(1.0) / self.height.max(1.0)
    }
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// The page camera: standing off on +Z, looking at the origin.
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: viewport.aspect(),
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    pub fn white(intensity: f32) -> Self {
        Self {
            color: Vec3::ONE,
            intensity,
            position: DEFAULT_LIGHT_POSITION,
            target: Vec3::ZERO,
        }
    }

    /// Direction the light travels in, from its position towards its target.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).try_normalize().unwrap_or(Vec3::NEG_Y)
    }
}

/// Whether the rim light's position lands on the fill light (legacy
/// layout) or on the rim light itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightPositionQuirk {
    #[default]
    Preserve,
    Fixed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub lights: [DirectionalLight; 3],
}

impl LightRig {
    pub fn new(quirk: LightPositionQuirk) -> Self {
        let mut key = DirectionalLight::white(KEY_LIGHT_INTENSITY);
        key.position = KEY_LIGHT_POSITION;
        let mut fill = DirectionalLight::white(FILL_LIGHT_INTENSITY);
        fill.position = FILL_LIGHT_POSITION;
        let mut rim = DirectionalLight::white(RIM_LIGHT_INTENSITY);
        match quirk {
            // rim keeps its default position
            LightPositionQuirk::Preserve => fill.position = RIM_LIGHT_POSITION,
            LightPositionQuirk::Fixed => rim.position = RIM_LIGHT_POSITION,
        }
        Self {
            lights: [key, fill, rim],
        }
    }
}

/// Object-level transform of the model. Rotation is Euler XYZ in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let r = self.rotation;
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            self.position,
        )
    }
}

impl TweenTarget for Transform {
    fn read(&self, channel: Channel) -> Option<f32> {
        match channel {
            Channel::RotationX => Some(self.rotation.x),
            Channel::RotationY => Some(self.rotation.y),
            Channel::RotationZ => Some(self.rotation.z),
            Channel::PositionX => Some(self.position.x),
            Channel::PositionY => Some(self.position.y),
            Channel::PositionZ => Some(self.position.z),
            Channel::Scale => Some(self.scale.x),
            Channel::YPercent => None,
        }
    }

    fn write(&mut self, channel: Channel, value: f32) -> bool {
        match channel {
            Channel::RotationX => self.rotation.x = value,
            Channel::RotationY => self.rotation.y = value,
            Channel::RotationZ => self.rotation.z = value,
            Channel::PositionX => self.position.x = value,
            Channel::PositionY => self.position.y = value,
            Channel::PositionZ => self.position.z = value,
            Channel::Scale => self.scale = Vec3::splat(value),
            Channel::YPercent => return false,
        }
        true
    }
}

pub type SharedTransform = Rc<RefCell<Transform>>;

/// Animated node pose: locals written by the mixer, globals derived from them.
#[derive(Clone, Debug, Default)]
pub struct Pose {
    pub locals: Vec<NodeTransform>,
    pub globals: Vec<Mat4>,
}

impl Pose {
    pub fn rest(asset: &ModelAsset) -> Self {
        let mut pose = Self {
            locals: asset.nodes.iter().map(|n| n.rest).collect(),
            globals: vec![Mat4::IDENTITY; asset.nodes.len()],
        };
        pose.update_globals(asset);
        pose
    }

    pub fn update_globals(&mut self, asset: &ModelAsset) {
        let mut stack: Vec<(usize, Mat4)> =
            asset.roots.iter().rev().map(|r| (*r, Mat4::IDENTITY)).collect();
        while let Some((i, parent)) = stack.pop() {
            let (Some(local), Some(node)) = (self.locals.get(i), asset.nodes.get(i)) else {
                continue;
            };
            let global = parent * local.matrix();
            self.globals[i] = global;
            for c in node.children.iter().rev() {
                stack.push((*c, global));
            }
        }
    }

    /// Joint palette for `skin` in model space.
    pub fn joint_matrices(&self, skin: &Skin) -> Vec<Mat4> {
        skin.joints
            .iter()
            .enumerate()
            .map(|(j, node)| {
                let global = self.globals.get(*node).copied().unwrap_or(Mat4::IDENTITY);
                let inverse_bind = skin.inverse_bind.get(j).copied().unwrap_or(Mat4::IDENTITY);
                global * inverse_bind
            })
            .collect()
    }
}

pub struct Model {
    pub asset: ModelAsset,
    pub transform: SharedTransform,
    pub pose: Pose,
}

impl Model {
    /// Wrap a decoded asset with the page's placement (uniform scale, vertical offset).
    pub fn place(asset: ModelAsset) -> Self {
        let transform = Transform {
            position: Vec3::new(0.0, MODEL_Y_OFFSET, 0.0),
            rotation: Vec3::ZERO,
            scale: Vec3::splat(MODEL_SCALE),
        };
        let pose = Pose::rest(&asset);
        Self {
            asset,
            transform: Rc::new(RefCell::new(transform)),
            pose,
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.transform.borrow().matrix()
    }
}

pub struct Scene {
    pub camera: Camera,
    pub lights: LightRig,
    model: Option<Model>,
}

impl Scene {
    pub fn new(viewport: Viewport, quirk: LightPositionQuirk) -> Self {
        Self {
            camera: Camera::for_viewport(viewport),
            lights: LightRig::new(quirk),
            model: None,
        }
    }

    /// Attach the model. A scene holds at most one; a second one is handed back.
    pub fn attach(&mut self, model: Model) -> Result<&mut Model, Model> {
        if self.model.is_some() {
            return Err(model);
        }
        Ok(self.model.insert(model))
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }

    pub fn model_count(&self) -> usize {
        usize::from(self.model.is_some())
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.aspect = viewport.aspect();
    }
}
