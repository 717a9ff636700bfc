// Host-side tests for camera, lights, transforms and pose evaluation.
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
    pub mod scene {
        include!("../src/core/scene.rs");
    }
    pub mod timeline {
        include!("../src/core/timeline.rs");
    }
    pub mod easing {
        include!("../src/core/easing.rs");
    }
}

use glam::{Mat4, Vec3, Vec4};
use page::animation::NodeTransform;
use page::asset::{ModelAsset, Node, Skin};
use page::constants::*;
use page::scene::*;
use page::timeline::{Channel, TweenTarget};

fn chain_asset() -> ModelAsset {
    let node = |parent: Option<usize>, children: Vec<usize>, x: f32| Node {
        parent,
        children,
        rest: NodeTransform {
            translation: Vec3::new(x, 0.0, 0.0),
            ..NodeTransform::default()
        },
        ..Node::default()
    };
    ModelAsset {
        nodes: vec![node(None, vec![1], 1.0), node(Some(0), vec![2], 2.0), node(Some(1), vec![], 3.0)],
        roots: vec![0],
        ..ModelAsset::default()
    }
}

#[test]
fn camera_matches_page_setup() {
    let cam = Camera::for_viewport(Viewport {
        width: 1600.0,
        height: 900.0,
    });
    assert_eq!(cam.eye, Vec3::new(0.0, 0.0, CAMERA_Z));
    assert!((cam.fovy_radians - 65f32.to_radians()).abs() < 1e-6);
    assert_eq!((cam.znear, cam.zfar), (1.0, 10.0));

    // origin lands in the centre of clip space
    let clip = cam.view_projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
    assert!(clip.w > 0.0);
}

#[test]
fn viewport_aspect_guards_zero_height() {
    let v = Viewport {
        width: 800.0,
        height: 0.0,
    };
    assert_eq!(v.aspect(), 800.0);
}

#[test]
fn light_rig_preserves_fill_position_quirk() {
    let rig = LightRig::new(LightPositionQuirk::Preserve);
    let [key, fill, rim] = rig.lights;
    assert_eq!(key.position, KEY_LIGHT_POSITION);
    assert_eq!(fill.position, RIM_LIGHT_POSITION);
    assert_eq!(rim.position, DEFAULT_LIGHT_POSITION);
    assert_eq!(fill.intensity, FILL_LIGHT_INTENSITY);
    assert_eq!(rim.intensity, RIM_LIGHT_INTENSITY);
}

#[test]
fn fixed_light_rig_places_each_light() {
    let rig = LightRig::new(LightPositionQuirk::Fixed);
    let [_, fill, rim] = rig.lights;
    assert_eq!(fill.position, FILL_LIGHT_POSITION);
    assert_eq!(rim.position, RIM_LIGHT_POSITION);
    assert!((rim.direction() - (-RIM_LIGHT_POSITION.normalize())).length() < 1e-6);
}

#[test]
fn transform_exposes_tween_channels() {
    let mut t = Transform::default();
    assert!(t.write(Channel::RotationZ, 1.5));
    assert!(t.write(Channel::PositionY, -1.0));
    assert!(t.write(Channel::Scale, 3.3));
    assert!(!t.write(Channel::YPercent, 10.0));
    assert_eq!(t.read(Channel::RotationZ), Some(1.5));
    assert_eq!(t.read(Channel::PositionY), Some(-1.0));
    assert_eq!(t.scale, Vec3::splat(3.3));
    assert_eq!(t.read(Channel::YPercent), None);
}

#[test]
fn placed_model_uses_page_scale_and_offset() {
    let model = Model::place(chain_asset());
    let m = model.world_matrix();
    let p = m.transform_point3(Vec3::new(1.0, 0.0, 0.0));
    assert!((p - Vec3::new(MODEL_SCALE, MODEL_Y_OFFSET, 0.0)).length() < 1e-5);
}

#[test]
fn pose_composes_parent_chain() {
    let asset = chain_asset();
    let mut pose = Pose::rest(&asset);
    assert!((pose.globals[2].w_axis.x - 6.0).abs() < 1e-6);

    pose.locals[0].translation = Vec3::ZERO;
    pose.update_globals(&asset);
    assert!((pose.globals[2].w_axis.x - 5.0).abs() < 1e-6);
    assert!((pose.globals[1].w_axis.x - 2.0).abs() < 1e-6);
}

#[test]
fn joint_palette_is_identity_at_bind_pose() {
    let asset = chain_asset();
    let pose = Pose::rest(&asset);
    let skin = Skin {
        joints: vec![1, 2],
        inverse_bind: vec![pose.globals[1].inverse(), pose.globals[2].inverse()],
    };
    for m in pose.joint_matrices(&skin) {
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}

#[test]
fn scene_holds_at_most_one_model() {
    let mut scene = Scene::new(
        Viewport {
            width: 800.0,
            height: 600.0,
        },
        LightPositionQuirk::default(),
    );
    assert_eq!(scene.model_count(), 0);
    assert!(scene.attach(Model::place(chain_asset())).is_ok());
    assert!(scene.attach(Model::place(chain_asset())).is_err());
    assert_eq!(scene.model_count(), 1);
}
