// Host-side tests for constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod page {
    pub mod constants {
        include!("../src/core/constants.rs");
    }
    pub mod easing {
        include!("../src/core/easing.rs");
    }
    pub mod scroll {
        include!("../src/core/scroll.rs");
    }
}

use constants::*;
use page::constants::*;
use page::scroll::ScrollMarker;

static MODEL_WGSL: &str = include_str!("../shaders/model.wgsl");

#[test]
fn every_page_marker_parses() {
    for m in [
        SEQ_A_START,
        SEQ_A_END,
        SEQ_B_START,
        SEQ_B_END,
        SEQ_C_START,
        SEQ_C_END,
        PARALLAX_START,
        PARALLAX_END,
    ] {
        assert!(m.parse::<ScrollMarker>().is_ok(), "marker `{m}` rejected");
    }
}

#[test]
fn trigger_selectors_are_distinct() {
    let selectors = [TRIGGER_1, TRIGGER_2, TRIGGER_3, PARALLAX_LAYER];
    for (i, a) in selectors.iter().enumerate() {
        for b in &selectors[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn camera_frames_the_model() {
    assert!(CAMERA_NEAR > 0.0 && CAMERA_NEAR < CAMERA_FAR);
    // the model origin sits between the clip planes
    assert!(CAMERA_Z > CAMERA_NEAR && CAMERA_Z < CAMERA_FAR);
    // so does the far end of sequence C's move towards the camera
    let z = CAMERA_Z - SEQ_C_POSITION.z;
    assert!(z > CAMERA_NEAR && z < CAMERA_FAR);
    assert!(CAMERA_FOV_DEG > 0.0 && CAMERA_FOV_DEG < 180.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn timing_constants_are_positive() {
    assert!(LEGACY_MIXER_STEP_SEC > 0.0);
    assert!(MAX_FRAME_STEP_SEC > LEGACY_MIXER_STEP_SEC);
    assert!(PARALLAX_SCRUB_SEC > 0.0);
    assert!(TWEEN_DURATION > 0.0);
}

#[test]
fn model_url_is_a_glb_path() {
    assert!(MODEL_URL.starts_with('/'));
    assert!(MODEL_URL.ends_with(".glb"));
}

#[test]
fn joint_palette_matches_shader() {
    let decl = format!("array<mat4x4<f32>, {}>", MAX_JOINTS);
    assert!(MODEL_WGSL.contains(&decl), "shader joint array is not {MAX_JOINTS}");
    assert!(MODEL_WGSL.contains("array<Light, 3>"));
}

#[test]
fn clear_colour_is_transparent() {
    assert_eq!(CLEAR_COLOR.a, 0.0);
    assert!(AMBIENT_LIGHT.iter().all(|c| (0.0..1.0).contains(c)));
}

#[test]
fn fragment_output_is_premultiplied() {
    let fs = &MODEL_WGSL[MODEL_WGSL.find("fn fs_main").unwrap()..];
    assert!(fs.contains("albedo.rgb * lit * albedo.a, albedo.a"));
}
