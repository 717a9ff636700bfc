use glam::Vec3;

// Scene and page tuning constants shared by the core and the web frontend.

// Camera
pub const CAMERA_FOV_DEG: f32 = 65.0; // vertical field of view
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 10.0;
pub const CAMERA_Z: f32 = 6.0; // standoff distance from the origin

// Model placement applied once the asset is attached
pub const MODEL_SCALE: f32 = 3.3;
pub const MODEL_Y_OFFSET: f32 = -1.0;

// Native clip playback
pub const LEGACY_MIXER_STEP_SEC: f32 = 0.015; // fixed per-frame step of the legacy clock
pub const MAX_FRAME_STEP_SEC: f32 = 0.1; // clamp for wall-clock deltas (tab switches)
pub const NATIVE_CLIP_INDEX: usize = 0;

// Lighting rig: three white directional lights aimed at the origin
pub const KEY_LIGHT_POSITION: Vec3 = Vec3::new(2.0, 2.0, 5.0);
pub const KEY_LIGHT_INTENSITY: f32 = 1.4;
pub const FILL_LIGHT_POSITION: Vec3 = Vec3::new(-4.0, 1.0, 2.0);
pub const FILL_LIGHT_INTENSITY: f32 = 0.9;
pub const RIM_LIGHT_POSITION: Vec3 = Vec3::new(0.0, -3.0, -4.0);
pub const RIM_LIGHT_INTENSITY: f32 = 0.7;
// Position a directional light has before anything is written to it
pub const DEFAULT_LIGHT_POSITION: Vec3 = Vec3::new(0.0, 1.0, 0.0);

// Asset endpoint, relative to the hosting page
pub const MODEL_URL: &str = "/model/can10jul.glb";

// DOM contract
pub const TRIGGER_1: &str = ".trigger1";
pub const TRIGGER_2: &str = ".trigger2";
pub const TRIGGER_3: &str = ".trigger3";
pub const PARALLAX_LAYER: &str = "#parallaxShare";

// Scroll markers: "<element edge> <viewport edge>"
pub const SEQ_A_START: &str = "top top";
pub const SEQ_A_END: &str = "50% top";
pub const SEQ_B_START: &str = "40% bottom";
pub const SEQ_B_END: &str = "bottom bottom";
pub const SEQ_C_START: &str = "10% bottom";
pub const SEQ_C_END: &str = "100% bottom";
pub const PARALLAX_START: &str = "top bottom";
pub const PARALLAX_END: &str = "bottom top";

// Tween destinations
pub const SEQ_A_ROTATION_DELTA: Vec3 = Vec3::new(std::f32::consts::TAU, 0.3, 0.5);
pub const SEQ_B_ROTATION: Vec3 = Vec3::new(0.0, 5.0, 0.0);
pub const SEQ_C_SPIN_Z: f32 = std::f32::consts::TAU;
pub const SEQ_C_POSITION: Vec3 = Vec3::new(2.5, -1.0, 2.0);
pub const PARALLAX_Y_PERCENT: f32 = -5.0;
pub const PARALLAX_SCALE: f32 = 1.2;
pub const PARALLAX_SCRUB_SEC: f32 = 1.0; // smoothing lag for the parallax layer
pub const TWEEN_DURATION: f32 = 1.0; // nominal; scrubbed timelines ignore wall-clock time
