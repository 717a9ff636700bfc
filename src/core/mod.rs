pub mod animation;
pub mod asset;
pub mod constants;
pub mod context;
pub mod controller;
pub mod easing;
pub mod scene;
pub mod scroll;
pub mod timeline;

pub use animation::*;
pub use asset::*;
pub use constants::*;
pub use context::*;
pub use controller::*;
pub use scene::*;
pub use scroll::*;
pub use timeline::*;

// Shaders bundled as string constants
pub static MODEL_WGSL: &str = include_str!("../../shaders/model.wgsl");
