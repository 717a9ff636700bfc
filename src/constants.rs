/// Renderer tuning constants.
///
/// Scene layout (camera, lights, model placement) lives in `core::constants`;
/// these only affect how the frame is drawn.
// Colour the canvas is cleared to; transparent so the page shows through
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::TRANSPARENT;

// Flat light added to every fragment (the page has directional lights only)
pub const AMBIENT_LIGHT: [f32; 3] = [0.04, 0.04, 0.04];

// Joint palette size; must match `joints` in shaders/model.wgsl
pub const MAX_JOINTS: usize = 64;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// DOM ids used by the status line
pub const STATUS_ELEMENT_ID: &str = "load-status";
