use crate::constants::MAX_JOINTS;
use crate::core::{Model, ModelAsset};
use glam::Mat4;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct LightPacked {
    pub(crate) direction: [f32; 4],
    pub(crate) color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct GlobalUniforms {
    pub(crate) view_proj: [[f32; 4]; 4],
    pub(crate) lights: [LightPacked; 3],
    pub(crate) ambient: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct DrawUniforms {
    pub(crate) model: [[f32; 4]; 4],
    pub(crate) base_color: [f32; 4],
    pub(crate) flags: [f32; 4],
    pub(crate) joints: [[[f32; 4]; 4]; MAX_JOINTS],
}

pub(crate) struct GpuPrimitive {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
    pub(crate) material: Option<usize>,
}

/// One primitive as placed by one node.
pub(crate) struct DrawItem {
    pub(crate) mesh: usize,
    pub(crate) primitive: usize,
    pub(crate) node: usize,
    pub(crate) skin: Option<usize>,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

pub(crate) struct ModelResources {
    pub(crate) meshes: Vec<Vec<GpuPrimitive>>,
    pub(crate) items: Vec<DrawItem>,
}

pub(crate) fn upload_model(
    device: &wgpu::Device,
    draw_layout: &wgpu::BindGroupLayout,
    asset: &ModelAsset,
) -> ModelResources {
    let meshes = asset
        .meshes
        .iter()
        .enumerate()
        .map(|(mi, mesh)| {
            mesh.primitives
                .iter()
                .enumerate()
                .map(|(pi, prim)| GpuPrimitive {
                    vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("mesh{mi}_prim{pi}_vertices")),
                        contents: bytemuck::cast_slice(&prim.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("mesh{mi}_prim{pi}_indices")),
                        contents: bytemuck::cast_slice(&prim.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: prim.indices.len() as u32,
                    material: prim.material,
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut items = Vec::new();
    for (node_index, node) in asset.nodes.iter().enumerate() {
        let Some(mesh) = node.mesh else {
            continue;
        };
        let Some(prims) = meshes.get(mesh) else {
            continue;
        };
        if let Some(skin) = node.skin.and_then(|s| asset.skins.get(s)) {
            if skin.joints.len() > MAX_JOINTS {
                log::warn!(
                    "[render] skin has {} joints; only the first {} are used",
                    skin.joints.len(),
                    MAX_JOINTS
                );
            }
        }
        for primitive in 0..prims.len() {
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("draw_uniforms"),
                size: std::mem::size_of::<DrawUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("draw_bg"),
                layout: draw_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            items.push(DrawItem {
                mesh,
                primitive,
                node: node_index,
                skin: node.skin,
                uniform_buffer,
                bind_group,
            });
        }
    }
    log::info!(
        "[render] uploaded {} meshes as {} draw items",
        meshes.len(),
        items.len()
    );
    ModelResources { meshes, items }
}

/// Per-draw uniforms for `item` at the model's current pose.
pub(crate) fn pack_draw(model: &Model, item: &DrawItem) -> DrawUniforms {
    let world = model.world_matrix();
    let asset = &model.asset;
    let mut joints = [Mat4::IDENTITY.to_cols_array_2d(); MAX_JOINTS];
    let (matrix, skinned) = match item.skin.and_then(|s| asset.skins.get(s)) {
        Some(skin) => {
            for (slot, m) in joints.iter_mut().zip(model.pose.joint_matrices(skin)) {
                *slot = m.to_cols_array_2d();
            }
            (world, 1.0)
        }
        None => {
            let node = model.pose.globals.get(item.node).copied().unwrap_or(Mat4::IDENTITY);
            (world * node, 0.0)
        }
    };
    let base_color = asset.meshes[item.mesh].primitives[item.primitive]
        .material
        .and_then(|m| asset.materials.get(m))
        .map(|m| m.base_color)
        .unwrap_or([1.0; 4]);
    DrawUniforms {
        model: matrix.to_cols_array_2d(),
        base_color,
        flags: [skinned, 0.0, 0.0, 0.0],
        joints,
    }
}
