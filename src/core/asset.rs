// Decoding of the binary glTF (GLB) model into renderer-ready data.

use super::animation::{
    AnimationChannel, AnimationClip, Interpolation, Keyframes, NodeTransform, Property, Sampler,
};
use glam::{Mat4, Quat, Vec3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("GET {url} failed with HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("asset could not be decoded: {0}")]
    Decode(#[from] gltf::Error),
    #[error("asset contains no scene nodes")]
    EmptyScene,
    #[error("a model is already attached to the scene")]
    AlreadyAttached,
}

/// Bytes received so far for an in-flight asset fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    /// Unknown when the server sends no `Content-Length`.
    pub total: Option<u64>,
}

impl LoadProgress {
    pub fn fraction(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f64 / total as f64).min(1.0) as f32),
            _ => None,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

#[derive(Clone, Debug, Default)]
pub struct Primitive {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

/// Tightly packed RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct Material {
    pub base_color: [f32; 4],
    pub base_color_texture: Option<usize>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            base_color_texture: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Skin {
    pub joints: Vec<usize>,
    pub inverse_bind: Vec<Mat4>,
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub name: Option<String>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub rest: NodeTransform,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

/// A decoded scene-graph fragment plus its authored animation clips.
#[derive(Clone, Debug, Default)]
pub struct ModelAsset {
    pub nodes: Vec<Node>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    /// Indexed like the glTF images; `None` where the pixel format is unsupported.
    pub textures: Vec<Option<Texture>>,
    pub skins: Vec<Skin>,
    pub clips: Vec<AnimationClip>,
}

impl ModelAsset {
    pub fn from_glb(bytes: &[u8]) -> Result<Self, LoadError> {
        let (document, buffers, images) = gltf::import_slice(bytes)?;
        let buffer = buffer_source(&buffers);

        let mut nodes: Vec<Node> = document
            .nodes()
            .map(|n| {
                let (t, r, s) = n.transform().decomposed();
                Node {
                    name: n.name().map(str::to_string),
                    parent: None,
                    children: n.children().map(|c| c.index()).collect(),
                    rest: NodeTransform {
                        translation: Vec3::from(t),
                        rotation: Quat::from_array(r),
                        scale: Vec3::from(s),
                    },
                    mesh: n.mesh().map(|m| m.index()),
                    skin: n.skin().map(|s| s.index()),
                }
            })
            .collect();
        if nodes.is_empty() {
            return Err(LoadError::EmptyScene);
        }
        for i in 0..nodes.len() {
            for c in nodes[i].children.clone() {
                if let Some(child) = nodes.get_mut(c) {
                    child.parent = Some(i);
                }
            }
        }
        let roots: Vec<usize> = match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => (0..nodes.len()).filter(|i| nodes[*i].parent.is_none()).collect(),
        };

        let mut meshes = Vec::new();
        for mesh in document.meshes() {
            let mut primitives = Vec::new();
            for prim in mesh.primitives() {
                if prim.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!("[asset] skipping non-triangle primitive ({:?})", prim.mode());
                    continue;
                }
                let reader = prim.reader(buffer.clone());
                let Some(positions) = reader.read_positions() else {
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();
                let n = positions.len();
                let indices: Vec<u32> = reader
                    .read_indices()
                    .map(|i| i.into_u32().collect())
                    .unwrap_or_else(|| (0..n as u32).collect());
                let normals: Vec<[f32; 3]> = match reader.read_normals() {
                    Some(it) => it.collect(),
                    None => face_normals(&positions, &indices),
                };
                let uvs: Vec<[f32; 2]> = reader
                    .read_tex_coords(0)
                    .map(|t| t.into_f32().collect())
                    .unwrap_or_default();
                let joints: Vec<[u16; 4]> = reader
                    .read_joints(0)
                    .map(|j| j.into_u16().collect())
                    .unwrap_or_default();
                let weights: Vec<[f32; 4]> = reader
                    .read_weights(0)
                    .map(|w| w.into_f32().collect())
                    .unwrap_or_default();

                let vertices = (0..n)
                    .map(|i| Vertex {
                        position: positions[i],
                        normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                        uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                        joints: joints
                            .get(i)
                            .map(|j| [j[0] as u32, j[1] as u32, j[2] as u32, j[3] as u32])
                            .unwrap_or([0; 4]),
                        weights: weights.get(i).copied().unwrap_or([0.0; 4]),
                    })
                    .collect();
                primitives.push(Primitive {
                    vertices,
                    indices,
                    material: prim.material().index(),
                });
            }
            meshes.push(Mesh {
                name: mesh.name().map(str::to_string),
                primitives,
            });
        }

        let textures: Vec<Option<Texture>> = images.iter().map(to_rgba8).collect();
        let materials = document
            .materials()
            .map(|m| {
                let pbr = m.pbr_metallic_roughness();
                Material {
                    base_color: pbr.base_color_factor(),
                    base_color_texture: pbr
                        .base_color_texture()
                        .map(|info| info.texture().source().index())
                        .filter(|i| textures.get(*i).map(Option::is_some).unwrap_or(false)),
                }
            })
            .collect();

        let skins = document
            .skins()
            .map(|skin| {
                let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();
                let inverse_bind = skin
                    .reader(buffer.clone())
                    .read_inverse_bind_matrices()
                    .map(|it| it.map(|m| Mat4::from_cols_array_2d(&m)).collect())
                    .unwrap_or_else(|| vec![Mat4::IDENTITY; joints.len()]);
                Skin {
                    joints,
                    inverse_bind,
                }
            })
            .collect();

        let clips = document
            .animations()
            .map(|anim| read_clip(&anim, buffer.clone()))
            .collect::<Vec<_>>();

        let asset = ModelAsset {
            nodes,
            roots,
            meshes,
            materials,
            textures,
            skins,
            clips,
        };
        log::info!(
            "[asset] decoded {} nodes, {} meshes, {} skins, {} clips",
            asset.nodes.len(),
            asset.meshes.len(),
            asset.skins.len(),
            asset.clips.len()
        );
        Ok(asset)
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }
}

fn buffer_source<'s>(
    buffers: &'s [gltf::buffer::Data],
) -> impl Clone + Fn(gltf::Buffer) -> Option<&'s [u8]> + 's {
    move |b| Some(&buffers[b.index()].0[..])
}

fn read_clip<'s>(
    anim: &gltf::Animation,
    buffer: impl Clone + Fn(gltf::Buffer) -> Option<&'s [u8]>,
) -> AnimationClip {
    let name = anim
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("clip{}", anim.index()));
    let mut clip = AnimationClip::new(name);
    for channel in anim.channels() {
        let target = channel.target();
        let property = match target.property() {
            gltf::animation::Property::Translation => Property::Translation,
            gltf::animation::Property::Rotation => Property::Rotation,
            gltf::animation::Property::Scale => Property::Scale,
            gltf::animation::Property::MorphTargetWeights => continue,
        };
        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };
        let reader = channel.reader(buffer.clone());
        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let values = match reader.read_outputs() {
            Some(gltf::animation::util::ReadOutputs::Translations(it)) => {
                Keyframes::Vec3(it.map(Vec3::from).collect())
            }
            Some(gltf::animation::util::ReadOutputs::Scales(it)) => {
                Keyframes::Vec3(it.map(Vec3::from).collect())
            }
            Some(gltf::animation::util::ReadOutputs::Rotations(it)) => {
                Keyframes::Quat(it.into_f32().map(Quat::from_array).collect())
            }
            _ => continue,
        };
        clip.add_channel(AnimationChannel {
            node: target.node().index(),
            property,
            sampler: Sampler {
                times: inputs.collect(),
                values,
                interpolation,
            },
        });
    }
    clip
}

fn to_rgba8(image: &gltf::image::Data) -> Option<Texture> {
    use gltf::image::Format;
    let px = &image.pixels;
    let rgba: Vec<u8> = match image.format {
        Format::R8G8B8A8 => px.clone(),
        Format::R8G8B8 => px
            .chunks_exact(3)
            .flat_map(|c| [c[0], c[1], c[2], 255])
            .collect(),
        Format::R8G8 => px
            .chunks_exact(2)
            .flat_map(|c| [c[0], c[0], c[0], c[1]])
            .collect(),
        Format::R8 => px.iter().flat_map(|v| [*v, *v, *v, 255]).collect(),
        other => {
            log::warn!("[asset] unsupported texture format {:?}; using base colour", other);
            return None;
        }
    };
    Some(Texture {
        width: image.width,
        height: image.height,
        rgba,
    })
}

/// Area-weighted vertex normals from triangle faces.
pub fn face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let n = (Vec3::from(positions[b]) - pa).cross(Vec3::from(positions[c]) - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}
