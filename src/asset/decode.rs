// glTF document -> DecodedMesh + AnimationClips

use base64::Engine;
use gltf::animation::util::ReadOutputs;
use nalgebra_glm as glm;

use super::draco::{DracoLayout, MeshDecoder};
use super::source::{Location, fetch};
use crate::animation::{AnimationClip, Interpolation, Property, Track, TrackValues};
use crate::error::LoadError;
use crate::model::{DecodedMesh, Material, MeshData, Primitive, SceneNode, Transform, Vertex};

/// Everything a successful load produces. Clip durations are as declared by the asset.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub mesh: DecodedMesh,
    pub clips: Vec<AnimationClip>,
}

/// Parse JSON or GLB. Validation is skipped since Draco files list the
/// extension as required.
pub fn parse(bytes: &[u8]) -> Result<gltf::Gltf, LoadError> {
    Ok(gltf::Gltf::from_slice_without_validation(bytes)?)
}

/// Contents of a GLB-chunk or `data:` buffer.
fn read_embedded(buffer: &gltf::Buffer<'_>, blob: Option<&[u8]>) -> Result<Vec<u8>, LoadError> {
    let missing = |reason: &str| LoadError::MissingBuffer {
        index: buffer.index(),
        reason: reason.to_string(),
    };
    match buffer.source() {
        gltf::buffer::Source::Bin => blob
            .map(<[u8]>::to_vec)
            .ok_or_else(|| missing("GLB binary chunk is absent")),
        gltf::buffer::Source::Uri(uri) => {
            let (_, payload) = uri
                .strip_prefix("data:")
                .and_then(|rest| rest.split_once(";base64,"))
                .ok_or_else(|| missing("external buffers need a base location"))?;
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| missing(&e.to_string()))
        }
    }
}

fn external_uri<'a>(buffer: &gltf::Buffer<'a>) -> Option<&'a str> {
    match buffer.source() {
        gltf::buffer::Source::Uri(uri) if !uri.starts_with("data:") => Some(uri),
        _ => None,
    }
}

fn check_length(buffer: &gltf::Buffer<'_>, data: Vec<u8>) -> Result<Vec<u8>, LoadError> {
    if data.len() < buffer.length() {
        return Err(LoadError::MissingBuffer {
            index: buffer.index(),
            reason: format!("expected {} bytes, got {}", buffer.length(), data.len()),
        });
    }
    Ok(data)
}

/// Resolve every buffer of the document, fetching external ones next to `base`.
pub async fn resolve_buffers(gltf: &gltf::Gltf, base: &Location) -> Result<Vec<Vec<u8>>, LoadError> {
    let mut buffers = Vec::with_capacity(gltf.document.buffers().len());
    for buffer in gltf.document.buffers() {
        let data = match external_uri(&buffer) {
            Some(uri) => {
                let location = base.sibling(uri)?;
                log::debug!("Fetching external buffer {} from {}", buffer.index(), location.display_name());
                fetch(&location, |_| {}).await?
            }
            None => read_embedded(&buffer, gltf.blob.as_deref())?,
        };
        buffers.push(check_length(&buffer, data)?);
    }
    Ok(buffers)
}

/// Decode a self-contained document (GLB or data URIs only).
pub fn decode_slice(
    bytes: &[u8],
    name: &str,
    decoder: Option<&dyn MeshDecoder>,
) -> Result<LoadedAsset, LoadError> {
    let gltf = parse(bytes)?;
    let mut buffers = Vec::new();
    for buffer in gltf.document.buffers() {
        let data = read_embedded(&buffer, gltf.blob.as_deref())?;
        buffers.push(check_length(&buffer, data)?);
    }
    build_asset(&gltf.document, &buffers, name, decoder)
}

pub fn build_asset(
    document: &gltf::Document,
    buffers: &[Vec<u8>],
    name: &str,
    decoder: Option<&dyn MeshDecoder>,
) -> Result<LoadedAsset, LoadError> {
    let mut meshes = Vec::with_capacity(document.meshes().len());
    for mesh in document.meshes() {
        meshes.push(build_mesh(document, &mesh, buffers, decoder)?);
    }

    let (nodes, roots) = build_nodes(document);
    let clips = build_clips(document, buffers, nodes.len())?;

    let mesh = DecodedMesh {
        name: name.to_string(),
        nodes,
        roots,
        meshes,
    };
    log::info!(
        "Decoded '{}': {} nodes, {} meshes, {} primitives, {} clips",
        mesh.name,
        mesh.nodes.len(),
        mesh.meshes.len(),
        mesh.primitive_count(),
        clips.len()
    );
    Ok(LoadedAsset { mesh, clips })
}

fn build_nodes(document: &gltf::Document) -> (Vec<SceneNode>, Vec<usize>) {
    let mut nodes: Vec<SceneNode> = document
        .nodes()
        .map(|node| {
            let (t, r, s) = node.transform().decomposed();
            let name = node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("node_{}", node.index()));
            let mut scene_node = SceneNode::new(name, Transform::from_decomposed(t, r, s));
            scene_node.mesh = node.mesh().map(|m| m.index());
            scene_node.children = node.children().map(|c| c.index()).collect();
            scene_node
        })
        .collect();

    for parent in 0..nodes.len() {
        for child in nodes[parent].children.clone() {
            if let Some(node) = nodes.get_mut(child) {
                node.parent = Some(parent);
            }
        }
    }

    let roots = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => (0..nodes.len()).filter(|&i| nodes[i].parent.is_none()).collect(),
    };
    (nodes, roots)
}

fn material_of(prim: &gltf::Primitive<'_>) -> Material {
    let pbr = prim.material().pbr_metallic_roughness();
    Material {
        base_color: pbr.base_color_factor(),
        metallic: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
    }
}

fn build_mesh(
    document: &gltf::Document,
    mesh: &gltf::Mesh<'_>,
    buffers: &[Vec<u8>],
    decoder: Option<&dyn MeshDecoder>,
) -> Result<MeshData, LoadError> {
    let mesh_name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

    let mut primitives = Vec::new();
    for (index, prim) in mesh.primitives().enumerate() {
        if prim.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping primitive {index} of '{mesh_name}': mode {:?}", prim.mode());
            continue;
        }

        let (positions, normals, indices) = match DracoLayout::from_primitive(&prim) {
            Some(layout) => {
                let layout = layout?;
                let decoder = decoder.ok_or_else(|| LoadError::DecoderUnavailable {
                    mesh: mesh_name.clone(),
                    primitive: index,
                })?;
                let compressed = view_bytes(document, buffers, layout.buffer_view)?;
                let geometry = decoder.decode(compressed, &layout)?;
                let indices = (!geometry.indices.is_empty()).then_some(geometry.indices);
                (geometry.positions, geometry.normals, indices)
            }
            None => {
                let reader = prim.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .ok_or_else(|| {
                        LoadError::decode(format!("primitive {index} of '{mesh_name}' has no positions"))
                    })?
                    .collect();
                let normals = reader.read_normals().map(|n| n.collect::<Vec<_>>());
                let indices = reader.read_indices().map(|i| i.into_u32().collect::<Vec<_>>());
                (positions, normals, indices)
            }
        };

        let indices = indices.unwrap_or_else(|| (0..positions.len() as u32).collect());
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(LoadError::decode(format!(
                "index {bad} out of range in primitive {index} of '{mesh_name}'"
            )));
        }
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => smooth_normals(&positions, &indices),
        };

        let vertices = positions
            .iter()
            .zip(&normals)
            .map(|(&position, &normal)| Vertex { position, normal })
            .collect();
        primitives.push(Primitive::new(vertices, indices, material_of(&prim)));
    }

    Ok(MeshData {
        name: mesh_name,
        primitives,
    })
}

fn view_bytes<'b>(
    document: &gltf::Document,
    buffers: &'b [Vec<u8>],
    view: usize,
) -> Result<&'b [u8], LoadError> {
    let view = document
        .views()
        .nth(view)
        .ok_or_else(|| LoadError::decode(format!("bufferView {view} does not exist")))?;
    let buffer = view.buffer().index();
    let data = buffers.get(buffer).ok_or_else(|| LoadError::MissingBuffer {
        index: buffer,
        reason: "referenced by a compressed primitive".into(),
    })?;
    let range = view.offset()..view.offset() + view.length();
    data.get(range)
        .ok_or_else(|| LoadError::decode(format!("bufferView {} exceeds buffer {buffer}", view.index())))
}

/// Area-weighted vertex normals for meshes that ship without them.
pub fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![glm::Vec3::zeros(); positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (pa, pb, pc) = (
            glm::make_vec3(&positions[a]),
            glm::make_vec3(&positions[b]),
            glm::make_vec3(&positions[c]),
        );
        let face = glm::cross(&(pb - pa), &(pc - pa));
        for i in [a, b, c] {
            acc[i] += face;
        }
    }
    acc.into_iter()
        .map(|n| {
            if glm::length(&n) > f32::EPSILON {
                let n = glm::normalize(&n);
                [n.x, n.y, n.z]
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

fn build_clips(
    document: &gltf::Document,
    buffers: &[Vec<u8>],
    node_count: usize,
) -> Result<Vec<AnimationClip>, LoadError> {
    let mut clips = Vec::with_capacity(document.animations().len());
    for animation in document.animations() {
        let name = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("animation_{}", animation.index()));

        let mut tracks = Vec::new();
        for channel in animation.channels() {
            let node = channel.target().node().index();
            if node >= node_count {
                return Err(LoadError::decode(format!("clip '{name}' targets missing node {node}")));
            }
            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Step => Interpolation::Step,
                gltf::animation::Interpolation::Linear => Interpolation::Linear,
                gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
            };

            let reader = channel.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
            let times: Vec<f32> = reader
                .read_inputs()
                .ok_or_else(|| LoadError::decode(format!("clip '{name}' has a channel without key times")))?
                .collect();
            let (property, values) = match reader.read_outputs() {
                Some(ReadOutputs::Translations(it)) => (
                    Property::Translation,
                    TrackValues::Vec3(it.map(|v| glm::make_vec3(&v)).collect()),
                ),
                Some(ReadOutputs::Scales(it)) => (
                    Property::Scale,
                    TrackValues::Vec3(it.map(|v| glm::make_vec3(&v)).collect()),
                ),
                Some(ReadOutputs::Rotations(it)) => (
                    Property::Rotation,
                    TrackValues::Quat(
                        it.into_f32()
                            .map(|[x, y, z, w]| glm::Quat::new(w, x, y, z))
                            .collect(),
                    ),
                ),
                Some(ReadOutputs::MorphTargetWeights(_)) => {
                    log::debug!("Clip '{name}': skipping morph target weights on node {node}");
                    continue;
                }
                None => {
                    return Err(LoadError::decode(format!("clip '{name}' has a channel without values")));
                }
            };

            let expected = Track::expected_values(interpolation, times.len());
            if values.len() != expected {
                return Err(LoadError::decode(format!(
                    "clip '{name}': {} keys need {expected} values, found {}",
                    times.len(),
                    values.len()
                )));
            }
            tracks.push(Track {
                node,
                property,
                interpolation,
                times,
                values,
            });
        }
        clips.push(AnimationClip::new(name, tracks));
    }
    Ok(clips)
}
