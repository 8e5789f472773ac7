// KHR_draco_mesh_compression support.
//
// The glTF side (which attributes exist, how many vertices and indices to expect)
// is described by `DracoLayout`; turning the compressed bitstream into geometry is
// the job of a `MeshDecoder`.

use std::sync::Arc;

use crate::error::LoadError;

pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    pub fn size(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::U32 | ComponentType::F32 => 4,
        }
    }

    fn from_gltf(ty: gltf::accessor::DataType) -> Self {
        use gltf::accessor::DataType;
        match ty {
            DataType::I8 => ComponentType::I8,
            DataType::U8 => ComponentType::U8,
            DataType::I16 => ComponentType::I16,
            DataType::U16 => ComponentType::U16,
            DataType::U32 => ComponentType::U32,
            DataType::F32 => ComponentType::F32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DracoSemantic {
    Position,
    Normal,
    /// Decoded to keep the stream offsets right, then discarded.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DracoAttribute {
    /// Unique id of the attribute inside the Draco bitstream.
    pub id: u32,
    pub semantic: DracoSemantic,
    pub components: usize,
    pub component: ComponentType,
    pub normalized: bool,
}

/// What the decoder must produce for one primitive. Attributes are sorted by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DracoLayout {
    pub buffer_view: usize,
    pub vertex_count: u32,
    pub index_count: u32,
    pub attributes: Vec<DracoAttribute>,
}

impl DracoLayout {
    /// Read the extension object of `prim`. `None` when the primitive is not compressed.
    pub fn from_primitive(prim: &gltf::Primitive<'_>) -> Option<Result<Self, LoadError>> {
        let ext = prim.extension_value(DRACO_EXTENSION)?;
        Some(Self::from_extension(prim, ext))
    }

    fn from_extension(prim: &gltf::Primitive<'_>, ext: &serde_json::Value) -> Result<Self, LoadError> {
        let buffer_view = ext
            .get("bufferView")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| LoadError::decode("draco extension has no bufferView"))? as usize;
        let attribute_ids = ext
            .get("attributes")
            .and_then(|v| v.as_object())
            .ok_or_else(|| LoadError::decode("draco extension has no attributes"))?;

        let vertex_count = prim
            .get(&gltf::Semantic::Positions)
            .map(|a| a.count() as u32)
            .ok_or_else(|| LoadError::decode("draco primitive has no POSITION accessor"))?;
        let index_count = prim.indices().map(|a| a.count() as u32).unwrap_or(0);

        let mut attributes = Vec::with_capacity(attribute_ids.len());
        for (name, id) in attribute_ids {
            let id = id
                .as_u64()
                .ok_or_else(|| LoadError::decode(format!("draco attribute '{name}' has no id")))?
                as u32;
            let Some(semantic) = semantic_from_name(name) else {
                continue;
            };
            let Some(accessor) = prim.get(&semantic) else {
                continue;
            };
            attributes.push(DracoAttribute {
                id,
                semantic: match semantic {
                    gltf::Semantic::Positions => DracoSemantic::Position,
                    gltf::Semantic::Normals => DracoSemantic::Normal,
                    _ => DracoSemantic::Other,
                },
                components: accessor.dimensions().multiplicity(),
                component: ComponentType::from_gltf(accessor.data_type()),
                normalized: accessor.normalized(),
            });
        }
        attributes.sort_by_key(|a| a.id);

        Ok(Self {
            buffer_view,
            vertex_count,
            index_count,
            attributes,
        })
    }

    /// Indices are written as u16 when they fit, u32 otherwise.
    pub fn wide_indices(&self) -> bool {
        self.index_count > u16::MAX as u32
    }
}

fn semantic_from_name(name: &str) -> Option<gltf::Semantic> {
    use gltf::Semantic;
    let indexed = |prefix: &str| name.strip_prefix(prefix).and_then(|n| n.parse::<u32>().ok());
    match name {
        "POSITION" => Some(Semantic::Positions),
        "NORMAL" => Some(Semantic::Normals),
        "TANGENT" => Some(Semantic::Tangents),
        _ => indexed("TEXCOORD_")
            .map(Semantic::TexCoords)
            .or_else(|| indexed("COLOR_").map(Semantic::Colors))
            .or_else(|| indexed("JOINTS_").map(Semantic::Joints))
            .or_else(|| indexed("WEIGHTS_").map(Semantic::Weights)),
    }
}

/// Positions, optional normals and u32 indices of one decoded primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
}

pub trait MeshDecoder: Send + Sync {
    fn decode(&self, compressed: &[u8], layout: &DracoLayout) -> Result<DecodedGeometry, LoadError>;
}

struct StreamReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> StreamReader<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], LoadError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                LoadError::decode(format!(
                    "decoded draco stream too short for {what}: need {len} bytes at {}, have {}",
                    self.offset,
                    self.bytes.len()
                ))
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }
}

fn read_vec3(slice: &[u8], attr: &DracoAttribute) -> Result<Vec<[f32; 3]>, LoadError> {
    if attr.components < 3 {
        return Err(LoadError::decode(format!(
            "draco attribute {} has {} components, expected 3",
            attr.id, attr.components
        )));
    }
    let stride = attr.components * attr.component.size();
    let component = |c: &[u8], i: usize| -> f32 {
        let at = i * attr.component.size();
        match attr.component {
            ComponentType::F32 => f32::from_le_bytes([c[at], c[at + 1], c[at + 2], c[at + 3]]),
            ComponentType::I16 => {
                let v = i16::from_le_bytes([c[at], c[at + 1]]) as f32;
                if attr.normalized { (v / 32767.0).max(-1.0) } else { v }
            }
            ComponentType::U16 => {
                let v = u16::from_le_bytes([c[at], c[at + 1]]) as f32;
                if attr.normalized { v / 65535.0 } else { v }
            }
            ComponentType::I8 => {
                let v = c[at] as i8 as f32;
                if attr.normalized { (v / 127.0).max(-1.0) } else { v }
            }
            ComponentType::U8 => {
                let v = c[at] as f32;
                if attr.normalized { v / 255.0 } else { v }
            }
            ComponentType::U32 => {
                u32::from_le_bytes([c[at], c[at + 1], c[at + 2], c[at + 3]]) as f32
            }
        }
    };
    Ok(slice
        .chunks_exact(stride)
        .map(|c| [component(c, 0), component(c, 1), component(c, 2)])
        .collect())
}

/// Split the flat decoder output into geometry: indices first, then each
/// attribute in id order, tightly packed.
pub fn parse_decoded_stream(bytes: &[u8], layout: &DracoLayout) -> Result<DecodedGeometry, LoadError> {
    let mut reader = StreamReader { bytes, offset: 0 };
    let index_count = layout.index_count as usize;

    let indices: Vec<u32> = if layout.wide_indices() {
        reader
            .take(index_count * 4, "indices")?
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    } else {
        reader
            .take(index_count * 2, "indices")?
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]) as u32)
            .collect()
    };

    let vertex_count = layout.vertex_count as usize;
    let mut positions = None;
    let mut normals = None;
    for attr in &layout.attributes {
        let len = vertex_count * attr.components * attr.component.size();
        let slice = reader.take(len, "attribute")?;
        match attr.semantic {
            DracoSemantic::Position => positions = Some(read_vec3(slice, attr)?),
            DracoSemantic::Normal => normals = Some(read_vec3(slice, attr)?),
            DracoSemantic::Other => {}
        }
    }

    let positions = positions.ok_or_else(|| LoadError::decode("decoded draco stream has no POSITION"))?;
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(LoadError::decode(format!(
            "decoded draco index {bad} out of range for {} vertices",
            positions.len()
        )));
    }

    Ok(DecodedGeometry {
        positions,
        normals,
        indices,
    })
}

/// Decoder backed by the native Draco library.
#[cfg(feature = "draco")]
pub struct NativeDracoDecoder;

#[cfg(feature = "draco")]
impl MeshDecoder for NativeDracoDecoder {
    fn decode(&self, compressed: &[u8], layout: &DracoLayout) -> Result<DecodedGeometry, LoadError> {
        use anyhow::Context;
        use draco_decoder::{AttributeDataType, MeshDecodeConfig, decode_mesh};

        let mut config = MeshDecodeConfig::new(layout.vertex_count, layout.index_count);
        for attr in &layout.attributes {
            let ty = match attr.component {
                ComponentType::I8 => AttributeDataType::Int8,
                ComponentType::U8 => AttributeDataType::UInt8,
                ComponentType::I16 => AttributeDataType::Int16,
                ComponentType::U16 => AttributeDataType::UInt16,
                ComponentType::U32 => AttributeDataType::UInt32,
                ComponentType::F32 => AttributeDataType::Float32,
            };
            config.add_attribute(attr.components as u32, ty);
        }

        let decoded = pollster::block_on(decode_mesh(compressed, &config))
            .context("draco native decode failed")
            .map_err(|e| LoadError::decode(format!("{e:#}")))?;
        parse_decoded_stream(&decoded, layout)
    }
}

/// Decoder available in this build, if any.
pub fn default_decoder() -> Option<Arc<dyn MeshDecoder>> {
    #[cfg(feature = "draco")]
    {
        Some(Arc::new(NativeDracoDecoder))
    }
    #[cfg(not(feature = "draco"))]
    {
        None
    }
}
