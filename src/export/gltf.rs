//! glTF/GLB export of a posed, skinned page.
//!
//! Node layout: node 0 is the page group (carrying the depth offset), node 1
//! the skinned mesh, nodes 2.. the bone chain. Each material group becomes
//! one primitive sharing the vertex attributes. Print textures are
//! referenced by URI, not embedded.

use crate::book::Book;
use crate::config::CatalogConfig;
use crate::error::{Result, StorybookError};
use crate::geometry::Mesh;
use crate::material::PageMaterials;
use crate::skeleton::Skeleton;
use crate::types::BoundingBox;
use gltf_json as json;
use json::accessor::{ComponentType, Type};
use json::mesh::Semantic;
use json::validation::Checked::Valid;
use json::validation::USize64;

/// Everything needed to export one page.
pub struct PageExport<'a> {
    pub mesh: &'a Mesh,
    pub skeleton: &'a Skeleton,
    pub materials: &'a PageMaterials,
    pub catalog: &'a CatalogConfig,
    /// Z offset of the page group.
    pub depth_offset: f32,
}

/// Export one page of a book in its current pose.
pub fn export_page_glb(book: &Book, number: usize) -> Result<Vec<u8>> {
    let page = book.page(number).ok_or(StorybookError::OutOfRangeIndex {
        index: number,
        page_count: book.page_count(),
    })?;

    export_glb(&PageExport {
        mesh: book.mesh(),
        skeleton: page.skeleton(),
        materials: page.materials(),
        catalog: &book.config().catalog,
        depth_offset: book.depth_offset(number),
    })
}

/// Export a skinned page to GLB format (binary glTF).
pub fn export_glb(page: &PageExport<'_>) -> Result<Vec<u8>> {
    let mesh = page.mesh;
    let skeleton = page.skeleton;
    if mesh.is_empty() || mesh.groups.is_empty() {
        return Err(StorybookError::Export("Cannot export empty mesh".to_string()));
    }
    if skeleton.bone_count() == 0 {
        return Err(StorybookError::Export("Cannot export a page without bones".to_string()));
    }

    let mut buffer_data: Vec<u8> = Vec::new();
    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();

    let vertex_count = mesh.vertex_count();
    let bounds = BoundingBox::from_points(mesh.vertices.iter().map(|v| v.position))
        .unwrap_or(BoundingBox::new([0.0; 3], [0.0; 3]));

    // Vertex attributes: one view and accessor each.
    let attributes = [
        (Semantic::Positions, Type::Vec3, ComponentType::F32, f32_bytes(&mesh.positions_flat())),
        (Semantic::Normals, Type::Vec3, ComponentType::F32, f32_bytes(&mesh.normals_flat())),
        (Semantic::TexCoords(0), Type::Vec2, ComponentType::F32, f32_bytes(&mesh.uvs_flat())),
        (Semantic::Joints(0), Type::Vec4, ComponentType::U16, u16_bytes(&mesh.joints_flat())),
        (Semantic::Weights(0), Type::Vec4, ComponentType::F32, f32_bytes(&mesh.weights_flat())),
    ];

    let mut attribute_map = std::collections::BTreeMap::new();
    for (semantic, type_, component_type, bytes) in attributes {
        let view = push_view(&mut buffer_data, &mut buffer_views, &bytes, Some(json::buffer::Target::ArrayBuffer));
        let (min, max) = if semantic == Semantic::Positions {
            (Some(bounds.min.to_vec()), Some(bounds.max.to_vec()))
        } else {
            (None, None)
        };
        attribute_map.insert(Valid(semantic), json::Index::new(accessors.len() as u32));
        accessors.push(create_accessor(view, vertex_count, type_, component_type, min, max));
    }

    // One primitive per material group.
    let mut primitives = Vec::new();
    for group in &mesh.groups {
        let indices = mesh.group_indices(group);
        let view = push_view(
            &mut buffer_data,
            &mut buffer_views,
            &u32_bytes(indices),
            Some(json::buffer::Target::ElementArrayBuffer),
        );
        let accessor = accessors.len() as u32;
        accessors.push(create_accessor(view, indices.len(), Type::Scalar, ComponentType::U32, None, None));

        primitives.push(json::mesh::Primitive {
            attributes: attribute_map.clone(),
            extensions: Default::default(),
            extras: Default::default(),
            indices: Some(json::Index::new(accessor)),
            material: Some(json::Index::new(group.material as u32)),
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        });
    }

    // Inverse bind matrices, column-major.
    let matrices: Vec<f32> = skeleton
        .inverse_bind_matrices()
        .iter()
        .flat_map(|m| m.to_cols_array())
        .collect();
    let ibm_view = push_view(&mut buffer_data, &mut buffer_views, &f32_bytes(&matrices), None);
    let ibm_accessor = accessors.len() as u32;
    accessors.push(create_accessor(ibm_view, skeleton.bone_count(), Type::Mat4, ComponentType::F32, None, None));

    let (materials, images, textures) = build_materials(page.materials, page.catalog);

    // Nodes: group, mesh, then bones in chain order.
    const FIRST_BONE: u32 = 2;
    let mut nodes = vec![
        json::Node {
            children: Some(vec![json::Index::new(1), json::Index::new(FIRST_BONE)]),
            translation: Some([0.0, 0.0, page.depth_offset]),
            ..empty_node()
        },
        json::Node {
            mesh: Some(json::Index::new(0)),
            skin: Some(json::Index::new(0)),
            ..empty_node()
        },
    ];
    let bone_count = skeleton.bone_count();
    for (i, bone) in skeleton.bones().iter().enumerate() {
        let children = (i + 1 < bone_count).then(|| vec![json::Index::new(FIRST_BONE + i as u32 + 1)]);
        let rotation = bone.rotation.to_quat();
        nodes.push(json::Node {
            children,
            translation: Some(bone.offset.to_array()),
            rotation: Some(json::scene::UnitQuaternion(rotation.to_array())),
            ..empty_node()
        });
    }

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(buffer_data.len() as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        images,
        samplers: vec![json::texture::Sampler {
            mag_filter: Some(Valid(json::texture::MagFilter::Linear)),
            min_filter: Some(Valid(json::texture::MinFilter::LinearMipmapLinear)),
            wrap_s: Valid(json::texture::WrappingMode::ClampToEdge),
            wrap_t: Valid(json::texture::WrappingMode::ClampToEdge),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        textures,
        materials,
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives,
            weights: None,
        }],
        skins: vec![json::Skin {
            extensions: Default::default(),
            extras: Default::default(),
            inverse_bind_matrices: Some(json::Index::new(ibm_accessor)),
            joints: (0..bone_count as u32)
                .map(|i| json::Index::new(FIRST_BONE + i))
                .collect(),
            skeleton: Some(json::Index::new(FIRST_BONE)),
        }],
        nodes,
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| StorybookError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    Ok(assemble_glb(json_string.as_bytes(), &buffer_data))
}

/// Six materials matching the page slots; print slots reference their texture.
fn build_materials(
    page_materials: &PageMaterials,
    catalog: &CatalogConfig,
) -> (Vec<json::Material>, Vec<json::Image>, Vec<json::Texture>) {
    let mut materials = Vec::new();
    let mut images = Vec::new();
    let mut textures = Vec::new();

    for slot in page_materials.slots() {
        let base_color_texture = match (&slot.texture_id, slot.map) {
            (Some(id), Some(_)) => {
                let index = textures.len() as u32;
                images.push(json::Image {
                    buffer_view: None,
                    mime_type: None,
                    uri: Some(catalog.texture_uri(id)),
                    extensions: Default::default(),
                    extras: Default::default(),
                });
                textures.push(json::Texture {
                    sampler: Some(json::Index::new(0)),
                    source: json::Index::new(index),
                    extensions: Default::default(),
                    extras: Default::default(),
                });
                Some(json::texture::Info {
                    index: json::Index::new(index),
                    tex_coord: 0,
                    extensions: Default::default(),
                    extras: Default::default(),
                })
            }
            _ => None,
        };

        let [r, g, b] = slot.color;
        let emissive = slot.emissive.map(|c| c * slot.emissive_intensity);
        materials.push(json::Material {
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_texture,
                base_color_factor: json::material::PbrBaseColorFactor([r, g, b, 1.0]),
                metallic_factor: json::material::StrengthFactor(0.0),
                roughness_factor: json::material::StrengthFactor(slot.roughness),
                metallic_roughness_texture: None,
                extensions: Default::default(),
                extras: Default::default(),
            },
            alpha_mode: Valid(json::material::AlphaMode::Opaque),
            alpha_cutoff: None,
            double_sided: false,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: json::material::EmissiveFactor(emissive),
            extensions: Default::default(),
            extras: Default::default(),
        });
    }

    (materials, images, textures)
}

/// Wrap JSON and binary chunks into a GLB container.
fn assemble_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(0x20u8).take(json_padding));

    // BIN Chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat(0u8).take(buffer_padding));

    glb
}

/// Append bytes as a new buffer view and return its index.
fn push_view(
    buffer: &mut Vec<u8>,
    views: &mut Vec<json::buffer::View>,
    bytes: &[u8],
    target: Option<json::buffer::Target>,
) -> u32 {
    let padding = (4 - (buffer.len() % 4)) % 4;
    buffer.extend(std::iter::repeat(0u8).take(padding));
    let offset = buffer.len();
    buffer.extend_from_slice(bytes);
    views.push(json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(bytes.len() as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: target.map(Valid),
    });
    (views.len() - 1) as u32
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: Type,
    component_type: ComponentType,
    min: Option<Vec<f32>>,
    max: Option<Vec<f32>>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(json::Value::from),
        max: max.map(json::Value::from),
        normalized: false,
        sparse: None,
    }
}

fn empty_node() -> json::Node {
    json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: None,
        rotation: None,
        scale: None,
        translation: None,
        skin: None,
        weights: None,
    }
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn u16_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn u32_bytes(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
