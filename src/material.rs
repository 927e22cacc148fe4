//! Page materials and texture binding.
//!
//! Textures are opaque handles owned by the host. The core only decides
//! which slot a handle goes into and how bright the print faces glow.

use crate::error::{Result, StorybookError};
use crate::geometry::{BACK_MATERIAL, FRONT_MATERIAL};
use std::collections::HashMap;

/// Opaque reference to a texture loaded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Resolves texture ids to handles.
pub trait TextureProvider {
    fn texture(&self, id: &str) -> Option<TextureHandle>;
}

impl TextureProvider for HashMap<String, TextureHandle> {
    fn texture(&self, id: &str) -> Option<TextureHandle> {
        self.get(id).copied()
    }
}

/// Assigns sequential handles to texture ids as the host preloads them.
#[derive(Debug, Clone, Default)]
pub struct TextureRegistry {
    handles: HashMap<String, TextureHandle>,
    ids: Vec<String>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every id in order.
    pub fn preloaded<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for id in ids {
            registry.register(id);
        }
        registry
    }

    /// Register an id, returning its existing handle if already known.
    pub fn register(&mut self, id: impl Into<String>) -> TextureHandle {
        let id = id.into();
        if let Some(handle) = self.handles.get(&id) {
            return *handle;
        }
        let handle = TextureHandle(self.ids.len() as u32);
        self.handles.insert(id.clone(), handle);
        self.ids.push(id);
        handle
    }

    /// Id a handle was registered under.
    pub fn id(&self, handle: TextureHandle) -> Option<&str> {
        self.ids.get(handle.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl TextureProvider for TextureRegistry {
    fn texture(&self, id: &str) -> Option<TextureHandle> {
        self.handles.get(id).copied()
    }
}

/// Material state of one mesh face group.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSlot {
    /// Linear RGB base colour.
    pub color: [f32; 3],
    pub roughness: f32,
    /// Texture id this slot prints, if any.
    pub texture_id: Option<String>,
    /// Bound texture; `None` when the id could not be resolved.
    pub map: Option<TextureHandle>,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
}

impl MaterialSlot {
    fn plain(color: [f32; 3]) -> Self {
        Self {
            color,
            roughness: 1.0,
            texture_id: None,
            map: None,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
        }
    }

    fn print(texture_id: &str) -> Self {
        Self {
            roughness: 0.1,
            texture_id: Some(texture_id.to_string()),
            ..Self::plain(WHITE)
        }
    }
}

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
// #111 in linear space.
const EDGE: [f32; 3] = [0.005_605, 0.005_605, 0.005_605];

/// The six material slots of a page mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMaterials {
    slots: [MaterialSlot; 6],
}

impl PageMaterials {
    /// Plain edges plus two print slots for the given texture ids, unbound.
    pub fn new(front: &str, back: &str) -> Self {
        Self {
            slots: [
                MaterialSlot::plain(WHITE),
                MaterialSlot::plain(EDGE),
                MaterialSlot::plain(WHITE),
                MaterialSlot::plain(WHITE),
                MaterialSlot::print(front),
                MaterialSlot::print(back),
            ],
        }
    }

    pub fn slots(&self) -> &[MaterialSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&MaterialSlot> {
        self.slots.get(index)
    }

    pub fn front(&self) -> &MaterialSlot {
        &self.slots[FRONT_MATERIAL]
    }

    pub fn back(&self) -> &MaterialSlot {
        &self.slots[BACK_MATERIAL]
    }

    /// Resolve one print slot's texture.
    pub fn bind_slot(&mut self, index: usize, provider: &dyn TextureProvider) -> Result<()> {
        let slot = &mut self.slots[index];
        let Some(id) = slot.texture_id.as_deref() else {
            return Ok(());
        };
        match provider.texture(id) {
            Some(handle) => {
                slot.map = Some(handle);
                Ok(())
            }
            None => {
                slot.map = None;
                Err(StorybookError::MissingAsset(id.to_string()))
            }
        }
    }

    /// Resolve both print slots. Each slot binds independently, so one
    /// missing texture does not leave the other face blank.
    pub fn bind_textures(&mut self, provider: &dyn TextureProvider) -> Vec<StorybookError> {
        [FRONT_MATERIAL, BACK_MATERIAL]
            .into_iter()
            .filter_map(|index| self.bind_slot(index, provider).err())
            .collect()
    }

    pub fn emissive_intensity(&self) -> f32 {
        self.slots[FRONT_MATERIAL].emissive_intensity
    }

    /// Write the highlight glow to both print faces.
    pub fn set_emissive_intensity(&mut self, intensity: f32) {
        self.slots[FRONT_MATERIAL].emissive_intensity = intensity;
        self.slots[BACK_MATERIAL].emissive_intensity = intensity;
    }
}
