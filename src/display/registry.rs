use std::sync::{Arc, RwLock};

use blake3::Hash;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Stable identifier of a registered display.
pub type DisplayId = u32;

/// Registry shared between the render loop and capture callbacks.
pub type SharedDisplays = Arc<RwLock<DisplayRegistry>>;

pub fn shared_displays(registry: DisplayRegistry) -> SharedDisplays {
    Arc::new(RwLock::new(registry))
}

/// Row-major 3x4 identity used when a display has no calibrated camera matrix.
pub const IDENTITY_MATRIX: [f32; 12] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0,
];

/// Static metadata describing a video source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayInfo {
    pub name: String,
    pub topic: String,
    pub display_name: String,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub matrix: Option<[f32; 12]>,
}

impl Default for DisplayInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            topic: String::new(),
            display_name: String::new(),
            width: 1024,
            height: 1024,
            channels: 3,
            matrix: None,
        }
    }
}

impl DisplayInfo {
    pub fn new(name: impl Into<String>, width: u32, height: u32, channels: u32) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            width,
            height,
            channels,
            ..Self::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_matrix(mut self, matrix: [f32; 12]) -> Self {
        self.matrix = Some(matrix);
        self
    }

    /// Name shown to the operator, falling back to the source name.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }
}

/// Borrow-by-handle reference to a registry buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    pub display: DisplayId,
    pub generation: u64,
}

#[derive(Debug, Clone)]
struct DisplayEntry {
    info: DisplayInfo,
    data: Vec<u8>,
    generation: u64,
    digest: Hash,
    frames: u64,
}

impl DisplayEntry {
    fn new(info: DisplayInfo) -> Self {
        let data = vec![0; info.buffer_len()];
        let digest = blake3::hash(&data);
        Self {
            info,
            data,
            generation: 0,
            digest,
            frames: 0,
        }
    }
}

/// Registry mapping display ids to their image buffers and metadata.
#[derive(Debug, Default)]
pub struct DisplayRegistry {
    entries: Vec<DisplayEntry>,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source with a zeroed buffer sized from its metadata.
    pub fn register(&mut self, info: DisplayInfo) -> DisplayId {
        let id = self.entries.len() as DisplayId;
        self.entries.push(DisplayEntry::new(info));
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DisplayId> + '_ {
        (0..self.entries.len()).map(|ix| ix as DisplayId)
    }

    pub fn contains(&self, id: DisplayId) -> bool {
        (id as usize) < self.entries.len()
    }

    /// Resolve a registry position to its display id.
    pub fn id_at(&self, ix: usize) -> Result<DisplayId> {
        if ix < self.entries.len() {
            Ok(ix as DisplayId)
        } else {
            Err(LayoutError::InvalidIndex {
                index: ix,
                len: self.entries.len(),
            })
        }
    }

    pub fn display_info(&self, id: DisplayId) -> Result<&DisplayInfo> {
        self.entry(id).map(|entry| &entry.info)
    }

    pub fn display_data(&self, id: DisplayId) -> Result<&[u8]> {
        self.entry(id).map(|entry| entry.data.as_slice())
    }

    pub fn display_matrix(&self, id: DisplayId) -> Result<[f32; 12]> {
        Ok(self.entry(id)?.info.matrix.unwrap_or(IDENTITY_MATRIX))
    }

    pub fn frame_digest(&self, id: DisplayId) -> Result<Hash> {
        self.entry(id).map(|entry| entry.digest)
    }

    pub fn frames_received(&self, id: DisplayId) -> Result<u64> {
        self.entry(id).map(|entry| entry.frames)
    }

    /// Current handle for a display's buffer.
    pub fn handle(&self, id: DisplayId) -> Result<BufferHandle> {
        let entry = self.entry(id)?;
        Ok(BufferHandle {
            display: id,
            generation: entry.generation,
        })
    }

    /// Reject handles issued before the buffer was last reallocated.
    pub fn validate(&self, handle: BufferHandle) -> Result<()> {
        let entry = self.entry(handle.display)?;
        if entry.generation != handle.generation {
            return Err(LayoutError::StaleReference {
                display: handle.display,
                issued: handle.generation,
                current: entry.generation,
            });
        }
        Ok(())
    }

    /// Store a decoded frame. A change in dimensions reallocates the buffer and
    /// bumps the generation, invalidating outstanding handles.
    pub fn update_frame(
        &mut self,
        id: DisplayId,
        width: u32,
        height: u32,
        channels: u32,
        data: Vec<u8>,
    ) -> Result<()> {
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(LayoutError::Backend(format!(
                "frame for display {id} holds {} bytes, expected {expected}",
                data.len()
            )));
        }

        let entry = self.entry_mut(id)?;
        let info = &mut entry.info;
        if info.width != width || info.height != height || info.channels != channels {
            info.width = width;
            info.height = height;
            info.channels = channels;
            entry.generation = entry.generation.saturating_add(1);
        }

        entry.digest = blake3::hash(&data);
        entry.data = data;
        entry.frames = entry.frames.saturating_add(1);
        Ok(())
    }

    fn entry(&self, id: DisplayId) -> Result<&DisplayEntry> {
        self.entries
            .get(id as usize)
            .ok_or(LayoutError::DisplayNotFound(id))
    }

    fn entry_mut(&mut self, id: DisplayId) -> Result<&mut DisplayEntry> {
        self.entries
            .get_mut(id as usize)
            .ok_or(LayoutError::DisplayNotFound(id))
    }
}
