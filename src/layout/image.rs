use crate::display::{BufferHandle, DisplayId};

use super::command::LayoutDisplayRole;

/// Renderer-assigned texture handle.
pub type TextureId = u32;

/// Per-frame request asking the renderer to upload/bind a display's image.
///
/// The request names the buffer by handle; it never borrows registry memory,
/// so it cannot outlive the frame's view of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayImageRequest {
    width: u32,
    height: u32,
    slot: usize,
    role: LayoutDisplayRole,
    buffer: BufferHandle,
}

impl DisplayImageRequest {
    pub fn new(
        width: u32,
        height: u32,
        buffer: BufferHandle,
        slot: usize,
        role: LayoutDisplayRole,
    ) -> Self {
        Self {
            width,
            height,
            slot,
            role,
            buffer,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ring position the image is destined for.
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn role(&self) -> LayoutDisplayRole {
        self.role
    }

    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    /// Registry display the buffer belongs to.
    pub fn source(&self) -> DisplayId {
        self.buffer.display
    }
}

/// Result of a completed upload, consumed once by the layout next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayImageResponse {
    texture: TextureId,
    slot: usize,
    role: LayoutDisplayRole,
}

impl DisplayImageResponse {
    pub fn new(texture: TextureId, slot: usize, role: LayoutDisplayRole) -> Self {
        Self {
            texture,
            slot,
            role,
        }
    }

    pub fn for_request(texture: TextureId, request: &DisplayImageRequest) -> Self {
        Self::new(texture, request.slot, request.role)
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn role(&self) -> LayoutDisplayRole {
        self.role
    }
}
