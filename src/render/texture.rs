use std::collections::HashMap;

use blake3::Hash;

use crate::display::{DisplayId, DisplayRegistry};
use crate::error::Result;
use crate::layout::{DisplayImageRequest, DisplayImageResponse, TextureId};

/// Turns a frame's image requests into responses, synchronously.
pub trait ImageResolver {
    fn resolve(
        &mut self,
        displays: &DisplayRegistry,
        requests: &[DisplayImageRequest],
    ) -> Result<Vec<DisplayImageResponse>>;
}

#[derive(Debug, Clone)]
struct TextureEntry {
    texture: TextureId,
    generation: u64,
    digest: Hash,
    brightness: u8,
}

/// One texture per display. Buffer reallocation gets a fresh texture; an
/// unchanged frame digest skips the upload entirely.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<DisplayId, TextureEntry>,
    next_texture: TextureId,
    uploads: u64,
    last_skipped: usize,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture_for(&self, display: DisplayId) -> Option<TextureId> {
        self.entries.get(&display).map(|entry| entry.texture)
    }

    /// Mean channel value of the last uploaded frame.
    pub fn brightness(&self, display: DisplayId) -> Option<u8> {
        self.entries.get(&display).map(|entry| entry.brightness)
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Uploads skipped during the most recent `resolve`.
    pub fn last_skipped(&self) -> usize {
        self.last_skipped
    }

    fn allocate(&mut self) -> TextureId {
        self.next_texture = self.next_texture.wrapping_add(1);
        self.next_texture
    }
}

impl ImageResolver for TextureCache {
    fn resolve(
        &mut self,
        displays: &DisplayRegistry,
        requests: &[DisplayImageRequest],
    ) -> Result<Vec<DisplayImageResponse>> {
        self.last_skipped = 0;
        let mut responses = Vec::with_capacity(requests.len());

        for request in requests {
            let handle = request.buffer();
            displays.validate(handle)?;
            let digest = displays.frame_digest(handle.display)?;

            let texture = match self.entries.get(&handle.display) {
                Some(entry) if entry.generation == handle.generation && entry.digest == digest => {
                    self.last_skipped += 1;
                    entry.texture
                }
                Some(entry) if entry.generation == handle.generation => {
                    let texture = entry.texture;
                    self.upload(displays, request, texture, digest)?;
                    texture
                }
                _ => {
                    let texture = self.allocate();
                    self.upload(displays, request, texture, digest)?;
                    texture
                }
            };
            responses.push(DisplayImageResponse::for_request(texture, request));
        }

        Ok(responses)
    }
}

impl TextureCache {
    fn upload(
        &mut self,
        displays: &DisplayRegistry,
        request: &DisplayImageRequest,
        texture: TextureId,
        digest: Hash,
    ) -> Result<()> {
        let handle = request.buffer();
        let data = displays.display_data(handle.display)?;
        let brightness = if data.is_empty() {
            0
        } else {
            (data.iter().map(|byte| *byte as u64).sum::<u64>() / data.len() as u64) as u8
        };
        self.entries.insert(
            handle.display,
            TextureEntry {
                texture,
                generation: handle.generation,
                digest,
                brightness,
            },
        );
        self.uploads = self.uploads.saturating_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayInfo;
    use crate::error::LayoutError;
    use crate::layout::LayoutDisplayRole;

    fn setup() -> DisplayRegistry {
        let mut registry = DisplayRegistry::new();
        registry.register(DisplayInfo::new("front", 2, 2, 1));
        registry.register(DisplayInfo::new("rear", 2, 2, 1));
        registry
    }

    fn request(displays: &DisplayRegistry, id: DisplayId, slot: usize) -> DisplayImageRequest {
        DisplayImageRequest::new(2, 2, displays.handle(id).unwrap(), slot, LayoutDisplayRole::Primary)
    }

    #[test]
    fn unchanged_frames_skip_upload() {
        let mut displays = setup();
        let mut cache = TextureCache::new();
        let requests = [request(&displays, 0, 0), request(&displays, 1, 1)];

        let first = cache.resolve(&displays, &requests).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].slot(), 1);
        assert_eq!(cache.uploads(), 2);

        let again = cache.resolve(&displays, &requests).unwrap();
        assert_eq!(cache.last_skipped(), 2);
        assert_eq!(again[0].texture(), first[0].texture());

        displays.update_frame(0, 2, 2, 1, vec![200; 4]).unwrap();
        cache.resolve(&displays, &requests).unwrap();
        assert_eq!(cache.last_skipped(), 1);
        assert_eq!(cache.uploads(), 3);
        assert_eq!(cache.brightness(0), Some(200));
    }

    #[test]
    fn reallocation_gets_a_new_texture() {
        let mut displays = setup();
        let mut cache = TextureCache::new();
        let before = cache.resolve(&displays, &[request(&displays, 0, 0)]).unwrap();

        displays.update_frame(0, 4, 1, 1, vec![1; 4]).unwrap();
        let after = cache.resolve(&displays, &[request(&displays, 0, 0)]).unwrap();
        assert_ne!(before[0].texture(), after[0].texture());
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut displays = setup();
        let mut cache = TextureCache::new();
        let stale = request(&displays, 1, 0);
        displays.update_frame(1, 1, 1, 1, vec![0]).unwrap();

        assert!(matches!(
            cache.resolve(&displays, &[stale]),
            Err(LayoutError::StaleReference { display: 1, .. })
        ));
    }
}
