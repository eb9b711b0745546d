//! Display registry: the set of live video sources the layouts draw from.
//!
//! The registry owns every image buffer. Layouts never hold buffer
//! references; they address frames through [`BufferHandle`]s that carry the
//! buffer generation they were issued against.

mod registry;

pub use registry::{
    BufferHandle, DisplayId, DisplayInfo, DisplayRegistry, IDENTITY_MATRIX, SharedDisplays,
    shared_displays,
};
