//! Layout engine: display rings, component trees, the image request/response
//! mailboxes and the concrete layout variants.
//!
//! Callers import layout types from here while implementation details stay
//! in the private submodules.

mod command;
mod component;
mod core;
mod image;
mod params;
mod ring;
mod scoreboard;
pub mod variants;

pub use command::{LayoutCommand, LayoutDisplayRole, LayoutType, translate_string_input_to_command};
pub use component::{
    ComponentType, Direction, LayoutComponent, Positioning, ResolvedComponent, Spacing,
    resolve_components,
};
pub use self::core::{Layout, LayoutCore, ROBOT_LABEL, SUCTION_LABEL};
pub use image::{DisplayImageRequest, DisplayImageResponse, TextureId};
pub use params::{DisplayChoice, ParamsSnapshot, ParamsUi, RingEdit};
pub use ring::DisplayRing;
pub use scoreboard::Scoreboard;
pub use variants::{LayoutParams, build_layout};
