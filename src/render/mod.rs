//! Renderer side of the image pipeline: resolving requests into textures and
//! painting the resolved layout to a terminal.

mod terminal;
mod texture;

pub use terminal::{RendererSettings, TerminalRenderer};
pub use texture::{ImageResolver, TextureCache};
