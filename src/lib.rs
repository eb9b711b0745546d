//! Operator-console layout engine for multi-camera robot stations.
//!
//! Camera frames live in a [`DisplayRegistry`]; a [`LayoutManager`] owns the
//! active [`Layout`], which arranges cameras on screen and asks the renderer
//! for images once per frame. The [`ConsoleRuntime`] ties the two together
//! with keyboard, controller and socket input.

pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod logging;
pub mod manager;
pub mod metrics;
pub mod render;
pub mod runtime;
pub mod width;

pub use config::{ConsoleConfig, DisplayConfig};
pub use display::{BufferHandle, DisplayId, DisplayInfo, DisplayRegistry, SharedDisplays, shared_displays};
pub use error::{LayoutError, Result};
pub use geometry::{Rect, Size};
pub use input::{ControllerState, ControllerUpdate, Switch, SwitchMode, parse_controller_message};
pub use layout::{
    DisplayImageRequest, DisplayImageResponse, DisplayRing, Layout, LayoutCommand, LayoutCore,
    LayoutDisplayRole, LayoutParams, LayoutType, ParamsSnapshot, ParamsUi, Scoreboard, TextureId,
    build_layout, translate_string_input_to_command,
};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult};
pub use manager::LayoutManager;
pub use metrics::{ConsoleMetrics, MetricSnapshot};
pub use render::{ImageResolver, RendererSettings, TerminalRenderer, TextureCache};
pub use runtime::driver::cli::{CliDriver, CliDriverError, DriverResult};
pub use runtime::driver::socket::{JsonEventStrategy, SocketDriver, SocketDriverError, SocketStrategy};
pub use runtime::{ConsoleRuntime, ConsoleStatus, RuntimeConfig, RuntimeEvent};
pub use width::display_width;
