use thiserror::Error;

use crate::display::DisplayId;

/// Unified result type for the console core.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by the layout engine and its collaborators.
///
/// Unrecognized command strings are not represented here; they translate to
/// [`LayoutCommand::Invalid`](crate::LayoutCommand::Invalid) and are dropped.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("index {index} out of range for length {len}")]
    InvalidIndex { index: usize, len: usize },
    #[error("invalid display role `{0}`")]
    InvalidRole(String),
    #[error("display {0} not found in registry")]
    DisplayNotFound(DisplayId),
    #[error("stale buffer reference for display {display}: issued at generation {issued}, registry at {current}")]
    StaleReference {
        display: DisplayId,
        issued: u64,
        current: u64,
    },
    #[error("controller input error: {0}")]
    ControllerInput(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
