//! Operator input: key bindings, switch debouncing and controller messages.

mod controller;
mod keys;
mod switch;

pub use controller::{ControllerState, ControllerUpdate, parse_controller_message};
pub use keys::{default_key_command, digit_key, is_press};
pub use switch::{DEFAULT_DOUBLE_PRESS_WINDOW, Switch, SwitchMode};
