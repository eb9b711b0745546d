use crate::error::{LayoutError, Result};

use super::switch::{Switch, SwitchMode};

/// Decoded controller message.
///
/// Messages are `key=value;` token streams, e.g.
/// `grab=1; clutch=0; offset=0.1,0,-0.2; cmd=primary_next;`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerUpdate {
    pub grab: Option<bool>,
    pub clutch: Option<bool>,
    pub manual: Option<bool>,
    pub offset: Option<[f32; 3]>,
    /// Layout command tokens in arrival order, untranslated.
    pub commands: Vec<String>,
}

pub fn parse_controller_message(message: &str) -> Result<ControllerUpdate> {
    let mut update = ControllerUpdate::default();

    for raw in message.split(';') {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }

        let (key, value) = token.split_once('=').ok_or_else(|| {
            LayoutError::ControllerInput(format!("token `{token}` is missing `=`"))
        })?;
        let key = key.trim();
        let value = value.trim();

        match key {
            "grab" => update.grab = Some(parse_flag(key, value)?),
            "clutch" => update.clutch = Some(parse_flag(key, value)?),
            "manual" => update.manual = Some(parse_flag(key, value)?),
            "offset" => update.offset = Some(parse_vector(value)?),
            "cmd" => update.commands.push(value.to_string()),
            other => {
                return Err(LayoutError::ControllerInput(format!(
                    "unknown controller key `{other}`"
                )));
            }
        }
    }

    Ok(update)
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        _ => Err(LayoutError::ControllerInput(format!(
            "`{key}` expects a flag, got `{value}`"
        ))),
    }
}

fn parse_vector(value: &str) -> Result<[f32; 3]> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(LayoutError::ControllerInput(format!(
            "offset expects three components, got `{value}`"
        )));
    }
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse::<f32>().map_err(|err| {
            LayoutError::ControllerInput(format!("bad offset component `{part}`: {err}"))
        })?;
    }
    Ok(out)
}

/// Robot-side operator state fed by controller messages.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub manual_adj: Switch,
    pub clutching: Switch,
    pub grabbing: Switch,
    pub manual_offset: [f32; 3],
    pub clutch_offset: [f32; 3],
    pub initialized: bool,
    pub dynamic_valid: bool,
    pub static_valid: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            manual_adj: Switch::new(false, SwitchMode::Hold),
            clutching: Switch::new(false, SwitchMode::Single),
            grabbing: Switch::new(false, SwitchMode::Hold),
            manual_offset: [0.0; 3],
            clutch_offset: [0.0; 3],
            initialized: false,
            dynamic_valid: false,
            static_valid: false,
        }
    }
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one decoded message; returns the command tokens it carried.
    pub fn apply(&mut self, update: ControllerUpdate) -> Vec<String> {
        self.initialized = true;

        if let Some(manual) = update.manual {
            self.manual_adj.update_signal(manual);
        }
        if let Some(clutch) = update.clutch {
            self.clutching.update_signal(clutch);
            if self.clutching.confirm_flip_on() {
                self.clutch_offset = self.manual_offset;
            }
        }
        if let Some(grab) = update.grab {
            self.grabbing.update_signal(grab);
        }
        if let Some(offset) = update.offset {
            if self.manual_adj.is_on() {
                self.manual_offset = offset;
            }
        }

        update.commands
    }

    pub fn is_grabbing(&self) -> bool {
        self.grabbing.is_on()
    }

    pub fn is_clutching(&self) -> bool {
        self.clutching.is_on()
    }

    pub fn status_line(&self) -> String {
        let [x, y, z] = self.manual_offset;
        format!(
            "Manual Adj: {} ({x:.3}, {y:.3}, {z:.3}) · Clutch: {}",
            self.manual_adj.as_str(),
            self.clutching.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_message() {
        let update =
            parse_controller_message("grab=1; clutch=off; offset=0.5, 0, -1; cmd=primary_next;")
                .unwrap();
        assert_eq!(update.grab, Some(true));
        assert_eq!(update.clutch, Some(false));
        assert_eq!(update.offset, Some([0.5, 0.0, -1.0]));
        assert_eq!(update.commands, vec!["primary_next".to_string()]);
        assert_eq!(update.manual, None);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            parse_controller_message("laser=1;"),
            Err(LayoutError::ControllerInput(_))
        ));
        assert!(parse_controller_message("grab").is_err());
        assert!(parse_controller_message("grab=maybe").is_err());
        assert!(parse_controller_message("offset=1,2").is_err());
    }

    #[test]
    fn unknown_command_tokens_pass_through() {
        let update = parse_controller_message("cmd=do_a_barrel_roll").unwrap();
        assert_eq!(update.commands, vec!["do_a_barrel_roll".to_string()]);
    }

    #[test]
    fn validity_flags_start_false() {
        let state = ControllerState::new();
        assert!(!state.dynamic_valid);
        assert!(!state.static_valid);
        assert!(!state.initialized);
    }

    #[test]
    fn clutch_toggles_and_snapshots_offset() {
        let mut state = ControllerState::new();
        state.apply(parse_controller_message("manual=1; offset=1,2,3").unwrap());
        assert_eq!(state.manual_offset, [1.0, 2.0, 3.0]);

        state.apply(parse_controller_message("clutch=1").unwrap());
        assert!(state.is_clutching());
        assert_eq!(state.clutch_offset, [1.0, 2.0, 3.0]);

        state.apply(parse_controller_message("clutch=0").unwrap());
        assert!(state.is_clutching());
        state.apply(parse_controller_message("clutch=1").unwrap());
        assert!(!state.is_clutching());
    }

    #[test]
    fn offset_ignored_without_manual_adjust() {
        let mut state = ControllerState::new();
        let commands = state.apply(parse_controller_message("offset=4,4,4; cmd=toggle").unwrap());
        assert_eq!(state.manual_offset, [0.0; 3]);
        assert_eq!(commands, vec!["toggle".to_string()]);
        assert!(state.status_line().contains("Clutch: off"));
    }
}
