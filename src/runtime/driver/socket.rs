use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::LayoutError;
use crate::geometry::Size;
use crate::layout::LayoutType;
use crate::runtime::{ConsoleRuntime, ConsoleStatus, RuntimeConfig, RuntimeEvent};

pub type DriverResult<T> = std::result::Result<T, SocketDriverError>;

#[derive(Debug, Error)]
pub enum SocketDriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("runtime error: {0}")]
    Runtime(#[from] LayoutError),
}

/// Decodes inbound payloads into runtime events and encodes optional replies.
pub trait SocketStrategy {
    type Inbound: DeserializeOwned;
    type Outbound;

    fn decode(&self, payload: Self::Inbound) -> Result<Vec<RuntimeEvent>, SocketDriverError>;
    fn encode(&self, frame: Self::Outbound) -> Result<String, SocketDriverError>;
    fn after_events(&self, _runtime: &ConsoleRuntime) -> Option<Self::Outbound> {
        None
    }
}

/// Line-delimited TCP transport for remote operator stations. Serves one
/// connection, then returns.
pub struct SocketDriver<S: SocketStrategy> {
    listener: TcpListener,
    runtime: ConsoleRuntime,
    initial_size: Size,
    config: Option<RuntimeConfig>,
    strategy: S,
}

impl<S: SocketStrategy> SocketDriver<S> {
    pub fn bind<A>(
        addr: A,
        runtime: ConsoleRuntime,
        initial_size: Size,
        strategy: S,
    ) -> DriverResult<Self>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            listener,
            runtime,
            initial_size,
            config: None,
            strategy,
        })
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn local_addr(&self) -> DriverResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn run(mut self) -> DriverResult<()> {
        if let Some(config) = self.config.take() {
            *self.runtime.config_mut() = config;
        }
        if let Some(stream) = self.listener.incoming().next() {
            let stream = stream?;
            stream.set_nodelay(true).ok();
            self.runtime.resize(self.initial_size);

            let inbound = BufReader::new(stream.try_clone()?);
            for line in inbound.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let payload: S::Inbound = serde_json::from_str(&line)
                    .map_err(|err| SocketDriverError::Decode(err.to_string()))?;
                let events = self.strategy.decode(payload)?;
                let mut writer = stream.try_clone()?;
                self.runtime.run_scripted(&mut writer, events)?;
                if let Some(outbound) = self.strategy.after_events(&self.runtime) {
                    let encoded = self.strategy.encode(outbound)?;
                    if !encoded.is_empty() {
                        writer.write_all(encoded.as_bytes())?;
                        writer.write_all(b"\n")?;
                        writer.flush()?;
                    }
                }
                if self.runtime.should_exit() {
                    break;
                }
            }
        }
        Ok(())
    }
}

/// JSON events in, a [`ConsoleStatus`] line out after every batch.
pub struct JsonEventStrategy;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
pub enum JsonInbound {
    Key {
        code: String,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    Resize {
        width: u16,
        height: u16,
    },
    Tick {
        ms: u64,
    },
    Command {
        command: String,
    },
    Controller {
        message: String,
    },
    Collision {
        message: String,
    },
    Select {
        layout: LayoutType,
    },
    Exit,
}

impl SocketStrategy for JsonEventStrategy {
    type Inbound = JsonInbound;
    type Outbound = ConsoleStatus;

    fn decode(&self, payload: Self::Inbound) -> Result<Vec<RuntimeEvent>, SocketDriverError> {
        Ok(vec![match payload {
            JsonInbound::Key { code, modifiers } => {
                RuntimeEvent::Key(build_key_event(&code, &modifiers)?)
            }
            JsonInbound::Resize { width, height } => RuntimeEvent::Resize(Size::new(width, height)),
            JsonInbound::Tick { ms } => RuntimeEvent::Tick {
                elapsed: Duration::from_millis(ms),
            },
            JsonInbound::Command { command } => RuntimeEvent::Command(command),
            JsonInbound::Controller { message } => RuntimeEvent::Controller(message),
            JsonInbound::Collision { message } => RuntimeEvent::Collision(message),
            JsonInbound::Select { layout } => RuntimeEvent::SelectLayout(layout),
            JsonInbound::Exit => RuntimeEvent::Exit,
        }])
    }

    fn encode(&self, frame: Self::Outbound) -> Result<String, SocketDriverError> {
        serde_json::to_string(&frame).map_err(|err| SocketDriverError::Decode(err.to_string()))
    }

    fn after_events(&self, runtime: &ConsoleRuntime) -> Option<Self::Outbound> {
        Some(runtime.status())
    }
}

fn build_key_event(code: &str, modifiers: &[String]) -> Result<KeyEvent, SocketDriverError> {
    Ok(KeyEvent {
        code: parse_key_code(code)?,
        modifiers: parse_modifiers(modifiers),
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    })
}

fn parse_modifiers(modifiers: &[String]) -> KeyModifiers {
    let mut result = KeyModifiers::empty();
    for m in modifiers {
        match m.to_ascii_lowercase().as_str() {
            "control" | "ctrl" => result |= KeyModifiers::CONTROL,
            "alt" => result |= KeyModifiers::ALT,
            "shift" => result |= KeyModifiers::SHIFT,
            _ => {}
        }
    }
    result
}

fn parse_key_code(code: &str) -> Result<KeyCode, SocketDriverError> {
    let lower = code.to_ascii_lowercase();
    let key = match lower.as_str() {
        "enter" => KeyCode::Enter,
        "backspace" => KeyCode::Backspace,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        other => {
            let mut chars = code.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeyCode::Char(ch),
                _ => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    Some(n @ 1..=12) => KeyCode::F(n),
                    _ => return Err(SocketDriverError::Decode(format!("unknown key `{code}`"))),
                },
            }
        }
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayInfo, DisplayRegistry, shared_displays};
    use crate::layout::LayoutParams;
    use crate::manager::LayoutManager;

    #[test]
    fn parse_key_event_defaults_to_press() {
        let event = build_key_event("a", &["shift".into()]).unwrap();
        assert_eq!(event.kind, KeyEventKind::Press);
        assert_eq!(event.code, KeyCode::Char('a'));
        assert!(event.modifiers.contains(KeyModifiers::SHIFT));
    }

    #[test]
    fn function_and_named_keys() {
        assert_eq!(parse_key_code("F3").unwrap(), KeyCode::F(3));
        assert_eq!(parse_key_code("Left").unwrap(), KeyCode::Left);
        assert_eq!(parse_key_code("F").unwrap(), KeyCode::Char('F'));
        assert!(matches!(
            parse_key_code("hyper"),
            Err(SocketDriverError::Decode(_))
        ));
    }

    #[test]
    fn decodes_console_payloads() {
        let strategy = JsonEventStrategy;
        let decode = |line: &str| {
            let payload: JsonInbound = serde_json::from_str(line).unwrap();
            strategy.decode(payload).unwrap()
        };

        assert_eq!(
            decode(r#"{"type":"select","layout":"twinned_pip"}"#),
            vec![RuntimeEvent::SelectLayout(LayoutType::TwinnedPip)]
        );
        assert_eq!(
            decode(r#"{"type":"controller","message":"grab=1"}"#),
            vec![RuntimeEvent::Controller("grab=1".into())]
        );
        assert_eq!(
            decode(r#"{"type":"tick","ms":40}"#),
            vec![RuntimeEvent::Tick {
                elapsed: Duration::from_millis(40)
            }]
        );
        assert_eq!(decode(r#"{"type":"exit"}"#), vec![RuntimeEvent::Exit]);
    }

    #[test]
    fn status_frame_reports_layout() {
        let mut registry = DisplayRegistry::new();
        registry.register(DisplayInfo::new("front", 2, 2, 1));
        registry.register(DisplayInfo::new("rear", 2, 2, 1));
        let mut runtime = ConsoleRuntime::new(
            LayoutManager::new(LayoutParams::default()),
            shared_displays(registry),
            Size::new(20, 6),
        );
        runtime.select_layout(LayoutType::Wide).unwrap();

        let strategy = JsonEventStrategy;
        let status = strategy.after_events(&runtime).unwrap();
        let encoded = strategy.encode(status).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["layout"], "Wide Angle");
        assert_eq!(value["active_display"], serde_json::Value::Null);
    }
}
