use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use serde::Serialize;
use serde_json::json;

use crate::config::ConsoleConfig;
use crate::display::{DisplayId, DisplayRegistry, SharedDisplays};
use crate::error::{LayoutError, Result};
use crate::geometry::{Rect, Size};
use crate::input::{ControllerState, is_press, parse_controller_message};
use crate::layout::{LayoutCommand, LayoutType, translate_string_input_to_command};
use crate::logging::{LogLevel, Logger, METRICS_TARGET, RUNTIME_TARGET, event_with_fields, json_kv};
use crate::manager::LayoutManager;
use crate::metrics::ConsoleMetrics;
use crate::render::{ImageResolver, TerminalRenderer, TextureCache};

pub mod driver;

/// Configuration knobs for the runtime loop.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Interval between frames.
    pub frame_interval: Duration,
    /// Optional structured logger used by the runtime.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<ConsoleMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: METRICS_TARGET.to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(ConsoleMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<ConsoleMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Events driving the console loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    Tick { elapsed: Duration },
    Key(KeyEvent),
    /// Layout command token, e.g. `primary_next`.
    Command(String),
    /// Raw controller message in `key=value;` form.
    Controller(String),
    Collision(String),
    SelectLayout(LayoutType),
    Resize(Size),
    Exit,
}

/// Snapshot reported to remote operators after each batch of events.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleStatus {
    pub layout: String,
    pub scoreboard: Vec<(String, bool)>,
    pub active_display: Option<DisplayId>,
    pub frames: Vec<DisplayId>,
    pub controller: String,
}

pub struct ConsoleRuntime {
    manager: LayoutManager,
    displays: SharedDisplays,
    controller: ControllerState,
    textures: TextureCache,
    renderer: TerminalRenderer,
    config: RuntimeConfig,
    size: Size,
    should_exit: bool,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl ConsoleRuntime {
    pub fn new(manager: LayoutManager, displays: SharedDisplays, initial_size: Size) -> Self {
        let mut runtime = Self {
            manager,
            displays,
            controller: ControllerState::new(),
            textures: TextureCache::new(),
            renderer: TerminalRenderer::with_default(),
            config: RuntimeConfig::default(),
            size: initial_size,
            should_exit: false,
            start_instant: None,
            last_metrics_emit: None,
        };
        runtime.apply_size(initial_size);
        runtime
    }

    /// Build a runtime from a console configuration and select its default
    /// layout.
    pub fn from_config(
        console: &ConsoleConfig,
        displays: SharedDisplays,
        initial_size: Size,
        config: RuntimeConfig,
    ) -> Result<Self> {
        let mut manager = LayoutManager::new(console.layouts.clone());
        if let Some(logger) = &config.logger {
            manager = manager.with_logger(logger.clone());
        }
        if let Some(metrics) = config.metrics_handle() {
            manager = manager.with_metrics(metrics);
        }

        let mut runtime = Self::new(manager, displays, initial_size);
        runtime.config = config;
        runtime.config.frame_interval = console.frame_interval()?;
        runtime.select_layout(console.default_layout)?;
        Ok(runtime)
    }

    pub fn config_mut(&mut self) -> &mut RuntimeConfig {
        &mut self.config
    }

    pub fn renderer_mut(&mut self) -> &mut TerminalRenderer {
        &mut self.renderer
    }

    pub fn manager(&self) -> &LayoutManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut LayoutManager {
        &mut self.manager
    }

    pub fn controller(&self) -> &ControllerState {
        &self.controller
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn displays(&self) -> SharedDisplays {
        Arc::clone(&self.displays)
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn select_layout(&mut self, layout_type: LayoutType) -> Result<()> {
        let shared = Arc::clone(&self.displays);
        let displays = read_displays(&shared)?;
        self.manager.select(layout_type, &displays)
    }

    pub fn resize(&mut self, size: Size) {
        self.apply_size(size);
        self.log_runtime_event(
            LogLevel::Info,
            "resized",
            [
                json_kv("width", json!(size.width)),
                json_kv("height", json!(size.height)),
            ],
        );
    }

    pub fn status(&self) -> ConsoleStatus {
        let core = self.manager.active().core();
        ConsoleStatus {
            layout: core.layout_name().to_string(),
            scoreboard: core
                .scoreboard()
                .iter()
                .map(|(label, state)| (label.to_string(), state))
                .collect(),
            active_display: core.active_display(),
            frames: core.frame_sources().to_vec(),
            controller: self.controller.status_line(),
        }
    }

    pub fn run(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.bootstrap(stdout)?;
        let mut last_tick = Instant::now();

        while !self.should_exit {
            let timeout = self
                .config
                .frame_interval
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                if let Some(runtime_event) = map_event(event::read()?) {
                    self.dispatch_event(runtime_event)?;
                }
                if self.should_exit {
                    break;
                }
            }

            if last_tick.elapsed() >= self.config.frame_interval {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick);
                last_tick = now;
                self.dispatch_event(RuntimeEvent::Tick { elapsed })?;
                self.render_frame(stdout)?;
            }

            self.maybe_emit_metrics();
        }

        self.finalize();
        Ok(())
    }

    /// Deterministic loop: a frame is rendered after every tick event.
    pub fn run_scripted<I>(&mut self, stdout: &mut impl Write, events: I) -> Result<()>
    where
        I: IntoIterator<Item = RuntimeEvent>,
    {
        self.bootstrap(stdout)?;
        for event in events {
            let tick = matches!(event, RuntimeEvent::Tick { .. });
            self.dispatch_event(event)?;
            if self.should_exit {
                break;
            }
            if tick {
                self.render_frame(stdout)?;
            }
        }
        self.finalize();
        Ok(())
    }

    pub fn dispatch_event(&mut self, event: RuntimeEvent) -> Result<()> {
        let kind = describe_event(&event);
        let quiet = match &event {
            RuntimeEvent::Tick { .. } => true,
            RuntimeEvent::Command(token) => {
                translate_string_input_to_command(token) == LayoutCommand::Invalid
            }
            _ => false,
        };
        match event {
            RuntimeEvent::Tick { elapsed } => self.manager.tick(elapsed),
            RuntimeEvent::Key(key) => self.handle_key(&key)?,
            RuntimeEvent::Command(token) => self.forward_command(&token)?,
            RuntimeEvent::Controller(message) => self.handle_controller(&message)?,
            RuntimeEvent::Collision(message) => {
                self.log_runtime_event(
                    LogLevel::Warn,
                    "collision_reported",
                    [json_kv("message", json!(message))],
                );
                self.manager.handle_collision_message(&message)?;
            }
            RuntimeEvent::SelectLayout(layout_type) => self.try_select(layout_type),
            RuntimeEvent::Resize(size) => self.resize(size),
            RuntimeEvent::Exit => self.request_exit(),
        }

        self.record_metric(ConsoleMetrics::record_event);
        if !quiet {
            self.log_runtime_event(
                LogLevel::Debug,
                "event_dispatched",
                [json_kv("event", json!(kind))],
            );
        }
        Ok(())
    }

    /// Draw the active layout, resolve its image requests and paint the frame.
    /// The registry read lock is held from draw until the responses exist.
    pub fn render_frame(&mut self, stdout: &mut impl Write) -> Result<()> {
        let shared = Arc::clone(&self.displays);
        let responses = {
            let displays = read_displays(&shared)?;
            self.manager.frame(&displays)?;
            let requests = self.manager.take_image_requests();
            let responses = self.textures.resolve(&displays, &requests)?;
            self.renderer
                .render(stdout, self.manager.active(), &displays, &self.textures)?;

            let (requested, resolved) = (requests.len(), responses.len());
            let skipped = self.textures.last_skipped();
            self.record_metric(|metrics| {
                metrics.record_frame(requested, resolved);
                metrics.record_skipped_uploads(skipped);
            });
            responses
        };
        self.manager.push_image_responses(responses);
        Ok(())
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Result<()> {
        if !is_press(key) {
            return Ok(());
        }
        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c'));
        match key.code {
            _ if ctrl_c => self.request_exit(),
            KeyCode::Char('q') | KeyCode::Esc => self.request_exit(),
            KeyCode::F(n @ 1..=10) => self.try_select(LayoutType::from_index(n as i32 - 1)),
            _ => self.manager.handle_key_input(key)?,
        }
        Ok(())
    }

    fn handle_controller(&mut self, message: &str) -> Result<()> {
        let update = match parse_controller_message(message) {
            Ok(update) => update,
            Err(err) => {
                self.log_runtime_event(
                    LogLevel::Warn,
                    "controller_message_rejected",
                    [json_kv("error", json!(err.to_string()))],
                );
                return Ok(());
            }
        };

        let commands = self.controller.apply(update);
        self.manager
            .set_grabbing_state(self.controller.is_grabbing());
        self.manager
            .set_clutching_state(self.controller.is_clutching());
        for token in commands {
            self.forward_command(&token)?;
        }
        Ok(())
    }

    /// Unknown tokens are dropped without being counted or logged.
    fn forward_command(&mut self, token: &str) -> Result<()> {
        if translate_string_input_to_command(token) == LayoutCommand::Invalid {
            return Ok(());
        }
        self.record_metric(ConsoleMetrics::record_command);
        self.manager.handle_string_input(token)
    }

    fn try_select(&mut self, layout_type: LayoutType) {
        // The manager logs failures and keeps the current layout.
        let _ = self.select_layout(layout_type);
    }

    fn request_exit(&mut self) {
        self.should_exit = true;
        self.log_runtime_event(LogLevel::Info, "exit_requested", []);
    }

    /// The bottom row is reserved for the status line.
    fn apply_size(&mut self, size: Size) {
        self.size = size;
        let bounds = Rect::new(0, 0, size.width, size.height.saturating_sub(1));
        self.manager.set_display_bounds(bounds);
    }

    fn bootstrap(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.should_exit = false;
        self.ensure_metrics_initialized();
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);

        let display_count = read_displays(&self.displays)?.len();
        self.log_runtime_event(
            LogLevel::Info,
            "runtime_started",
            [
                json_kv("layout", json!(self.manager.active_type().name())),
                json_kv("displays", json!(display_count)),
                json_kv("width", json!(self.size.width)),
                json_kv("height", json!(self.size.height)),
            ],
        );
        self.render_frame(stdout)
    }

    fn finalize(&mut self) {
        let uptime_ms = self
            .start_instant
            .map(|start| start.elapsed().as_millis())
            .unwrap_or(0);
        self.log_runtime_event(
            LogLevel::Info,
            "runtime_stopped",
            [json_kv("uptime_ms", json!(uptime_ms))],
        );
    }

    fn ensure_metrics_initialized(&mut self) {
        if self.config.metrics.is_none() && !self.config.metrics_interval.is_zero() {
            self.config.enable_metrics();
        }
    }

    fn log_runtime_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, RUNTIME_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn record_metric(&self, record: impl FnOnce(&mut ConsoleMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut guard);
            }
        }
    }

    fn maybe_emit_metrics(&mut self) {
        if self.config.metrics.is_none() || self.config.metrics_interval.is_zero() {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < self.config.metrics_interval => return,
            _ => self.last_metrics_emit = Some(now),
        }

        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();

        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let target = self.config.metrics_target.as_str();
                let _ = logger.log_event(guard.snapshot(uptime).to_log_event(target));
            }
        }
    }
}

fn read_displays(
    shared: &SharedDisplays,
) -> Result<std::sync::RwLockReadGuard<'_, DisplayRegistry>> {
    shared
        .read()
        .map_err(|_| LayoutError::Backend("display registry lock poisoned".to_string()))
}

fn map_event(event: CrosstermEvent) -> Option<RuntimeEvent> {
    match event {
        CrosstermEvent::Key(key) => Some(RuntimeEvent::Key(key)),
        CrosstermEvent::Resize(width, height) => Some(RuntimeEvent::Resize(Size::new(width, height))),
        _ => None,
    }
}

fn describe_event(event: &RuntimeEvent) -> &'static str {
    match event {
        RuntimeEvent::Tick { .. } => "tick",
        RuntimeEvent::Key(_) => "key",
        RuntimeEvent::Command(_) => "command",
        RuntimeEvent::Controller(_) => "controller",
        RuntimeEvent::Collision(_) => "collision",
        RuntimeEvent::SelectLayout(_) => "select_layout",
        RuntimeEvent::Resize(_) => "resize",
        RuntimeEvent::Exit => "exit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayInfo, shared_displays};
    use crate::layout::{LayoutDisplayRole, LayoutParams};
    use crate::logging::MemorySink;

    fn runtime(count: usize) -> ConsoleRuntime {
        let mut registry = DisplayRegistry::new();
        for ix in 0..count {
            registry.register(DisplayInfo::new(format!("cam{ix}"), 4, 4, 1));
        }
        let mut runtime = ConsoleRuntime::new(
            LayoutManager::new(LayoutParams::default()),
            shared_displays(registry),
            Size::new(40, 12),
        );
        runtime.config_mut().metrics_interval = Duration::ZERO;
        runtime
    }

    fn tick() -> RuntimeEvent {
        RuntimeEvent::Tick {
            elapsed: Duration::from_millis(33),
        }
    }

    fn key(code: KeyCode) -> RuntimeEvent {
        RuntimeEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn function_keys_select_layouts() {
        let mut runtime = runtime(3);
        let mut out = Vec::new();
        runtime
            .run_scripted(&mut out, [key(KeyCode::F(7)), tick()])
            .unwrap();

        assert_eq!(runtime.manager().active_type(), LayoutType::Split);
        assert_eq!(runtime.status().frames, vec![0, 1]);
        assert_eq!(
            runtime.manager().active().core().display_bounds(),
            Rect::new(0, 0, 40, 11)
        );
    }

    #[test]
    fn responses_from_one_frame_feed_the_next() {
        let mut runtime = runtime(2);
        runtime.select_layout(LayoutType::Pip).unwrap();
        let mut out = Vec::new();
        runtime.run_scripted(&mut out, [tick()]).unwrap();

        assert_eq!(runtime.manager().active().core().pending_image_responses(), 2);
        assert_eq!(runtime.textures().uploads(), 2);

        runtime.render_frame(&mut out).unwrap();
        assert_eq!(runtime.manager().active().core().pending_image_responses(), 2);
        assert_eq!(runtime.textures().uploads(), 2);
        assert_eq!(runtime.textures().last_skipped(), 2);
    }

    #[test]
    fn controller_messages_drive_scoreboard_and_commands() {
        let mut runtime = runtime(3);
        runtime.select_layout(LayoutType::Wide).unwrap();
        let mut out = Vec::new();
        runtime
            .run_scripted(
                &mut out,
                [
                    RuntimeEvent::Controller("grab=1; clutch=1; cmd=primary_next".into()),
                    RuntimeEvent::Controller("laser=on".into()),
                    tick(),
                ],
            )
            .unwrap();

        let status = runtime.status();
        assert!(status.scoreboard.contains(&("Suction".to_string(), true)));
        assert!(status.scoreboard.contains(&("Robot".to_string(), false)));
        assert_eq!(
            runtime
                .manager()
                .active()
                .core()
                .ring(LayoutDisplayRole::Primary)
                .get(0)
                .unwrap(),
            0
        );
    }

    #[test]
    fn exit_keys_stop_the_loop() {
        let sink = MemorySink::new();
        let mut runtime = runtime(1);
        runtime.config_mut().logger = Some(Logger::new(sink.clone()));
        let mut out = Vec::new();
        runtime
            .run_scripted(
                &mut out,
                [
                    RuntimeEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
                    RuntimeEvent::Command("primary_next".into()),
                ],
            )
            .unwrap();

        assert!(runtime.should_exit());
        assert_eq!(sink.matching("exit_requested").len(), 1);
        assert_eq!(sink.matching("runtime_stopped").len(), 1);
        assert!(sink.matching("event_dispatched").len() == 1);
    }

    #[test]
    fn unknown_command_tokens_are_not_logged() {
        let sink = MemorySink::new();
        let mut runtime = runtime(2);
        runtime.config_mut().logger = Some(Logger::new(sink.clone()));
        runtime.config_mut().enable_metrics();
        let metrics = runtime.config_mut().metrics_handle().unwrap();
        runtime.select_layout(LayoutType::Wide).unwrap();
        let mut out = Vec::new();
        runtime
            .run_scripted(
                &mut out,
                [
                    RuntimeEvent::Command("warp_drive".into()),
                    RuntimeEvent::Controller("cmd=warp_drive".into()),
                    RuntimeEvent::Command("primary_next".into()),
                ],
            )
            .unwrap();

        let dispatched = sink.matching("event_dispatched");
        assert_eq!(dispatched.len(), 2);
        assert_eq!(dispatched[0]["fields"]["event"], "controller");
        assert_eq!(dispatched[1]["fields"]["event"], "command");
        assert!(sink.lines().iter().all(|line| !line.contains("warp_drive")));
        assert_eq!(metrics.lock().unwrap().snapshot(Duration::ZERO).commands, 1);
    }

    #[test]
    fn config_selects_default_layout() {
        let console = ConsoleConfig::from_json_str(
            r#"{"loop_rate": 10, "default_layout": "twinned",
                "displays": [{"name": "a", "width": 2, "height": 2},
                             {"name": "b", "width": 2, "height": 2}]}"#,
        )
        .unwrap();
        let runtime = ConsoleRuntime::from_config(
            &console,
            shared_displays(console.build_registry()),
            Size::new(40, 12),
            RuntimeConfig::default(),
        )
        .unwrap();

        assert_eq!(runtime.manager().active_type(), LayoutType::Twinned);
        assert_eq!(runtime.config.frame_interval, Duration::from_millis(100));
    }

    #[test]
    fn failed_selection_keeps_running() {
        let mut runtime = runtime(1);
        runtime.select_layout(LayoutType::Dynamic).unwrap();
        runtime.dispatch_event(RuntimeEvent::SelectLayout(LayoutType::Wide)).unwrap();
        assert_eq!(runtime.manager().active_type(), LayoutType::Dynamic);
        assert!(!runtime.should_exit());
    }
}
