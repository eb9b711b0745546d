//! Owner of the active layout: selection, input forwarding and the per-frame
//! draw step.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::display::DisplayRegistry;
use crate::error::Result;
use crate::geometry::Rect;
use crate::layout::variants::InactiveLayout;
use crate::layout::{
    DisplayImageRequest, DisplayImageResponse, Layout, LayoutParams, LayoutType, ParamsUi,
    build_layout,
};
use crate::logging::{LAYOUT_TARGET, LogLevel, Logger, event_with_fields, json_kv, json_str};
use crate::metrics::ConsoleMetrics;

/// Coordinates layout construction, activation and event routing.
pub struct LayoutManager {
    params: LayoutParams,
    active: Box<dyn Layout>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<ConsoleMetrics>>>,
}

impl LayoutManager {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            params,
            active: Box::new(InactiveLayout::new()),
            logger: None,
            metrics: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Mutex<ConsoleMetrics>>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn active(&self) -> &dyn Layout {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> &mut dyn Layout {
        self.active.as_mut()
    }

    pub fn active_type(&self) -> LayoutType {
        self.active.layout_type()
    }

    /// Replace the active layout. Grab/clutch state and display bounds carry
    /// over; on failure the current layout stays active.
    pub fn select(&mut self, layout_type: LayoutType, displays: &DisplayRegistry) -> Result<()> {
        let mut next = match build_layout(layout_type, displays, &self.params) {
            Ok(layout) => layout,
            Err(err) => {
                self.log(
                    LogLevel::Warn,
                    "layout_select_failed",
                    [
                        json_str("layout", layout_type.name()),
                        json_str("error", err.to_string()),
                    ],
                );
                return Err(err);
            }
        };

        let previous = self.active.core();
        let (grabbing, clutching, bounds) = (
            previous.grabbing(),
            previous.clutching(),
            previous.display_bounds(),
        );
        let from = previous.layout_name();
        let core = next.core_mut();
        core.set_grabbing_state(grabbing);
        core.set_clutching_state(clutching);
        core.set_display_bounds(bounds);

        self.log(
            LogLevel::Info,
            "layout_selected",
            [
                json_str("from", from),
                json_str("layout", layout_type.name()),
                json_kv("displays", displays.len()),
            ],
        );
        self.active = next;
        if let Some(metrics) = &self.metrics {
            if let Ok(mut metrics) = metrics.lock() {
                metrics.record_layout_switch();
            }
        }
        Ok(())
    }

    pub fn set_display_bounds(&mut self, bounds: Rect) {
        self.active.core_mut().set_display_bounds(bounds);
    }

    pub fn set_grabbing_state(&mut self, state: bool) {
        self.active.core_mut().set_grabbing_state(state);
    }

    pub fn set_clutching_state(&mut self, state: bool) {
        self.active.core_mut().set_clutching_state(state);
    }

    pub fn handle_key_input(&mut self, key: &KeyEvent) -> Result<()> {
        self.active.handle_key_input(key)
    }

    pub fn handle_string_input(&mut self, input: &str) -> Result<()> {
        self.active.handle_string_input(input)
    }

    pub fn handle_collision_message(&mut self, message: &str) -> Result<()> {
        self.active.handle_collision_message(message)
    }

    pub fn tick(&mut self, elapsed: Duration) {
        self.active.tick(elapsed);
    }

    /// Consume last frame's responses, then draw this frame.
    pub fn frame(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.active.handle_image_response();
        self.active.draw(displays)
    }

    pub fn take_image_requests(&mut self) -> Vec<DisplayImageRequest> {
        self.active.core_mut().take_image_requests()
    }

    pub fn push_image_responses(&mut self, responses: impl IntoIterator<Item = DisplayImageResponse>) {
        let core = self.active.core_mut();
        for response in responses {
            core.push_image_response(response);
        }
    }

    pub fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        self.active.display_layout_params(ui, displays)
    }

    fn log<const N: usize>(
        &self,
        level: LogLevel,
        message: &str,
        fields: [(String, serde_json::Value); N],
    ) {
        if let Some(logger) = &self.logger {
            let _ = logger.log_event(event_with_fields(level, LAYOUT_TARGET, message, fields));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayInfo;
    use crate::error::LayoutError;
    use crate::layout::LayoutDisplayRole;
    use crate::logging::MemorySink;

    fn registry(count: usize) -> DisplayRegistry {
        let mut registry = DisplayRegistry::new();
        for ix in 0..count {
            registry.register(DisplayInfo::new(format!("cam{ix}"), 32, 24, 3));
        }
        registry
    }

    #[test]
    fn starts_inactive_and_draws_nothing() {
        let displays = registry(2);
        let mut manager = LayoutManager::new(LayoutParams::default());
        assert_eq!(manager.active_type(), LayoutType::Inactive);
        manager.frame(&displays).unwrap();
        assert!(manager.take_image_requests().is_empty());
    }

    #[test]
    fn select_carries_state_and_bounds() {
        let displays = registry(3);
        let mut manager = LayoutManager::new(LayoutParams::default());
        manager.set_grabbing_state(true);
        manager.set_display_bounds(Rect::new(0, 0, 40, 20));
        manager.select(LayoutType::Split, &displays).unwrap();

        let core = manager.active().core();
        assert!(core.grabbing());
        assert_eq!(core.display_bounds(), Rect::new(0, 0, 40, 20));

        manager.frame(&displays).unwrap();
        assert_eq!(manager.take_image_requests().len(), 2);
    }

    #[test]
    fn failed_select_keeps_current_layout() {
        let displays = registry(1);
        let sink = MemorySink::new();
        let metrics = Arc::new(Mutex::new(ConsoleMetrics::new()));
        let mut manager = LayoutManager::new(LayoutParams::default())
            .with_logger(Logger::new(sink.clone()))
            .with_metrics(metrics.clone());

        manager.select(LayoutType::Dynamic, &displays).unwrap();
        let err = manager.select(LayoutType::Wide, &displays).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidIndex { index: 1, len: 1 }));
        assert_eq!(manager.active_type(), LayoutType::Dynamic);

        assert_eq!(sink.matching("layout_selected").len(), 1);
        assert_eq!(sink.matching("layout_select_failed").len(), 1);
        let snapshot = metrics.lock().unwrap().snapshot(Duration::ZERO);
        assert_eq!(snapshot.layout_switches, 1);
    }

    #[test]
    fn responses_reach_the_active_layout() {
        let displays = registry(2);
        let mut manager = LayoutManager::new(LayoutParams::default());
        manager.select(LayoutType::Pip, &displays).unwrap();
        manager.frame(&displays).unwrap();

        let requests = manager.take_image_requests();
        manager.push_image_responses(
            requests
                .iter()
                .enumerate()
                .map(|(ix, request)| DisplayImageResponse::for_request(ix as u32, request)),
        );
        assert_eq!(manager.active().core().pending_image_responses(), 2);
        manager.frame(&displays).unwrap();
        assert_eq!(manager.active().core().pending_image_responses(), 0);

        manager.handle_string_input("toggle").unwrap();
        assert_eq!(
            manager
                .active()
                .core()
                .ring(LayoutDisplayRole::Primary)
                .get(0)
                .unwrap(),
            1
        );
    }
}
