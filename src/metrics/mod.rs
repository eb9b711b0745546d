use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters for the frame pipeline.
#[derive(Debug, Default, Clone)]
pub struct ConsoleMetrics {
    frames: u64,
    events: u64,
    commands: u64,
    image_requests: u64,
    image_responses: u64,
    uploads_skipped: u64,
    layout_switches: u64,
}

impl ConsoleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self) {
        self.events = self.events.saturating_add(1);
    }

    pub fn record_command(&mut self) {
        self.commands = self.commands.saturating_add(1);
    }

    /// One drawn frame and the requests and responses it exchanged.
    pub fn record_frame(&mut self, requests: usize, responses: usize) {
        self.frames = self.frames.saturating_add(1);
        self.image_requests = self.image_requests.saturating_add(requests as u64);
        self.image_responses = self.image_responses.saturating_add(responses as u64);
    }

    pub fn record_skipped_uploads(&mut self, count: usize) {
        if count > 0 {
            self.uploads_skipped = self.uploads_skipped.saturating_add(count as u64);
        }
    }

    pub fn record_layout_switch(&mut self) {
        self.layout_switches = self.layout_switches.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            frames: self.frames,
            events: self.events,
            commands: self.commands,
            image_requests: self.image_requests,
            image_responses: self.image_responses,
            uploads_skipped: self.uploads_skipped,
            layout_switches: self.layout_switches,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub frames: u64,
    pub events: u64,
    pub commands: u64,
    pub image_requests: u64,
    pub image_responses: u64,
    pub uploads_skipped: u64,
    pub layout_switches: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "console_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("frames".to_string(), json!(self.frames));
        map.insert("events".to_string(), json!(self.events));
        map.insert("commands".to_string(), json!(self.commands));
        map.insert("image_requests".to_string(), json!(self.image_requests));
        map.insert("image_responses".to_string(), json!(self.image_responses));
        map.insert("uploads_skipped".to_string(), json!(self.uploads_skipped));
        map.insert("layout_switches".to_string(), json!(self.layout_switches));
        map
    }
}
