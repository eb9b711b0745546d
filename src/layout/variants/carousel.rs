use std::time::Duration;

use crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};

use crate::display::DisplayRegistry;
use crate::error::Result;
use crate::layout::command::{LayoutCommand, LayoutDisplayRole, LayoutType};
use crate::layout::component::LayoutComponent;
use crate::layout::core::{Layout, LayoutCore};
use crate::layout::params::ParamsUi;

use super::{key_command, push_navigation, seed_ring};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselParams {
    pub primary_display: usize,
    pub strip_len: usize,
    /// Auto-advance period; zero disables auto-advance.
    pub interval_ms: u64,
}

impl Default for CarouselParams {
    fn default() -> Self {
        Self {
            primary_display: 0,
            strip_len: 3,
            interval_ms: 5000,
        }
    }
}

/// Large view of the ring head above a strip of the cameras queued next.
#[derive(Debug, Clone)]
pub struct CarouselLayout {
    core: LayoutCore,
    strip_len: usize,
    interval: Duration,
    since_advance: Duration,
    paused: bool,
}

impl CarouselLayout {
    pub fn new(params: &CarouselParams, displays: &DisplayRegistry) -> Result<Self> {
        let mut core = LayoutCore::new(LayoutType::Carousel);
        seed_ring(
            &mut core,
            LayoutDisplayRole::Primary,
            &[params.primary_display],
            displays,
        )?;
        Ok(Self {
            core,
            strip_len: params.strip_len,
            interval: Duration::from_millis(params.interval_ms),
            since_advance: Duration::ZERO,
            paused: false,
        })
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn strip_height(&self) -> u16 {
        (self.core.display_bounds().height / 4).max(1)
    }
}

impl Layout for CarouselLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.core.begin_draw();
        let strip = LayoutComponent::row(
            (1..=self.strip_len)
                .map(LayoutComponent::primary)
                .collect(),
        )
        .with_size(0, self.strip_height());
        let carousel = LayoutComponent::column(vec![LayoutComponent::primary(0), strip]);
        self.core.emit_display(carousel, displays)?;
        self.core.end_draw();
        Ok(())
    }

    fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        let state = if self.paused { "paused" } else { "running" };
        ui.text(&format!(
            "Carousel every {} ms ({state})",
            self.interval.as_millis()
        ));
        self.core.draw_display_params(
            ui,
            displays,
            &[LayoutDisplayRole::Primary],
            &[("Main Display", LayoutDisplayRole::Primary, 0)],
        )
    }

    fn handle_key_input(&mut self, key: &KeyEvent) -> Result<()> {
        match key_command(key) {
            Some(command) => self.handle_command(command),
            None => Ok(()),
        }
    }

    fn handle_command(&mut self, command: LayoutCommand) -> Result<()> {
        match command {
            LayoutCommand::Toggle => self.paused = !self.paused,
            LayoutCommand::PrimaryNext | LayoutCommand::PrimaryPrev => {
                self.since_advance = Duration::ZERO;
                push_navigation(&mut self.core, command);
            }
            other => push_navigation(&mut self.core, other),
        }
        Ok(())
    }

    fn tick(&mut self, elapsed: Duration) {
        if self.paused || self.interval.is_zero() {
            return;
        }
        self.since_advance += elapsed;
        while self.since_advance >= self.interval {
            self.since_advance -= self.interval;
            self.core
                .to_next_display_with_push(LayoutDisplayRole::Primary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::variants::fixtures::{bounds, registry};

    fn head(layout: &CarouselLayout) -> u32 {
        layout
            .core()
            .ring(LayoutDisplayRole::Primary)
            .get(0)
            .unwrap()
    }

    #[test]
    fn main_view_above_strip() {
        let displays = registry(5);
        let mut layout = CarouselLayout::new(&CarouselParams::default(), &displays).unwrap();
        layout.core_mut().set_display_bounds(bounds());
        layout.draw(&displays).unwrap();

        assert_eq!(layout.core().image_request_queue().len(), 4);
        let resolved = layout.core().resolved_components();
        assert_eq!(resolved[0].rect, Rect::new(0, 0, 80, 18));
        assert_eq!(resolved[1].rect, Rect::new(0, 18, 27, 6));
        assert_eq!(resolved[3].slot, 3);
    }

    #[test]
    fn advances_on_interval_and_pauses() {
        let displays = registry(3);
        let params = CarouselParams {
            interval_ms: 100,
            ..CarouselParams::default()
        };
        let mut layout = CarouselLayout::new(&params, &displays).unwrap();

        layout.tick(Duration::from_millis(60));
        assert_eq!(head(&layout), 0);
        layout.tick(Duration::from_millis(60));
        assert_eq!(head(&layout), 1);

        layout.handle_string_input("toggle").unwrap();
        assert!(layout.is_paused());
        layout.tick(Duration::from_millis(500));
        assert_eq!(head(&layout), 1);

        layout.handle_string_input("toggle").unwrap();
        layout.tick(Duration::from_millis(220));
        assert_eq!(head(&layout), 0);
    }

    #[test]
    fn short_ring_drops_missing_strip_cells() {
        let displays = registry(2);
        let mut layout = CarouselLayout::new(&CarouselParams::default(), &displays).unwrap();
        layout.draw(&displays).unwrap();
        assert_eq!(layout.core().image_request_queue().len(), 2);
    }
}
