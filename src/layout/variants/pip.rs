//! Picture-in-picture family: a primary view with one or more secondary
//! thumbnails placed explicitly inside it.

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};

use crate::display::DisplayRegistry;
use crate::error::Result;
use crate::geometry::Rect;
use crate::layout::command::{LayoutCommand, LayoutDisplayRole, LayoutType};
use crate::layout::component::LayoutComponent;
use crate::layout::core::{Layout, LayoutCore};
use crate::layout::image::TextureId;
use crate::layout::params::ParamsUi;

use super::{key_command, push_navigation, seed_ring};

/// Cells between a thumbnail and the edge of its parent region.
pub const PIP_MARGIN: u16 = 1;

const DEFAULT_PIP_SCALE: f32 = 0.25;

/// Thumbnail rectangle, relative to `bounds`, anchored bottom-right.
pub fn pip_rect(bounds: Rect, scale: f32) -> Rect {
    let scale = if scale.is_finite() {
        scale.clamp(0.05, 1.0)
    } else {
        DEFAULT_PIP_SCALE
    };
    let width = scaled(bounds.width, scale);
    let height = scaled(bounds.height, scale);
    Rect::new(
        bounds.width.saturating_sub(width.saturating_add(PIP_MARGIN)),
        bounds.height.saturating_sub(height.saturating_add(PIP_MARGIN)),
        width,
        height,
    )
}

fn scaled(length: u16, scale: f32) -> u16 {
    ((length as f32 * scale).round() as u16).clamp(1, length.max(1)).min(length)
}

fn thumbnail(slot: usize, rect: Rect) -> LayoutComponent {
    LayoutComponent::secondary(slot)
        .with_size(rect.width, rect.height)
        .at(rect.x, rect.y)
}

/// Last texture received per `(role, slot)`, kept across frames so a
/// thumbnail can be repainted without a fresh upload.
#[derive(Debug, Clone, Default)]
struct TextureSlots {
    textures: HashMap<(LayoutDisplayRole, usize), TextureId>,
}

impl TextureSlots {
    fn absorb(&mut self, core: &mut LayoutCore) {
        for response in core.drain_image_responses() {
            self.textures
                .insert((response.role(), response.slot()), response.texture());
        }
    }

    fn get(&self, role: LayoutDisplayRole, slot: usize) -> Option<TextureId> {
        self.textures.get(&(role, slot)).copied()
    }
}

fn dispatch_key<L: Layout + ?Sized>(layout: &mut L, key: &KeyEvent) -> Result<()> {
    match key_command(key) {
        Some(command) => layout.handle_command(command),
        None => Ok(()),
    }
}

/// Toggle swaps the heads; everything else is push navigation.
fn pip_command(core: &mut LayoutCore, command: LayoutCommand) -> Result<()> {
    match command {
        LayoutCommand::Toggle => {
            let primary = core.ring(LayoutDisplayRole::Primary);
            let secondary = core.ring(LayoutDisplayRole::Secondary);
            if !primary.is_empty() && !secondary.is_empty() {
                core.swap_ring_heads()?;
            }
        }
        other => push_navigation(core, other),
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipParams {
    pub primary_display: usize,
    pub pip_display: usize,
    pub pip_scale: f32,
}

impl Default for PipParams {
    fn default() -> Self {
        Self {
            primary_display: 0,
            pip_display: 1,
            pip_scale: DEFAULT_PIP_SCALE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipLayout {
    core: LayoutCore,
    pip_scale: f32,
    textures: TextureSlots,
}

impl PipLayout {
    pub fn new(params: &PipParams, displays: &DisplayRegistry) -> Result<Self> {
        Self::build(LayoutType::Pip, params, displays)
    }

    fn build(layout_type: LayoutType, params: &PipParams, displays: &DisplayRegistry) -> Result<Self> {
        let mut core = LayoutCore::new(layout_type);
        seed_ring(
            &mut core,
            LayoutDisplayRole::Primary,
            &[params.primary_display],
            displays,
        )?;
        seed_ring(
            &mut core,
            LayoutDisplayRole::Secondary,
            &[params.pip_display],
            displays,
        )?;
        Ok(Self {
            core,
            pip_scale: params.pip_scale,
            textures: TextureSlots::default(),
        })
    }

    pub fn texture(&self, role: LayoutDisplayRole, slot: usize) -> Option<TextureId> {
        self.textures.get(role, slot)
    }

    fn draw_with(&mut self, displays: &DisplayRegistry, show_thumbnail: bool) -> Result<()> {
        self.core.begin_draw();
        self.core.emit_display(LayoutComponent::primary(0), displays)?;
        if show_thumbnail {
            let rect = pip_rect(self.core.display_bounds(), self.pip_scale);
            self.core.emit_display(thumbnail(0, rect), displays)?;
        }
        self.core.end_draw();
        Ok(())
    }

    fn params_panel(&mut self, ui: &mut dyn ParamsUi, displays: &DisplayRegistry) -> Result<()> {
        self.core.draw_display_params(
            ui,
            displays,
            &[LayoutDisplayRole::Primary, LayoutDisplayRole::Secondary],
            &[
                ("Main Display", LayoutDisplayRole::Primary, 0),
                ("Pip Display", LayoutDisplayRole::Secondary, 0),
            ],
        )
    }
}

impl Layout for PipLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.draw_with(displays, true)
    }

    fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        self.params_panel(ui, displays)
    }

    fn handle_key_input(&mut self, key: &KeyEvent) -> Result<()> {
        dispatch_key(self, key)
    }

    fn handle_command(&mut self, command: LayoutCommand) -> Result<()> {
        pip_command(&mut self.core, command)
    }

    fn handle_image_response(&mut self) {
        self.textures.absorb(&mut self.core);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimedPipParams {
    pub primary_display: usize,
    pub pip_display: usize,
    pub pip_scale: f32,
    pub duration_ms: u64,
}

impl Default for TimedPipParams {
    fn default() -> Self {
        Self {
            primary_display: 0,
            pip_display: 1,
            pip_scale: DEFAULT_PIP_SCALE,
            duration_ms: 3000,
        }
    }
}

/// Pip whose thumbnail appears for a while after the operator (or a
/// collision report) asks for it, then hides again.
#[derive(Debug, Clone)]
pub struct TimedPipLayout {
    pip: PipLayout,
    duration: Duration,
    remaining: Duration,
}

impl TimedPipLayout {
    pub fn new(params: &TimedPipParams, displays: &DisplayRegistry) -> Result<Self> {
        let pip = PipLayout::build(
            LayoutType::TimedPip,
            &PipParams {
                primary_display: params.primary_display,
                pip_display: params.pip_display,
                pip_scale: params.pip_scale,
            },
            displays,
        )?;
        Ok(Self {
            pip,
            duration: Duration::from_millis(params.duration_ms),
            remaining: Duration::ZERO,
        })
    }

    pub fn thumbnail_visible(&self) -> bool {
        !self.remaining.is_zero()
    }

    pub fn texture(&self, role: LayoutDisplayRole, slot: usize) -> Option<TextureId> {
        self.pip.texture(role, slot)
    }

    fn show_thumbnail(&mut self) {
        self.remaining = self.duration;
    }
}

impl Layout for TimedPipLayout {
    fn core(&self) -> &LayoutCore {
        &self.pip.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.pip.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        let visible = self.thumbnail_visible();
        self.pip.draw_with(displays, visible)
    }

    fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        ui.text(&format!("Thumbnail time: {} ms", self.duration.as_millis()));
        self.pip.params_panel(ui, displays)
    }

    fn handle_key_input(&mut self, key: &KeyEvent) -> Result<()> {
        dispatch_key(self, key)
    }

    fn handle_command(&mut self, command: LayoutCommand) -> Result<()> {
        if matches!(
            command,
            LayoutCommand::Toggle | LayoutCommand::SecondaryNext | LayoutCommand::SecondaryPrev
        ) {
            self.show_thumbnail();
        }
        pip_command(&mut self.pip.core, command)
    }

    fn handle_collision_message(&mut self, _message: &str) -> Result<()> {
        self.show_thumbnail();
        Ok(())
    }

    fn handle_image_response(&mut self) {
        self.pip.handle_image_response();
    }

    fn tick(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinnedPipParams {
    pub primary_display: usize,
    pub pip_displays: [usize; 2],
    pub pip_scale: f32,
}

impl Default for TwinnedPipParams {
    fn default() -> Self {
        Self {
            primary_display: 0,
            pip_displays: [1, 2],
            pip_scale: DEFAULT_PIP_SCALE,
        }
    }
}

/// Primary view with two thumbnails along the bottom edge.
#[derive(Debug, Clone)]
pub struct TwinnedPipLayout {
    core: LayoutCore,
    pip_scale: f32,
    textures: TextureSlots,
}

impl TwinnedPipLayout {
    pub fn new(params: &TwinnedPipParams, displays: &DisplayRegistry) -> Result<Self> {
        let mut core = LayoutCore::new(LayoutType::TwinnedPip);
        seed_ring(
            &mut core,
            LayoutDisplayRole::Primary,
            &[params.primary_display],
            displays,
        )?;
        seed_ring(
            &mut core,
            LayoutDisplayRole::Secondary,
            &params.pip_displays,
            displays,
        )?;
        Ok(Self {
            core,
            pip_scale: params.pip_scale,
            textures: TextureSlots::default(),
        })
    }

    pub fn texture(&self, role: LayoutDisplayRole, slot: usize) -> Option<TextureId> {
        self.textures.get(role, slot)
    }
}

impl Layout for TwinnedPipLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.core.begin_draw();
        self.core.emit_display(LayoutComponent::primary(0), displays)?;

        let right = pip_rect(self.core.display_bounds(), self.pip_scale);
        let left = Rect::new(
            right
                .x
                .saturating_sub(right.width.saturating_add(PIP_MARGIN)),
            right.y,
            right.width,
            right.height,
        );
        self.core.emit_display(thumbnail(0, right), displays)?;
        self.core.emit_display(thumbnail(1, left), displays)?;
        self.core.end_draw();
        Ok(())
    }

    fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        self.core.draw_display_params(
            ui,
            displays,
            &[LayoutDisplayRole::Primary, LayoutDisplayRole::Secondary],
            &[
                ("Main Display", LayoutDisplayRole::Primary, 0),
                ("Right Pip", LayoutDisplayRole::Secondary, 0),
                ("Left Pip", LayoutDisplayRole::Secondary, 1),
            ],
        )
    }

    fn handle_key_input(&mut self, key: &KeyEvent) -> Result<()> {
        dispatch_key(self, key)
    }

    fn handle_command(&mut self, command: LayoutCommand) -> Result<()> {
        pip_command(&mut self.core, command)
    }

    fn handle_image_response(&mut self) {
        self.textures.absorb(&mut self.core);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoublePipParams {
    pub primary_displays: [usize; 2],
    pub pip_displays: [usize; 2],
    pub pip_scale: f32,
}

impl Default for DoublePipParams {
    fn default() -> Self {
        Self {
            primary_displays: [0, 1],
            pip_displays: [1, 0],
            pip_scale: DEFAULT_PIP_SCALE,
        }
    }
}

/// Two side-by-side primaries, each carrying its own thumbnail.
#[derive(Debug, Clone)]
pub struct DoublePipLayout {
    core: LayoutCore,
    pip_scale: f32,
    textures: TextureSlots,
}

impl DoublePipLayout {
    pub fn new(params: &DoublePipParams, displays: &DisplayRegistry) -> Result<Self> {
        let mut core = LayoutCore::new(LayoutType::DoublePip);
        seed_ring(
            &mut core,
            LayoutDisplayRole::Primary,
            &params.primary_displays,
            displays,
        )?;
        seed_ring(
            &mut core,
            LayoutDisplayRole::Secondary,
            &params.pip_displays,
            displays,
        )?;
        Ok(Self {
            core,
            pip_scale: params.pip_scale,
            textures: TextureSlots::default(),
        })
    }

    pub fn texture(&self, role: LayoutDisplayRole, slot: usize) -> Option<TextureId> {
        self.textures.get(role, slot)
    }

    fn half(&self, slot: usize) -> LayoutComponent {
        let bounds = self.core.display_bounds();
        // Left half takes the odd column, matching the packer.
        let width = if slot == 0 {
            bounds.width - bounds.width / 2
        } else {
            bounds.width / 2
        };
        let rect = pip_rect(Rect::new(0, 0, width, bounds.height), self.pip_scale);
        LayoutComponent::row(vec![LayoutComponent::primary(slot), thumbnail(slot, rect)])
    }
}

impl Layout for DoublePipLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.core.begin_draw();
        let left = self.half(0);
        let right = self.half(1);
        self.core.emit_display(left, displays)?;
        self.core.emit_display(right, displays)?;
        self.core.end_draw();
        Ok(())
    }

    fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        self.core.draw_display_params(
            ui,
            displays,
            &[LayoutDisplayRole::Primary, LayoutDisplayRole::Secondary],
            &[
                ("Left Display", LayoutDisplayRole::Primary, 0),
                ("Left Pip", LayoutDisplayRole::Secondary, 0),
                ("Right Display", LayoutDisplayRole::Primary, 1),
                ("Right Pip", LayoutDisplayRole::Secondary, 1),
            ],
        )
    }

    fn handle_key_input(&mut self, key: &KeyEvent) -> Result<()> {
        dispatch_key(self, key)
    }

    fn handle_command(&mut self, command: LayoutCommand) -> Result<()> {
        match command {
            LayoutCommand::Toggle => {
                if self.core.ring(LayoutDisplayRole::Primary).len() > 1 {
                    self.core.swap_slots(LayoutDisplayRole::Primary, 0, 1)?;
                }
                Ok(())
            }
            other => {
                push_navigation(&mut self.core, other);
                Ok(())
            }
        }
    }

    fn handle_image_response(&mut self) {
        self.textures.absorb(&mut self.core);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::image::DisplayImageResponse;
    use crate::layout::variants::fixtures::{bounds, registry};

    fn sources(layout: &dyn Layout) -> Vec<(LayoutDisplayRole, usize, u32)> {
        layout
            .core()
            .image_request_queue()
            .iter()
            .map(|r| (r.role(), r.slot(), r.source()))
            .collect()
    }

    #[test]
    fn thumbnail_sits_bottom_right_inside_bounds() {
        let rect = pip_rect(bounds(), 0.25);
        assert_eq!(rect, Rect::new(59, 17, 20, 6));
        assert_eq!(pip_rect(Rect::new(0, 0, 0, 0), 0.25).width, 0);
    }

    #[test]
    fn pip_draws_primary_then_thumbnail() {
        let displays = registry(3);
        let mut layout = PipLayout::new(&PipParams::default(), &displays).unwrap();
        layout.core_mut().set_display_bounds(bounds());
        layout.draw(&displays).unwrap();

        assert_eq!(
            sources(&layout),
            vec![
                (LayoutDisplayRole::Primary, 0, 0),
                (LayoutDisplayRole::Secondary, 0, 1)
            ]
        );
        let resolved = layout.core().resolved_components();
        assert_eq!(resolved[0].rect, bounds());
        assert_eq!(resolved[1].rect, Rect::new(59, 17, 20, 6));
    }

    #[test]
    fn toggle_swaps_main_and_thumbnail() {
        let displays = registry(3);
        let mut layout = PipLayout::new(&PipParams::default(), &displays).unwrap();
        layout.handle_string_input("toggle").unwrap();
        layout.draw(&displays).unwrap();

        assert_eq!(
            sources(&layout),
            vec![
                (LayoutDisplayRole::Primary, 0, 1),
                (LayoutDisplayRole::Secondary, 0, 0)
            ]
        );
    }

    #[test]
    fn pip_remembers_textures_across_frames() {
        let displays = registry(2);
        let mut layout = PipLayout::new(&PipParams::default(), &displays).unwrap();
        layout.draw(&displays).unwrap();
        let requests = layout.core_mut().take_image_requests();
        for (texture, request) in requests.iter().enumerate() {
            layout
                .core_mut()
                .push_image_response(DisplayImageResponse::for_request(texture as u32 + 10, request));
        }

        layout.handle_image_response();
        assert_eq!(layout.core().pending_image_responses(), 0);
        assert_eq!(layout.texture(LayoutDisplayRole::Secondary, 0), Some(11));

        layout.handle_image_response();
        assert_eq!(layout.texture(LayoutDisplayRole::Primary, 0), Some(10));
    }

    #[test]
    fn timed_thumbnail_expires() {
        let displays = registry(2);
        let params = TimedPipParams {
            duration_ms: 100,
            ..TimedPipParams::default()
        };
        let mut layout = TimedPipLayout::new(&params, &displays).unwrap();
        layout.draw(&displays).unwrap();
        assert_eq!(layout.core().image_request_queue().len(), 1);
        layout.core_mut().take_image_requests();

        layout.handle_collision_message("arm near table").unwrap();
        layout.tick(Duration::from_millis(60));
        layout.draw(&displays).unwrap();
        assert_eq!(layout.core_mut().take_image_requests().len(), 2);

        layout.tick(Duration::from_millis(60));
        assert!(!layout.thumbnail_visible());
        layout.draw(&displays).unwrap();
        assert_eq!(layout.core().image_request_queue().len(), 1);
    }

    #[test]
    fn timed_secondary_navigation_shows_thumbnail() {
        let displays = registry(3);
        let mut layout = TimedPipLayout::new(&TimedPipParams::default(), &displays).unwrap();
        layout.handle_string_input("primary_next").unwrap();
        assert!(!layout.thumbnail_visible());
        layout.handle_string_input("secondary_next").unwrap();
        assert!(layout.thumbnail_visible());
        assert_eq!(layout.layout_type(), LayoutType::TimedPip);
    }

    #[test]
    fn twinned_pip_places_two_thumbnails() {
        let displays = registry(3);
        let mut layout = TwinnedPipLayout::new(&TwinnedPipParams::default(), &displays).unwrap();
        layout.core_mut().set_display_bounds(bounds());
        layout.draw(&displays).unwrap();

        assert_eq!(
            sources(&layout),
            vec![
                (LayoutDisplayRole::Primary, 0, 0),
                (LayoutDisplayRole::Secondary, 0, 1),
                (LayoutDisplayRole::Secondary, 1, 2)
            ]
        );
        let resolved = layout.core().resolved_components();
        assert_eq!(resolved[2].rect, Rect::new(38, 17, 20, 6));
    }

    #[test]
    fn double_pip_gives_each_half_a_thumbnail() {
        let displays = registry(2);
        let mut layout = DoublePipLayout::new(&DoublePipParams::default(), &displays).unwrap();
        layout.core_mut().set_display_bounds(bounds());
        layout.draw(&displays).unwrap();

        assert_eq!(
            sources(&layout),
            vec![
                (LayoutDisplayRole::Primary, 0, 0),
                (LayoutDisplayRole::Secondary, 0, 1),
                (LayoutDisplayRole::Primary, 1, 1),
                (LayoutDisplayRole::Secondary, 1, 0)
            ]
        );
        let resolved = layout.core().resolved_components();
        assert_eq!(resolved[0].rect, Rect::new(0, 0, 40, 24));
        assert_eq!(resolved[1].rect, Rect::new(29, 17, 10, 6));
        assert_eq!(resolved[3].rect, Rect::new(69, 17, 10, 6));
    }
}
