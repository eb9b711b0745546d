use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::display::{DisplayId, DisplayRegistry, IDENTITY_MATRIX};
use crate::error::{LayoutError, Result};
use crate::geometry::Rect;

use super::command::{LayoutCommand, LayoutDisplayRole, LayoutType, translate_string_input_to_command};
use super::component::{Direction, LayoutComponent, ResolvedComponent, resolve_components};
use super::image::{DisplayImageRequest, DisplayImageResponse};
use super::params::{DisplayChoice, ParamsUi, RingEdit};
use super::ring::DisplayRing;
use super::scoreboard::Scoreboard;

pub const ROBOT_LABEL: &str = "Robot";
pub const SUCTION_LABEL: &str = "Suction";

/// Behaviour every layout variant provides.
///
/// Shared state lives in [`LayoutCore`]; variants embed one and override the
/// hooks they need. Hooks with default bodies are no-ops in the base.
pub trait Layout: Send {
    fn core(&self) -> &LayoutCore;

    fn core_mut(&mut self) -> &mut LayoutCore;

    fn layout_type(&self) -> LayoutType {
        self.core().layout_type()
    }

    /// Rebuild components, refresh the scoreboard and queue one image request
    /// per display drawn this frame.
    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()>;

    /// Describe the configuration widgets and apply any selections made.
    fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
    ) -> Result<()>;

    fn handle_key_input(&mut self, _key: &KeyEvent) -> Result<()> {
        Ok(())
    }

    /// Act on a translated command; unmatched commands are ignored.
    fn handle_command(&mut self, _command: LayoutCommand) -> Result<()> {
        Ok(())
    }

    fn handle_string_input(&mut self, input: &str) -> Result<()> {
        match translate_string_input_to_command(input) {
            LayoutCommand::Invalid => Ok(()),
            command => self.handle_command(command),
        }
    }

    fn handle_collision_message(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }

    /// Consume the responses pushed since the last frame.
    fn handle_image_response(&mut self) {
        self.core_mut().drain_image_responses();
    }

    /// Frame time for variants that animate or time out.
    fn tick(&mut self, _elapsed: Duration) {}
}

/// State shared by all layout variants.
#[derive(Debug, Clone)]
pub struct LayoutCore {
    layout_type: LayoutType,
    grabbing: bool,
    clutching: bool,
    primary_ring: DisplayRing,
    secondary_ring: DisplayRing,
    display_image_queue: Vec<DisplayImageRequest>,
    image_response_queue: Vec<DisplayImageResponse>,
    scoreboard: Scoreboard,
    components: Vec<LayoutComponent>,
    display_bounds: Rect,
    frame_sources: Vec<DisplayId>,
    active_frame: usize,
}

impl LayoutCore {
    pub fn new(layout_type: LayoutType) -> Self {
        Self {
            layout_type,
            grabbing: false,
            clutching: false,
            primary_ring: DisplayRing::new(),
            secondary_ring: DisplayRing::new(),
            display_image_queue: Vec::new(),
            image_response_queue: Vec::new(),
            scoreboard: Scoreboard::new(),
            components: Vec::new(),
            display_bounds: Rect::default(),
            frame_sources: Vec::new(),
            active_frame: 0,
        }
    }

    pub fn layout_type(&self) -> LayoutType {
        self.layout_type
    }

    pub fn layout_name(&self) -> &'static str {
        self.layout_type.name()
    }

    pub fn set_grabbing_state(&mut self, state: bool) {
        self.grabbing = state;
    }

    pub fn set_clutching_state(&mut self, state: bool) {
        self.clutching = state;
    }

    pub fn grabbing(&self) -> bool {
        self.grabbing
    }

    pub fn clutching(&self) -> bool {
        self.clutching
    }

    pub fn set_display_bounds(&mut self, bounds: Rect) {
        self.display_bounds = bounds;
    }

    pub fn display_bounds(&self) -> Rect {
        self.display_bounds
    }

    pub fn ring(&self, role: LayoutDisplayRole) -> &DisplayRing {
        match role {
            LayoutDisplayRole::Primary => &self.primary_ring,
            LayoutDisplayRole::Secondary => &self.secondary_ring,
        }
    }

    fn ring_mut(&mut self, role: LayoutDisplayRole) -> &mut DisplayRing {
        match role {
            LayoutDisplayRole::Primary => &mut self.primary_ring,
            LayoutDisplayRole::Secondary => &mut self.secondary_ring,
        }
    }

    /// Add the display at registry position `ix` to `role`'s ring.
    pub fn add_display_by_ix_and_role(
        &mut self,
        ix: usize,
        role: LayoutDisplayRole,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        let id = displays.id_at(ix)?;
        self.ring_mut(role).add_display(id);
        Ok(())
    }

    pub fn add_primary_display_by_id(&mut self, id: DisplayId, displays: &DisplayRegistry) -> Result<()> {
        self.add_display_by_id(id, LayoutDisplayRole::Primary, displays)
    }

    pub fn add_secondary_display_by_id(&mut self, id: DisplayId, displays: &DisplayRegistry) -> Result<()> {
        self.add_display_by_id(id, LayoutDisplayRole::Secondary, displays)
    }

    fn add_display_by_id(
        &mut self,
        id: DisplayId,
        role: LayoutDisplayRole,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        if !displays.contains(id) {
            return Err(LayoutError::DisplayNotFound(id));
        }
        self.ring_mut(role).add_display(id);
        Ok(())
    }

    /// Append every registry display not yet in `role`'s ring.
    pub fn fill_ring_from_registry(&mut self, role: LayoutDisplayRole, displays: &DisplayRegistry) {
        let ring = self.ring_mut(role);
        for id in displays.ids() {
            ring.add_display(id);
        }
    }

    pub fn activate_display_at_ix(&mut self, role: LayoutDisplayRole, ix: usize) -> Result<()> {
        self.ring_mut(role).activate(ix)
    }

    pub fn deactivate_display_at_ix(&mut self, role: LayoutDisplayRole, ix: usize) -> Result<()> {
        self.ring_mut(role).deactivate(ix)
    }

    pub fn set_display_at(&mut self, role: LayoutDisplayRole, slot: usize, id: DisplayId) -> Result<()> {
        self.ring_mut(role).set_display_at(slot, id)
    }

    pub fn to_next_display(&mut self, role: LayoutDisplayRole) {
        self.ring_mut(role).next();
    }

    pub fn to_prev_display(&mut self, role: LayoutDisplayRole) {
        self.ring_mut(role).prev();
    }

    pub fn to_next_display_with_push(&mut self, role: LayoutDisplayRole) {
        self.ring_mut(role).next_with_push();
    }

    pub fn to_prev_display_with_push(&mut self, role: LayoutDisplayRole) {
        self.ring_mut(role).prev_with_push();
    }

    pub fn page_displays(&mut self, role: LayoutDisplayRole, count: usize, forward: bool) {
        self.ring_mut(role).push_by(count, forward);
    }

    /// Exchange the heads of the primary and secondary rings.
    pub fn swap_ring_heads(&mut self) -> Result<()> {
        let primary = self.primary_ring.get(0)?;
        let secondary = self.secondary_ring.get(0)?;
        self.primary_ring.set_display_at(0, secondary)?;
        self.secondary_ring.set_display_at(0, primary)?;
        Ok(())
    }

    pub fn swap_slots(&mut self, role: LayoutDisplayRole, a: usize, b: usize) -> Result<()> {
        self.ring_mut(role).swap(a, b)
    }

    /// Start of a draw pass: components and frame bookkeeping are rebuilt.
    pub fn begin_draw(&mut self) {
        self.components.clear();
        self.frame_sources.clear();
        self.update_scoreboard();
    }

    /// End of a draw pass: keep the active frame inside the frames drawn.
    pub fn end_draw(&mut self) {
        if self.active_frame >= self.frame_sources.len() {
            self.active_frame = 0;
        }
    }

    fn update_scoreboard(&mut self) {
        self.scoreboard.set(ROBOT_LABEL, !self.clutching);
        self.scoreboard.set(SUCTION_LABEL, self.grabbing);
    }

    pub fn add_layout_component(&mut self, component: LayoutComponent) {
        self.components.push(component);
    }

    pub fn components(&self) -> &[LayoutComponent] {
        &self.components
    }

    pub fn resolved_components(&self) -> Vec<ResolvedComponent> {
        resolve_components(&self.components, self.display_bounds, Direction::Row)
    }

    /// Whether `slot` holds a display that is switched on.
    pub fn has_display(&self, role: LayoutDisplayRole, slot: usize) -> bool {
        self.ring(role).is_enabled(slot).unwrap_or(false)
    }

    /// Emit a component and one image request per display leaf, or nothing
    /// when the ring has no display at the leaf's slot. Containers are walked
    /// depth-first so requests follow resolution order.
    pub fn emit_display(
        &mut self,
        component: LayoutComponent,
        displays: &DisplayRegistry,
    ) -> Result<bool> {
        match self.admit(component, displays)? {
            Some(component) => {
                self.add_layout_component(component);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn admit(
        &mut self,
        mut component: LayoutComponent,
        displays: &DisplayRegistry,
    ) -> Result<Option<LayoutComponent>> {
        if let Some(role) = component.role() {
            if !self.has_display(role, component.slot) {
                return Ok(None);
            }
            self.request_display_image(role, component.slot, displays)?;
            return Ok(Some(component));
        }

        let children = std::mem::take(&mut component.children);
        for child in children {
            if let Some(kept) = self.admit(child, displays)? {
                component.children.push(kept);
            }
        }
        Ok(Some(component))
    }

    /// Queue a request for the display at `slot` of `role`'s ring.
    pub fn request_display_image(
        &mut self,
        role: LayoutDisplayRole,
        slot: usize,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        let id = self.ring(role).get(slot)?;
        let info = displays.display_info(id)?;
        let request = DisplayImageRequest::new(info.width, info.height, displays.handle(id)?, slot, role);
        self.add_image_request_to_queue(request);
        Ok(())
    }

    pub fn add_image_request_to_queue(&mut self, request: DisplayImageRequest) {
        self.frame_sources.push(request.source());
        self.display_image_queue.push(request);
    }

    pub fn image_request_queue(&self) -> &[DisplayImageRequest] {
        &self.display_image_queue
    }

    /// Hand this frame's requests to the renderer.
    pub fn take_image_requests(&mut self) -> Vec<DisplayImageRequest> {
        std::mem::take(&mut self.display_image_queue)
    }

    pub fn push_image_response(&mut self, response: DisplayImageResponse) {
        self.image_response_queue.push(response);
    }

    pub fn pending_image_responses(&self) -> usize {
        self.image_response_queue.len()
    }

    pub fn drain_image_responses(&mut self) -> Vec<DisplayImageResponse> {
        std::mem::take(&mut self.image_response_queue)
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn scoreboard_mut(&mut self) -> &mut Scoreboard {
        &mut self.scoreboard
    }

    /// Frames drawn in the last pass, by source display.
    pub fn frame_sources(&self) -> &[DisplayId] {
        &self.frame_sources
    }

    pub fn active_frame(&self) -> usize {
        self.active_frame
    }

    pub fn set_active_frame(&mut self, ix: usize) -> Result<()> {
        if ix >= self.frame_sources.len() {
            return Err(LayoutError::InvalidIndex {
                index: ix,
                len: self.frame_sources.len(),
            });
        }
        self.active_frame = ix;
        Ok(())
    }

    pub fn cycle_active_frame(&mut self, forward: bool) {
        let count = self.frame_sources.len();
        if count == 0 {
            return;
        }
        self.active_frame = if forward {
            (self.active_frame + 1) % count
        } else {
            (self.active_frame + count - 1) % count
        };
    }

    pub fn active_display(&self) -> Option<DisplayId> {
        self.frame_sources.get(self.active_frame).copied()
    }

    /// Camera matrix of the active frame, identity when nothing is drawn.
    pub fn active_display_matrix(&self, displays: &DisplayRegistry) -> Result<[f32; 12]> {
        match self.active_display() {
            Some(id) => displays.display_matrix(id),
            None => Ok(IDENTITY_MATRIX),
        }
    }

    /// Standard parameter panel: display list, ring editor per role, then one
    /// selector per `(title, role, slot)`.
    pub fn draw_display_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
        rings: &[LayoutDisplayRole],
        selectors: &[(&str, LayoutDisplayRole, usize)],
    ) -> Result<()> {
        let choices = DisplayChoice::all(displays);
        ui.displays_list(&choices, 0);

        for role in rings {
            if let Some(edit) = ui.draggable_ring(*role, self.ring(*role)) {
                match edit {
                    RingEdit::Activate(ix) => self.activate_display_at_ix(*role, ix)?,
                    RingEdit::Deactivate(ix) => self.deactivate_display_at_ix(*role, ix)?,
                    RingEdit::Swap(a, b) => self.ring_mut(*role).swap(a, b)?,
                }
            }
        }

        for (title, role, slot) in selectors {
            let current = self.ring(*role).get(*slot).ok();
            if let Some(id) = ui.display_selector(title, *role, *slot, current, &choices) {
                self.set_display_at(*role, *slot, id)?;
            }
        }
        Ok(())
    }
}
