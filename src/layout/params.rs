//! Layout-parameter panel contract.
//!
//! Layouts describe their configuration widgets through [`ParamsUi`]; the
//! widget toolkit returns operator selections, which the layout applies
//! through its ring helpers. [`ParamsSnapshot`] is a recording implementation
//! used for the terminal side panel and in tests.

use std::collections::VecDeque;

use crate::display::{DisplayId, DisplayRegistry};

use super::command::LayoutDisplayRole;
use super::ring::DisplayRing;

/// Entry in a display picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayChoice {
    pub id: DisplayId,
    pub label: String,
}

impl DisplayChoice {
    pub fn all(displays: &DisplayRegistry) -> Vec<DisplayChoice> {
        displays
            .ids()
            .filter_map(|id| {
                displays.display_info(id).ok().map(|info| DisplayChoice {
                    id,
                    label: info.label().to_string(),
                })
            })
            .collect()
    }
}

/// Edit requested through the draggable ring widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingEdit {
    Activate(usize),
    Deactivate(usize),
    Swap(usize, usize),
}

/// Immediate-mode widget surface consumed by `display_layout_params`.
pub trait ParamsUi {
    fn text(&mut self, text: &str);

    /// List the available displays; `limit` of zero lists them all.
    fn displays_list(&mut self, displays: &[DisplayChoice], limit: usize);

    fn draggable_ring(&mut self, role: LayoutDisplayRole, ring: &DisplayRing) -> Option<RingEdit>;

    /// Picker for the display at `slot` of `role`'s ring; returns a new choice.
    fn display_selector(
        &mut self,
        title: &str,
        role: LayoutDisplayRole,
        slot: usize,
        current: Option<DisplayId>,
        choices: &[DisplayChoice],
    ) -> Option<DisplayId>;
}

/// Widget recorder with optional scripted operator selections.
#[derive(Debug, Default)]
pub struct ParamsSnapshot {
    lines: Vec<String>,
    selections: VecDeque<(LayoutDisplayRole, usize, DisplayId)>,
    ring_edits: VecDeque<(LayoutDisplayRole, RingEdit)>,
}

impl ParamsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a selection returned the next time the matching selector is drawn.
    pub fn with_selection(mut self, role: LayoutDisplayRole, slot: usize, id: DisplayId) -> Self {
        self.selections.push_back((role, slot, id));
        self
    }

    pub fn with_ring_edit(mut self, role: LayoutDisplayRole, edit: RingEdit) -> Self {
        self.ring_edits.push_back((role, edit));
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl ParamsUi for ParamsSnapshot {
    fn text(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn displays_list(&mut self, displays: &[DisplayChoice], limit: usize) {
        let shown = if limit == 0 { displays.len() } else { limit };
        for choice in displays.iter().take(shown) {
            self.lines.push(format!("{}: {}", choice.id, choice.label));
        }
    }

    fn draggable_ring(&mut self, role: LayoutDisplayRole, ring: &DisplayRing) -> Option<RingEdit> {
        let ids = ring
            .ids()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.lines.push(format!("{} ring: [{}]", role.as_str(), ids));

        let position = self.ring_edits.iter().position(|(r, _)| *r == role)?;
        self.ring_edits.remove(position).map(|(_, edit)| edit)
    }

    fn display_selector(
        &mut self,
        title: &str,
        role: LayoutDisplayRole,
        slot: usize,
        current: Option<DisplayId>,
        choices: &[DisplayChoice],
    ) -> Option<DisplayId> {
        let label = current
            .and_then(|id| choices.iter().find(|choice| choice.id == id))
            .map(|choice| choice.label.as_str())
            .unwrap_or("none");
        self.lines.push(format!("{title}: {label}"));

        let position = self
            .selections
            .iter()
            .position(|(r, s, _)| *r == role && *s == slot)?;
        self.selections.remove(position).map(|(_, _, id)| id)
    }
}
