use crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};

use crate::display::DisplayRegistry;
use crate::error::Result;
use crate::input::digit_key;
use crate::layout::command::{LayoutCommand, LayoutDisplayRole, LayoutType};
use crate::layout::component::LayoutComponent;
use crate::layout::core::{Layout, LayoutCore};
use crate::layout::params::ParamsUi;

use super::{key_command, seed_ring};

/// Largest row or column count a grid accepts.
pub const MAX_GRID_DIM: u16 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    pub rows: u16,
    pub cols: u16,
    /// Registry positions placed first, in reading order.
    pub displays: Vec<usize>,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            rows: 2,
            cols: 2,
            displays: Vec::new(),
        }
    }
}

/// `rows x cols` primaries in reading order; paging rotates a full page.
#[derive(Debug, Clone)]
pub struct GridLayout {
    core: LayoutCore,
    rows: usize,
    cols: usize,
}

impl GridLayout {
    pub fn new(params: &GridParams, displays: &DisplayRegistry) -> Result<Self> {
        let mut core = LayoutCore::new(LayoutType::Grid);
        seed_ring(
            &mut core,
            LayoutDisplayRole::Primary,
            &params.displays,
            displays,
        )?;
        Ok(Self {
            core,
            rows: params.rows.clamp(1, MAX_GRID_DIM) as usize,
            cols: params.cols.clamp(1, MAX_GRID_DIM) as usize,
        })
    }

    pub fn page_size(&self) -> usize {
        self.rows * self.cols
    }

    fn cells(&self) -> LayoutComponent {
        let rows = (0..self.rows)
            .map(|row| {
                LayoutComponent::row(
                    (0..self.cols)
                        .map(|col| LayoutComponent::primary(row * self.cols + col))
                        .collect(),
                )
            })
            .collect();
        LayoutComponent::column(rows)
    }
}

impl Layout for GridLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.core.begin_draw();
        let cells = self.cells();
        self.core.emit_display(cells, displays)?;
        self.core.end_draw();
        Ok(())
    }

    fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        ui.text(&format!("Grid: {} x {}", self.rows, self.cols));
        self.core
            .draw_display_params(ui, displays, &[LayoutDisplayRole::Primary], &[])
    }

    fn handle_key_input(&mut self, key: &KeyEvent) -> Result<()> {
        if let Some(cell) = digit_key(key) {
            if cell < self.core.frame_sources().len() {
                self.core.set_active_frame(cell)?;
            }
            return Ok(());
        }
        match key_command(key) {
            Some(command) => self.handle_command(command),
            None => Ok(()),
        }
    }

    fn handle_command(&mut self, command: LayoutCommand) -> Result<()> {
        let page = self.page_size();
        match command {
            LayoutCommand::PrimaryNext => {
                self.core
                    .page_displays(LayoutDisplayRole::Primary, page, true)
            }
            LayoutCommand::PrimaryPrev => {
                self.core
                    .page_displays(LayoutDisplayRole::Primary, page, false)
            }
            LayoutCommand::ActiveFrameNext => self.core.cycle_active_frame(true),
            LayoutCommand::ActiveFramePrev => self.core.cycle_active_frame(false),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::variants::fixtures::{bounds, registry};
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn fills_cells_in_reading_order() {
        let displays = registry(5);
        let mut layout = GridLayout::new(&GridParams::default(), &displays).unwrap();
        layout.core_mut().set_display_bounds(bounds());
        layout.draw(&displays).unwrap();

        let sources: Vec<u32> = layout
            .core()
            .image_request_queue()
            .iter()
            .map(|r| r.source())
            .collect();
        assert_eq!(sources, vec![0, 1, 2, 3]);

        let resolved = layout.core().resolved_components();
        assert_eq!(resolved[3].rect, Rect::new(40, 12, 40, 12));
    }

    #[test]
    fn paging_rotates_a_full_page() {
        let displays = registry(5);
        let mut layout = GridLayout::new(&GridParams::default(), &displays).unwrap();
        layout.handle_string_input("primary_next").unwrap();
        let head: Vec<u32> = layout.core().ring(LayoutDisplayRole::Primary).ids().take(2).collect();
        assert_eq!(head, vec![4, 0]);

        layout.handle_string_input("primary_prev").unwrap();
        assert_eq!(layout.core().ring(LayoutDisplayRole::Primary).get(0).unwrap(), 0);
    }

    #[test]
    fn digit_keys_pick_the_active_cell() {
        let displays = registry(3);
        let params = GridParams {
            displays: vec![2],
            ..GridParams::default()
        };
        let mut layout = GridLayout::new(&params, &displays).unwrap();
        layout.draw(&displays).unwrap();

        layout
            .handle_key_input(&KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(layout.core().active_display(), Some(1));

        layout
            .handle_key_input(&KeyEvent::new(KeyCode::Char('4'), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(layout.core().active_frame(), 2);
    }

    #[test]
    fn disabled_cells_are_left_out() {
        let displays = registry(5);
        let mut layout = GridLayout::new(&GridParams::default(), &displays).unwrap();
        layout.core_mut().set_display_bounds(bounds());
        layout
            .core_mut()
            .deactivate_display_at_ix(LayoutDisplayRole::Primary, 1)
            .unwrap();
        layout.draw(&displays).unwrap();

        let slots: Vec<usize> = layout
            .core()
            .image_request_queue()
            .iter()
            .map(|r| r.slot())
            .collect();
        assert_eq!(slots, vec![0, 2, 3]);
        assert_eq!(layout.core().resolved_components().len(), 3);
        assert_eq!(layout.core().frame_sources(), &[0, 2, 3]);
    }

    #[test]
    fn oversized_dimensions_are_capped() {
        let displays = registry(2);
        let params = GridParams {
            rows: u16::MAX,
            cols: 0,
            ..GridParams::default()
        };
        let layout = GridLayout::new(&params, &displays).unwrap();
        assert_eq!(layout.page_size(), MAX_GRID_DIM as usize);
    }
}
