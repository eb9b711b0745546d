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
pub struct SplitParams {
    pub left_display: usize,
    pub right_display: usize,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            left_display: 0,
            right_display: 1,
        }
    }
}

/// Two half-bounds primaries side by side.
#[derive(Debug, Clone)]
pub struct SplitLayout {
    core: LayoutCore,
}

impl SplitLayout {
    pub fn new(params: &SplitParams, displays: &DisplayRegistry) -> Result<Self> {
        let mut core = LayoutCore::new(LayoutType::Split);
        seed_ring(
            &mut core,
            LayoutDisplayRole::Primary,
            &[params.left_display, params.right_display],
            displays,
        )?;
        Ok(Self { core })
    }
}

impl Layout for SplitLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.core.begin_draw();
        self.core.emit_display(LayoutComponent::primary(0), displays)?;
        self.core.emit_display(LayoutComponent::primary(1), displays)?;
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
            &[LayoutDisplayRole::Primary],
            &[
                ("Left Display", LayoutDisplayRole::Primary, 0),
                ("Right Display", LayoutDisplayRole::Primary, 1),
            ],
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
            LayoutCommand::Toggle => {
                if self.core.ring(LayoutDisplayRole::Primary).len() > 1 {
                    self.core.swap_slots(LayoutDisplayRole::Primary, 0, 1)?;
                }
            }
            other => push_navigation(&mut self.core, other),
        }
        Ok(())
    }
}
