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
pub struct WideParams {
    pub primary_display: usize,
}

impl Default for WideParams {
    fn default() -> Self {
        Self { primary_display: 1 }
    }
}

/// One full-bounds view of the primary ring's head.
#[derive(Debug, Clone)]
pub struct WideLayout {
    core: LayoutCore,
}

impl WideLayout {
    pub fn new(params: &WideParams, displays: &DisplayRegistry) -> Result<Self> {
        let mut core = LayoutCore::new(LayoutType::Wide);
        seed_ring(
            &mut core,
            LayoutDisplayRole::Primary,
            &[params.primary_display],
            displays,
        )?;
        Ok(Self { core })
    }
}

impl Layout for WideLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.core.begin_draw();
        self.core.emit_display(LayoutComponent::primary(0), displays)?;
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
            &[("Wide Display", LayoutDisplayRole::Primary, 0)],
        )
    }

    fn handle_key_input(&mut self, key: &KeyEvent) -> Result<()> {
        match key_command(key) {
            Some(command) => self.handle_command(command),
            None => Ok(()),
        }
    }

    fn handle_command(&mut self, command: LayoutCommand) -> Result<()> {
        push_navigation(&mut self.core, command);
        Ok(())
    }
}
