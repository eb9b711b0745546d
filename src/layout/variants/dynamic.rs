use crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};

use crate::display::DisplayRegistry;
use crate::error::Result;
use crate::layout::command::{LayoutCommand, LayoutDisplayRole, LayoutType};
use crate::layout::component::LayoutComponent;
use crate::layout::core::{Layout, LayoutCore};
use crate::layout::params::ParamsUi;

use super::{key_command, seed_ring};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicParams {
    pub primary_display: usize,
}

/// Full-bounds view that follows the primary ring's cursor. The ring order
/// never changes; navigation only moves the cursor.
#[derive(Debug, Clone)]
pub struct DynamicLayout {
    core: LayoutCore,
}

impl DynamicLayout {
    pub fn new(params: &DynamicParams, displays: &DisplayRegistry) -> Result<Self> {
        let mut core = LayoutCore::new(LayoutType::Dynamic);
        seed_ring(
            &mut core,
            LayoutDisplayRole::Primary,
            &[params.primary_display],
            displays,
        )?;
        Ok(Self { core })
    }
}

impl Layout for DynamicLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.core.begin_draw();
        if let Some(slot) = self.core.ring(LayoutDisplayRole::Primary).active_index() {
            self.core
                .emit_display(LayoutComponent::primary(slot), displays)?;
        }
        self.core.end_draw();
        Ok(())
    }

    fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        displays: &DisplayRegistry,
    ) -> Result<()> {
        self.core
            .draw_display_params(ui, displays, &[LayoutDisplayRole::Primary], &[])
    }

    fn handle_key_input(&mut self, key: &KeyEvent) -> Result<()> {
        match key_command(key) {
            Some(command) => self.handle_command(command),
            None => Ok(()),
        }
    }

    fn handle_command(&mut self, command: LayoutCommand) -> Result<()> {
        match command {
            LayoutCommand::PrimaryNext => self.core.to_next_display(LayoutDisplayRole::Primary),
            LayoutCommand::PrimaryPrev => self.core.to_prev_display(LayoutDisplayRole::Primary),
            _ => {}
        }
        Ok(())
    }
}
