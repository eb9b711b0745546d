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
pub struct TwinnedParams {
    pub primary_display: usize,
    pub secondary_display: usize,
}

impl Default for TwinnedParams {
    fn default() -> Self {
        Self {
            primary_display: 0,
            secondary_display: 1,
        }
    }
}

/// Primary and secondary heads at equal size, each navigated on its own.
#[derive(Debug, Clone)]
pub struct TwinnedLayout {
    core: LayoutCore,
}

impl TwinnedLayout {
    pub fn new(params: &TwinnedParams, displays: &DisplayRegistry) -> Result<Self> {
        let mut core = LayoutCore::new(LayoutType::Twinned);
        seed_ring(
            &mut core,
            LayoutDisplayRole::Primary,
            &[params.primary_display],
            displays,
        )?;
        seed_ring(
            &mut core,
            LayoutDisplayRole::Secondary,
            &[params.secondary_display],
            displays,
        )?;
        Ok(Self { core })
    }
}

impl Layout for TwinnedLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, displays: &DisplayRegistry) -> Result<()> {
        self.core.begin_draw();
        self.core.emit_display(LayoutComponent::primary(0), displays)?;
        self.core.emit_display(LayoutComponent::secondary(0), displays)?;
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
                ("Primary Display", LayoutDisplayRole::Primary, 0),
                ("Secondary Display", LayoutDisplayRole::Secondary, 0),
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
                if !self.core.ring(LayoutDisplayRole::Primary).is_empty()
                    && !self.core.ring(LayoutDisplayRole::Secondary).is_empty()
                {
                    self.core.swap_ring_heads()?;
                }
            }
            other => push_navigation(&mut self.core, other),
        }
        Ok(())
    }
}
