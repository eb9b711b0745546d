use crate::display::DisplayRegistry;
use crate::error::Result;
use crate::layout::command::LayoutType;
use crate::layout::core::{Layout, LayoutCore};
use crate::layout::params::ParamsUi;

/// Placeholder shown before a layout is selected; draws nothing.
#[derive(Debug, Clone)]
pub struct InactiveLayout {
    core: LayoutCore,
}

impl InactiveLayout {
    pub fn new() -> Self {
        Self {
            core: LayoutCore::new(LayoutType::Inactive),
        }
    }
}

impl Default for InactiveLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout for InactiveLayout {
    fn core(&self) -> &LayoutCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayoutCore {
        &mut self.core
    }

    fn draw(&mut self, _displays: &DisplayRegistry) -> Result<()> {
        self.core.begin_draw();
        self.core.end_draw();
        Ok(())
    }

    fn display_layout_params(
        &mut self,
        ui: &mut dyn ParamsUi,
        _displays: &DisplayRegistry,
    ) -> Result<()> {
        ui.text("No layout selected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::variants::fixtures::registry;

    #[test]
    fn draws_nothing_but_keeps_scoreboard() {
        let displays = registry(2);
        let mut layout = InactiveLayout::new();
        layout.core_mut().set_grabbing_state(true);
        layout.draw(&displays).unwrap();

        assert!(layout.core().components().is_empty());
        assert!(layout.core().image_request_queue().is_empty());
        assert_eq!(layout.core().scoreboard().len(), 2);
        assert!(layout.handle_string_input("primary_next").is_ok());
    }
}
