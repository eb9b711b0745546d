//! Concrete layouts. Each variant embeds a [`LayoutCore`], seeds its rings
//! from a parameter struct and emits its own component tree per frame.

mod carousel;
mod dynamic;
mod grid;
mod inactive;
mod pip;
mod split;
mod twinned;
mod wide;

use crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};

use crate::display::DisplayRegistry;
use crate::error::Result;
use crate::input::default_key_command;

use super::command::{LayoutCommand, LayoutDisplayRole, LayoutType};
use super::core::{Layout, LayoutCore};

pub use carousel::{CarouselLayout, CarouselParams};
pub use dynamic::{DynamicLayout, DynamicParams};
pub use grid::{GridLayout, GridParams, MAX_GRID_DIM};
pub use inactive::InactiveLayout;
pub use pip::{
    DoublePipLayout, DoublePipParams, PIP_MARGIN, PipLayout, PipParams, TimedPipLayout,
    TimedPipParams, TwinnedPipLayout, TwinnedPipParams, pip_rect,
};
pub use split::{SplitLayout, SplitParams};
pub use twinned::{TwinnedLayout, TwinnedParams};
pub use wide::{WideLayout, WideParams};

/// Per-variant construction parameters, as read from the console config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub dynamic: DynamicParams,
    pub wide: WideParams,
    pub pip: PipParams,
    pub timed_pip: TimedPipParams,
    pub twinned_pip: TwinnedPipParams,
    pub double_pip: DoublePipParams,
    pub split: SplitParams,
    pub twinned: TwinnedParams,
    pub grid: GridParams,
    pub carousel: CarouselParams,
}

/// Construct the variant for `layout_type`.
///
/// Fails when the parameters name a registry position that does not exist.
pub fn build_layout(
    layout_type: LayoutType,
    displays: &DisplayRegistry,
    params: &LayoutParams,
) -> Result<Box<dyn Layout>> {
    let layout: Box<dyn Layout> = match layout_type {
        LayoutType::Inactive => Box::new(InactiveLayout::new()),
        LayoutType::Dynamic => Box::new(DynamicLayout::new(&params.dynamic, displays)?),
        LayoutType::Wide => Box::new(WideLayout::new(&params.wide, displays)?),
        LayoutType::Pip => Box::new(PipLayout::new(&params.pip, displays)?),
        LayoutType::TimedPip => Box::new(TimedPipLayout::new(&params.timed_pip, displays)?),
        LayoutType::TwinnedPip => Box::new(TwinnedPipLayout::new(&params.twinned_pip, displays)?),
        LayoutType::DoublePip => Box::new(DoublePipLayout::new(&params.double_pip, displays)?),
        LayoutType::Split => Box::new(SplitLayout::new(&params.split, displays)?),
        LayoutType::Twinned => Box::new(TwinnedLayout::new(&params.twinned, displays)?),
        LayoutType::Grid => Box::new(GridLayout::new(&params.grid, displays)?),
        LayoutType::Carousel => Box::new(CarouselLayout::new(&params.carousel, displays)?),
    };
    Ok(layout)
}

/// Add the configured registry positions to `role`'s ring, then append the
/// remaining registry displays so navigation cycles every camera.
fn seed_ring(
    core: &mut LayoutCore,
    role: LayoutDisplayRole,
    positions: &[usize],
    displays: &DisplayRegistry,
) -> Result<()> {
    for ix in positions {
        core.add_display_by_ix_and_role(*ix, role, displays)?;
    }
    core.fill_ring_from_registry(role, displays);
    Ok(())
}

/// Ring navigation for variants whose "next" demotes the shown display.
fn push_navigation(core: &mut LayoutCore, command: LayoutCommand) {
    match command {
        LayoutCommand::PrimaryNext => core.to_next_display_with_push(LayoutDisplayRole::Primary),
        LayoutCommand::PrimaryPrev => core.to_prev_display_with_push(LayoutDisplayRole::Primary),
        LayoutCommand::SecondaryNext => {
            core.to_next_display_with_push(LayoutDisplayRole::Secondary)
        }
        LayoutCommand::SecondaryPrev => {
            core.to_prev_display_with_push(LayoutDisplayRole::Secondary)
        }
        LayoutCommand::ActiveFrameNext => core.cycle_active_frame(true),
        LayoutCommand::ActiveFramePrev => core.cycle_active_frame(false),
        LayoutCommand::Toggle | LayoutCommand::Invalid => {}
    }
}

fn key_command(key: &KeyEvent) -> Option<LayoutCommand> {
    match default_key_command(key) {
        LayoutCommand::Invalid => None,
        command => Some(command),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::display::{DisplayInfo, DisplayRegistry};
    use crate::geometry::Rect;

    pub fn registry(count: usize) -> DisplayRegistry {
        let mut registry = DisplayRegistry::new();
        for ix in 0..count {
            registry.register(DisplayInfo::new(format!("cam{ix}"), 64, 48, 3));
        }
        registry
    }

    pub fn bounds() -> Rect {
        Rect::new(0, 0, 80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::registry;
    use super::*;
    use crate::error::LayoutError;

    #[test]
    fn every_type_builds_with_default_params() {
        let displays = registry(4);
        let params = LayoutParams::default();
        for ty in std::iter::once(LayoutType::Inactive).chain(LayoutType::ALL) {
            let layout = build_layout(ty, &displays, &params).unwrap();
            assert_eq!(layout.layout_type(), ty);
        }
    }

    #[test]
    fn out_of_range_position_fails_construction() {
        let displays = registry(1);
        let mut params = LayoutParams::default();
        params.wide.primary_display = 3;
        assert!(matches!(
            build_layout(LayoutType::Wide, &displays, &params),
            Err(LayoutError::InvalidIndex { index: 3, len: 1 })
        ));
    }

    #[test]
    fn params_read_from_partial_json() {
        let params: LayoutParams =
            serde_json::from_str(r#"{"wide": {"primary_display": 2}, "grid": {"rows": 3}}"#)
                .unwrap();
        assert_eq!(params.wide.primary_display, 2);
        assert_eq!(params.grid.rows, 3);
        assert_eq!(params.grid.cols, 2);
        assert_eq!(params.split, SplitParams::default());
    }
}
