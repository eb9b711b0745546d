use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Every arrangement the console can switch between.
///
/// To add a layout: add the variant here (keeping `ALL` and `name` in the
/// same order), implement [`Layout`](crate::Layout) for it under
/// `layout::variants`, and add its constructor to `build_layout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    Inactive,
    Dynamic,
    Wide,
    Pip,
    TimedPip,
    TwinnedPip,
    DoublePip,
    Split,
    Twinned,
    Grid,
    Carousel,
}

impl LayoutType {
    /// Selectable layouts in menu order.
    pub const ALL: [LayoutType; 10] = [
        LayoutType::Dynamic,
        LayoutType::Wide,
        LayoutType::Pip,
        LayoutType::TimedPip,
        LayoutType::TwinnedPip,
        LayoutType::DoublePip,
        LayoutType::Split,
        LayoutType::Twinned,
        LayoutType::Grid,
        LayoutType::Carousel,
    ];

    /// Menu position lookup; anything outside the menu is `Inactive`.
    pub fn from_index(ix: i32) -> LayoutType {
        usize::try_from(ix)
            .ok()
            .and_then(|ix| Self::ALL.get(ix).copied())
            .unwrap_or(LayoutType::Inactive)
    }

    /// Menu position, `-1` for `Inactive`.
    pub fn index(self) -> i32 {
        Self::ALL
            .iter()
            .position(|ty| *ty == self)
            .map(|ix| ix as i32)
            .unwrap_or(-1)
    }

    pub fn name(self) -> &'static str {
        match self {
            LayoutType::Inactive => "Inactive",
            LayoutType::Dynamic => "Dynamic Camera",
            LayoutType::Wide => "Wide Angle",
            LayoutType::Pip => "Picture-in-Picture",
            LayoutType::TimedPip => "Timed Pic-in-Pic",
            LayoutType::TwinnedPip => "Twinned Pic-in-Pic",
            LayoutType::DoublePip => "Double Pic-in-Pic",
            LayoutType::Split => "Split Screen",
            LayoutType::Twinned => "Twinned",
            LayoutType::Grid => "Grid",
            LayoutType::Carousel => "Carousel",
        }
    }

    pub fn layout_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|ty| ty.name()).collect()
    }

    fn token(self) -> &'static str {
        match self {
            LayoutType::Inactive => "inactive",
            LayoutType::Dynamic => "dynamic",
            LayoutType::Wide => "wide",
            LayoutType::Pip => "pip",
            LayoutType::TimedPip => "timed_pip",
            LayoutType::TwinnedPip => "twinned_pip",
            LayoutType::DoublePip => "double_pip",
            LayoutType::Split => "split",
            LayoutType::Twinned => "twinned",
            LayoutType::Grid => "grid",
            LayoutType::Carousel => "carousel",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        std::iter::once(LayoutType::Inactive)
            .chain(Self::ALL)
            .find(|ty| ty.token() == wanted)
            .ok_or_else(|| LayoutError::Config(format!("unknown layout `{s}`")))
    }
}

/// Shared command vocabulary for every layout variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutCommand {
    Invalid,
    PrimaryNext,
    PrimaryPrev,
    SecondaryNext,
    SecondaryPrev,
    Toggle,
    ActiveFrameNext,
    ActiveFramePrev,
}

const COMMAND_TABLE: [(&str, LayoutCommand); 7] = [
    ("primary_next", LayoutCommand::PrimaryNext),
    ("primary_prev", LayoutCommand::PrimaryPrev),
    ("secondary_next", LayoutCommand::SecondaryNext),
    ("secondary_prev", LayoutCommand::SecondaryPrev),
    ("toggle", LayoutCommand::Toggle),
    ("active_frame_next", LayoutCommand::ActiveFrameNext),
    ("active_frame_prev", LayoutCommand::ActiveFramePrev),
];

/// Universal translation table from input tokens to layout commands.
///
/// New commands are added here and to [`LayoutCommand`] only; variants pick
/// the ones they care about. Unrecognized tokens yield `Invalid`.
pub fn translate_string_input_to_command(input: &str) -> LayoutCommand {
    COMMAND_TABLE
        .iter()
        .find(|(token, _)| *token == input)
        .map(|(_, command)| *command)
        .unwrap_or(LayoutCommand::Invalid)
}

impl LayoutCommand {
    pub fn token(self) -> Option<&'static str> {
        COMMAND_TABLE
            .iter()
            .find(|(_, command)| *command == self)
            .map(|(token, _)| *token)
    }
}

/// Purpose of a selected display within a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutDisplayRole {
    Primary,
    Secondary,
}

impl LayoutDisplayRole {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutDisplayRole::Primary => "primary",
            LayoutDisplayRole::Secondary => "secondary",
        }
    }
}

impl FromStr for LayoutDisplayRole {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(LayoutDisplayRole::Primary),
            "secondary" => Ok(LayoutDisplayRole::Secondary),
            _ => Err(LayoutError::InvalidRole(s.to_string())),
        }
    }
}
