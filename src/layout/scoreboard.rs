use std::collections::BTreeMap;

use serde::Serialize;

/// Named on/off indicators shown in the status overlay.
///
/// Labels are overwritten in place every frame and never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Scoreboard {
    states: BTreeMap<String, bool>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, label: impl Into<String>, state: bool) {
        self.states.insert(label.into(), state);
    }

    pub fn get(&self, label: &str) -> Option<bool> {
        self.states.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.states.iter().map(|(label, state)| (label.as_str(), *state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// One-line rendering, e.g. `Robot: on · Suction: off`.
    pub fn status_line(&self) -> String {
        self.iter()
            .map(|(label, state)| format!("{label}: {}", if state { "on" } else { "off" }))
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_in_place() {
        let mut board = Scoreboard::new();
        board.set("Suction", false);
        board.set("Suction", true);
        assert_eq!(board.len(), 1);
        assert_eq!(board.get("Suction"), Some(true));
        assert_eq!(board.get("Robot"), None);
    }

    #[test]
    fn status_line_is_sorted() {
        let mut board = Scoreboard::new();
        board.set("Suction", false);
        board.set("Robot", true);
        assert_eq!(board.status_line(), "Robot: on · Suction: off");
    }
}
