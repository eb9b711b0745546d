use std::time::{Duration, Instant};

/// Window in which a second press completes a double-press toggle.
pub const DEFAULT_DOUBLE_PRESS_WINDOW: Duration = Duration::from_millis(1500);

/// How raw button signals drive the switch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    /// On while the button is held.
    Hold,
    /// Toggle on each press.
    Single,
    /// Toggle on two presses within the double-press window.
    Double,
}

/// Edge-detecting boolean input.
///
/// `set_state` assigns the state directly; `update_signal` feeds a sampled
/// button level and applies the mode's edge rules. The two never alias.
#[derive(Debug, Clone)]
pub struct Switch {
    state: bool,
    mode: SwitchMode,
    cur_signal: bool,
    prev_signal: bool,
    flipping: bool,
    unconfirmed: bool,
    double_window: Duration,
    pending_press: Option<Instant>,
}

impl Switch {
    pub fn new(state: bool, mode: SwitchMode) -> Self {
        Self {
            state,
            mode,
            cur_signal: false,
            prev_signal: false,
            flipping: false,
            unconfirmed: false,
            double_window: DEFAULT_DOUBLE_PRESS_WINDOW,
            pending_press: None,
        }
    }

    pub fn with_double_window(mut self, window: Duration) -> Self {
        self.double_window = window;
        self
    }

    pub fn mode(&self) -> SwitchMode {
        self.mode
    }

    pub fn is_on(&self) -> bool {
        self.state
    }

    /// Whether the state changed during the latest signal update.
    pub fn is_flipping(&self) -> bool {
        self.flipping
    }

    pub fn as_str(&self) -> &'static str {
        if self.state { "on" } else { "off" }
    }

    pub fn turn_on(&mut self) {
        self.change(true);
    }

    pub fn turn_off(&mut self) {
        self.change(false);
    }

    pub fn flip(&mut self) {
        self.change(!self.state);
    }

    /// Plain assignment: no edge processing and no pending flip.
    pub fn set_state(&mut self, state: bool) {
        self.state = state;
    }

    /// Returns `true` once per flip.
    pub fn confirm_flip(&mut self) -> bool {
        std::mem::replace(&mut self.unconfirmed, false)
    }

    pub fn confirm_flip_on(&mut self) -> bool {
        self.confirm_flip() && self.is_on()
    }

    pub fn confirm_flip_off(&mut self) -> bool {
        self.confirm_flip() && !self.is_on()
    }

    pub fn button_pressed(&self) -> bool {
        self.cur_signal && !self.prev_signal
    }

    pub fn button_released(&self) -> bool {
        !self.cur_signal && self.prev_signal
    }

    pub fn update_signal(&mut self, signal: bool) {
        self.update_signal_at(signal, Instant::now());
    }

    /// Feed a sampled signal observed at `now`.
    pub fn update_signal_at(&mut self, signal: bool, now: Instant) {
        self.prev_signal = self.cur_signal;
        self.cur_signal = signal;
        self.flipping = false;

        match self.mode {
            SwitchMode::Hold => {
                if self.button_pressed() || self.button_released() {
                    self.change(signal);
                }
            }
            SwitchMode::Single => {
                if self.button_pressed() {
                    self.flip();
                }
            }
            SwitchMode::Double => {
                if !self.button_pressed() {
                    return;
                }
                match self.pending_press.take() {
                    Some(first) if now.duration_since(first) <= self.double_window => self.flip(),
                    _ => self.pending_press = Some(now),
                }
            }
        }
    }

    fn change(&mut self, state: bool) {
        self.state = state;
        self.flipping = true;
        self.unconfirmed = true;
    }
}

impl Default for Switch {
    fn default() -> Self {
        Self::new(false, SwitchMode::Hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_follows_signal() {
        let mut switch = Switch::new(false, SwitchMode::Hold);
        switch.update_signal(true);
        assert!(switch.is_on());
        assert!(switch.is_flipping());
        switch.update_signal(true);
        assert!(switch.is_on());
        assert!(!switch.is_flipping());
        switch.update_signal(false);
        assert!(!switch.is_on());
    }

    #[test]
    fn single_toggles_on_press_edges() {
        let mut switch = Switch::new(false, SwitchMode::Single);
        switch.update_signal(true);
        switch.update_signal(false);
        assert!(switch.is_on());
        switch.update_signal(true);
        assert!(!switch.is_on());
        assert!(switch.confirm_flip_off());
        assert!(!switch.confirm_flip());
    }

    #[test]
    fn double_requires_two_presses_in_window() {
        let start = Instant::now();
        let mut switch = Switch::new(false, SwitchMode::Double);

        switch.update_signal_at(true, start);
        switch.update_signal_at(false, start + Duration::from_millis(100));
        assert!(!switch.is_on());
        switch.update_signal_at(true, start + Duration::from_millis(400));
        assert!(switch.is_on());

        switch.update_signal_at(false, start + Duration::from_millis(500));
        switch.update_signal_at(true, start + Duration::from_millis(600));
        switch.update_signal_at(false, start + Duration::from_millis(700));
        switch.update_signal_at(true, start + Duration::from_secs(5));
        assert!(switch.is_on());
    }

    #[test]
    fn assignment_is_not_a_signal() {
        let mut switch = Switch::new(false, SwitchMode::Single);
        switch.set_state(true);
        assert!(switch.is_on());
        assert!(!switch.button_pressed());
        assert!(!switch.confirm_flip());
    }
}
