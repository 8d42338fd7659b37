//! Interaction mode machine.

use serde::{Deserialize, Serialize};

/// Available interaction modes. Exactly one mode is active at a time and
/// gates which gesture handler processes pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Move,
    Prompt,
    Segment,
    Render,
    Frame,
}

/// Tracks the active mode plus the transient segment override: holding the
/// modifier key forces `Segment` and releasing it restores whatever mode was
/// active at the moment the key went down.
#[derive(Debug, Clone, Default)]
pub struct ModeMachine {
    current: Mode,
    held: Option<Mode>,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    /// Explicit mode selection (toolbar). Cancels any pending restore so a
    /// later key-up does not clobber the user's choice.
    pub fn set(&mut self, mode: Mode) {
        self.current = mode;
        self.held = None;
    }

    /// Modifier key down: force `Segment`, remembering the prior mode.
    /// Repeated key-down events while already held are ignored so the
    /// original mode is what gets restored.
    pub fn hold_segment(&mut self) {
        if self.held.is_none() {
            self.held = Some(self.current);
            self.current = Mode::Segment;
        }
    }

    /// Modifier key up: restore the mode captured at the forced transition.
    pub fn release_segment(&mut self) {
        if let Some(prior) = self.held.take() {
            self.current = prior;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_move() {
        assert_eq!(ModeMachine::new().current(), Mode::Move);
    }

    #[test]
    fn test_hold_and_release() {
        let mut modes = ModeMachine::new();
        modes.set(Mode::Prompt);
        modes.hold_segment();
        assert_eq!(modes.current(), Mode::Segment);
        modes.release_segment();
        assert_eq!(modes.current(), Mode::Prompt);
    }

    #[test]
    fn test_repeated_key_down_keeps_original_prior() {
        let mut modes = ModeMachine::new();
        modes.set(Mode::Frame);
        modes.hold_segment();
        modes.hold_segment(); // key auto-repeat
        modes.release_segment();
        assert_eq!(modes.current(), Mode::Frame);
    }

    #[test]
    fn test_release_without_hold_is_noop() {
        let mut modes = ModeMachine::new();
        modes.set(Mode::Render);
        modes.release_segment();
        assert_eq!(modes.current(), Mode::Render);
    }

    #[test]
    fn test_explicit_set_cancels_pending_restore() {
        let mut modes = ModeMachine::new();
        modes.hold_segment();
        modes.set(Mode::Prompt);
        modes.release_segment();
        assert_eq!(modes.current(), Mode::Prompt);
    }
}
