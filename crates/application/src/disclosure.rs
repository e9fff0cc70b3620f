/// Open/closed state of a dropdown, user menu or mobile navigation panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisclosureState {
    /// Content hidden.
    #[default]
    Closed,
    /// Content shown.
    Open,
}

/// Input event routed to a disclosure by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureEvent {
    /// The toggle button was clicked.
    TriggerClicked,
    /// A click landed outside the trigger and the panel.
    OutsideClicked,
    /// The Escape key was pressed.
    EscapePressed,
    /// An entry inside the panel was chosen.
    ItemSelected,
}

/// Reusable disclosure state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Disclosure {
    state: DisclosureState,
}

impl Disclosure {
    /// Creates a closed disclosure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> DisclosureState {
        self.state
    }

    /// Returns whether the panel is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == DisclosureState::Open
    }

    /// Applies one event and returns whether the state changed.
    pub fn handle(&mut self, event: DisclosureEvent) -> bool {
        let next = match (self.state, event) {
            (DisclosureState::Closed, DisclosureEvent::TriggerClicked) => DisclosureState::Open,
            (DisclosureState::Open, _) => DisclosureState::Closed,
            (DisclosureState::Closed, _) => DisclosureState::Closed,
        };

        let changed = next != self.state;
        self.state = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::{Disclosure, DisclosureEvent, DisclosureState};

    #[test]
    fn trigger_toggles() {
        let mut disclosure = Disclosure::new();
        assert!(disclosure.handle(DisclosureEvent::TriggerClicked));
        assert!(disclosure.is_open());
        assert!(disclosure.handle(DisclosureEvent::TriggerClicked));
        assert_eq!(disclosure.state(), DisclosureState::Closed);
    }

    #[test]
    fn dismiss_events_close_an_open_panel() {
        for event in [
            DisclosureEvent::OutsideClicked,
            DisclosureEvent::EscapePressed,
            DisclosureEvent::ItemSelected,
        ] {
            let mut disclosure = Disclosure::new();
            disclosure.handle(DisclosureEvent::TriggerClicked);

            assert!(disclosure.handle(event));
            assert!(!disclosure.is_open());
        }
    }

    #[test]
    fn dismiss_events_on_closed_panel_are_no_ops() {
        let mut disclosure = Disclosure::new();
        assert!(!disclosure.handle(DisclosureEvent::OutsideClicked));
        assert!(!disclosure.handle(DisclosureEvent::EscapePressed));
        assert_eq!(disclosure.state(), DisclosureState::Closed);
    }
}
