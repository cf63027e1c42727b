//! Page event model
//!
//! Input and viewport events as delivered by a host event loop. Events
//! carry the two DOM dispatch flags: `propagation_stopped` (later,
//! outer handlers are skipped) and `default_prevented` (the host must not
//! run its built-in action, e.g. following a link or submitting a form).

use crate::node::ElementId;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    /// Primary pointer activation (mouse click, tap, keyboard-activated link)
    pub const CLICK: EventType = 1;
    pub const KEY_DOWN: EventType = 20;
    pub const SCROLL: EventType = 30;
    pub const RESIZE: EventType = 40;
    /// Form submission
    pub const SUBMIT: EventType = 90;
}

/// A page event with associated data
#[derive(Clone, Debug)]
pub struct PageEvent {
    pub event_type: EventType,
    /// Element the event was dispatched to; `None` for window-level events
    pub target: Option<ElementId>,
    pub data: EventData,
    pub timestamp: u64,
    pub propagation_stopped: bool,
    pub default_prevented: bool,
}

/// Event-specific data
#[derive(Clone, Debug)]
pub enum EventData {
    Key { key: KeyCode },
    None,
}

/// Virtual key codes (platform-agnostic)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const TAB: KeyCode = KeyCode(0x09);
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const SPACE: KeyCode = KeyCode(0x20);

    // Unknown/unmapped key
    pub const UNKNOWN: KeyCode = KeyCode(0);

    /// Map a DOM `KeyboardEvent.key` name to a key code.
    ///
    /// Single printable characters map to their uppercase code point.
    pub fn from_key_name(name: &str) -> KeyCode {
        match name {
            "Tab" => Self::TAB,
            "Enter" => Self::ENTER,
            "Escape" | "Esc" => Self::ESCAPE,
            " " | "Space" | "Spacebar" => Self::SPACE,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode(c.to_ascii_uppercase() as u32),
                    _ => Self::UNKNOWN,
                }
            }
        }
    }
}

impl PageEvent {
    fn new(event_type: EventType, target: Option<ElementId>, data: EventData) -> Self {
        Self {
            event_type,
            target,
            data,
            timestamp: 0,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    /// Primary activation of `target`
    pub fn click(target: ElementId) -> Self {
        Self::new(event_types::CLICK, Some(target), EventData::None)
    }

    /// Key press. `target` is the focused element, if any.
    pub fn key_down(key: KeyCode, target: Option<ElementId>) -> Self {
        Self::new(event_types::KEY_DOWN, target, EventData::Key { key })
    }

    /// Window scroll; the new offset is read from the page, not the event
    pub fn scroll() -> Self {
        Self::new(event_types::SCROLL, None, EventData::None)
    }

    /// Viewport resize; the new size is read from the page
    pub fn resize() -> Self {
        Self::new(event_types::RESIZE, None, EventData::None)
    }

    /// Submission of `form`
    pub fn submit(form: ElementId) -> Self {
        Self::new(event_types::SUBMIT, Some(form), EventData::None)
    }

    /// Key code for key events
    pub fn key(&self) -> Option<KeyCode> {
        match self.data {
            EventData::Key { key } => Some(key),
            _ => None,
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(KeyCode::from_key_name("Escape"), KeyCode::ESCAPE);
        assert_eq!(KeyCode::from_key_name(" "), KeyCode::SPACE);
        assert_eq!(KeyCode::from_key_name("Enter"), KeyCode::ENTER);
        assert_eq!(KeyCode::from_key_name("a"), KeyCode(0x41));
        assert_eq!(KeyCode::from_key_name("ArrowDown"), KeyCode::UNKNOWN);
        assert_eq!(KeyCode::from_key_name("F13"), KeyCode::UNKNOWN);
    }

    #[test]
    fn test_only_key_events_carry_a_key() {
        let el = ElementId::default();
        assert_eq!(PageEvent::key_down(KeyCode::ESCAPE, None).key(), Some(KeyCode::ESCAPE));
        assert_eq!(PageEvent::click(el).key(), None);
        assert_eq!(PageEvent::resize().key(), None);
    }

    #[test]
    fn test_dispatch_flags() {
        let mut event = PageEvent::scroll();
        assert!(!event.propagation_stopped && !event.default_prevented);

        event.stop_propagation();
        event.prevent_default();
        assert!(event.propagation_stopped);
        assert!(event.default_prevented);
    }
}
