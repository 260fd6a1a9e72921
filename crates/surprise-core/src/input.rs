#![forbid(unsafe_code)]

//! Input events, trigger binding, and the listener registry.
//!
//! The host delivers raw [`InputEvent`]s to an [`InputBus`]. Listeners
//! subscribe for a [`ListenerId`] and drain their own queue; unsubscribing
//! drops the queue so nothing is delivered after teardown. A
//! [`TriggerBinding`] reduces raw events to the two signals the hold detector
//! understands.

use std::collections::VecDeque;
use std::fmt;

use ahash::AHashMap;

/// A key on the designated trigger input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Key {
    Space,
    Enter,
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space => f.write_str("space"),
            Self::Enter => f.write_str("enter"),
            Self::Char(c) => write!(f, "'{c}'"),
        }
    }
}

/// Press phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    /// Auto-repeat while held.
    Repeat,
    Up,
}

/// Raw input as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key { key: Key, phase: KeyPhase },
    /// The surface lost input focus; any held key is implicitly released.
    FocusLost,
}

impl InputEvent {
    #[must_use]
    pub const fn key_down(key: Key) -> Self {
        Self::Key {
            key,
            phase: KeyPhase::Down,
        }
    }

    #[must_use]
    pub const fn key_repeat(key: Key) -> Self {
        Self::Key {
            key,
            phase: KeyPhase::Repeat,
        }
    }

    #[must_use]
    pub const fn key_up(key: Key) -> Self {
        Self::Key {
            key,
            phase: KeyPhase::Up,
        }
    }
}

/// Activation signal for the hold detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateSignal {
    Start,
    End,
}

/// Maps raw events on one designated key to activation signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerBinding {
    key: Key,
}

impl TriggerBinding {
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self { key }
    }

    #[must_use]
    pub const fn key(&self) -> Key {
        self.key
    }

    /// Translate one event. Events on other keys map to `None`.
    #[must_use]
    pub fn signal(&self, event: &InputEvent) -> Option<ActivateSignal> {
        match event {
            InputEvent::Key { key, phase } if *key == self.key => Some(match phase {
                KeyPhase::Down | KeyPhase::Repeat => ActivateSignal::Start,
                KeyPhase::Up => ActivateSignal::End,
            }),
            InputEvent::Key { .. } => None,
            InputEvent::FocusLost => Some(ActivateSignal::End),
        }
    }
}

impl Default for TriggerBinding {
    fn default() -> Self {
        Self::new(Key::Space)
    }
}

/// Handle for one subscription on an [`InputBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Fan-out event queue with explicit listener registration.
#[derive(Debug, Default)]
pub struct InputBus {
    next_id: u64,
    queues: AHashMap<ListenerId, VecDeque<InputEvent>>,
}

impl InputBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It receives events published from now on.
    pub fn subscribe(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.queues.insert(id, VecDeque::new());
        id
    }

    /// Remove a listener and drop its undelivered events. Returns `false` if
    /// it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.queues.remove(&id).is_some()
    }

    /// Deliver `event` to every registered listener.
    pub fn publish(&mut self, event: InputEvent) {
        for queue in self.queues.values_mut() {
            queue.push_back(event.clone());
        }
    }

    /// Take every pending event for `id`, oldest first.
    pub fn drain(&mut self, id: ListenerId) -> Vec<InputEvent> {
        self.queues
            .get_mut(&id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.queues.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_maps_phases() {
        let binding = TriggerBinding::new(Key::Space);
        assert_eq!(
            binding.signal(&InputEvent::key_down(Key::Space)),
            Some(ActivateSignal::Start)
        );
        assert_eq!(
            binding.signal(&InputEvent::key_repeat(Key::Space)),
            Some(ActivateSignal::Start)
        );
        assert_eq!(
            binding.signal(&InputEvent::key_up(Key::Space)),
            Some(ActivateSignal::End)
        );
        assert_eq!(binding.signal(&InputEvent::key_down(Key::Enter)), None);
        assert_eq!(
            binding.signal(&InputEvent::FocusLost),
            Some(ActivateSignal::End)
        );
    }

    #[test]
    fn bus_fans_out_and_drains_in_order() {
        let mut bus = InputBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.publish(InputEvent::key_down(Key::Char('w')));
        bus.publish(InputEvent::key_up(Key::Char('w')));

        assert_eq!(
            bus.drain(a),
            vec![
                InputEvent::key_down(Key::Char('w')),
                InputEvent::key_up(Key::Char('w'))
            ]
        );
        assert!(bus.drain(a).is_empty());
        assert_eq!(bus.drain(b).len(), 2);
    }

    #[test]
    fn unsubscribed_listener_receives_nothing() {
        let mut bus = InputBus::new();
        let id = bus.subscribe();
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(InputEvent::key_down(Key::Space));
        assert!(bus.drain(id).is_empty());
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let mut bus = InputBus::new();
        bus.publish(InputEvent::key_down(Key::Space));
        let id = bus.subscribe();
        assert!(bus.drain(id).is_empty());
    }
}
