use crate::frame::Frame;

/// An event tagged with the frame it was emitted in.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub frame_index: u64,
    pub kind: E,
}

/// Records events until drained. A bounded bus keeps only the most recent
/// `capacity` events.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Event<E>>,
    capacity: Option<usize>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            capacity: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    pub fn emit(&mut self, frame: Frame, kind: E) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            if self.events.len() >= capacity {
                let excess = self.events.len() + 1 - capacity;
                self.events.drain(..excess);
            }
        }
        self.events.push(Event {
            frame_index: frame.index,
            kind,
        });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}
