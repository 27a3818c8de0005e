use crate::frame::Frame;

/// Tasks waiting for the next completed paint.
///
/// A task is queued at most once until it is drained; draining hands tasks
/// out in the order they were first scheduled.
#[derive(Debug)]
pub struct AfterPaintQueue<T> {
    pending: Vec<T>,
}

impl<T> Default for AfterPaintQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> AfterPaintQueue<T> {
    /// Returns `false` if an equal task is already pending.
    pub fn schedule(&mut self, task: T) -> bool {
        if self.pending.contains(&task) {
            return false;
        }
        self.pending.push(task);
        true
    }
}

impl<T> AfterPaintQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops pending tasks for which `keep` returns `false`.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.pending.retain(keep);
    }

    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.pending)
    }
}

/// A latch that reports the first frame it is triggered in, and only that one.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct OneShot {
    fired_at: Option<Frame>,
}

impl OneShot {
    pub fn new() -> Self {
        Self { fired_at: None }
    }

    /// `true` on the first call only.
    pub fn fire(&mut self, frame: Frame) -> bool {
        if self.fired_at.is_some() {
            return false;
        }
        self.fired_at = Some(frame);
        true
    }

    pub fn fired_at(&self) -> Option<Frame> {
        self.fired_at
    }
}

#[cfg(test)]
mod tests {
    use super::{AfterPaintQueue, OneShot};
    use crate::frame::Frame;

    #[test]
    fn drains_in_first_scheduled_order() {
        let mut queue = AfterPaintQueue::new();
        assert!(queue.schedule("b"));
        assert!(queue.schedule("a"));
        assert_eq!(queue.drain(), vec!["b", "a"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn duplicate_pending_tasks_are_collapsed() {
        let mut queue = AfterPaintQueue::new();
        assert!(queue.schedule("load"));
        assert!(!queue.schedule("load"));
        assert_eq!(queue.len(), 1);
        queue.drain();
        assert!(queue.schedule("load"));
    }

    #[test]
    fn default_queue_needs_no_comparable_tasks() {
        struct Opaque;
        let mut queue: AfterPaintQueue<Opaque> = AfterPaintQueue::default();
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn one_shot_fires_once() {
        let mut latch = OneShot::new();
        assert!(latch.fire(Frame::new(3)));
        assert!(!latch.fire(Frame::new(4)));
        assert_eq!(latch.fired_at(), Some(Frame::new(3)));
    }
}
