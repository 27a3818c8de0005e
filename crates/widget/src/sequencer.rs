//! Two-phase render sequencing.
//!
//! The element starts in [`Phase::Loading`] and moves to [`Phase::Ready`] on
//! the first render where the viewport size is known and the world geometry
//! has resolved. `Ready` is never left. Background work (geometry load,
//! viewport probe) is handed to the host after the first paint.

use runtime::{AfterPaintQueue, Frame, OneShot};

use crate::loader::WorldSource;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
}

/// Work the host runs after a paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Fetch and convert world geometry, then report it back with
    /// `H3Map::apply_world_geometry`.
    LoadWorldGeometry(WorldSource),
    /// Measure the render surface on the next frame and report it with
    /// `H3Map::apply_viewport`.
    ProbeViewport,
}

#[derive(Debug)]
pub struct RenderSequencer {
    phase: Phase,
    frame: Frame,
    rendered: bool,
    first_paint: OneShot,
    queue: AfterPaintQueue<Task>,
}

impl Default for RenderSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSequencer {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            frame: Frame::default(),
            rendered: false,
            first_paint: OneShot::new(),
            queue: AfterPaintQueue::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Frame of the most recent render.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn first_paint_done(&self) -> bool {
        self.first_paint.fired_at().is_some()
    }

    /// Starts a render pass. Returns the new phase if it changed.
    pub fn begin_render(&mut self, size_known: bool, geometry_loaded: bool) -> Option<Phase> {
        if self.rendered {
            self.frame = self.frame.next();
        }
        self.rendered = true;
        if self.phase == Phase::Loading && size_known && geometry_loaded {
            self.phase = Phase::Ready;
            return Some(Phase::Ready);
        }
        None
    }

    /// Queues a task for the next `after_paint`. `false` if it was already
    /// queued.
    pub fn request(&mut self, task: Task) -> bool {
        if matches!(task, Task::LoadWorldGeometry(_)) {
            self.queue
                .retain(|pending| !matches!(pending, Task::LoadWorldGeometry(_)));
        }
        self.queue.schedule(task)
    }

    /// Called once a render has been painted. The first call yields the
    /// initial load and, while the size is unknown, the viewport probe.
    /// Later calls yield only tasks requested since.
    pub fn after_paint(&mut self, source: &WorldSource, size_known: bool) -> Vec<Task> {
        if self.first_paint.fire(self.frame) {
            self.request(Task::LoadWorldGeometry(source.clone()));
            if !size_known {
                self.queue.schedule(Task::ProbeViewport);
            }
        }
        self.queue.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::{Phase, RenderSequencer, Task};
    use crate::loader::WorldSource;
    use pretty_assertions::assert_eq;

    fn source() -> WorldSource {
        WorldSource::new("land.json", "land")
    }

    #[test]
    fn first_paint_schedules_load_and_probe_once() {
        let mut seq = RenderSequencer::new();
        seq.begin_render(false, false);
        assert_eq!(
            seq.after_paint(&source(), false),
            vec![Task::LoadWorldGeometry(source()), Task::ProbeViewport]
        );
        seq.begin_render(false, false);
        assert_eq!(seq.after_paint(&source(), false), vec![]);
    }

    #[test]
    fn probe_is_skipped_when_size_already_known() {
        let mut seq = RenderSequencer::new();
        seq.begin_render(true, false);
        assert_eq!(
            seq.after_paint(&source(), true),
            vec![Task::LoadWorldGeometry(source())]
        );
    }

    #[test]
    fn ready_requires_both_predicates_and_is_sticky() {
        let mut seq = RenderSequencer::new();
        assert_eq!(seq.begin_render(true, false), None);
        assert_eq!(seq.begin_render(false, true), None);
        assert_eq!(seq.phase(), Phase::Loading);
        assert_eq!(seq.begin_render(true, true), Some(Phase::Ready));
        assert_eq!(seq.begin_render(false, false), None);
        assert_eq!(seq.phase(), Phase::Ready);
        assert_eq!(seq.frame().index, 3);
    }

    #[test]
    fn newer_load_requests_replace_pending_ones() {
        let mut seq = RenderSequencer::new();
        seq.begin_render(true, false);
        seq.after_paint(&source(), true);
        let a = WorldSource::new("a.json", "land");
        let b = WorldSource::new("b.json", "land");
        assert!(seq.request(Task::LoadWorldGeometry(a)));
        assert!(seq.request(Task::LoadWorldGeometry(b.clone())));
        assert_eq!(seq.after_paint(&source(), true), vec![Task::LoadWorldGeometry(b)]);
    }
}
