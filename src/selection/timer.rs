//! Single-slot deferred step with cancellable handles.

/// Handle to one scheduled step. Goes stale once the step fires, is
/// cancelled, or is replaced by a newer schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleHandle {
    generation: u64,
}

/// Holds at most one pending step at a time.
#[derive(Debug, Default)]
pub struct StepTimer {
    generation: u64,
    pending: Option<(ScheduleHandle, f64)>,
}

impl StepTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a step at `due_ms`, replacing any pending one.
    pub fn schedule(&mut self, due_ms: f64) -> ScheduleHandle {
        self.generation += 1;
        let handle = ScheduleHandle {
            generation: self.generation,
        };
        self.pending = Some((handle, due_ms));
        handle
    }

    /// Cancel a step. Returns false if the handle was already stale.
    pub fn cancel(&mut self, handle: ScheduleHandle) -> bool {
        if self.is_pending(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self, handle: ScheduleHandle) -> bool {
        matches!(self.pending, Some((pending, _)) if pending == handle)
    }

    /// When the pending step is due, if any.
    pub fn due_at(&self) -> Option<f64> {
        self.pending.map(|(_, due)| due)
    }

    /// Take the pending step if it is due by `now_ms`, returning its due time.
    pub fn take_due(&mut self, now_ms: f64) -> Option<f64> {
        match self.pending {
            Some((_, due)) if due <= now_ms => {
                self.pending = None;
                Some(due)
            }
            _ => None,
        }
    }
}
