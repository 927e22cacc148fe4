//! Walks the displayed page toward the requested one, one page per step.
//!
//! A jump from the cover to page 10 flips every page in between: quickly
//! while far away, slower for the last two.

use super::signal::{PageSignal, SubscriptionId};
use super::timer::{ScheduleHandle, StepTimer};
use crate::config::SelectionTiming;
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;

/// One applied step of the delayed index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepEvent {
    /// Clock time the step was applied at.
    pub at_ms: f64,
    pub from: usize,
    pub to: usize,
}

/// Delayed page index following a [`PageSignal`].
#[derive(Debug)]
pub struct PageSmoother {
    signal: PageSignal,
    subscription: SubscriptionId,
    changed: Rc<Cell<bool>>,
    delayed: usize,
    timer: StepTimer,
    pending: Option<ScheduleHandle>,
    timing: SelectionTiming,
}

impl PageSmoother {
    /// Start settled on the signal's current value.
    pub fn new(signal: PageSignal, timing: SelectionTiming) -> Self {
        let changed = Rc::new(Cell::new(false));
        let flag = changed.clone();
        let subscription = signal.subscribe(move |_| flag.set(true));
        Self {
            delayed: signal.get(),
            signal,
            subscription,
            changed,
            timer: StepTimer::new(),
            pending: None,
            timing,
        }
    }

    pub fn delayed(&self) -> usize {
        self.delayed
    }

    pub fn requested(&self) -> usize {
        self.signal.get()
    }

    pub fn signal(&self) -> &PageSignal {
        &self.signal
    }

    /// When the next step is due, if one is scheduled.
    pub fn next_step_at(&self) -> Option<f64> {
        self.timer.due_at()
    }

    /// True when nothing is scheduled and the delayed index has arrived.
    pub fn is_settled(&self) -> bool {
        self.pending.is_none() && self.delayed == self.requested() && !self.changed.get()
    }

    /// Handle a request change and fire every step due by `now_ms`.
    ///
    /// A change cancels any pending step and steps at once; each later step
    /// runs at its own due time, so a long frame yields the same sequence as
    /// many short ones.
    pub fn poll(&mut self, now_ms: f64) -> Vec<StepEvent> {
        let mut events = Vec::new();

        if self.changed.replace(false) {
            self.cancel();
            self.go_to_page(now_ms, &mut events);
        }

        while let Some(due) = self.timer.take_due(now_ms) {
            self.pending = None;
            self.go_to_page(due, &mut events);
        }

        events
    }

    /// Cancel the pending step, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timer.cancel(handle);
        }
    }

    fn go_to_page(&mut self, at_ms: f64, events: &mut Vec<StepEvent>) {
        // Compared when the step runs, so a request that caught up with the
        // delayed index in the meantime turns the step into a no-op.
        let requested = self.signal.get();
        if requested == self.delayed {
            return;
        }

        let distance = requested.abs_diff(self.delayed);
        self.pending = Some(self.timer.schedule(at_ms + self.timing.delay_for(distance)));

        let from = self.delayed;
        self.delayed = if requested > from { from + 1 } else { from - 1 };
        log::debug!("page step {} -> {} at {:.0}ms (target {})", from, self.delayed, at_ms, requested);
        events.push(StepEvent {
            at_ms,
            from,
            to: self.delayed,
        });
    }
}

impl Drop for PageSmoother {
    fn drop(&mut self) {
        self.cancel();
        self.signal.unsubscribe(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(start: usize) -> (PageSignal, PageSmoother) {
        let signal = PageSignal::new(start);
        let smoother = PageSmoother::new(signal.clone(), SelectionTiming::default());
        (signal, smoother)
    }

    /// Poll in 10ms ticks until settled, collecting every step.
    fn run_until_settled(smoother: &mut PageSmoother, start_ms: f64) -> Vec<StepEvent> {
        let mut events = Vec::new();
        let mut now = start_ms;
        for _ in 0..1000 {
            events.extend(smoother.poll(now));
            if smoother.is_settled() && smoother.next_step_at().is_none() {
                break;
            }
            now += 10.0;
        }
        events
    }

    #[test]
    fn test_three_page_scenario() {
        let (signal, mut smoother) = setup(0);
        signal.set(3);
        let events = run_until_settled(&mut smoother, 0.0);

        assert_eq!(
            events,
            vec![
                StepEvent { at_ms: 0.0, from: 0, to: 1 },
                StepEvent { at_ms: 50.0, from: 1, to: 2 },
                StepEvent { at_ms: 200.0, from: 2, to: 3 },
            ]
        );
        assert_eq!(smoother.delayed(), 3);
    }

    #[test]
    fn test_long_jump_timestamps() {
        let (signal, mut smoother) = setup(0);
        signal.set(10);
        let events = run_until_settled(&mut smoother, 0.0);

        let times: Vec<f64> = events.iter().map(|e| e.at_ms).collect();
        assert_eq!(
            times,
            vec![0.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0, 550.0]
        );
        let intervals: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
        // Fast while more than two pages away, then the slow final approach.
        assert!(intervals[..8].iter().all(|&i| i == 50.0));
        assert_eq!(intervals[8], 150.0);
    }

    #[test]
    fn test_steps_are_unit_and_never_skip() {
        let (signal, mut smoother) = setup(4);
        let mut now = 0.0;
        let mut previous = smoother.delayed();
        let requests = [(0.0, 9), (120.0, 2), (260.0, 6), (300.0, 6), (700.0, 0)];
        let mut next = 0;

        for _ in 0..400 {
            if next < requests.len() && requests[next].0 <= now {
                signal.set(requests[next].1);
                next += 1;
            }
            for event in smoother.poll(now) {
                assert_eq!(event.from, previous);
                assert_eq!(event.from.abs_diff(event.to), 1);
                previous = event.to;
            }
            now += 10.0;
        }
        assert_eq!(smoother.delayed(), 0);
    }

    #[test]
    fn test_no_steps_once_request_matches() {
        let (signal, mut smoother) = setup(2);
        signal.set(2);
        assert!(smoother.poll(0.0).is_empty());
        assert!(smoother.poll(1000.0).is_empty());
        assert_eq!(smoother.next_step_at(), None);
    }

    #[test]
    fn test_pending_step_resolves_to_noop() {
        let (signal, mut smoother) = setup(0);
        signal.set(2);
        let events = smoother.poll(0.0);
        assert_eq!(events.len(), 1);
        assert_eq!(smoother.delayed(), 1);

        // The request moves back onto the delayed index before the next step.
        signal.set(1);
        assert!(smoother.poll(10.0).is_empty());
        assert!(smoother.poll(1000.0).is_empty());
        assert_eq!(smoother.delayed(), 1);
    }

    #[test]
    fn test_step_fires_noop_when_arrived() {
        let (signal, mut smoother) = setup(0);
        signal.set(1);
        smoother.poll(0.0);
        assert_eq!(smoother.delayed(), 1);
        // The follow-up step is still scheduled but changes nothing.
        assert_eq!(smoother.next_step_at(), Some(150.0));
        assert!(smoother.poll(150.0).is_empty());
        assert_eq!(smoother.next_step_at(), None);
    }

    #[test]
    fn test_change_reschedules() {
        let (signal, mut smoother) = setup(0);
        signal.set(10);
        smoother.poll(0.0);
        assert_eq!(smoother.next_step_at(), Some(50.0));

        signal.set(0);
        let events = smoother.poll(20.0);
        assert_eq!(events, vec![StepEvent { at_ms: 20.0, from: 1, to: 0 }]);
        assert_eq!(smoother.next_step_at(), Some(170.0));
    }

    #[test]
    fn test_single_long_poll_matches_ticks() {
        let (signal, mut smoother) = setup(0);
        signal.set(5);
        smoother.poll(0.0);
        let events = smoother.poll(10_000.0);
        let times: Vec<f64> = events.iter().map(|e| e.at_ms).collect();
        assert_eq!(times, vec![50.0, 100.0, 150.0, 300.0]);
        assert_eq!(smoother.delayed(), 5);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let signal = PageSignal::new(0);
        {
            let _smoother = PageSmoother::new(signal.clone(), SelectionTiming::default());
            assert_eq!(signal.subscriber_count(), 1);
        }
        assert_eq!(signal.subscriber_count(), 0);
    }
}
