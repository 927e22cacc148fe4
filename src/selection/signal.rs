//! Shared "requested page" cell with change observers.
//!
//! The UI writes it, the smoother and any host hooks (page-flip sound,
//! active-button styling) observe it. Single-threaded: clones share one
//! `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identifies one observer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(usize)>;

/// Upper bound on rebroadcasts when observers keep setting new values.
const MAX_NOTIFY_PASSES: usize = 32;

struct SignalInner {
    value: usize,
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    notifying: bool,
    removed: Vec<SubscriptionId>,
}

/// The requested page index, shared between the UI and the book.
#[derive(Clone)]
pub struct PageSignal {
    inner: Rc<RefCell<SignalInner>>,
}

impl PageSignal {
    pub fn new(value: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                value,
                next_id: 0,
                observers: Vec::new(),
                notifying: false,
                removed: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> usize {
        self.inner.borrow().value
    }

    /// Store a new value and notify observers if it changed.
    ///
    /// Observers run outside the internal borrow, so they may read the signal,
    /// set it, or unsubscribe. A value set from inside an observer is
    /// broadcast to every observer once the current pass ends, repeating
    /// until the value settles.
    pub fn set(&self, value: usize) {
        let mut observers = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            if inner.notifying {
                // Picked up by the pass already running.
                return;
            }
            inner.notifying = true;
            std::mem::take(&mut inner.observers)
        };

        let mut broadcast = value;
        let mut passes = 0;
        loop {
            for (id, observer) in observers.iter_mut() {
                let removed = self.inner.borrow().removed.contains(id);
                if !removed {
                    observer(broadcast);
                }
            }
            passes += 1;

            let mut inner = self.inner.borrow_mut();
            let removed = std::mem::take(&mut inner.removed);
            observers.retain(|(id, _)| !removed.contains(id));
            // Keep registrations made during notification, after the existing ones.
            observers.append(&mut inner.observers);

            if inner.value == broadcast || passes >= MAX_NOTIFY_PASSES {
                if inner.value != broadcast {
                    log::warn!(
                        "page signal still changing after {} passes, last broadcast {} but value is {}",
                        passes,
                        broadcast,
                        inner.value
                    );
                }
                inner.observers = observers;
                inner.notifying = false;
                return;
            }
            broadcast = inner.value;
        }
    }

    /// Register an observer called with each new value.
    pub fn subscribe(&self, observer: impl FnMut(usize) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.borrow_mut();
        let before = inner.observers.len();
        inner.observers.retain(|(existing, _)| *existing != id);
        if inner.notifying && inner.observers.len() == before {
            inner.removed.push(id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }
}

impl Default for PageSignal {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for PageSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("PageSignal")
            .field("value", &inner.value)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_notifies_on_change_only() {
        let signal = PageSignal::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        signal.subscribe(move |value| sink.borrow_mut().push(value));

        signal.set(3);
        signal.set(3);
        signal.set(1);

        assert_eq!(*seen.borrow(), vec![3, 1]);
        assert_eq!(signal.get(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let signal = PageSignal::new(0);
        let ui = signal.clone();
        ui.set(4);
        assert_eq!(signal.get(), 4);
    }

    #[test]
    fn test_unsubscribe() {
        let signal = PageSignal::new(0);
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let id = signal.subscribe(move |_| counter.set(counter.get() + 1));

        signal.set(1);
        signal.unsubscribe(id);
        signal.set(2);

        assert_eq!(count.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_value_set_by_observer_reaches_every_observer() {
        let signal = PageSignal::new(0);
        let clamp = signal.clone();
        // Clamp requests past the end of a two-page book.
        signal.subscribe(move |value| {
            if value > 2 {
                clamp.set(2);
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        signal.subscribe(move |value| sink.borrow_mut().push(value));

        signal.set(5);
        assert_eq!(signal.get(), 2);
        assert_eq!(*seen.borrow(), vec![5, 2]);
        assert_eq!(seen.borrow().last(), Some(&signal.get()));
        assert_eq!(signal.subscriber_count(), 2);
    }

    #[test]
    fn test_earlier_observer_sees_value_set_by_later_one() {
        let signal = PageSignal::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        signal.subscribe(move |value| sink.borrow_mut().push(value));
        let clamp = signal.clone();
        signal.subscribe(move |value| {
            if value > 2 {
                clamp.set(2);
            }
        });

        signal.set(7);
        assert_eq!(*seen.borrow(), vec![7, 2]);
        assert_eq!(signal.get(), 2);
    }

    #[test]
    fn test_oscillating_observer_terminates() {
        let signal = PageSignal::new(0);
        let handle = signal.clone();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        signal.subscribe(move |value| {
            counter.set(counter.get() + 1);
            handle.set(if value == 1 { 2 } else { 1 });
        });

        signal.set(1);
        assert_eq!(calls.get(), MAX_NOTIFY_PASSES);
        assert_eq!(signal.subscriber_count(), 1);
        // Notification finished, so later sets broadcast again.
        let before = calls.get();
        signal.set(9);
        assert!(calls.get() > before);
    }

    #[test]
    fn test_observer_unsubscribed_mid_pass_is_skipped() {
        let signal = PageSignal::new(0);
        let handle = signal.clone();
        let later: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let target = later.clone();
        signal.subscribe(move |_| {
            if let Some(id) = target.get() {
                handle.unsubscribe(id);
            }
        });
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        later.set(Some(signal.subscribe(move |_| counter.set(counter.get() + 1))));

        signal.set(1);
        assert_eq!(count.get(), 0);
        assert_eq!(signal.subscriber_count(), 1);
    }

    #[test]
    fn test_unsubscribe_during_notification() {
        let signal = PageSignal::new(0);
        let handle = signal.clone();
        let id_cell: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let id_slot = id_cell.clone();
        let id = signal.subscribe(move |_| {
            if let Some(id) = id_slot.get() {
                handle.unsubscribe(id);
            }
        });
        id_cell.set(Some(id));

        signal.set(1);
        assert_eq!(signal.subscriber_count(), 0);
    }
}
