//! Change notification for store subscribers.
//!
//! `emit` works on a snapshot of the registrations taken when the pass
//! starts: listeners subscribed during a pass wait for the next one, and a
//! listener unsubscribed during a pass is skipped if it has not run yet.
use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use log::trace;

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
}

impl Registry {
    fn is_registered(&self, id: u64) -> bool {
        self.listeners.borrow().iter().any(|(lid, _)| *lid == id)
    }

    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }
}

/// A list of zero-argument listeners, invoked in registration order.
#[derive(Clone, Default)]
pub struct Emitter {
    registry: Rc<Registry>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. Every call creates an independent registration.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        let listener: Listener = Rc::new(listener);
        self.registry.listeners.borrow_mut().push((id, listener));

        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Invokes every listener registered when the call starts.
    pub fn emit(&self) {
        let snapshot: Vec<(u64, Listener)> = self
            .registry
            .listeners
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        trace!("Notifying {} listeners", snapshot.len());
        for (id, listener) in snapshot {
            if self.registry.is_registered(id) {
                listener();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`Emitter::subscribe`]. Dropping it keeps the listener registered.
#[derive(Debug, Clone)]
pub struct Subscription {
    registry: Weak<Registry>,
    id: u64,
}

impl Subscription {
    /// Removes exactly this registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.remove(self.id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<usize>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn invokes_in_registration_order() {
        let emitter = Emitter::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = Rc::clone(&order);
            let _ = emitter.subscribe(move || order.borrow_mut().push(n));
        }

        emitter.emit();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn same_closure_registered_twice_runs_twice() {
        let emitter = Emitter::new();
        let count = Rc::new(Cell::new(0));
        let listener = {
            let count = Rc::clone(&count);
            Rc::new(move || count.set(count.get() + 1))
        };
        let first = Rc::clone(&listener);
        let second = Rc::clone(&listener);
        let a = emitter.subscribe(move || first());
        let _b = emitter.subscribe(move || second());

        emitter.emit();
        assert_eq!(count.get(), 2);

        assert!(a.unsubscribe());
        assert!(!a.unsubscribe());
        emitter.emit();
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn unsubscribed_listener_is_never_called_again() {
        let emitter = Emitter::new();
        let (count, listener) = counter();
        let subscription = emitter.subscribe(listener);

        emitter.emit();
        subscription.unsubscribe();
        emitter.emit();
        emitter.emit();

        assert_eq!(count.get(), 1);
        assert!(emitter.is_empty());
    }

    #[test]
    fn listener_added_during_emit_waits_for_next_pass() {
        let emitter = Emitter::new();
        let (count, listener) = counter();
        let listener = Rc::new(listener);
        let added = Rc::new(Cell::new(false));

        let inner_emitter = emitter.clone();
        let inner_added = Rc::clone(&added);
        let _ = emitter.subscribe(move || {
            if !inner_added.replace(true) {
                let listener = Rc::clone(&listener);
                let _ = inner_emitter.subscribe(move || listener());
            }
        });

        emitter.emit();
        assert_eq!(count.get(), 0);
        emitter.emit();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn listener_removed_during_emit_is_skipped() {
        let emitter = Emitter::new();
        let (count, listener) = counter();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let handle = Rc::clone(&victim);
        let _ = emitter.subscribe(move || {
            if let Some(subscription) = handle.borrow().as_ref() {
                subscription.unsubscribe();
            }
        });
        *victim.borrow_mut() = Some(emitter.subscribe(listener));

        emitter.emit();
        assert_eq!(count.get(), 0);
        assert_eq!(emitter.len(), 1);
    }

    #[test]
    fn unsubscribe_after_emitter_dropped_is_noop() {
        let emitter = Emitter::new();
        let subscription = emitter.subscribe(|| {});
        drop(emitter);
        assert!(!subscription.unsubscribe());
    }
}
