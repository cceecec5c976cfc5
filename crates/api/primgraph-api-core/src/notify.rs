//! Synchronous listener registry.
//!
//! Mutable entities (the graph, the time context) own a `Notifier` and fire
//! it inline after their state is fully updated, so listeners always observe
//! consistent state. Emission is single-threaded and reentrant: a listener's
//! own side effects may trigger nested notifications, but a listener must
//! not call back into the object that is mid-mutation.

use std::fmt;

/// Handle returned by [`Notifier::subscribe`], used to unsubscribe later.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(u32);

pub struct Notifier<E> {
    listeners: Vec<(ListenerId, Box<dyn FnMut(&E)>)>,
    next: u32,
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Notifier {
            listeners: Vec::new(),
            next: 0,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next);
        self.next = self.next.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns true if the listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Invoke every listener in subscription order, before returning.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn emit_reaches_all_listeners() {
        let count = Rc::new(Cell::new(0));
        let mut n: Notifier<i32> = Notifier::new();
        for _ in 0..3 {
            let count = Rc::clone(&count);
            n.subscribe(move |v| count.set(count.get() + v));
        }
        n.emit(&2);
        assert_eq!(count.get(), 6);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(Cell::new(0));
        let mut n: Notifier<()> = Notifier::new();
        let c = Rc::clone(&count);
        let id = n.subscribe(move |()| c.set(c.get() + 1));
        n.emit(&());
        assert!(n.unsubscribe(id));
        assert!(!n.unsubscribe(id));
        n.emit(&());
        assert_eq!(count.get(), 1);
    }
}
