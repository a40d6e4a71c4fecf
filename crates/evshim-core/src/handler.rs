//! Caller-facing handler values.
//!
//! An [`EventHandler`] is what the facade layer's callers hand in when they
//! subscribe: an optional captured receiver plus a method function pointer.
//! The pair is also the handler's *identity* — two independently constructed
//! `EventHandler` values that name the same receiver and method are one
//! subscription as far as the lookup table is concerned.
//!
//! The receiver is type-erased behind `Rc<dyn Any>` and handed back to the
//! method on every invocation; a method that needs its concrete type
//! downcasts. Receiver-less handlers (plain free functions) are legal and
//! keep a consistent identity with no receiver dereference anywhere.
//!
//! Method identity is address identity. That matches how native event
//! sources compare handlers, and it is the reason methods are `fn` pointers
//! here rather than closures — a closure has no stable address to compare.

use std::any::Any;
use std::rc::Rc;

use crate::identity::HandlerIdentity;

/// Type-erased receiver object captured by a bound handler.
pub type Receiver = Rc<dyn Any>;

/// Method shape for an event handler: receiver (if any), sender, payload.
pub type MethodFn<S, A> = fn(Option<&dyn Any>, &S, &A);

/// A payload-less handler for signal-style notifications.
pub type SignalHandler<S> = EventHandler<S, ()>;

/// A caller-supplied callback: optional receiver + method pointer.
pub struct EventHandler<S, A> {
    receiver: Option<Receiver>,
    method: MethodFn<S, A>,
}

impl<S, A> Clone for EventHandler<S, A> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            method: self.method,
        }
    }
}

impl<S, A> std::fmt::Debug for EventHandler<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandler")
            .field("identity", &self.identity())
            .finish()
    }
}

impl<S, A> EventHandler<S, A> {
    /// Create a handler bound to a receiver object.
    ///
    /// The receiver is kept alive by the handler (and by any table entry the
    /// handler is attached under) until the last clone is dropped.
    #[must_use]
    pub fn bound<R: Any>(receiver: Rc<R>, method: MethodFn<S, A>) -> Self {
        let receiver: Receiver = receiver;
        Self {
            receiver: Some(receiver),
            method,
        }
    }

    /// Create a receiver-less handler from a free function.
    #[must_use]
    pub fn unbound(method: MethodFn<S, A>) -> Self {
        Self {
            receiver: None,
            method,
        }
    }

    /// Invoke the handler's method with the sender and payload.
    pub fn invoke(&self, sender: &S, args: &A) {
        (self.method)(self.receiver.as_deref(), sender, args);
    }

    /// Compute this handler's identity.
    ///
    /// Computed fresh on every call; nothing is cached.
    #[must_use]
    pub fn identity(&self) -> HandlerIdentity {
        let receiver = self
            .receiver
            .as_ref()
            .map(|r| Rc::as_ptr(r) as *const ());
        HandlerIdentity::new(receiver, self.method as usize)
    }
}

impl<S> EventHandler<S, ()> {
    /// Invoke a payload-less handler with just the sender.
    pub fn invoke_signal(&self, sender: &S) {
        self.invoke(sender, &());
    }
}

/// Default identity equality for [`EventHandler`] keys: pairwise
/// (receiver, method) address equality.
pub fn identity_eq<S, A>(a: &EventHandler<S, A>, b: &EventHandler<S, A>) -> bool {
    a.identity() == b.identity()
}

/// Default identity hash for [`EventHandler`] keys, consistent with
/// [`identity_eq`].
pub fn identity_hash<S, A>(handler: &EventHandler<S, A>) -> u64 {
    handler.identity().mixed()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Counter {
        hits: Cell<u32>,
    }

    fn on_tick(receiver: Option<&dyn Any>, _sender: &u8, delta: &u32) {
        let counter = receiver
            .and_then(|r| r.downcast_ref::<Counter>())
            .expect("bound receiver");
        counter.hits.set(counter.hits.get() + delta);
    }

    fn on_other(_receiver: Option<&dyn Any>, _sender: &u8, _delta: &u32) {}

    #[test]
    fn invoke_dispatches_to_receiver() {
        let counter = Rc::new(Counter { hits: Cell::new(0) });
        let handler = EventHandler::bound(Rc::clone(&counter), on_tick);

        handler.invoke(&1, &3);
        handler.invoke(&1, &4);
        assert_eq!(counter.hits.get(), 7);
    }

    #[test]
    fn distinct_instances_share_identity() {
        let counter = Rc::new(Counter { hits: Cell::new(0) });
        let a = EventHandler::bound(Rc::clone(&counter), on_tick);
        let b = EventHandler::bound(Rc::clone(&counter), on_tick);

        assert!(identity_eq(&a, &b));
        assert_eq!(identity_hash(&a), identity_hash(&b));
    }

    #[test]
    fn clone_preserves_identity() {
        let counter = Rc::new(Counter { hits: Cell::new(0) });
        let a = EventHandler::bound(counter, on_tick);
        let b = a.clone();
        assert!(identity_eq(&a, &b));
    }

    #[test]
    fn different_receivers_differ() {
        let a = EventHandler::bound(Rc::new(Counter { hits: Cell::new(0) }), on_tick);
        let b = EventHandler::bound(Rc::new(Counter { hits: Cell::new(0) }), on_tick);
        assert!(!identity_eq(&a, &b));
    }

    #[test]
    fn different_methods_differ() {
        let counter = Rc::new(Counter { hits: Cell::new(0) });
        let a = EventHandler::bound(Rc::clone(&counter), on_tick);
        let b = EventHandler::bound(counter, on_other);
        assert!(!identity_eq(&a, &b));
    }

    #[test]
    fn unbound_handlers_compare_by_method_only() {
        fn free(_: Option<&dyn Any>, _: &u8, _: &u32) {}

        let a = EventHandler::unbound(free);
        let b = EventHandler::unbound(free);
        assert!(identity_eq(&a, &b));
        assert!(!a.identity().is_bound());
    }

    #[test]
    fn bound_and_unbound_never_equal() {
        let counter = Rc::new(Counter { hits: Cell::new(0) });
        let bound = EventHandler::bound(counter, on_tick);
        let unbound = EventHandler::unbound(on_tick);
        assert!(!identity_eq(&bound, &unbound));
    }

    #[test]
    fn signal_handler_invokes_without_payload() {
        struct Flag {
            seen: Cell<bool>,
        }

        fn on_signal(receiver: Option<&dyn Any>, _sender: &u8, _args: &()) {
            let flag = receiver
                .and_then(|r| r.downcast_ref::<Flag>())
                .expect("bound receiver");
            flag.seen.set(true);
        }

        let flag = Rc::new(Flag {
            seen: Cell::new(false),
        });
        let handler: SignalHandler<u8> = EventHandler::bound(Rc::clone(&flag), on_signal);
        handler.invoke_signal(&9);
        assert!(flag.seen.get());
    }
}
