//! Stand-in native event sources.
//!
//! These mimic the subscription semantics of the native sources a facade
//! wraps: registering the same callback object twice yields two
//! registrations (each invoked per raise), and removal unsubscribes the
//! *first* registration whose callback is pointer-identical to the one
//! handed in. A callback that is merely equal in behavior — a freshly built
//! wrapper around the same handler — is never found, which is precisely the
//! failure mode the identity table exists to prevent.
//!
//! Raising snapshots the registration list first, so callbacks may register
//! or remove during dispatch without affecting the current round.

use std::cell::RefCell;
use std::rc::Rc;

use evshim_core::{NativeEvent, NativeSignal};

/// In-memory native source for payload-carrying events.
pub struct NativeEventSource<S, P> {
    callbacks: RefCell<Vec<NativeEvent<S, P>>>,
}

impl<S, P> Default for NativeEventSource<S, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P> NativeEventSource<S, P> {
    /// Create a source with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            callbacks: RefCell::new(Vec::new()),
        }
    }

    /// Register a callback. Duplicate registrations are kept and each fires
    /// per raise.
    pub fn add(&self, callback: NativeEvent<S, P>) {
        self.callbacks.borrow_mut().push(callback);
    }

    /// Remove the first registration pointer-identical to `callback`.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&self, callback: &NativeEvent<S, P>) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        match callbacks
            .iter()
            .position(|cb| std::ptr::addr_eq(Rc::as_ptr(cb), Rc::as_ptr(callback)))
        {
            Some(pos) => {
                callbacks.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Invoke every currently registered callback with `sender` and
    /// `payload`.
    pub fn raise(&self, sender: &S, payload: &P) {
        let snapshot: Vec<NativeEvent<S, P>> = self.callbacks.borrow().clone();
        for callback in snapshot {
            callback(sender, payload);
        }
    }

    /// Number of live registrations (duplicates counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}

/// In-memory native source for payload-less signals.
pub struct NativeSignalSource<S> {
    callbacks: RefCell<Vec<NativeSignal<S>>>,
}

impl<S> Default for NativeSignalSource<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> NativeSignalSource<S> {
    /// Create a source with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            callbacks: RefCell::new(Vec::new()),
        }
    }

    /// Register a callback.
    pub fn add(&self, callback: NativeSignal<S>) {
        self.callbacks.borrow_mut().push(callback);
    }

    /// Remove the first registration pointer-identical to `callback`.
    pub fn remove(&self, callback: &NativeSignal<S>) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        match callbacks
            .iter()
            .position(|cb| std::ptr::addr_eq(Rc::as_ptr(cb), Rc::as_ptr(callback)))
        {
            Some(pos) => {
                callbacks.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Invoke every currently registered callback with `sender`.
    pub fn raise(&self, sender: &S) {
        let snapshot: Vec<NativeSignal<S>> = self.callbacks.borrow().clone();
        for callback in snapshot {
            callback(sender);
        }
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}
