//! Identity-keyed, reference-counted subscription table.
//!
//! [`HandlerMap`] is the bookkeeping core of the facade layer: it maps a
//! caller handler's identity to the one native callback generated for it,
//! plus a live attachment count. The two operations mirror a facade's event
//! accessors:
//!
//! - [`HandlerMap::map_for_attachment`] — look up by identity, create and
//!   store the native callback on first attach, bump the count, and return
//!   the stored native callback for the facade to register with the real
//!   native source.
//! - [`HandlerMap::try_map_for_detachment`] — drop the count, evict at zero,
//!   and return the stored native callback for the facade to hand to the
//!   native source's removal API.
//!
//! # Invariants
//!
//! 1. A stored registration's count is always >= 1; a registration reaching
//!    zero is removed in the same operation, never kept.
//! 2. The native callback of a registration is created exactly once and
//!    never regenerated — every attach and detach for that identity returns
//!    the same `Rc` referent, because native sources unsubscribe by
//!    reference identity.
//! 3. An absent handler is a no-op on both paths and never mutates the
//!    table.
//! 4. An absent factory fails before the handler is even examined.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Absent factory | Facade bug | `InvalidArgument`, table untouched |
//! | Detach of unknown handler | Caller over-detach | Returns `None` |
//! | Detach past zero | Caller over-detach | `None`; no resurrection |
//!
//! The backing map is a plain, unsynchronized `HashMap`. A `HandlerMap` is
//! owned by one facade instance; callers needing cross-thread facades must
//! serialize whole attach/detach calls externally (the native sources being
//! wrapped are not thread-safe for concurrent subscribe/unsubscribe either).

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use ahash::RandomState;

use crate::comparer::IdentityComparer;
use crate::error::ShimError;

/// One live subscription: the generated native callback and its attachment
/// count. Owned exclusively by the table; callers only ever see clones of
/// the `native` handle.
struct Registration<N: ?Sized> {
    native: Rc<N>,
    count: usize,
}

/// Map key routing `Hash`/`Eq` through the table's comparer.
struct IdentityKey<H> {
    handler: H,
    comparer: IdentityComparer<H>,
}

impl<H> PartialEq for IdentityKey<H> {
    fn eq(&self, other: &Self) -> bool {
        self.comparer.equals(&self.handler, &other.handler)
    }
}

impl<H> Eq for IdentityKey<H> {}

impl<H> Hash for IdentityKey<H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_u64(self.comparer.hash_of(&self.handler));
    }
}

/// Identity-keyed lookup table from caller handlers to refcounted native
/// callbacks.
pub struct HandlerMap<H, N: ?Sized> {
    comparer: IdentityComparer<H>,
    slots: HashMap<IdentityKey<H>, Registration<N>, RandomState>,
}

impl<H, N: ?Sized> std::fmt::Debug for HandlerMap<H, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerMap")
            .field("len", &self.slots.len())
            .finish()
    }
}

impl<H: Clone, N: ?Sized> HandlerMap<H, N> {
    /// Create an empty table keyed through `comparer`.
    #[must_use]
    pub fn new(comparer: IdentityComparer<H>) -> Self {
        Self {
            comparer,
            slots: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Map a caller handler to its native callback for attachment.
    ///
    /// This is the dynamic-boundary form consumed by facade event accessors,
    /// which pass through whatever their own caller supplied. An absent
    /// `factory` is a contract violation and fails with
    /// [`ShimError::InvalidArgument`] regardless of the handler. Code that
    /// holds a factory by type can call [`HandlerMap::attach_with`] directly.
    pub fn map_for_attachment<F>(
        &mut self,
        handler: Option<&H>,
        factory: Option<F>,
    ) -> Result<Option<Rc<N>>, ShimError>
    where
        F: FnOnce(&H) -> Rc<N>,
    {
        let factory = factory.ok_or(ShimError::InvalidArgument("factory"))?;
        Ok(self.attach_with(handler, factory))
    }

    /// Attach a handler, generating its native callback on first attach.
    ///
    /// On the first attach for a given identity, `factory` is invoked exactly
    /// once to generate the native callback; every further attach while the
    /// identity's count stays above zero returns the same referent without
    /// touching the factory. The returned handle is what the facade registers
    /// with the real native source.
    ///
    /// An absent `handler` is a legal no-op and returns `None` without
    /// mutating the table.
    pub fn attach_with<F>(&mut self, handler: Option<&H>, factory: F) -> Option<Rc<N>>
    where
        F: FnOnce(&H) -> Rc<N>,
    {
        let handler = handler?;
        let key = self.key_for(handler);
        let slot = self.slots.entry(key).or_insert_with(|| Registration {
            native: factory(handler),
            count: 0,
        });
        slot.count += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(count = slot.count, "handler attached");
        Some(Rc::clone(&slot.native))
    }

    /// Map a caller handler to its native callback for detachment.
    ///
    /// Decrements the identity's count, evicting the registration when it
    /// reaches zero. Returns the same native callback referent every prior
    /// attach returned, so the facade can pass it to the native source's
    /// removal API and have it found by reference.
    ///
    /// An absent handler, an identity never attached, or a detach past zero
    /// all return `None`; none of them mutate the table or resurrect a
    /// removed registration.
    pub fn try_map_for_detachment(&mut self, handler: Option<&H>) -> Option<Rc<N>> {
        let handler = handler?;
        let key = self.key_for(handler);
        match self.slots.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().count -= 1;
                #[cfg(feature = "tracing")]
                tracing::trace!(count = occupied.get().count, "handler detached");
                if occupied.get().count == 0 {
                    Some(occupied.remove().native)
                } else {
                    Some(Rc::clone(&occupied.get().native))
                }
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Live attachment count for a handler's identity (0 if not attached).
    #[must_use]
    pub fn attachment_count(&self, handler: Option<&H>) -> usize {
        let Some(handler) = handler else {
            return 0;
        };
        let key = self.key_for(handler);
        self.slots.get(&key).map_or(0, |slot| slot.count)
    }

    /// Number of distinct identities currently registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table holds no registrations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove every registration, returning the native callbacks so a facade
    /// being torn down can unregister each from the real native source.
    pub fn drain(&mut self) -> Vec<Rc<N>> {
        self.slots.drain().map(|(_, slot)| slot.native).collect()
    }

    fn key_for(&self, handler: &H) -> IdentityKey<H> {
        IdentityKey {
            handler: handler.clone(),
            comparer: self.comparer.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    // The table is exercised with plain integer keys here; identity-typed
    // keys are covered by the bridge and integration tests.
    fn value_table() -> HandlerMap<u32, String> {
        HandlerMap::new(IdentityComparer::new(
            |a: &u32, b: &u32| a == b,
            |k: &u32| u64::from(*k),
        ))
    }

    fn make_native(label: &str) -> impl FnOnce(&u32) -> Rc<String> + '_ {
        move |_| Rc::new(label.to_string())
    }

    #[test]
    fn absent_handler_is_a_noop() {
        let mut table = value_table();
        for _ in 0..3 {
            let mapped = table
                .map_for_attachment(None, Some(make_native("n")))
                .unwrap();
            assert!(mapped.is_none());
        }
        assert!(table.is_empty());
    }

    #[test]
    fn absent_factory_fails_before_handler_is_examined() {
        let mut table = value_table();

        let err = table
            .map_for_attachment(Some(&1), None::<fn(&u32) -> Rc<String>>)
            .unwrap_err();
        assert_eq!(err, ShimError::InvalidArgument("factory"));

        // Factory validation is independent of handler nullness.
        let err = table
            .map_for_attachment(None, None::<fn(&u32) -> Rc<String>>)
            .unwrap_err();
        assert_eq!(err, ShimError::InvalidArgument("factory"));
        assert!(table.is_empty());
    }

    #[test]
    fn repeated_attach_shares_one_native() {
        let mut table = value_table();
        let calls = Cell::new(0u32);

        let first = table
            .map_for_attachment(
                Some(&7),
                Some(|_: &u32| {
                    calls.set(calls.get() + 1);
                    Rc::new(String::from("native"))
                }),
            )
            .unwrap()
            .unwrap();
        let second = table
            .map_for_attachment(
                Some(&7),
                Some(|_: &u32| {
                    calls.set(calls.get() + 1);
                    Rc::new(String::from("other"))
                }),
            )
            .unwrap()
            .unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1, "factory runs once per live identity");
        assert_eq!(table.attachment_count(Some(&7)), 2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn detach_counts_down_then_evicts() {
        let mut table = value_table();

        let attached = table
            .map_for_attachment(Some(&3), Some(make_native("n")))
            .unwrap()
            .unwrap();
        table
            .map_for_attachment(Some(&3), Some(make_native("n")))
            .unwrap();

        let first = table.try_map_for_detachment(Some(&3)).unwrap();
        assert!(Rc::ptr_eq(&attached, &first));
        assert_eq!(table.attachment_count(Some(&3)), 1);
        assert_eq!(table.len(), 1);

        let second = table.try_map_for_detachment(Some(&3)).unwrap();
        assert!(Rc::ptr_eq(&attached, &second));
        assert!(table.is_empty());

        assert!(table.try_map_for_detachment(Some(&3)).is_none());
    }

    #[test]
    fn attach_with_is_the_statically_checked_path() {
        let mut table = value_table();
        let native = table.attach_with(Some(&8), make_native("n")).unwrap();
        let again = table.attach_with(Some(&8), make_native("n")).unwrap();
        assert!(Rc::ptr_eq(&native, &again));
        assert!(table.attach_with(None, make_native("n")).is_none());
        assert_eq!(table.attachment_count(Some(&8)), 2);
    }

    #[test]
    fn detach_of_unknown_handler_is_none() {
        let mut table = value_table();
        assert!(table.try_map_for_detachment(Some(&99)).is_none());
        assert!(table.try_map_for_detachment(None).is_none());
    }

    #[test]
    fn over_detach_does_not_resurrect() {
        let mut table = value_table();
        table
            .map_for_attachment(Some(&5), Some(make_native("a")))
            .unwrap();
        table.try_map_for_detachment(Some(&5)).unwrap();
        assert!(table.try_map_for_detachment(Some(&5)).is_none());
        assert_eq!(table.attachment_count(Some(&5)), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn reattach_after_eviction_runs_factory_again() {
        let mut table = value_table();
        let calls = Cell::new(0u32);
        let factory = |_: &u32| {
            calls.set(calls.get() + 1);
            Rc::new(String::from("native"))
        };

        let first = table
            .map_for_attachment(Some(&4), Some(factory))
            .unwrap()
            .unwrap();
        table.try_map_for_detachment(Some(&4)).unwrap();

        let second = table
            .map_for_attachment(Some(&4), Some(factory))
            .unwrap()
            .unwrap();
        assert_eq!(calls.get(), 2);
        assert!(
            !Rc::ptr_eq(&first, &second),
            "a fresh registration owns a fresh native callback"
        );
        assert_eq!(table.attachment_count(Some(&4)), 1);
    }

    #[test]
    fn identities_are_independent() {
        let mut table = value_table();
        let a = table
            .map_for_attachment(Some(&1), Some(make_native("a")))
            .unwrap()
            .unwrap();
        let b = table
            .map_for_attachment(Some(&2), Some(make_native("b")))
            .unwrap()
            .unwrap();

        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(table.len(), 2);

        table.try_map_for_detachment(Some(&1)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.attachment_count(Some(&2)), 1);
    }

    #[test]
    fn drain_returns_all_natives_and_empties() {
        let mut table = value_table();
        table
            .map_for_attachment(Some(&1), Some(make_native("a")))
            .unwrap();
        table
            .map_for_attachment(Some(&2), Some(make_native("b")))
            .unwrap();
        table
            .map_for_attachment(Some(&2), Some(make_native("b")))
            .unwrap();

        let natives = table.drain();
        assert_eq!(natives.len(), 2, "one native per identity, not per count");
        assert!(table.is_empty());
        assert!(table.try_map_for_detachment(Some(&2)).is_none());
    }

    #[test]
    fn debug_reports_len() {
        let mut table = value_table();
        table
            .map_for_attachment(Some(&1), Some(make_native("a")))
            .unwrap();
        assert!(format!("{table:?}").contains("len: 1"));
    }
}
