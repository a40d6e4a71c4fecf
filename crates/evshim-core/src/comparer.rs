//! Pluggable equality/hash strategy for mapping keys.
//!
//! [`IdentityComparer`] adapts two caller-supplied functions into the key
//! strategy the lookup table hashes and compares with. It forwards without
//! interpretation of its own.
//!
//! # Contract
//!
//! `equals` must be reflexive, symmetric, and consistent with `hash`: keys
//! that compare equal must hash equal. The comparer does not (and cannot)
//! verify this; a strategy pair that violates it corrupts the table the same
//! way a bad `Hash`/`Eq` pair corrupts any hash map.

use std::rc::Rc;

use crate::error::ShimError;

/// Equality strategy function.
pub type EqualsFn<K> = dyn Fn(&K, &K) -> bool;

/// Hash strategy function.
pub type HashFn<K> = dyn Fn(&K) -> u64;

/// An equality/hash strategy built from two caller-supplied functions.
pub struct IdentityComparer<K> {
    equals: Rc<EqualsFn<K>>,
    hash: Rc<HashFn<K>>,
}

impl<K> Clone for IdentityComparer<K> {
    fn clone(&self) -> Self {
        Self {
            equals: Rc::clone(&self.equals),
            hash: Rc::clone(&self.hash),
        }
    }
}

impl<K> std::fmt::Debug for IdentityComparer<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityComparer").finish_non_exhaustive()
    }
}

impl<K> IdentityComparer<K> {
    /// Build a comparer from its two strategy functions.
    #[must_use]
    pub fn new(
        equals: impl Fn(&K, &K) -> bool + 'static,
        hash: impl Fn(&K) -> u64 + 'static,
    ) -> Self {
        Self {
            equals: Rc::new(equals),
            hash: Rc::new(hash),
        }
    }

    /// Build a comparer from strategy functions that arrived through a
    /// dynamic boundary and may be absent.
    ///
    /// The table cannot function without both; either missing fails with
    /// [`ShimError::InvalidArgument`] naming the absent function.
    pub fn from_parts(
        equals: Option<Rc<EqualsFn<K>>>,
        hash: Option<Rc<HashFn<K>>>,
    ) -> Result<Self, ShimError> {
        let equals = equals.ok_or(ShimError::InvalidArgument("equals"))?;
        let hash = hash.ok_or(ShimError::InvalidArgument("hash"))?;
        Ok(Self { equals, hash })
    }

    /// Compare two keys with the supplied equality strategy.
    pub fn equals(&self, a: &K, b: &K) -> bool {
        (self.equals)(a, b)
    }

    /// Hash a key with the supplied hash strategy.
    pub fn hash_of(&self, key: &K) -> u64 {
        (self.hash)(key)
    }
}
