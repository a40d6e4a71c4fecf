#![forbid(unsafe_code)]

//! Identity-keyed callback mapping for testable event facades.
//!
//! A facade wraps a native, event-driven API behind a parallel interface so
//! calling code can be tested without the native event source. The facade's
//! forwarding is mechanical; the part that needs real bookkeeping is event
//! subscription, and that is what this crate provides:
//!
//! - [`EventHandler`] / [`SignalHandler`]: the caller-supplied callback — an
//!   optional captured receiver plus a method pointer, compared by identity.
//! - [`HandlerIdentity`]: that identity as an explicit value.
//! - [`IdentityComparer`]: pluggable equality/hash strategy for table keys.
//! - [`HandlerMap`]: the identity-keyed, reference-counted table from caller
//!   handlers to generated native callbacks.
//! - [`EventBridge`] / [`SignalBridge`]: typed specializations that also
//!   convert native payloads to facade payloads at invocation time.
//!
//! # Architecture
//!
//! Native event sources unsubscribe by *reference identity* of the handler
//! object, not by value. The table therefore generates at most one native
//! callback per caller-handler identity and hands out the same `Rc` referent
//! on every attach and detach for that identity; a counter tracks how many
//! attachments are outstanding so equal attachments stay individually
//! revocable. The facade registers and unregisters the returned native
//! callback with the real source — this crate never touches the source
//! itself.
//!
//! Everything is synchronous and single-threaded: plain in-memory map
//! operations, no locks, no suspension points. A table is owned by one
//! facade instance; wrap whole attach/detach calls in a mutex if a facade
//! must be shared across threads.
//!
//! # Invariants
//!
//! 1. Attaching identity-equal handlers N times yields one native callback
//!    and a count of N; the factory runs once per live identity.
//! 2. Detachment returns the exact native callback object attachment
//!    returned, so the native source finds it by reference.
//! 3. A registration's count is >= 1 while stored; eviction at zero is
//!    immediate and final (no resurrection on over-detach).
//! 4. An absent handler is a no-op on every path; an absent factory or
//!    converter is an [`ShimError::InvalidArgument`] before anything else is
//!    examined.

pub mod bridge;
pub mod comparer;
pub mod error;
pub mod handler;
pub mod identity;
pub mod table;

pub use bridge::{EventBridge, NativeEvent, NativeSignal, SignalBridge};
pub use comparer::{EqualsFn, HashFn, IdentityComparer};
pub use error::ShimError;
pub use handler::{EventHandler, MethodFn, Receiver, SignalHandler};
pub use identity::HandlerIdentity;
pub use table::HandlerMap;
