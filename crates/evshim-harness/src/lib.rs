#![forbid(unsafe_code)]

//! Test harness for evshim facades.
//!
//! Real native event sources are exactly what facade tests want to avoid, so
//! this crate provides stand-ins that keep the one behavior the subscription
//! table is designed around: removal by *reference identity* of the
//! registered callback.
//!
//! - [`NativeEventSource`] / [`NativeSignalSource`]: in-memory sources that
//!   register, remove (first pointer-identical match only), and raise.
//! - [`Probe`]: a shared invocation recorder usable as a handler receiver.

pub mod native;
pub mod probe;

pub use native::{NativeEventSource, NativeSignalSource};
pub use probe::Probe;
