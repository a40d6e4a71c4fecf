//! Shared invocation recorder.

use std::cell::RefCell;
use std::rc::Rc;

/// Records formatted invocations for later assertion.
///
/// A `Probe` is built to sit behind a handler's receiver slot: share it via
/// [`Probe::shared`], bind handlers to the `Rc`, and have the handler method
/// downcast and [`Probe::record`].
#[derive(Debug, Default)]
pub struct Probe {
    entries: RefCell<Vec<String>>,
}

impl Probe {
    /// Create a probe behind an `Rc`, ready to be captured as a receiver.
    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Append one entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    /// Copy out the entries recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Take the recorded entries, leaving the probe empty.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut self.entries.borrow_mut())
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
