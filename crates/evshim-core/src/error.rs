//! Error type for the subscription-mapping subsystem.
//!
//! There is exactly one failure mode: a required collaborator (a native
//! callback factory, a payload converter, or a comparer strategy function
//! supplied through a dynamic boundary) was absent. An absent *handler* is
//! never an error — attaching or detaching nothing is a documented no-op.
//!
//! Errors propagate synchronously to the caller of the attach operation.
//! Nothing is caught, retried, or logged on the error path; a `ShimError`
//! indicates a programming contract violation in the facade layer, not a
//! runtime condition.

/// Errors from attach-time validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShimError {
    /// A required collaborator was absent. The payload names it
    /// (`"factory"`, `"convert"`, `"equals"`, `"hash"`).
    InvalidArgument(&'static str),
}

impl std::fmt::Display for ShimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(what) => {
                write!(f, "required collaborator '{what}' was not supplied")
            }
        }
    }
}

impl std::error::Error for ShimError {}
