//! Typed bridges from facade handlers to native callbacks.
//!
//! A facade's event accessors do not talk to [`HandlerMap`] directly; they go
//! through a bridge that knows the native callback shape for one event and
//! how to build it:
//!
//! - [`EventBridge`] — payload-carrying events. The generated native
//!   callback converts the native payload to the facade representation, then
//!   invokes the caller's handler with the original sender and the converted
//!   payload.
//! - [`SignalBridge`] — payload-less, signal-style notifications. Same
//!   bookkeeping, no conversion step.
//!
//! Both are thin specializations over one [`HandlerMap`]; the lookup and
//! counting logic is not duplicated here.
//!
//! # Converter capture
//!
//! Identity is computed from the handler alone, never from the converter.
//! Attaching a second identity-equal handler with a *different* converter
//! returns the existing native callback, whose closure still holds the
//! converter captured when the registration was first created
//! (first-writer-wins). The alternative — regenerating the native callback
//! to honor the new converter — would change its reference identity and
//! break native unsubscription, so the stale-converter asymmetry is accepted
//! and documented on [`EventBridge::map_for_attachment`].

use std::rc::Rc;

use crate::comparer::IdentityComparer;
use crate::error::ShimError;
use crate::handler::{self, EventHandler, SignalHandler};
use crate::table::HandlerMap;

/// Native callback shape for payload-carrying events.
pub type NativeEvent<S, P> = Rc<dyn Fn(&S, &P)>;

/// Native callback shape for payload-less signals.
pub type NativeSignal<S> = Rc<dyn Fn(&S)>;

// ---------------------------------------------------------------------------
// EventBridge<S, P, A> — payload-converting bridge
// ---------------------------------------------------------------------------

/// Bridge for events whose native payload `P` must be converted to the
/// facade payload `A` before reaching caller handlers.
pub struct EventBridge<S: 'static, P: 'static, A: 'static> {
    table: HandlerMap<EventHandler<S, A>, dyn Fn(&S, &P)>,
}

impl<S: 'static, P: 'static, A: 'static> std::fmt::Debug for EventBridge<S, P, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBridge")
            .field("table", &self.table)
            .finish()
    }
}

impl<S: 'static, P: 'static, A: 'static> EventBridge<S, P, A> {
    /// Create an empty bridge keyed by handler identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: HandlerMap::new(IdentityComparer::new(
                handler::identity_eq::<S, A>,
                handler::identity_hash::<S, A>,
            )),
        }
    }

    /// Map a handler to its converting native callback for attachment.
    ///
    /// The returned native callback converts the native payload with
    /// `convert`, then invokes the handler with the original sender and the
    /// converted payload. An absent `convert` fails with
    /// [`ShimError::InvalidArgument`] independent of handler nullness; an
    /// absent handler is a no-op returning `Ok(None)`.
    ///
    /// The converter participates in the *generated callback*, not in the
    /// handler's identity: a second attach of an identity-equal handler
    /// keeps the converter captured at first creation and ignores the one
    /// passed here (see the module docs on converter capture).
    pub fn map_for_attachment<C>(
        &mut self,
        handler: Option<&EventHandler<S, A>>,
        convert: Option<C>,
    ) -> Result<Option<NativeEvent<S, P>>, ShimError>
    where
        C: Fn(&P) -> A + 'static,
    {
        let convert = convert.ok_or(ShimError::InvalidArgument("convert"))?;
        Ok(self.table.attach_with(handler, move |h| {
            let h = h.clone();
            let native: NativeEvent<S, P> = Rc::new(move |sender, payload| {
                let args = convert(payload);
                h.invoke(sender, &args);
            });
            native
        }))
    }

    /// Map a handler to its native callback for detachment.
    ///
    /// Returns the same referent every attach returned for this identity, or
    /// `None` for an absent or never-attached handler.
    pub fn try_map_for_detachment(
        &mut self,
        handler: Option<&EventHandler<S, A>>,
    ) -> Option<NativeEvent<S, P>> {
        self.table.try_map_for_detachment(handler)
    }

    /// Live attachment count for a handler's identity.
    #[must_use]
    pub fn attachment_count(&self, handler: Option<&EventHandler<S, A>>) -> usize {
        self.table.attachment_count(handler)
    }

    /// Number of distinct handler identities currently attached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no handlers are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Remove all registrations, returning their native callbacks for
    /// unregistration from the real native source.
    pub fn drain(&mut self) -> Vec<NativeEvent<S, P>> {
        self.table.drain()
    }
}

impl<S: 'static, P: 'static, A: 'static> Default for EventBridge<S, P, A> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// SignalBridge<S> — payload-less bridge
// ---------------------------------------------------------------------------

/// Bridge for payload-less, signal-style notifications.
pub struct SignalBridge<S: 'static> {
    table: HandlerMap<SignalHandler<S>, dyn Fn(&S)>,
}

impl<S: 'static> std::fmt::Debug for SignalBridge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalBridge")
            .field("table", &self.table)
            .finish()
    }
}

impl<S: 'static> SignalBridge<S> {
    /// Create an empty bridge keyed by handler identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: HandlerMap::new(IdentityComparer::new(
                handler::identity_eq::<S, ()>,
                handler::identity_hash::<S, ()>,
            )),
        }
    }

    /// Map a handler to its native callback for attachment.
    ///
    /// There is no converter and the factory is built internally, so no
    /// error path exists; an absent handler is a no-op returning `None`.
    pub fn map_for_attachment(
        &mut self,
        handler: Option<&SignalHandler<S>>,
    ) -> Option<NativeSignal<S>> {
        self.table.attach_with(handler, |h| {
            let h = h.clone();
            let native: NativeSignal<S> = Rc::new(move |sender| h.invoke_signal(sender));
            native
        })
    }

    /// Map a handler to its native callback for detachment.
    pub fn try_map_for_detachment(
        &mut self,
        handler: Option<&SignalHandler<S>>,
    ) -> Option<NativeSignal<S>> {
        self.table.try_map_for_detachment(handler)
    }

    /// Live attachment count for a handler's identity.
    #[must_use]
    pub fn attachment_count(&self, handler: Option<&SignalHandler<S>>) -> usize {
        self.table.attachment_count(handler)
    }

    /// Number of distinct handler identities currently attached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no handlers are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Remove all registrations, returning their native callbacks.
    pub fn drain(&mut self) -> Vec<NativeSignal<S>> {
        self.table.drain()
    }
}

impl<S: 'static> Default for SignalBridge<S> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
