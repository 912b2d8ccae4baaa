//! Event capability consumed by services.
//!
//! The event's internal structure belongs to the protocol layer. The service
//! tree only needs a name for logs and a way to get back to the concrete type:
//!
//! ```rust,ignore
//! use sprig_core::Event;
//!
//! fn run(event: &mut dyn Event) {
//!     if let Some(msg) = event.downcast_mut::<ChatMessage>() {
//!         msg.text.make_ascii_uppercase();
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;

// ============================================================================
// Core Event Trait
// ============================================================================

/// The base trait for all events flowing through a service tree.
///
/// Events are handed to services as `&mut dyn Event`: a `run` hook may
/// inspect or mutate the event but never owns it.
pub trait Event: Any + Send + Sync + 'static {
    /// Returns the human-readable name of this event type.
    fn event_name(&self) -> &'static str;

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to self as `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Event {
    /// Returns `true` if the concrete event type is `E`.
    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref()
    }

    /// Attempts to downcast to a mutable concrete event type.
    pub fn downcast_mut<E: Event>(&mut self) -> Option<&mut E> {
        self.as_any_mut().downcast_mut()
    }
}

impl fmt::Debug for dyn Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_name", &self.event_name())
            .finish()
    }
}

// ============================================================================
// Boxed Event
// ============================================================================

/// An owned, type-erased event as produced by the protocol layer.
pub type BoxedEvent = Box<dyn Event>;
