//! Bot capability seen by services.
//!
//! The owning bot's networking and session lifecycle live outside the
//! service tree. Services receive a shared [`BoxedBot`] in every hook and may
//! downcast it to the concrete bot type they were written for.

use std::any::Any;
use std::sync::Arc;

/// The bot that owns a service tree.
pub trait Bot: Send + Sync + 'static {
    /// Returns the bot's unique identifier.
    fn id(&self) -> &str;

    /// Returns self as `Any` for downcasting to the concrete bot type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Bot {
    /// Attempts to downcast to a concrete bot type.
    pub fn downcast_ref<B: Bot>(&self) -> Option<&B> {
        self.as_any().downcast_ref()
    }
}

/// A shared Bot trait object.
pub type BoxedBot = Arc<dyn Bot>;
