//! Outcome of serving one event.
//!
//! A [`RunResult`] is what every service hands back after handling an event.
//! The sign of its code classifies the outcome:
//!
//! | code  | [`Outcome`]           |
//! |-------|-----------------------|
//! | `0`   | [`Outcome::NoOp`]     |
//! | `> 0` | [`Outcome::Success`]  |
//! | `< 0` | [`Outcome::Failure`]  |
//!
//! An optional type-erased payload may ride along. Reading it back is a soft
//! operation: asking for the wrong type yields `None`, never an error.
//!
//! ```rust,ignore
//! let result = RunResult::new(3).with_payload(String::from("pong"));
//! assert!(result.is_success());
//! assert_eq!(result.downcast_ref::<String>().map(String::as_str), Some("pong"));
//! assert!(result.downcast_ref::<i64>().is_none());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Integer code carried by a [`RunResult`].
pub type RetCode = i32;

/// Code of the canonical "nothing happened" result.
pub const NO_SIGNIFICANT_RET: RetCode = 0;

/// Classification of a [`RunResult`] by the sign of its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The service had nothing to say about the event.
    NoOp,
    /// The service handled the event.
    Success,
    /// The service tried and failed.
    Failure,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => write!(f, "no-op"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Immutable outcome of one `run` of a service.
///
/// Cloning is cheap: the payload is shared, never copied. There is no way to
/// mutate a `RunResult` in place; builders consume `self` and hand back a new
/// value.
#[derive(Clone, Default)]
pub struct RunResult {
    code: RetCode,
    payload: Option<Arc<dyn Any + Send + Sync>>,
}

impl RunResult {
    /// The canonical no-op result (`code == 0`, no payload).
    pub const fn nothing() -> Self {
        Self {
            code: NO_SIGNIFICANT_RET,
            payload: None,
        }
    }

    /// Creates a result with the given code and no payload.
    pub const fn new(code: RetCode) -> Self {
        Self {
            code,
            payload: None,
        }
    }

    /// Returns a new result with the same code carrying `payload`.
    pub fn with_payload<T: Any + Send + Sync>(self, payload: T) -> Self {
        Self {
            code: self.code,
            payload: Some(Arc::new(payload)),
        }
    }

    /// Returns the raw code.
    pub fn code(&self) -> RetCode {
        self.code
    }

    /// Classifies this result by the sign of its code.
    pub fn outcome(&self) -> Outcome {
        match self.code {
            NO_SIGNIFICANT_RET => Outcome::NoOp,
            c if c > NO_SIGNIFICANT_RET => Outcome::Success,
            _ => Outcome::Failure,
        }
    }

    /// `true` when the code is positive.
    pub fn is_success(&self) -> bool {
        self.code > NO_SIGNIFICANT_RET
    }

    /// `true` when the code is negative.
    pub fn is_failed(&self) -> bool {
        self.code < NO_SIGNIFICANT_RET
    }

    /// `true` when the code is zero.
    pub fn is_noop(&self) -> bool {
        self.code == NO_SIGNIFICANT_RET
    }

    /// Whether any payload is attached, regardless of its type.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Borrows the payload as `T` if the stored value is exactly a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref()?.downcast_ref::<T>()
    }

    /// Clones the payload out as `T` if the stored value is exactly a `T`.
    pub fn extract<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }
}

impl From<RetCode> for RunResult {
    fn from(code: RetCode) -> Self {
        Self::new(code)
    }
}

impl fmt::Debug for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunResult")
            .field("code", &self.code)
            .field("outcome", &self.outcome())
            .field("has_payload", &self.has_payload())
            .finish()
    }
}
