//! Foundation layer - values and capabilities every service touches.
//!
//! - [`RunResult`]: tri-state outcome of serving one event
//! - [`Event`] / [`Bot`]: capabilities supplied by the protocol layer
//! - [`ServiceError`]: configuration-class failures

pub mod bot;
pub mod error;
pub mod event;
pub mod result;

pub use bot::{Bot, BoxedBot};
pub use error::{ServiceError, ServiceResult};
pub use event::{BoxedEvent, Event};
pub use result::{NO_SIGNIFICANT_RET, Outcome, RetCode, RunResult};
