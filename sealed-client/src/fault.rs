//! Panic containment: turn a panicking closure or future into a [`Fault`].
//!
//! Expected failures are ordinary `Result`s throughout this crate. These
//! helpers exist for the one place where foreign code runs inside the retry
//! loop and a panic must count as a failed attempt rather than unwind
//! through the caller.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;

/// Message used when a panic payload is neither `&str` nor `String`.
pub const UNKNOWN_FAULT: &str = "unknown fault";

/// A normalised failure message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Normalise any displayable error.
    pub fn from_error(err: &impl fmt::Display) -> Self {
        Self::new(err.to_string())
    }

    /// Normalise a panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        if let Some(msg) = payload.downcast_ref::<&str>() {
            Self::new(*msg)
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            Self::new(msg.clone())
        } else {
            Self::new(UNKNOWN_FAULT)
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Fault {}

/// Run `f`, converting a panic into `Err(Fault)`.
pub fn try_catch<T, F>(f: F) -> Result<T, Fault>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(Fault::from_panic)
}

/// Await `fut`, converting a panic during any poll into `Err(Fault)`.
pub async fn try_catch_async<T, Fut>(fut: Fut) -> Result<T, Fault>
where
    Fut: Future<Output = T>,
{
    AssertUnwindSafe(fut).catch_unwind().await.map_err(Fault::from_panic)
}
