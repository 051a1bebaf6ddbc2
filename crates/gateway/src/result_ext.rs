//! Result extension trait for logging errors with context.

use std::fmt::Display;
use tracing::error;

pub trait ResultExt<T, E> {
    /// Log the error with `context` and the caller's location if this is an
    /// `Err`, returning the result unchanged.
    fn log<S: ToString>(self, context: S) -> Result<T, E>;
}

impl<T, E: Display> ResultExt<T, E> for Result<T, E> {
    #[track_caller]
    fn log<S: ToString>(self, context: S) -> Result<T, E> {
        if let Err(ref e) = self {
            let caller_location = std::panic::Location::caller();
            error!(
                target: "dapi_gateway",
                error = %e,
                file = %format!("{}:{}", caller_location.file(), caller_location.line()),
                "{}",
                context.to_string()
            );
        }
        self
    }
}
