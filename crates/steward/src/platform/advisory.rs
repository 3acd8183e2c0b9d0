//! Result type for advisory reads.
//!
//! Searches and listings are advisory: a failure means "no information",
//! which callers usually treat the same as "nothing there". [`Advisory`]
//! keeps the two cases apart so a caller can tell a definitive empty answer
//! from an unknown one, while [`Advisory::or_absent`] gives the
//! absent-on-failure shape shared by every adapter.

use super::errors::{PlatformError, Result, short_error_message};

/// Outcome of an advisory read.
#[derive(Debug)]
#[must_use]
pub enum Advisory<T> {
    /// The platform answered.
    Known(T),
    /// The platform could not be asked; treat as absent.
    Unknown(PlatformError),
}

impl<T> Advisory<T> {
    /// Wrap a platform result, logging failures at debug level.
    pub fn from_result(result: Result<T>, operation: &str) -> Self {
        match result {
            Ok(value) => Self::Known(value),
            Err(e) => {
                tracing::debug!(
                    "{} failed, treating as absent: {}",
                    operation,
                    short_error_message(&e)
                );
                Self::Unknown(e)
            }
        }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// The definitive answer, if there is one.
    #[inline]
    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unknown(_) => None,
        }
    }

    /// The error that made the answer unknown.
    #[inline]
    pub fn error(&self) -> Option<&PlatformError> {
        match self {
            Self::Known(_) => None,
            Self::Unknown(e) => Some(e),
        }
    }

    #[inline]
    pub fn unwrap_or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Self::Known(value) => value,
            Self::Unknown(_) => fallback(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Advisory<U> {
        match self {
            Self::Known(value) => Advisory::Known(f(value)),
            Self::Unknown(e) => Advisory::Unknown(e),
        }
    }

    /// Convert back into a plain result.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Known(value) => Ok(value),
            Self::Unknown(e) => Err(e),
        }
    }
}

impl<T: Default> Advisory<T> {
    /// The answer, or the empty value (`None`, empty list) when unknown.
    #[inline]
    pub fn or_absent(self) -> T {
        self.unwrap_or_else(T::default)
    }
}
