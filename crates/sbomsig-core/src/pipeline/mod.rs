//! Signing and verification pipeline.
//!
//! Producers hand the pipeline a serialized document and a key:
//! - `parse`: size-limited JSON parsing
//! - `envelope`: reading, writing and stripping the top-level `signature` block
//! - `sign`: canonicalize, sign, build the block (`Signer`)
//! - `verify`: replay exclusions, re-canonicalize, check (`Verifier`)
//!
//! Key and certificate files are read once at load time. Everything else
//! operates on in-memory documents.

use std::sync::Arc;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::errors::{SbomSigError, SbomSigResult};

pub mod envelope;
pub mod parse;
pub mod sign;
pub mod verify;

/// Source of the signing timestamp.
///
/// `System` reads UTC wall-clock time. `Fixed` pins the value for tests and
/// reproducible builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SigningClock {
    #[default]
    System,
    Fixed(OffsetDateTime),
}

impl SigningClock {
    pub fn now(&self) -> OffsetDateTime {
        match self {
            Self::System => OffsetDateTime::now_utc(),
            Self::Fixed(t) => *t,
        }
    }

    /// Current time as ISO-8601 UTC, truncated to milliseconds.
    pub fn timestamp(&self) -> SbomSigResult<String> {
        format_timestamp(self.now())
    }
}

/// `2025-01-01T00:00:00.000Z`
pub(crate) fn format_timestamp(t: OffsetDateTime) -> SbomSigResult<String> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
    t.to_offset(UtcOffset::UTC)
        .format(format)
        .map_err(|e| SbomSigError::invalid_argument(format!("cannot format timestamp: {e}")))
}

/// Key slot of a `Signer` or `Verifier`.
///
/// A failed load is terminal: later operations report the load error instead of
/// behaving as if no key was ever requested.
#[derive(Debug)]
pub(crate) enum KeyState<K> {
    Unloaded,
    Loaded(Arc<K>),
    Failed(SbomSigError),
}

impl<K> Clone for KeyState<K> {
    fn clone(&self) -> Self {
        match self {
            Self::Unloaded => Self::Unloaded,
            Self::Loaded(k) => Self::Loaded(Arc::clone(k)),
            Self::Failed(e) => Self::Failed(e.clone()),
        }
    }
}

impl<K> Default for KeyState<K> {
    fn default() -> Self {
        Self::Unloaded
    }
}

impl<K> KeyState<K> {
    pub(crate) fn get(&self) -> SbomSigResult<&K> {
        match self {
            Self::Unloaded => Err(SbomSigError::NoKeyLoaded),
            Self::Loaded(k) => Ok(k.as_ref()),
            Self::Failed(e) => Err(e.clone()),
        }
    }

    pub(crate) fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Record the outcome of a load attempt and pass the error through.
    pub(crate) fn store(&mut self, loaded: SbomSigResult<K>) -> SbomSigResult<()> {
        match loaded {
            Ok(k) => {
                *self = Self::Loaded(Arc::new(k));
                Ok(())
            }
            Err(e) => {
                *self = Self::Failed(e.clone());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn timestamp_has_millisecond_precision_and_z() {
        let clock = SigningClock::Fixed(datetime!(2025-03-04 05:06:07.891234 UTC));
        assert_eq!(clock.timestamp().unwrap(), "2025-03-04T05:06:07.891Z");
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let clock = SigningClock::Fixed(datetime!(2025-01-01 01:00:00 +01:00));
        assert_eq!(clock.timestamp().unwrap(), "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn system_clock_shape() {
        let ts = SigningClock::System.timestamp().unwrap();
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn failed_load_is_sticky() {
        let mut slot: KeyState<u8> = KeyState::default();
        assert_eq!(slot.get(), Err(SbomSigError::NoKeyLoaded));
        assert!(slot.store(Err(SbomSigError::key_load("bad"))).is_err());
        assert_eq!(slot.get(), Err(SbomSigError::key_load("bad")));
        slot.store(Ok(7)).unwrap();
        assert!(slot.is_loaded());
        assert_eq!(slot.get(), Ok(&7));
    }
}
