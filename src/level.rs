//! Severity levels for structured errors.
//!
//! Levels classify how badly an operation failed, from informational
//! conditions up to critical faults that warrant paging. The set of named
//! levels is closed, but the representation is deliberately open: raw
//! values arrive from registry configuration and from callers that stamp
//! levels numerically, and an unrecognized value must never make a
//! diagnostic path fail. Out-of-range levels render as `"UNKNOWN"`.
//!
//! # Copy Semantics
//!
//! `Level` is a small Copy newtype. It is classification metadata, not
//! governed identity - defensive code can extract and propagate levels
//! cheaply without concern.
//!
//! # Example
//!
//! ```rust
//! use rampart_authz::Level;
//!
//! assert_eq!(Level::WARNING.label(), "WARNING");
//! assert_eq!(Level::new(9999).label(), "UNKNOWN");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error severity level.
///
/// The four named levels cover the taxonomy used across the framework:
///
/// - [`Level::INFO`] - informational, not a failure
/// - [`Level::WARNING`] - degraded but handled
/// - [`Level::ERROR`] - operation failed (the default)
/// - [`Level::CRITICAL`] - severe, likely requires alerting
///
/// # Construction
///
/// Use the named constants in code. [`Level::new`] accepts any raw value
/// so that levels deserialized from configuration or received from other
/// systems never reject; whatever the value, [`Level::label`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(i32);

impl Level {
    /// Informational condition, not a failure.
    pub const INFO: Level = Level(0);
    /// Degraded but handled.
    pub const WARNING: Level = Level(1);
    /// Operation failed. The default for freshly constructed errors.
    pub const ERROR: Level = Level(2);
    /// Severe failure, likely requires paging or alerting.
    pub const CRITICAL: Level = Level(3);

    /// Create a level from a raw value.
    ///
    /// Any value is accepted; values outside the named range render as
    /// `"UNKNOWN"` rather than erroring. Diagnostics availability beats
    /// strict validation here.
    #[inline]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Get the display label for this level.
    ///
    /// Zero-allocation - returns a static string. Unrecognized raw values
    /// map to `"UNKNOWN"`.
    #[inline]
    pub const fn label(self) -> &'static str {
        match self.0 {
            0 => "INFO",
            1 => "WARNING",
            2 => "ERROR",
            3 => "CRITICAL",
            _ => "UNKNOWN",
        }
    }

    /// Check whether this level marks a failed operation (ERROR or above).
    #[inline]
    pub const fn is_failure(self) -> bool {
        self.0 >= 2
    }
}

impl Default for Level {
    /// Errors default to [`Level::ERROR`].
    fn default() -> Self {
        Self::ERROR
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_levels_have_expected_labels() {
        assert_eq!(Level::INFO.label(), "INFO");
        assert_eq!(Level::WARNING.label(), "WARNING");
        assert_eq!(Level::ERROR.label(), "ERROR");
        assert_eq!(Level::CRITICAL.label(), "CRITICAL");
    }

    #[test]
    fn out_of_range_levels_render_unknown() {
        assert_eq!(Level::new(9999).label(), "UNKNOWN");
        assert_eq!(Level::new(-1).label(), "UNKNOWN");
        assert_eq!(Level::new(4).label(), "UNKNOWN");
    }

    #[test]
    fn default_level_is_error() {
        assert_eq!(Level::default(), Level::ERROR);
    }

    #[test]
    fn failure_threshold() {
        assert!(!Level::INFO.is_failure());
        assert!(!Level::WARNING.is_failure());
        assert!(Level::ERROR.is_failure());
        assert!(Level::CRITICAL.is_failure());
        // Unknown high values are still treated as failures.
        assert!(Level::new(9999).is_failure());
    }

    #[test]
    fn display_matches_label() {
        assert_eq!(Level::CRITICAL.to_string(), "CRITICAL");
        assert_eq!(Level::new(42).to_string(), "UNKNOWN");
    }

    #[test]
    fn serde_roundtrip_is_transparent() {
        let json = serde_json::to_string(&Level::WARNING).unwrap();
        assert_eq!(json, "1");

        let level: Level = serde_json::from_str("9999").unwrap();
        assert_eq!(level.label(), "UNKNOWN");
        assert_eq!(level.raw(), 9999);
    }
}
