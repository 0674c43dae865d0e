//! Structured error value with a hard internal/external split.
//!
//! # Design Philosophy
//!
//! 1. **Internal fields carry full context** - cause chain, message,
//!    symbolic status codes, open metadata - for logs and operators.
//! 2. **External fields carry the sanitized subset** - a numeric status
//!    and a client-safe message - and nothing else ever crosses over.
//! 3. **Construction is cheap and infallible** - an error value must never
//!    itself become a source of failure on the error path.
//!
//! The split is the load-bearing invariant of this module: `cause`,
//! `message` and `meta` must never leak into the external representation.
//! `Display` renders the external view only; `Debug` redacts internal
//! context so that generic logging cannot leak it by accident.
//!
//! # Builder Model
//!
//! Errors are built fluently: construct with [`StructuredError::new`],
//! refine with chained `with_*` calls, then hand off for formatting or
//! propagation. The builder mutates and returns the same value - it is a
//! per-request object, not a shared one, and must not be mutated from
//! multiple threads (see the concurrency notes in the crate docs).
//!
//! # Metadata Hygiene
//!
//! `meta` is an open string-keyed map and routinely carries internal data
//! (request ids, subject identifiers). Owned metadata buffers and owned
//! message buffers are zeroized when the error drops; borrowed `'static`
//! strings live in the binary and need no clearing.
//!
//! # Example
//!
//! ```rust
//! use rampart_authz::{Level, StructuredError};
//!
//! let err = StructuredError::new(None, "role lookup found no subject")
//!     .with_status_code("SEC-403")
//!     .with_level(Level::WARNING)
//!     .with_external_status(403)
//!     .with_external_message("Forbidden")
//!     .with_meta("request_id", "req-1234".to_string());
//!
//! // External view: sanitized, safe for clients.
//! assert_eq!(err.to_string(), "403 | Forbidden");
//! ```

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use chrono::{SecondsFormat, Utc};
use smallvec::SmallVec;
use zeroize::Zeroize;

use crate::level::Level;
use crate::report::InternalReport;

/// Sentinel for status fields that were never classified.
pub const CODE_NA: &str = "NA";

/// Metadata key under which the creation timestamp is stored.
pub const META_TIMESTAMP_KEY: &str = "timestamp";

// ============================================================================
// Metadata Field
// ============================================================================

/// Metadata value wrapper with zeroization for owned data.
///
/// Borrowed values are assumed static and are not zeroized.
#[derive(Debug)]
pub struct MetaField {
    value: Cow<'static, str>,
}

impl MetaField {
    /// Get the value as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.value.as_ref()
    }
}

impl From<&'static str> for MetaField {
    fn from(value: &'static str) -> Self {
        Self {
            value: Cow::Borrowed(value),
        }
    }
}

impl From<String> for MetaField {
    fn from(value: String) -> Self {
        Self {
            value: Cow::Owned(value),
        }
    }
}

impl From<Cow<'static, str>> for MetaField {
    fn from(value: Cow<'static, str>) -> Self {
        Self { value }
    }
}

impl Zeroize for MetaField {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.value {
            s.zeroize();
        }
    }
}

impl Drop for MetaField {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Inline storage for metadata pairs.
///
/// Most errors carry a handful of keys (timestamp plus two or three
/// contextual values), so four inline slots avoid heap use on the
/// common path.
pub(crate) type MetaVec = SmallVec<[(Cow<'static, str>, MetaField); 4]>;

// ============================================================================
// Structured Error
// ============================================================================

/// Structured error value with severity, retry semantics and an
/// internal/external field split.
///
/// # Key Properties
///
/// - `Display` renders ONLY the external view (`"<status> | <message>"`)
/// - `Debug` redacts message and metadata
/// - Owned message and metadata buffers are zeroized on drop
/// - Construction never fails; defaults are always well-formed
/// - The builder mutates in place and returns `self` for chaining
///
/// # Defaults
///
/// A fresh error has status and sub-status `"NA"`, level
/// [`Level::ERROR`], `retryable = false`, external status `0` and
/// external message `"NA"`, and a creation timestamp in
/// `meta["timestamp"]`.
#[must_use = "errors should be handled or logged"]
pub struct StructuredError {
    cause: Option<Box<dyn StdError + Send + Sync>>,
    message: Cow<'static, str>,
    status_code: Cow<'static, str>,
    sub_status_code: Cow<'static, str>,
    level: Level,
    meta: MetaVec,
    retryable: bool,
    external_status: u16,
    external_message: Cow<'static, str>,
}

impl StructuredError {
    /// Create a new error with an optional underlying cause and an
    /// internal, human-readable message.
    ///
    /// Stamps a high-resolution creation timestamp into
    /// `meta["timestamp"]`. All other fields take their defaults; refine
    /// them with the `with_*` builders.
    pub fn new(
        cause: Option<Box<dyn StdError + Send + Sync>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let mut meta = MetaVec::new();
        meta.push((
            Cow::Borrowed(META_TIMESTAMP_KEY),
            MetaField::from(Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)),
        ));
        Self {
            cause,
            message: message.into(),
            status_code: Cow::Borrowed(CODE_NA),
            sub_status_code: Cow::Borrowed(CODE_NA),
            level: Level::ERROR,
            meta,
            retryable: false,
            external_status: 0,
            external_message: Cow::Borrowed(CODE_NA),
        }
    }

    /// Create a new error wrapping a concrete cause.
    ///
    /// Convenience over [`StructuredError::new`] for the common case
    /// where a lower-level error is in hand.
    pub fn from_cause(
        cause: impl Into<Box<dyn StdError + Send + Sync>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(Some(cause.into()), message)
    }

    // ------------------------------------------------------------------
    // Fluent builders. Each mutates in place and returns the same value.
    // ------------------------------------------------------------------

    /// Set the symbolic internal status code.
    #[inline]
    pub fn with_status_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.status_code = code.into();
        self
    }

    /// Set the symbolic internal sub-status code.
    #[inline]
    pub fn with_sub_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.sub_status_code = code.into();
        self
    }

    /// Set the severity level.
    #[inline]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Mark whether the failed operation may be safely retried.
    #[inline]
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Upsert a single metadata key.
    ///
    /// Replaces the value if the key is already present; the replaced
    /// owned buffer is zeroized on drop.
    #[inline]
    pub fn with_meta(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<MetaField>,
    ) -> Self {
        self.upsert_meta(key.into(), value.into());
        self
    }

    /// Upsert many metadata keys at once.
    pub fn with_meta_multi<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Cow<'static, str>>,
        V: Into<MetaField>,
    {
        for (key, value) in entries {
            self.upsert_meta(key.into(), value.into());
        }
        self
    }

    /// Set the protocol-facing external status code.
    #[inline]
    pub fn with_external_status(mut self, status: u16) -> Self {
        self.external_status = status;
        self
    }

    /// Set the client-safe external message.
    #[inline]
    pub fn with_external_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.external_message = message.into();
        self
    }

    fn upsert_meta(&mut self, key: Cow<'static, str>, value: MetaField) {
        if let Some(entry) = self.meta.iter_mut().find(|(k, _)| k == &key) {
            entry.1 = value;
        } else {
            self.meta.push((key, value));
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Get the internal message. Never expose this externally.
    #[inline]
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// Get the symbolic internal status code.
    #[inline]
    pub fn status_code(&self) -> &str {
        self.status_code.as_ref()
    }

    /// Get the symbolic internal sub-status code.
    #[inline]
    pub fn sub_status_code(&self) -> &str {
        self.sub_status_code.as_ref()
    }

    /// Get the severity level.
    #[inline]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Check if the failed operation may be safely retried.
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Get the protocol-facing external status code.
    #[inline]
    pub const fn external_status(&self) -> u16 {
        self.external_status
    }

    /// Get the client-safe external message.
    #[inline]
    pub fn external_message(&self) -> &str {
        self.external_message.as_ref()
    }

    /// Get the metadata pairs in insertion order.
    ///
    /// Metadata is internal context. Never serialize it into an
    /// external-facing representation.
    #[inline]
    pub fn meta(&self) -> &[(Cow<'static, str>, MetaField)] {
        self.meta.as_slice()
    }

    /// Look up a single metadata value by key.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the wrapped cause, if any.
    #[inline]
    pub fn cause(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }

    /// Borrow the internal fields as a structured report.
    ///
    /// The returned [`InternalReport`] cannot outlive this error, which
    /// keeps internal context on a short leash: format it, log it, let it
    /// go. See [`crate::report`] for the rendering contract.
    #[inline]
    pub fn internal_report(&self) -> InternalReport<'_> {
        InternalReport {
            level: self.level,
            status_code: self.status_code.as_ref(),
            sub_status_code: self.sub_status_code.as_ref(),
            message: self.message.as_ref(),
            cause: self.cause(),
            meta: self.meta.as_slice(),
            retryable: self.retryable,
        }
    }

    /// Render the external view: `"<externalStatusCode> | <externalMessage>"`.
    ///
    /// This is the only string representation that may cross the trust
    /// boundary.
    pub fn external_string(&self) -> String {
        format!("{} | {}", self.external_status, self.external_message)
    }

    /// Render the internal view, optionally appending the metadata as a
    /// JSON object. See [`crate::report::internal_error`] for the format.
    pub fn internal_string(&self, include_meta: bool) -> String {
        let report = self.internal_report();
        let mut out = report.to_string();
        if include_meta {
            out.push_str(" | ");
            out.push_str(&report.meta_json());
        }
        out
    }
}

impl Drop for StructuredError {
    fn drop(&mut self) {
        if let Cow::Owned(ref mut s) = self.message {
            s.zeroize();
        }
        // MetaField zeroizes its own owned buffer on drop.
        self.meta.clear();
    }
}

impl fmt::Display for StructuredError {
    /// External display - sanitized for untrusted viewers.
    ///
    /// Renders `"<externalStatusCode> | <externalMessage>"` and nothing
    /// else. Internal message, cause and metadata never appear here.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.external_status, self.external_message)
    }
}

impl fmt::Debug for StructuredError {
    /// Redacting debug representation.
    ///
    /// Shows classification fields only; message and metadata are
    /// internal context and stay out of generic debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredError")
            .field("status_code", &self.status_code)
            .field("sub_status_code", &self.sub_status_code)
            .field("level", &self.level.label())
            .field("retryable", &self.retryable)
            .field("external_status", &self.external_status)
            .field("external_message", &self.external_message)
            .field("message", &"<REDACTED>")
            .field("meta_entries", &self.meta.len())
            .field("cause", &self.cause.as_ref().map(|_| "<PRESENT>"))
            .finish()
    }
}

impl StdError for StructuredError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn defaults_are_well_formed() {
        let err = StructuredError::new(None, "something failed");

        assert_eq!(err.status_code(), CODE_NA);
        assert_eq!(err.sub_status_code(), CODE_NA);
        assert_eq!(err.level(), Level::ERROR);
        assert!(!err.is_retryable());
        assert_eq!(err.external_status(), 0);
        assert_eq!(err.external_message(), CODE_NA);
        assert_eq!(err.message(), "something failed");
        assert!(err.cause().is_none());
    }

    #[test]
    fn creation_timestamp_is_stamped() {
        let err = StructuredError::new(None, "x");
        let ts = err.meta_value(META_TIMESTAMP_KEY).expect("timestamp meta");
        // RFC 3339 with nanosecond precision and a UTC suffix.
        assert!(ts.ends_with('Z'));
        assert!(ts.contains('T'));
    }

    #[test]
    fn builders_chain_and_mutate() {
        let err = StructuredError::new(None, "db query failed")
            .with_status_code("UPS-503")
            .with_sub_code("UPS-503-POOL")
            .with_level(Level::CRITICAL)
            .with_retryable(true)
            .with_external_status(503)
            .with_external_message("Service Unavailable");

        assert_eq!(err.status_code(), "UPS-503");
        assert_eq!(err.sub_status_code(), "UPS-503-POOL");
        assert_eq!(err.level(), Level::CRITICAL);
        assert!(err.is_retryable());
        assert_eq!(err.external_string(), "503 | Service Unavailable");
    }

    #[test]
    fn with_meta_upserts() {
        let err = StructuredError::new(None, "x")
            .with_meta("request_id", "req-1")
            .with_meta("request_id", "req-2");

        assert_eq!(err.meta_value("request_id"), Some("req-2"));
        // timestamp + request_id, not three entries
        assert_eq!(err.meta().len(), 2);
    }

    #[test]
    fn with_meta_multi_upserts_many() {
        let err = StructuredError::new(None, "x").with_meta_multi(vec![
            ("subject", "alice".to_string()),
            ("route", "/v1/reports".to_string()),
        ]);

        assert_eq!(err.meta_value("subject"), Some("alice"));
        assert_eq!(err.meta_value("route"), Some("/v1/reports"));
    }

    #[test]
    fn metadata_never_touches_external_fields() {
        let err = StructuredError::new(None, "x")
            .with_external_status(404)
            .with_external_message("Not Found")
            .with_meta("secret", "internal-only".to_string())
            .with_meta_multi(vec![("tenant", "t-99".to_string())]);

        assert_eq!(err.external_status(), 404);
        assert_eq!(err.external_message(), "Not Found");

        let external = err.external_string();
        assert!(!external.contains("secret"));
        assert!(!external.contains("internal-only"));
        assert!(!external.contains("tenant"));
    }

    #[test]
    fn display_is_external_only() {
        let err = StructuredError::new(None, "internal detail: pool exhausted")
            .with_external_status(503)
            .with_external_message("Service Unavailable")
            .with_meta("pool", "primary".to_string());

        let displayed = format!("{err}");
        assert_eq!(displayed, "503 | Service Unavailable");
        assert!(!displayed.contains("pool"));
        assert!(!displayed.contains("internal detail"));
    }

    #[test]
    fn debug_redacts_internal_context() {
        let err = StructuredError::from_cause(
            io::Error::new(io::ErrorKind::PermissionDenied, "/etc/shadow"),
            "read of protected path refused",
        )
        .with_meta("path", "/etc/shadow".to_string());

        let debugged = format!("{err:?}");
        assert!(debugged.contains("<REDACTED>"));
        assert!(debugged.contains("<PRESENT>"));
        assert!(!debugged.contains("/etc/shadow"));
        assert!(!debugged.contains("protected path"));
    }

    #[test]
    fn source_exposes_cause_chain() {
        let err = StructuredError::from_cause(
            io::Error::new(io::ErrorKind::TimedOut, "upstream timed out"),
            "fetch failed",
        );

        let source = StdError::source(&err).expect("source");
        assert!(source.to_string().contains("upstream timed out"));
    }

    #[test]
    fn meta_field_zeroizes_owned() {
        let mut field = MetaField::from(String::from("sensitive"));
        field.zeroize();
        assert_eq!(field.as_str(), "");
    }

    #[test]
    fn meta_field_keeps_borrowed_intact() {
        let mut field = MetaField::from("static");
        field.zeroize();
        assert_eq!(field.as_str(), "static");
    }
}
