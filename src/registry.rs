//! Declarative mapping from symbolic status codes to error templates.
//!
//! # Purpose
//!
//! Recurring failure conditions (entity not found, access denied, upstream
//! unavailable) should produce the same fully-populated error everywhere
//! they are raised. The registry centralizes those field assignments: a
//! call site names the symbolic condition, the registry stamps the
//! template.
//!
//! # Governance
//!
//! The registry is static configuration: built once at startup (from code
//! via [`ErrorRegistry::with`] chaining, or deserialized from a
//! configuration map) and never extended at runtime. There is no dynamic
//! registration path.
//!
//! # Forward Compatibility
//!
//! Unknown codes are a soft failure by design. Registries and call sites
//! evolve independently; a call site raising a code the deployed registry
//! does not know must still produce a well-formed, diagnosable error -
//! never a panic, never an absent value.
//!
//! # Example
//!
//! ```rust
//! use rampart_authz::{external_error, from_registry, ErrorRegistry, Level, RegistryEntry};
//!
//! let registry = ErrorRegistry::new().with(
//!     "E100",
//!     RegistryEntry::new("upstream reported unavailable", 503, "Service Unavailable")
//!         .with_retryable(true),
//! );
//!
//! let err = from_registry(None, "E100", &registry);
//! assert_eq!(external_error(Some(&err)), "503 | Service Unavailable");
//! assert!(err.is_retryable());
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CODE_NA, StructuredError};
use crate::level::Level;

fn default_sub_code() -> Cow<'static, str> {
    Cow::Borrowed(CODE_NA)
}

/// Named static template for a recurring error condition.
///
/// Entries are plain data: an internal message, the external
/// status/message pair, and classification fields. Construct with
/// [`RegistryEntry::new`] and refine with the `with_*` builders (the same
/// idiom the error value itself uses), or deserialize from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Internal message stamped onto errors raised with this code.
    pub internal_message: Cow<'static, str>,
    /// Protocol-facing status code (e.g. an HTTP status).
    pub external_status: u16,
    /// Client-safe message.
    pub external_message: Cow<'static, str>,
    /// Severity level. Defaults to [`Level::ERROR`].
    #[serde(default)]
    pub level: Level,
    /// Sub-status code. Defaults to the `"NA"` sentinel.
    #[serde(default = "default_sub_code")]
    pub sub_status_code: Cow<'static, str>,
    /// Whether the condition is safe to retry. Defaults to `false`.
    #[serde(default)]
    pub retryable: bool,
}

impl RegistryEntry {
    /// Create a template with the three mandatory fields; classification
    /// fields take their defaults.
    pub fn new(
        internal_message: impl Into<Cow<'static, str>>,
        external_status: u16,
        external_message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            internal_message: internal_message.into(),
            external_status,
            external_message: external_message.into(),
            level: Level::ERROR,
            sub_status_code: Cow::Borrowed(CODE_NA),
            retryable: false,
        }
    }

    /// Set the severity level stamped by this template.
    #[inline]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the sub-status code stamped by this template.
    #[inline]
    pub fn with_sub_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.sub_status_code = code.into();
        self
    }

    /// Mark the condition as retryable.
    #[inline]
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

/// Immutable mapping from symbolic status code to [`RegistryEntry`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorRegistry {
    entries: HashMap<Cow<'static, str>, RegistryEntry>,
}

impl ErrorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, consuming and returning the registry for chaining.
    ///
    /// Later insertions under the same code replace earlier ones, which
    /// lets a deployment overlay its own template over a built-in.
    pub fn with(mut self, code: impl Into<Cow<'static, str>>, entry: RegistryEntry) -> Self {
        self.entries.insert(code.into(), entry);
        self
    }

    /// Look up the template for a symbolic status code.
    pub fn get(&self, code: &str) -> Option<&RegistryEntry> {
        self.entries.get(code)
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the registered symbolic codes.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_ref())
    }
}

/// Build an error from a registry template.
///
/// When `status_code` is registered, the error is stamped with the
/// template's internal message, external status/message, level, sub-status
/// code and retryable flag, plus the looked-up code itself as
/// `status_code`.
///
/// When it is not, the result degrades to a generic but well-formed error
/// whose internal message names the unknown code
/// (`"Unknown status code <code>"`) and whose other fields keep their
/// defaults. Unknown codes never panic and never produce an absent value.
pub fn from_registry(
    cause: Option<Box<dyn StdError + Send + Sync>>,
    status_code: &str,
    registry: &ErrorRegistry,
) -> StructuredError {
    match registry.get(status_code) {
        Some(entry) => StructuredError::new(cause, entry.internal_message.clone())
            .with_status_code(status_code.to_owned())
            .with_sub_code(entry.sub_status_code.clone())
            .with_level(entry.level)
            .with_retryable(entry.retryable)
            .with_external_status(entry.external_status)
            .with_external_message(entry.external_message.clone()),
        None => {
            debug!(status_code, "status code missing from registry, degrading to generic error");
            StructuredError::new(cause, format!("Unknown status code {status_code}"))
        }
    }
}
