//! Rendering of structured errors for the two sides of the trust boundary.
//!
//! # Rendering Contract
//!
//! - [`internal_error`] produces the full diagnostic line for internal
//!   logs: `"<LEVEL> | <statusCode> | <subStatusCode> | <message> |
//!   <cause>"`, with `"Nil cause"` standing in when no cause was wrapped,
//!   and optionally `" | <json-of-meta>"` appended.
//! - [`external_error`] produces the sanitized client line:
//!   `"<externalStatusCode> | <externalMessage>"`.
//!
//! # The Nil-Safety Asymmetry
//!
//! The two formatters deliberately disagree about absent errors:
//!
//! - [`internal_error`] PANICS when handed `None`. It is an internal
//!   diagnostic formatter; by the time code logs an error it must have one
//!   in hand, and a `None` here is a caller bug worth failing fast on.
//! - [`external_error`] returns `"0 | NA"` for `None` without panicking.
//!   Response-rendering paths call it defensively and must never be the
//!   thing that crashes a request.
//!
//! This asymmetry is part of the contract. Do not "fix" it.
//!
//! # Borrowed Reports
//!
//! [`InternalReport`] borrows from its error and cannot outlive it. The
//! short lifetime keeps internal context scoped to the logging call
//! instead of drifting into buffers that outlive the request.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{MetaField, StructuredError};
use crate::level::Level;

/// Structured internal view borrowed from a [`StructuredError`].
///
/// All fields borrow from the parent error; the report is created, written
/// out, and dropped within one logging call.
#[derive(Debug)]
pub struct InternalReport<'a> {
    /// Severity level.
    pub level: Level,
    /// Symbolic internal status code.
    pub status_code: &'a str,
    /// Symbolic internal sub-status code.
    pub sub_status_code: &'a str,
    /// Internal human-readable message.
    pub message: &'a str,
    /// Wrapped cause, if any.
    pub cause: Option<&'a (dyn StdError + 'static)>,
    /// Metadata pairs in insertion order.
    pub meta: &'a [(Cow<'static, str>, MetaField)],
    /// Whether the failed operation may be retried.
    pub retryable: bool,
}

impl InternalReport<'_> {
    /// Write the diagnostic line to a formatter without allocating.
    ///
    /// Format: `"<LEVEL> | <statusCode> | <subStatusCode> | <message> |
    /// <cause>"`. Absent causes render as `"Nil cause"`. Metadata is not
    /// included here; see [`InternalReport::meta_json`].
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | ",
            self.level.label(),
            self.status_code,
            self.sub_status_code,
            self.message
        )?;
        match self.cause {
            Some(cause) => write!(f, "{cause}"),
            None => f.write_str("Nil cause"),
        }
    }

    /// Render the metadata pairs as a JSON object.
    ///
    /// Keys are emitted in sorted order, which keeps the rendering
    /// deterministic regardless of insertion sequence. This output is for
    /// internal logs only.
    pub fn meta_json(&self) -> String {
        let mut map = Map::new();
        for (key, value) in self.meta {
            map.insert(key.to_string(), Value::String(value.as_str().to_owned()));
        }
        Value::Object(map).to_string()
    }
}

impl fmt::Display for InternalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

/// Format the full internal view of an error for logging.
///
/// See the module docs for the exact format. With `include_meta` the
/// metadata JSON object is appended as a final segment.
///
/// # Panics
///
/// Panics when `err` is `None`. This formatter assumes the caller already
/// holds a real error; an absent value here is a logic bug and fails fast.
/// Response-rendering code paths must use [`external_error`] instead.
pub fn internal_error(err: Option<&StructuredError>, include_meta: bool) -> String {
    let Some(err) = err else {
        panic!("internal_error requires an error value; check before formatting");
    };
    err.internal_string(include_meta)
}

/// Format the sanitized external view of an error.
///
/// Returns `"<externalStatusCode> | <externalMessage>"`, or `"0 | NA"`
/// when `err` is `None`. This function is meant to be called defensively
/// from response-rendering paths and never panics.
pub fn external_error(err: Option<&StructuredError>) -> String {
    match err {
        Some(err) => err.external_string(),
        None => String::from("0 | NA"),
    }
}
