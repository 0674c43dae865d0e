//! # Rampart Authz
//!
//! Role-hierarchy resolution and dual-view structured errors for
//! access-control boundaries.
//!
//! ## Design Philosophy
//!
//! 1. **Decisions are booleans, never errors** - role predicates answer
//!    `true` or `false`; an unknown role or an empty subject is a denial,
//!    not a fault.
//! 2. **Internal and external error views never mix** - causes, messages
//!    and metadata stay in internal logs; clients see only a numeric
//!    status and a sanitized message.
//! 3. **The authorization path adds no latency of its own** - everything
//!    here is synchronous, in-memory, CPU-bound computation with no I/O,
//!    timeouts or cancellation.
//! 4. **Recurring failures are stamped, not hand-assembled** - a registry
//!    maps symbolic status codes to pre-defined templates so the same
//!    condition reports identically everywhere.
//!
//! ## The Two Components
//!
//! - [`RoleHierarchy`] computes transitive role inheritance and answers
//!   the access-control predicates, including the route decision point
//!   [`is_role_allowed_with_hierarchy`].
//! - [`StructuredError`] carries a severity-tagged, internal/external-
//!   separated failure report, built fluently or stamped from an
//!   [`ErrorRegistry`] template.
//!
//! They compose at the boundary: when the hierarchy denies access, the
//! caller builds a registry error to report the denial, and optionally
//! records both in the [`DecisionLog`] audit trail.
//!
//! ## Trust Boundary
//!
//! Only `external_status` and `external_message` may cross to a client,
//! via [`external_error`] (which is nil-safe and never panics). The full
//! internal view - including cause and metadata - is rendered by
//! [`internal_error`], which panics when handed no error because internal
//! logging always has one in hand. That asymmetry is contractual.
//!
//! ## Quick Start
//!
//! ```rust
//! use rampart_authz::{
//!     RoleHierarchy, RoutePermissions, definitions, external_error, from_registry,
//!     is_role_allowed_with_hierarchy,
//! };
//! use std::collections::HashMap;
//!
//! // Startup: hierarchy and route table arrive from configuration.
//! let mut inherits = HashMap::new();
//! inherits.insert("admin".to_string(), vec!["editor".to_string()]);
//! inherits.insert("editor".to_string(), vec!["viewer".to_string()]);
//! let hierarchy = RoleHierarchy::new(Some(inherits));
//!
//! let permissions = RoutePermissions::default().permit("/v1/reports", ["viewer"]);
//! let registry = definitions::builtin_registry();
//!
//! // Per request: decide, and report denials consistently.
//! let subject = "admin"; // produced by the auth middleware (out of scope)
//! if is_role_allowed_with_hierarchy(subject, "/v1/reports", &permissions, Some(&hierarchy)) {
//!     // handle the request
//! } else {
//!     let err = from_registry(None, definitions::codes::ACCESS_DENIED, &registry);
//!     assert_eq!(external_error(Some(&err)), "403 | Forbidden");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod definitions;
pub mod error;
pub mod hierarchy;
pub mod level;
pub mod registry;
pub mod report;

pub use audit::{AuditRecord, DecisionLog};
pub use error::{CODE_NA, META_TIMESTAMP_KEY, MetaField, StructuredError};
pub use hierarchy::{RoleGraph, RoleHierarchy, RoutePermissions, is_role_allowed_with_hierarchy};
pub use level::Level;
pub use registry::{ErrorRegistry, RegistryEntry, from_registry};
pub use report::{InternalReport, external_error, internal_error};

/// Type alias for Results carrying a [`StructuredError`].
pub type Result<T> = std::result::Result<T, StructuredError>;
