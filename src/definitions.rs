//! Well-known status codes and the built-in registry.
//!
//! # Taxonomy
//!
//! Symbolic codes are namespaced by the failing domain, with the numeric
//! suffix matching the external protocol status the condition maps to:
//!
//! - **SEC**: authentication and authorization
//! - **REQ**: request shape and admission
//! - **RES**: resource lookup and lifecycle
//! - **UPS**: upstream collaborators (datasources, remote services)
//! - **SYS**: internal faults
//!
//! # Governance
//!
//! The suffix convention and the retryability assignments are enforced by
//! the `tests` module at the bottom of this file. Codes added here without
//! a matching external status fail the build's test run, which keeps the
//! catalog from drifting.
//!
//! Retryability is deliberately narrow: only transient conditions
//! (throttling, upstream unavailability, upstream timeouts) are marked
//! retryable. Authorization denials are never retryable - retrying a 403
//! with the same subject cannot succeed and only burns quota.

use crate::level::Level;
use crate::registry::{ErrorRegistry, RegistryEntry};

/// Canonical symbolic status codes.
///
/// These are the codes the framework stamps for recurring conditions. A
/// deployment may overlay its own templates for these codes, or extend the
/// registry with additional ones.
pub mod codes {
    /// Request carried no valid subject identity.
    pub const UNAUTHENTICATED: &str = "SEC-401";
    /// Subject's effective roles do not satisfy the route's permissions.
    pub const ACCESS_DENIED: &str = "SEC-403";
    /// Request failed structural or semantic validation.
    pub const VALIDATION_FAILED: &str = "REQ-400";
    /// Caller exceeded its admission budget.
    pub const RATE_LIMITED: &str = "REQ-429";
    /// Requested entity does not exist.
    pub const ENTITY_NOT_FOUND: &str = "RES-404";
    /// Write conflicted with concurrent state.
    pub const ENTITY_CONFLICT: &str = "RES-409";
    /// Upstream collaborator refused or is down.
    pub const UPSTREAM_UNAVAILABLE: &str = "UPS-503";
    /// Upstream collaborator did not answer in time.
    pub const UPSTREAM_TIMEOUT: &str = "UPS-504";
    /// Unclassified internal fault.
    pub const INTERNAL_FAULT: &str = "SYS-500";
}

/// Build the registry of built-in error templates.
///
/// Call once at startup; overlay deployment-specific entries with further
/// [`ErrorRegistry::with`] calls on the result.
pub fn builtin_registry() -> ErrorRegistry {
    ErrorRegistry::new()
        .with(
            codes::UNAUTHENTICATED,
            RegistryEntry::new("Request carried no valid subject identity", 401, "Unauthorized")
                .with_level(Level::WARNING)
                .with_sub_code("SEC-401-IDENTITY"),
        )
        .with(
            codes::ACCESS_DENIED,
            RegistryEntry::new(
                "Subject role set does not satisfy route permissions",
                403,
                "Forbidden",
            )
            .with_level(Level::WARNING)
            .with_sub_code("SEC-403-RBAC"),
        )
        .with(
            codes::VALIDATION_FAILED,
            RegistryEntry::new("Request failed validation", 400, "Bad Request")
                .with_level(Level::WARNING),
        )
        .with(
            codes::RATE_LIMITED,
            RegistryEntry::new("Caller exceeded admission budget", 429, "Too Many Requests")
                .with_level(Level::WARNING)
                .with_retryable(true),
        )
        .with(
            codes::ENTITY_NOT_FOUND,
            RegistryEntry::new("Requested entity does not exist", 404, "Not Found")
                .with_level(Level::WARNING),
        )
        .with(
            codes::ENTITY_CONFLICT,
            RegistryEntry::new("Write conflicted with concurrent state", 409, "Conflict"),
        )
        .with(
            codes::UPSTREAM_UNAVAILABLE,
            RegistryEntry::new(
                "Upstream collaborator unavailable",
                503,
                "Service Unavailable",
            )
            .with_retryable(true),
        )
        .with(
            codes::UPSTREAM_TIMEOUT,
            RegistryEntry::new("Upstream collaborator timed out", 504, "Gateway Timeout")
                .with_retryable(true),
        )
        .with(
            codes::INTERNAL_FAULT,
            RegistryEntry::new("Unclassified internal fault", 500, "Internal Server Error")
                .with_level(Level::CRITICAL),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::from_registry;
    use crate::report::external_error;

    const ALL_CODES: &[&str] = &[
        codes::UNAUTHENTICATED,
        codes::ACCESS_DENIED,
        codes::VALIDATION_FAILED,
        codes::RATE_LIMITED,
        codes::ENTITY_NOT_FOUND,
        codes::ENTITY_CONFLICT,
        codes::UPSTREAM_UNAVAILABLE,
        codes::UPSTREAM_TIMEOUT,
        codes::INTERNAL_FAULT,
    ];

    /// Every canonical code must resolve in the built-in registry.
    #[test]
    fn every_code_is_registered() {
        let registry = builtin_registry();
        for code in ALL_CODES {
            assert!(registry.get(code).is_some(), "unregistered code {code}");
        }
        assert_eq!(registry.len(), ALL_CODES.len());
    }

    /// The numeric suffix of each code must match its external status.
    /// Prevents catalog drift when codes are added ad-hoc.
    #[test]
    fn enforce_suffix_matches_external_status() {
        let registry = builtin_registry();
        for code in ALL_CODES {
            let entry = registry.get(code).expect("registered");
            let suffix: u16 = code
                .rsplit('-')
                .next()
                .and_then(|s| s.parse().ok())
                .expect("numeric suffix");
            assert_eq!(
                entry.external_status, suffix,
                "code {code} maps to external status {}",
                entry.external_status
            );
        }
    }

    /// Only transient conditions are retryable; denials never are.
    #[test]
    fn retryability_is_narrow() {
        let registry = builtin_registry();
        let retryable: Vec<&str> = ALL_CODES
            .iter()
            .copied()
            .filter(|code| registry.get(code).expect("registered").retryable)
            .collect();
        assert_eq!(
            retryable,
            vec![
                codes::RATE_LIMITED,
                codes::UPSTREAM_UNAVAILABLE,
                codes::UPSTREAM_TIMEOUT
            ]
        );
        assert!(!registry.get(codes::ACCESS_DENIED).unwrap().retryable);
    }

    #[test]
    fn access_denied_round_trip() {
        let registry = builtin_registry();
        let err = from_registry(None, codes::ACCESS_DENIED, &registry);

        assert_eq!(external_error(Some(&err)), "403 | Forbidden");
        assert_eq!(err.sub_status_code(), "SEC-403-RBAC");
        assert_eq!(err.level(), Level::WARNING);
    }

    #[test]
    fn internal_fault_is_critical() {
        let registry = builtin_registry();
        assert_eq!(
            registry.get(codes::INTERNAL_FAULT).unwrap().level,
            Level::CRITICAL
        );
    }
}
