//! Transitive role-inheritance resolution and access-control predicates.
//!
//! # Model
//!
//! A role hierarchy is a directed graph: each role names the roles it
//! directly inherits. The *effective roles* of a subject are its own role
//! plus everything transitively reachable along inheritance edges, each
//! role at most once. Diamond inheritance must not duplicate, and cycles
//! in a misconfigured graph must not hang resolution - a visited set
//! guards both.
//!
//! # Traversal Order
//!
//! Expansion is frozen to iterative breadth-first order: the subject role
//! first, then its direct parents in declaration order, then their
//! parents. Deterministic for a fixed graph; the dedup and termination
//! invariants are the load-bearing part, the order is for stable logs and
//! tests.
//!
//! # Failure Semantics
//!
//! Predicates never raise errors. A role absent from the graph simply
//! inherits nothing; an empty subject role matches nothing (there is no
//! implicit "everyone" role). Denial is `false`, and the caller decides
//! how to report it (typically via the error registry).
//!
//! # Concurrency
//!
//! The graph is built once from configuration and read concurrently by
//! request handlers. All public operations take only the read lock, so
//! readers never block each other; a poisoned lock is recovered rather
//! than propagated, because an authorization predicate must answer.
//!
//! # Example
//!
//! ```rust
//! use rampart_authz::RoleHierarchy;
//! use std::collections::HashMap;
//!
//! let mut inherits = HashMap::new();
//! inherits.insert("admin".to_string(), vec!["editor".to_string()]);
//! inherits.insert("editor".to_string(), vec!["author".to_string()]);
//!
//! let hierarchy = RoleHierarchy::new(Some(inherits));
//! assert!(hierarchy.has_role("admin", "author"));
//! assert!(!hierarchy.has_role("author", "admin"));
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mapping from role name to the roles it directly inherits.
pub type RoleGraph = HashMap<String, Vec<String>>;

/// Role hierarchy with transitive inheritance resolution.
///
/// Constructed once from static configuration; safe for unlimited
/// concurrent readers thereafter. No public mutation path exists - the
/// lock is defensive, not an invitation to mutate at runtime.
#[derive(Debug)]
pub struct RoleHierarchy {
    graph: RwLock<RoleGraph>,
}

impl RoleHierarchy {
    /// Create a hierarchy from an inheritance mapping.
    ///
    /// An absent mapping normalizes to an empty one: no inheritance,
    /// every role is its own only effective role.
    pub fn new(mapping: Option<RoleGraph>) -> Self {
        Self {
            graph: RwLock::new(mapping.unwrap_or_default()),
        }
    }

    #[inline]
    fn read_graph(&self) -> RwLockReadGuard<'_, RoleGraph> {
        match self.graph.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Compute the effective roles of `role`, in discovery order.
    ///
    /// The result starts with `role` itself, followed by every
    /// transitively inherited role exactly once: direct parents in
    /// declaration order, then their parents, breadth-first. An empty
    /// role yields an empty sequence; a role unknown to the graph yields
    /// just itself.
    ///
    /// Terminates on cyclic graphs: a role already seen is never
    /// re-expanded.
    pub fn effective_roles(&self, role: &str) -> Vec<String> {
        if role.is_empty() {
            return Vec::new();
        }

        let graph = self.read_graph();
        let mut resolved = vec![role.to_owned()];
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(role);
        let mut frontier: VecDeque<&str> = VecDeque::new();
        frontier.push_back(role);

        while let Some(current) = frontier.pop_front() {
            let Some(parents) = graph.get(current) else {
                continue;
            };
            for parent in parents {
                if seen.insert(parent.as_str()) {
                    resolved.push(parent.clone());
                    frontier.push_back(parent.as_str());
                }
            }
        }

        resolved
    }

    /// Check whether `subject_role` holds `required_role`, directly or
    /// through inheritance.
    ///
    /// An empty subject role always fails; there is no implicit
    /// "everyone" role. A non-empty role always holds itself, even when
    /// the hierarchy is empty.
    pub fn has_role(&self, subject_role: &str, required_role: &str) -> bool {
        if subject_role.is_empty() {
            return false;
        }
        if subject_role == required_role {
            return true;
        }
        self.effective_roles(subject_role)
            .iter()
            .any(|role| role == required_role)
    }

    /// Check whether `subject_role` holds any of `required_roles`.
    ///
    /// Short-circuits on the first match. Empty subject or empty
    /// requirement list always fails.
    pub fn has_any_role<S: AsRef<str>>(&self, subject_role: &str, required_roles: &[S]) -> bool {
        if subject_role.is_empty() || required_roles.is_empty() {
            return false;
        }
        let effective = self.effective_roles(subject_role);
        required_roles.iter().any(|required| {
            let required = required.as_ref();
            effective.iter().any(|role| role == required)
        })
    }
}

impl Default for RoleHierarchy {
    /// An empty hierarchy: no inheritance edges at all.
    fn default() -> Self {
        Self::new(None)
    }
}

// ============================================================================
// Route Permission Table
// ============================================================================

/// Mapping from route to the roles explicitly permitted on it.
///
/// This is the per-route half of the authorization decision: the
/// hierarchy answers *which roles a subject holds*, the table answers
/// *which roles a route accepts*. Tables are static configuration and
/// deserialize directly from a route -> roles map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePermissions {
    routes: HashMap<String, Vec<String>>,
}

impl RoutePermissions {
    /// Create a table from a route -> permitted-roles mapping.
    pub fn new(routes: HashMap<String, Vec<String>>) -> Self {
        Self { routes }
    }

    /// Add a route with its permitted roles, returning the table for
    /// chaining.
    pub fn permit(
        mut self,
        route: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.routes
            .insert(route.into(), roles.into_iter().map(Into::into).collect());
        self
    }

    /// Check whether `role` is explicitly listed for `route`.
    ///
    /// Unknown routes permit nothing.
    pub fn permits(&self, route: &str, role: &str) -> bool {
        self.routes
            .get(route)
            .is_some_and(|roles| roles.iter().any(|permitted| permitted == role))
    }

    /// Number of configured routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Decide whether `role` may access `route`.
///
/// This is the decision point request middleware consults. Without a
/// hierarchy the role must be explicitly listed for the route. With one,
/// access is granted when ANY effective role of `role` is listed.
///
/// Denial is expressed as `false`, never as an error; the caller reports
/// it (see [`crate::definitions::codes::ACCESS_DENIED`]).
pub fn is_role_allowed_with_hierarchy(
    role: &str,
    route: &str,
    permissions: &RoutePermissions,
    hierarchy: Option<&RoleHierarchy>,
) -> bool {
    let allowed = match hierarchy {
        None => permissions.permits(route, role),
        Some(hierarchy) => hierarchy
            .effective_roles(role)
            .iter()
            .any(|candidate| permissions.permits(route, candidate)),
    };
    if !allowed {
        debug!(role, route, "role not permitted for route");
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn graph(edges: &[(&str, &[&str])]) -> RoleGraph {
        edges
            .iter()
            .map(|(role, parents)| {
                (
                    (*role).to_owned(),
                    parents.iter().map(|p| (*p).to_owned()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn diamond_inheritance_does_not_duplicate() {
        let hierarchy = RoleHierarchy::new(Some(graph(&[
            ("admin", &["editor", "author"]),
            ("editor", &["author"]),
        ])));

        let effective = hierarchy.effective_roles("admin");
        assert_eq!(effective, vec!["admin", "editor", "author"]);
    }

    #[test]
    fn cyclic_graph_terminates() {
        let hierarchy = RoleHierarchy::new(Some(graph(&[("a", &["b"]), ("b", &["a"])])));

        let effective = hierarchy.effective_roles("a");
        assert_eq!(effective, vec!["a", "b"]);
    }

    #[test]
    fn self_cycle_terminates() {
        let hierarchy = RoleHierarchy::new(Some(graph(&[("a", &["a"])])));
        assert_eq!(hierarchy.effective_roles("a"), vec!["a"]);
    }

    #[test]
    fn empty_role_yields_empty_sequence() {
        let hierarchy = RoleHierarchy::new(Some(graph(&[("a", &["b"])])));
        assert!(hierarchy.effective_roles("").is_empty());
    }

    #[test]
    fn unknown_role_is_its_own_only_effective_role() {
        let hierarchy = RoleHierarchy::new(Some(graph(&[("a", &["b"])])));
        assert_eq!(hierarchy.effective_roles("ghost"), vec!["ghost"]);
    }

    #[test]
    fn absent_mapping_normalizes_to_empty() {
        let hierarchy = RoleHierarchy::new(None);
        assert_eq!(hierarchy.effective_roles("anyone"), vec!["anyone"]);
    }

    #[test]
    fn breadth_first_discovery_order() {
        // c is declared before b's parents are expanded, so it appears first.
        let hierarchy = RoleHierarchy::new(Some(graph(&[
            ("root", &["b", "c"]),
            ("b", &["d"]),
            ("c", &["e"]),
        ])));

        assert_eq!(
            hierarchy.effective_roles("root"),
            vec!["root", "b", "c", "d", "e"]
        );
    }

    #[test]
    fn has_role_is_reflexive_for_non_empty_roles() {
        let hierarchy = RoleHierarchy::new(None);
        assert!(hierarchy.has_role("viewer", "viewer"));
    }

    #[test]
    fn has_role_follows_inheritance() {
        let hierarchy = RoleHierarchy::new(Some(graph(&[
            ("admin", &["editor"]),
            ("editor", &["author"]),
        ])));

        assert!(hierarchy.has_role("admin", "author"));
        assert!(!hierarchy.has_role("author", "admin"));
    }

    #[test]
    fn empty_subject_never_matches() {
        let hierarchy = RoleHierarchy::new(Some(graph(&[("a", &["b"])])));
        assert!(!hierarchy.has_role("", "a"));
        assert!(!hierarchy.has_role("", ""));
        assert!(!hierarchy.has_any_role("", &["a", "b"]));
    }

    #[test]
    fn has_any_role_matches_any_effective_role() {
        let hierarchy = RoleHierarchy::new(Some(graph(&[("admin", &["editor"])])));

        assert!(hierarchy.has_any_role("admin", &["auditor", "editor"]));
        assert!(hierarchy.has_any_role("admin", &["admin"]));
        assert!(!hierarchy.has_any_role("admin", &["auditor", "owner"]));
        assert!(!hierarchy.has_any_role("admin", &[] as &[&str]));
    }

    #[test]
    fn route_table_direct_lookup() {
        let permissions = RoutePermissions::default()
            .permit("/v1/reports", ["viewer", "editor"])
            .permit("/v1/admin", ["admin"]);

        assert!(permissions.permits("/v1/reports", "viewer"));
        assert!(!permissions.permits("/v1/reports", "admin"));
        assert!(!permissions.permits("/v1/unknown", "viewer"));
        assert_eq!(permissions.len(), 2);
    }

    #[test]
    fn decision_without_hierarchy_requires_explicit_listing() {
        let permissions = RoutePermissions::default().permit("/v1/reports", ["viewer"]);

        assert!(is_role_allowed_with_hierarchy(
            "viewer",
            "/v1/reports",
            &permissions,
            None
        ));
        // admin inherits viewer, but with no hierarchy supplied the
        // direct lookup fails.
        assert!(!is_role_allowed_with_hierarchy(
            "admin",
            "/v1/reports",
            &permissions,
            None
        ));
    }

    #[test]
    fn decision_with_hierarchy_expands_effective_roles() {
        let hierarchy = RoleHierarchy::new(Some(graph(&[("admin", &["viewer"])])));
        let permissions = RoutePermissions::default().permit("/v1/reports", ["viewer"]);

        assert!(is_role_allowed_with_hierarchy(
            "admin",
            "/v1/reports",
            &permissions,
            Some(&hierarchy)
        ));
        assert!(!is_role_allowed_with_hierarchy(
            "viewer",
            "/v1/admin",
            &permissions,
            Some(&hierarchy)
        ));
        assert!(!is_role_allowed_with_hierarchy(
            "",
            "/v1/reports",
            &permissions,
            Some(&hierarchy)
        ));
    }

    #[test]
    fn route_table_deserializes_from_config() {
        let raw = r#"{ "/v1/reports": ["viewer", "editor"] }"#;
        let permissions: RoutePermissions = serde_json::from_str(raw).expect("valid table");
        assert!(permissions.permits("/v1/reports", "editor"));
    }

    #[test]
    fn concurrent_readers_do_not_block() {
        let hierarchy = Arc::new(RoleHierarchy::new(Some(graph(&[
            ("admin", &["editor"]),
            ("editor", &["author"]),
        ]))));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let hierarchy = Arc::clone(&hierarchy);
            handles.push(thread::spawn(move || {
                for _ in 0..1_000 {
                    assert!(hierarchy.has_role("admin", "author"));
                    assert_eq!(hierarchy.effective_roles("admin").len(), 3);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("reader thread panicked");
        }
    }
}
