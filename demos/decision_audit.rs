use rampart_authz::{
    DecisionLog, RoleHierarchy, RoutePermissions, definitions, from_registry,
    is_role_allowed_with_hierarchy,
};
use std::collections::HashMap;

fn main() {
    println!("--- Decision Audit Example ---\n");

    let mut inherits = HashMap::new();
    inherits.insert("admin".to_string(), vec!["viewer".to_string()]);
    let hierarchy = RoleHierarchy::new(Some(inherits));

    let permissions = RoutePermissions::default()
        .permit("/v1/reports", ["viewer"])
        .permit("/v1/admin", ["admin"]);

    let registry = definitions::builtin_registry();

    // Bounded log: a hostile client hammering denied routes cannot grow it.
    let log = DecisionLog::new(1_000);

    for (subject, route) in [
        ("admin", "/v1/reports"),
        ("viewer", "/v1/reports"),
        ("viewer", "/v1/admin"),
        ("", "/v1/reports"),
    ] {
        if is_role_allowed_with_hierarchy(subject, route, &permissions, Some(&hierarchy)) {
            log.record_decision(subject, route, true);
        } else {
            // Denials are reported with the registry template and audited
            // alongside their symbolic classification.
            let err = from_registry(None, definitions::codes::ACCESS_DENIED, &registry)
                .with_meta("subject", subject.to_string())
                .with_meta("route", route.to_string());
            log.record_denial(subject, route, &err);
        }
    }

    println!("recorded {} decisions ({} evicted)\n", log.len(), log.eviction_count());

    for record in log.all().iter().rev() {
        println!(
            "[{}] {:<8} {:<14} {} ({})",
            record.timestamp,
            if record.subject_role.is_empty() {
                "<anon>"
            } else {
                record.subject_role.as_ref()
            },
            record.route.as_ref(),
            if record.allowed { "allow" } else { "deny" },
            record.status_code.as_ref(),
        );
    }

    let denials = log.filtered(|r| !r.allowed);
    println!("\n{} denials in window", denials.len());
}
