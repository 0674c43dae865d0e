use rampart_authz::{RoleHierarchy, RoutePermissions, is_role_allowed_with_hierarchy};
use std::collections::HashMap;

fn main() {
    println!("--- Role Resolution Example ---\n");

    // Hierarchy as it would arrive from configuration:
    // admin inherits editor and auditor; editor inherits author.
    let mut inherits = HashMap::new();
    inherits.insert(
        "admin".to_string(),
        vec!["editor".to_string(), "auditor".to_string()],
    );
    inherits.insert("editor".to_string(), vec!["author".to_string()]);
    // Diamond edge: auditor also inherits author. Resolution must not
    // produce author twice for admin.
    inherits.insert("auditor".to_string(), vec!["author".to_string()]);

    let hierarchy = RoleHierarchy::new(Some(inherits));

    for role in ["admin", "editor", "author", "intern"] {
        println!("effective roles of {role:>7}: {:?}", hierarchy.effective_roles(role));
    }

    println!();
    println!("admin holds author:  {}", hierarchy.has_role("admin", "author"));
    println!("author holds admin:  {}", hierarchy.has_role("author", "admin"));
    println!(
        "editor holds any of [auditor, author]: {}",
        hierarchy.has_any_role("editor", &["auditor", "author"])
    );

    // Route table: only the leaf roles are listed per route; inheritance
    // does the rest.
    let permissions = RoutePermissions::default()
        .permit("/v1/articles", ["author"])
        .permit("/v1/audit-trail", ["auditor"]);

    println!();
    for (role, route) in [
        ("admin", "/v1/articles"),
        ("admin", "/v1/audit-trail"),
        ("editor", "/v1/articles"),
        ("editor", "/v1/audit-trail"),
    ] {
        let allowed =
            is_role_allowed_with_hierarchy(role, route, &permissions, Some(&hierarchy));
        println!("{role:>7} on {route:<16} -> {}", if allowed { "allow" } else { "deny" });
    }
}
