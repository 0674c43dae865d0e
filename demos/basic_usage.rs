use rampart_authz::{
    Level, Result, StructuredError, definitions, external_error, from_registry, internal_error,
};

fn load_report(id: &str) -> Result<String> {
    // Simulate a lookup that fails for a missing entity
    if id == "missing" {
        let registry = definitions::builtin_registry();
        return Err(
            from_registry(None, definitions::codes::ENTITY_NOT_FOUND, &registry)
                .with_meta("report_id", id.to_string()),
        );
    }
    Ok(format!("report {id}"))
}

fn main() {
    println!("--- Basic Usage Example ---\n");

    match load_report("missing") {
        Ok(report) => println!("Loaded: {report}"),
        Err(err) => {
            // SCENARIO 1: The External Client
            // They see only the sanitized status/message pair.
            println!("1. [EXTERNAL RESPONSE] What the client sees:");
            println!("   \"{}\"", external_error(Some(&err)));
            // Output: "404 | Not Found"

            println!("\n2. [INTERNAL LOG] What the operator sees:");
            // In a real app this line goes to the logging sink.
            println!("   {}", internal_error(Some(&err), true));
            // Includes level, codes, message, cause and the meta JSON.
        }
    }

    // Errors can also be assembled fluently when no template fits.
    let custom = StructuredError::new(None, "replica lag exceeded threshold")
        .with_status_code("UPS-503")
        .with_level(Level::WARNING)
        .with_retryable(true)
        .with_external_status(503)
        .with_external_message("Service Unavailable")
        .with_meta("replica", "eu-west-1b");

    println!("\n3. [CUSTOM ERROR]");
    println!("   external: {custom}");
    println!("   internal: {}", internal_error(Some(&custom), false));
    println!("   retryable: {}", custom.is_retryable());
}
