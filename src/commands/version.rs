//! Command: print version information.

/// Version reported by `provision version` and the install banner.
#[must_use]
pub fn string() -> &'static str {
    option_env!("PROVISION_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the provision version to stdout.
pub fn run() {
    println!("provision {}", string());
}
