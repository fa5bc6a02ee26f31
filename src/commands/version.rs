//! Command: print version information.

/// Version string baked in at build time, falling back to the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("FILEPATCH_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the filepatch version to stdout.
pub fn run() {
    println!("filepatch {}", version());
}
