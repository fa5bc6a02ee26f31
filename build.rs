use std::process::Command;

fn main() {
    // Prefer FILEPATCH_VERSION if the release pipeline sets it, otherwise
    // fall back to git describe for local builds.
    if let Ok(version) = std::env::var("FILEPATCH_VERSION") {
        println!("cargo:rustc-env=FILEPATCH_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !version.is_empty() {
            println!("cargo:rustc-env=FILEPATCH_VERSION={version}");
        }
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=FILEPATCH_VERSION");
}
