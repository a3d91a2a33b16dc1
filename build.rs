use std::process::Command;

fn main() {
    // Get version from git describe, fallback to Cargo.toml version
    let version = git_describe().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    let commit = git_commit().unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=UAMASK_VERSION={version}");
    println!("cargo:rustc-env=UAMASK_GIT_COMMIT={commit}");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;

    if output.status.success() {
        let version = String::from_utf8(output.stdout).ok()?;
        return Some(version.trim().to_string());
    }

    None
}

fn git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    if output.status.success() {
        let commit = String::from_utf8(output.stdout).ok()?;
        return Some(commit.trim().to_string());
    }

    None
}
