use std::process::Command;

fn main() {
    // CI passes an explicit version
    println!("cargo:rerun-if-env-changed=BUILD_VERSION");

    println!("cargo:rustc-env=BUILD_INFO={}", build_info());

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs/heads");
}

fn build_info() -> String {
    if let Ok(version) = std::env::var("BUILD_VERSION") {
        return format!("{}+ci", version);
    }

    // Local builds: derive from git, falling back to the crate version outside a checkout
    let base_version = get_tag_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    let commit_count = git_output(&["rev-list", "--count", "HEAD"])
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0);
    let commit_hash =
        git_output(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let dirty_suffix = if is_dirty() { "-dirty" } else { "" };

    format!(
        "{}+build.{}.{}{}",
        base_version, commit_count, commit_hash, dirty_suffix
    )
}

fn get_tag_version() -> Option<String> {
    git_output(&["describe", "--tags", "--abbrev=0", "--match", "v[0-9]*"])
        .map(|s| s.trim_start_matches('v').to_string())
}

fn git_output(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn is_dirty() -> bool {
    Command::new("git")
        .args(["diff", "--quiet"])
        .status()
        .map(|status| !status.success())
        .unwrap_or(false)
}
