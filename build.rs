//! Embeds build provenance for `aisle --version`.
//!
//! Release builds (HEAD exactly on a tag) report the crate version; anything
//! else reports `dev@<short-hash>` so preview deployments can be traced back
//! to a commit.

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-changed=static/motion.js");
    println!("cargo:rerun-if-changed=static/motion.css");

    let hash = git(&["rev-parse", "--short", "HEAD"])
        .map(|out| out.trim().to_string())
        .unwrap_or_default();
    let on_tag = git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();

    println!("cargo:rustc-env=AISLE_GIT_HASH={hash}");
    println!("cargo:rustc-env=AISLE_ON_RELEASE_TAG={on_tag}");
}

fn git(args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).into_owned())
}
