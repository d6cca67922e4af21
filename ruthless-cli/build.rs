use std::path::Path;
use std::process::Command;

/// Sets `RUTHLESS_VERSION` for `--version`: the package version, plus the
/// short commit when built from a git checkout.
fn main() {
    let pkg_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo_root = Path::new(&manifest_dir).join("..");
    let git_dir = repo_root.join(".git");

    let version = match git_dir.exists().then(|| short_sha(&repo_root)).flatten() {
        Some(sha) => {
            println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
            format!("{pkg_version} ({sha})")
        }
        // Source tarballs and vendored copies carry no history.
        None => pkg_version,
    };

    println!("cargo:rustc-env=RUTHLESS_VERSION={version}");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=../Cargo.toml");
}

fn short_sha(repo_root: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}
