use std::env;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

fn main() {
    let opt_level = env::var("OPT_LEVEL").unwrap_or_else(|_| "0".to_string());
    let is_optimized = opt_level != "0";

    // Optimized builds outside of a clean checkout are still labelled as development builds
    let version = if is_optimized {
        match (git(&["status", "--porcelain"]), git(&["rev-parse", "HEAD"])) {
            (Some(status), Some(commit)) if status.trim().is_empty() => commit,
            (Some(_), Some(commit)) => format!("{} (modified)", commit.trim()),
            _ => "Development build".into(),
        }
    } else {
        "Development build".into()
    };

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rustc-env=RELEASE={}", version.trim());
}
