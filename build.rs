use std::env;
use std::process::Command;

fn main() {
    // Capture the compiler version so reports can state what built the binary.
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "rustc unknown".to_string());

    println!("cargo:rustc-env=SYSREPORT_RUSTC_VERSION={version}");
    println!("cargo:rerun-if-changed=build.rs");
}
