use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_LINKED_SECTIONS").is_none() {
        return;
    }

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_vendor = env::var("CARGO_CFG_TARGET_VENDOR").unwrap_or_default();
    if target_os == "windows" || target_vendor == "apple" {
        return;
    }

    // Integration tests link real `.modules$I` slots and need the same
    // ordering the host binary gets.
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let script = PathBuf::from(manifest_dir).join("linker/modules.ld");
    println!("cargo:rerun-if-changed={}", script.display());
    println!("cargo:rustc-link-arg-tests=-Wl,-T,{}", script.display());
}
