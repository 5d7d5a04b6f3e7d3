use std::env;
use std::path::PathBuf;

const MANAGED_OBJECT_ENV: &str = "AOTBOOT_MANAGED_OBJECT";

fn main() {
    println!("cargo:rerun-if-env-changed={}", MANAGED_OBJECT_ENV);
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    if let Some(object) = env::var_os(MANAGED_OBJECT_ENV) {
        println!("cargo:rustc-link-arg-bins={}", PathBuf::from(object).display());
    } else {
        println!("cargo:warning={} is not set; the managed image must be linked by other means", MANAGED_OBJECT_ENV);
    }

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_env = env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();
    let target_vendor = env::var("CARGO_CFG_TARGET_VENDOR").unwrap_or_default();

    if target_os == "windows" {
        if target_env == "msvc" {
            // Folds .modules$A, every .modules$I and .modules$Z into .rdata, in name order.
            println!("cargo:rustc-link-arg-bins=/MERGE:.modules=.rdata");
        }
    } else if target_vendor != "apple" {
        let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
            return;
        };
        let script = PathBuf::from(manifest_dir).join("../aotboot-registry/linker/modules.ld");
        println!("cargo:rerun-if-changed={}", script.display());
        println!("cargo:rustc-link-arg-bins=-Wl,-T,{}", script.display());
    }
}
