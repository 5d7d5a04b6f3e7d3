//! Process entry point of a native image.
//!
//! On Unix the C runtime's `main` is defined here directly so the argument
//! vector reaches the managed entry point untouched.

#![cfg_attr(unix, no_main)]

use aotboot_registry::linked_source;
use aotboot_rt::native::{managed_entry, NativePlatform};
use aotboot_rt::{BootConfig, NativeArgs, RuntimeInitializer, BOOTSTRAP_FAILURE_EXIT_CODE};

fn boot(mut args: NativeArgs) -> i32 {
    let config = load_config();

    let source = match linked_source() {
        Ok(source) => source,
        Err(err) => {
            log::error!("Failed to locate the module list: {}", err);
            return BOOTSTRAP_FAILURE_EXIT_CODE;
        }
    };

    RuntimeInitializer::new(NativePlatform::new(), source)
        .with_config(&config)
        .run(&mut args, managed_entry())
}

// Configuration never blocks startup: a bad file falls back to defaults.
fn load_config() -> BootConfig {
    match BootConfig::from_env() {
        Ok(config) => {
            init_logging(&config);
            config
        }
        Err(err) => {
            let config = BootConfig::default();
            init_logging(&config);
            log::warn!("Ignoring configuration: {}", err);
            config
        }
    }
}

fn init_logging(config: &BootConfig) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.logging.filter);
    if !config.logging.timestamps {
        builder.format_timestamp(None);
    }
    let _ = builder.try_init();
}

#[cfg(unix)]
#[no_mangle]
pub extern "C" fn main(argc: std::ffi::c_int, argv: *mut *mut std::ffi::c_char) -> std::ffi::c_int {
    // SAFETY: the C runtime passes a valid vector that lives for the whole process.
    let args = unsafe { NativeArgs::from_raw(argc, argv) };
    boot(args)
}

#[cfg(not(unix))]
fn main() {
    let args = NativeArgs::from_os_args(std::env::args_os());
    std::process::exit(boot(args));
}
