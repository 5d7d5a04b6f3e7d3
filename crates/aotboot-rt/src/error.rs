use aotboot_layout::LayoutError;
use aotboot_registry::RegistryError;
use thiserror::Error;

/// Exit code of a process whose bootstrap failed. No managed code has run.
pub const BOOTSTRAP_FAILURE_EXIT_CODE: i32 = -1;

/// Errors that abort startup before the managed entry point is reached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("Platform abstraction layer failed to initialize")]
    PalInit,

    #[error("Runtime library refused the process attach notification")]
    RuntimeAttach,

    #[error("Conservative stack scanning could not be enabled")]
    StackScanning,

    #[error("Runtime rejected the managed image registration")]
    ImageRegistration,

    #[error("Module list could not be built: {0}")]
    Registry(#[from] RegistryError),

    #[error("Managed image disagrees with the host object layout: {0}")]
    Layout(#[from] LayoutError),
}

impl BootstrapError {
    pub fn exit_code(&self) -> i32 {
        BOOTSTRAP_FAILURE_EXIT_CODE
    }
}
