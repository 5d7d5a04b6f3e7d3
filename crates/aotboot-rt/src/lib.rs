//! Process bootstrap for ahead-of-time compiled managed images.

pub mod args;
pub mod bridge;
pub mod classlib;
pub mod config;
pub mod error;
pub mod fault;
pub mod init;
pub mod literals;
pub mod platform;
pub mod stubs;

#[cfg(feature = "native")]
pub mod native;

// Re-export the types most callers need
pub use args::{ManagedEntry, ManagedMain, NativeArgs, NativeChar, NativeEntry};
pub use bridge::{with_reverse_transition, ReverseTransition, ReverseTransitionFrame, TransitionBridge};
pub use classlib::{ClasslibFn, ClasslibFunction, ClasslibTable};
pub use config::{BootConfig, ConfigError, DiagnosticsConfig, FaultStream, LoggingConfig};
pub use error::{BootstrapError, BOOTSTRAP_FAILURE_EXIT_CODE};
pub use fault::{fault_boundary, Fault, FAULT_EXIT_CODE};
pub use init::{BootStep, RuntimeInitializer};
pub use literals::{load_string_literal, ObjectAllocator};
pub use platform::{ImageRegistration, Platform};
pub use stubs::DiagnosticStub;
