//! Ordered process bootstrap.
//!
//! Runs the runtime's startup steps in their fixed order, hands the module
//! list to the runtime, invokes the managed entry point inside the fault
//! boundary and finally shuts down. Any failed step stops the sequence.

use crate::args::{ManagedEntry, NativeArgs};
use crate::config::{BootConfig, FaultStream};
use crate::error::BootstrapError;
use crate::fault::{fault_boundary, Fault};
use crate::platform::Platform;
use aotboot_layout::LayoutContract;
use aotboot_registry::{ModuleList, ModuleSource};
use std::fmt;
use std::io::Write;

/// One step of the bootstrap sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootStep {
    PalInit,
    RuntimeAttach,
    ConservativeStackScan,
    ImageRegistration,
    ModuleInit,
    ManagedMain,
    Shutdown,
}

impl BootStep {
    pub const ALL: [BootStep; 7] = [
        BootStep::PalInit,
        BootStep::RuntimeAttach,
        BootStep::ConservativeStackScan,
        BootStep::ImageRegistration,
        BootStep::ModuleInit,
        BootStep::ManagedMain,
        BootStep::Shutdown,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BootStep::PalInit => "pal-init",
            BootStep::RuntimeAttach => "runtime-attach",
            BootStep::ConservativeStackScan => "conservative-stack-scan",
            BootStep::ImageRegistration => "image-registration",
            BootStep::ModuleInit => "module-init",
            BootStep::ManagedMain => "managed-main",
            BootStep::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for BootStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Drives a [`Platform`] through startup, feeding it the modules found by a
/// [`ModuleSource`].
pub struct RuntimeInitializer<P, S> {
    platform: P,
    source: S,
    fault_stream: FaultStream,
}

impl<P: Platform, S: ModuleSource> RuntimeInitializer<P, S> {
    pub fn new(platform: P, source: S) -> Self {
        RuntimeInitializer {
            platform,
            source,
            fault_stream: FaultStream::default(),
        }
    }

    pub fn with_config(mut self, config: &BootConfig) -> Self {
        self.fault_stream = config.diagnostics.stream;
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn into_platform(self) -> P {
        self.platform
    }

    /// Steps 1 to 4, then the layout agreement check.
    pub fn initialize(&mut self) -> Result<(), BootstrapError> {
        log::debug!("Bootstrap step: {}", BootStep::PalInit);
        if !self.platform.pal_init() {
            return Err(BootstrapError::PalInit);
        }

        log::debug!("Bootstrap step: {}", BootStep::RuntimeAttach);
        if !self.platform.attach() {
            return Err(BootstrapError::RuntimeAttach);
        }

        log::debug!("Bootstrap step: {}", BootStep::ConservativeStackScan);
        if !self.platform.enable_conservative_stack_scanning() {
            return Err(BootstrapError::StackScanning);
        }

        match self.platform.image() {
            Some(image) => {
                log::debug!(
                    "Bootstrap step: {} ({} bytes of managed code at {:p})",
                    BootStep::ImageRegistration,
                    image.code_size,
                    image.code_start
                );
                if !self.platform.register_image(&image) {
                    return Err(BootstrapError::ImageRegistration);
                }
            }
            None => log::trace!("No image to register on this platform"),
        }

        if let Some(image_layout) = self.platform.image_layout() {
            LayoutContract::host().ensure_matches(&image_layout)?;
        }
        Ok(())
    }

    /// Step 5: collects the module list and hands it to the runtime.
    pub fn initialize_modules(&mut self) -> Result<ModuleList, BootstrapError> {
        log::debug!("Bootstrap step: {} (strategy {})", BootStep::ModuleInit, self.source.strategy());
        let modules = self.source.collect()?;
        self.platform.initialize_modules(&modules);
        Ok(modules)
    }

    /// Runs the whole sequence and returns the process exit code. Fault
    /// reports go to the configured diagnostics stream.
    pub fn run<E: ManagedEntry>(self, args: &mut NativeArgs, entry: E) -> i32 {
        let mut out = self.fault_stream.writer();
        self.run_reporting_to(args, entry, &mut *out)
    }

    /// Same as [`RuntimeInitializer::run`], with fault reports written to `out`.
    pub fn run_reporting_to<E, W>(mut self, args: &mut NativeArgs, mut entry: E, out: &mut W) -> i32
    where
        E: ManagedEntry,
        W: Write + ?Sized,
    {
        if let Err(err) = self.initialize() {
            log::error!("Bootstrap failed: {}", err);
            return err.exit_code();
        }

        // Module initializers are managed code and may fault.
        let modules = match fault_boundary(|| self.initialize_modules()) {
            Ok(Ok(modules)) => modules,
            Ok(Err(err)) => {
                log::error!("Bootstrap failed: {}", err);
                return err.exit_code();
            }
            Err(fault) => {
                let exit_code = report_fault(&fault, out);
                shutdown();
                return exit_code;
            }
        };
        log::info!("Runtime initialized with {} module(s)", modules.len());

        log::debug!("Bootstrap step: {} with {} argument(s)", BootStep::ManagedMain, args.len());
        let exit_code = match fault_boundary(|| entry.invoke(args)) {
            Ok(code) => code,
            Err(fault) => report_fault(&fault, out),
        };

        shutdown();
        exit_code
    }
}

fn report_fault<W: Write + ?Sized>(fault: &Fault, out: &mut W) -> i32 {
    log::error!("Managed execution stopped: {}", fault);
    if let Err(err) = fault.report(out) {
        log::warn!("Failed to write fault report: {}", err);
    }
    fault.exit_code()
}

// Nothing is torn down; the process is about to exit.
fn shutdown() {
    log::debug!("Bootstrap step: {}", BootStep::Shutdown);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_listed_in_execution_order() {
        let names: Vec<_> = BootStep::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.first(), Some(&"pal-init"));
        assert_eq!(names.last(), Some(&"shutdown"));
        assert_eq!(BootStep::ModuleInit.to_string(), "module-init");
    }
}
