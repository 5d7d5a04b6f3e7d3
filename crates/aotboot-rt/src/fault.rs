//! Faults raised when execution reaches something that was never implemented.
//!
//! A fault unwinds from the point it is raised to the nearest boundary, where
//! it becomes an ordinary `Result`. Bootstrap places one around module
//! initialization and one around the managed entry point.

use aotboot_layout::StringRef;
use std::cell::Cell;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use thiserror::Error;

/// Exit code of a process stopped by a fault.
pub const FAULT_EXIT_CODE: i32 = -1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The compiler emitted a placeholder instead of a method body.
    #[error("Code generation gap in `{method}`: {reason}")]
    NotYetImplemented { method: String, reason: String },

    /// A runtime entry point with no implementation was called.
    #[error("Call to unimplemented runtime method `{0}`")]
    UnimplementedRuntimeMethod(&'static str),
}

impl Fault {
    /// Builds the fault from the two managed strings the compiler passes.
    ///
    /// # Safety
    /// Both pointers must be null or live managed strings.
    pub unsafe fn not_yet_implemented(method: *mut u8, reason: *mut u8) -> Self {
        Fault::NotYetImplemented {
            method: walk_or_placeholder(method),
            reason: walk_or_placeholder(reason),
        }
    }

    /// Unwinds to the enclosing [`fault_boundary`].
    pub fn raise(self) -> ! {
        install_quiet_hook();
        log::debug!("Raising fault: {}", self);
        panic::panic_any(self)
    }

    pub fn exit_code(&self) -> i32 {
        FAULT_EXIT_CODE
    }

    /// Writes the user-facing report.
    pub fn report<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Fault::NotYetImplemented { method, reason } => {
                writeln!(out, "ILCompiler failed generating code for this method; execution cannot continue.")?;
                writeln!(out, "This is likely because of a feature that is not yet implemented in the compiler.")?;
                writeln!(out, "Method: {}", method)?;
                writeln!(out)?;
                writeln!(out, "Reason: {}", reason)?;
            }
            Fault::UnimplementedRuntimeMethod(name) => {
                writeln!(out, "Call to an unimplemented runtime method; execution cannot continue.")?;
                writeln!(out, "Method: {}", name)?;
            }
        }
        out.flush()
    }
}

unsafe fn walk_or_placeholder(ptr: *mut u8) -> String {
    match StringRef::from_raw(ptr) {
        Some(string) => string.to_string_lossy(),
        None => "<null>".to_string(),
    }
}

/// Runs `f`, turning a raised [`Fault`] into `Err`. Any other panic keeps
/// unwinding.
pub fn fault_boundary<F, R>(f: F) -> Result<R, Fault>
where
    F: FnOnce() -> R,
{
    install_quiet_hook();
    let result = {
        let _inside = BoundaryGuard::enter();
        panic::catch_unwind(AssertUnwindSafe(f))
    };
    match result {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<Fault>() {
            Ok(fault) => Err(*fault),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

thread_local! {
    static BOUNDARY_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as running inside a boundary until dropped.
struct BoundaryGuard;

impl BoundaryGuard {
    fn enter() -> Self {
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get() + 1));
        BoundaryGuard
    }
}

impl Drop for BoundaryGuard {
    fn drop(&mut self) {
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn inside_boundary() -> bool {
    BOUNDARY_DEPTH.with(|depth| depth.get() > 0)
}

static QUIET_HOOK: Once = Once::new();

// A fault caught by a boundary is reported there. One raised with no
// boundary on the thread gets its report written to stderr instead.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| match info.payload().downcast_ref::<Fault>() {
            Some(_) if inside_boundary() => {}
            Some(fault) => {
                let _ = fault.report(&mut io::stderr());
            }
            None => previous(info),
        }));
    });
}
