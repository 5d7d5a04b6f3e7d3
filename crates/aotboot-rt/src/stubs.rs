//! Runtime entry points that exist only so that reaching them is loud.
//!
//! Each one raises [`Fault::UnimplementedRuntimeMethod`] the moment it is
//! called and never returns. They are `C-unwind` so the fault can travel back
//! through generated code to the boundary around the managed entry point.

use crate::fault::Fault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticStub {
    GetCurrentThreadStackTrace,
    UniversalTransition,
    EtwExceptionThrown,
    FailFast,
    ThrowException,
    ThrowHardwareException,
    CallCatchFunclet,
    CallFilterFunclet,
    CallFinallyFunclet,
    RangeCheckFail,
}

impl DiagnosticStub {
    pub const ALL: [DiagnosticStub; 10] = [
        DiagnosticStub::GetCurrentThreadStackTrace,
        DiagnosticStub::UniversalTransition,
        DiagnosticStub::EtwExceptionThrown,
        DiagnosticStub::FailFast,
        DiagnosticStub::ThrowException,
        DiagnosticStub::ThrowHardwareException,
        DiagnosticStub::CallCatchFunclet,
        DiagnosticStub::CallFilterFunclet,
        DiagnosticStub::CallFinallyFunclet,
        DiagnosticStub::RangeCheckFail,
    ];

    /// Exported symbol of the stub.
    pub const fn symbol(self) -> &'static str {
        match self {
            DiagnosticStub::GetCurrentThreadStackTrace => "RhGetCurrentThreadStackTrace",
            DiagnosticStub::UniversalTransition => "RhpUniversalTransition",
            DiagnosticStub::EtwExceptionThrown => "RhpEtwExceptionThrown",
            DiagnosticStub::FailFast => "__fail_fast",
            DiagnosticStub::ThrowException => "RhpThrowEx",
            DiagnosticStub::ThrowHardwareException => "RhpThrowHwEx",
            DiagnosticStub::CallCatchFunclet => "RhpCallCatchFunclet",
            DiagnosticStub::CallFilterFunclet => "RhpCallFilterFunclet",
            DiagnosticStub::CallFinallyFunclet => "RhpCallFinallyFunclet",
            DiagnosticStub::RangeCheckFail => "__range_check_fail",
        }
    }

    /// Name reported when the stub fires. Usually the symbol itself.
    pub const fn reported_name(self) -> &'static str {
        match self {
            DiagnosticStub::RangeCheckFail => "ThrowRangeOverflowException",
            other => other.symbol(),
        }
    }

    /// Whether the stub is only exported in the portable codegen
    /// configuration, where the runtime's own unwinder is absent.
    pub const fn portable_codegen_only(self) -> bool {
        matches!(
            self,
            DiagnosticStub::ThrowException
                | DiagnosticStub::ThrowHardwareException
                | DiagnosticStub::CallCatchFunclet
                | DiagnosticStub::CallFilterFunclet
                | DiagnosticStub::CallFinallyFunclet
                | DiagnosticStub::RangeCheckFail
        )
    }

    pub fn invoke(self) -> ! {
        Fault::UnimplementedRuntimeMethod(self.reported_name()).raise()
    }
}

#[export_name = "RhGetCurrentThreadStackTrace"]
pub extern "C-unwind" fn get_current_thread_stack_trace() -> ! {
    DiagnosticStub::GetCurrentThreadStackTrace.invoke()
}

#[export_name = "RhpUniversalTransition"]
pub extern "C-unwind" fn universal_transition() -> ! {
    DiagnosticStub::UniversalTransition.invoke()
}

#[export_name = "RhpEtwExceptionThrown"]
pub extern "C-unwind" fn etw_exception_thrown() -> ! {
    DiagnosticStub::EtwExceptionThrown.invoke()
}

/// Reported as an unimplemented runtime method; no reason code is read.
#[export_name = "__fail_fast"]
pub extern "C-unwind" fn fail_fast() -> ! {
    DiagnosticStub::FailFast.invoke()
}

/// Called by generated code in place of a method the compiler could not build.
///
/// # Safety
/// Both arguments must be null or live managed strings.
#[export_name = "__not_yet_implemented"]
pub unsafe extern "C-unwind" fn not_yet_implemented(method: *mut u8, reason: *mut u8) -> ! {
    Fault::not_yet_implemented(method, reason).raise()
}

#[cfg(feature = "portable-codegen")]
mod portable {
    use super::DiagnosticStub;

    #[export_name = "RhpThrowEx"]
    pub extern "C-unwind" fn throw_exception(_exception: *mut u8) -> ! {
        DiagnosticStub::ThrowException.invoke()
    }

    #[export_name = "RhpThrowHwEx"]
    pub extern "C-unwind" fn throw_hardware_exception() -> ! {
        DiagnosticStub::ThrowHardwareException.invoke()
    }

    #[export_name = "RhpCallCatchFunclet"]
    pub extern "C-unwind" fn call_catch_funclet() -> ! {
        DiagnosticStub::CallCatchFunclet.invoke()
    }

    #[export_name = "RhpCallFilterFunclet"]
    pub extern "C-unwind" fn call_filter_funclet() -> ! {
        DiagnosticStub::CallFilterFunclet.invoke()
    }

    #[export_name = "RhpCallFinallyFunclet"]
    pub extern "C-unwind" fn call_finally_funclet() -> ! {
        DiagnosticStub::CallFinallyFunclet.invoke()
    }

    #[export_name = "__range_check_fail"]
    pub extern "C-unwind" fn range_check_fail() -> ! {
        DiagnosticStub::RangeCheckFail.invoke()
    }
}

#[cfg(feature = "portable-codegen")]
pub use portable::*;
