use std::ffi::c_void;

/// A callback the runtime calls back into the image through.
pub type ClasslibFn = unsafe extern "C" fn();

/// Slots of the callback table, in ABI order.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClasslibFunction {
    NewObject = 0,
    NewArray = 1,
    IsInstanceOf = 2,
    StelemRef = 3,
    LdelemaRef = 4,
    ThrowException = 5,
    UnhandledExceptionHandler = 6,
    AppendExceptionStackFrame = 7,
}

impl ClasslibFunction {
    pub const COUNT: usize = 8;

    pub const ALL: [ClasslibFunction; Self::COUNT] = [
        ClasslibFunction::NewObject,
        ClasslibFunction::NewArray,
        ClasslibFunction::IsInstanceOf,
        ClasslibFunction::StelemRef,
        ClasslibFunction::LdelemaRef,
        ClasslibFunction::ThrowException,
        ClasslibFunction::UnhandledExceptionHandler,
        ClasslibFunction::AppendExceptionStackFrame,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ClasslibFunction::NewObject => "new-object",
            ClasslibFunction::NewArray => "new-array",
            ClasslibFunction::IsInstanceOf => "is-instance-of",
            ClasslibFunction::StelemRef => "store-ref-element",
            ClasslibFunction::LdelemaRef => "load-ref-element-address",
            ClasslibFunction::ThrowException => "throw-exception",
            ClasslibFunction::UnhandledExceptionHandler => "unhandled-exception-handler",
            ClasslibFunction::AppendExceptionStackFrame => "append-exception-stack-frame",
        }
    }

    /// Whether the host fills this slot when it registers an image.
    pub const fn provided_by_host(self) -> bool {
        !matches!(
            self,
            ClasslibFunction::UnhandledExceptionHandler | ClasslibFunction::AppendExceptionStackFrame
        )
    }
}

/// Fixed-order table of nullable callbacks handed to the runtime when an
/// image is registered. Unset slots are null.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ClasslibTable {
    entries: [Option<ClasslibFn>; ClasslibFunction::COUNT],
}

impl ClasslibTable {
    pub const fn new() -> Self {
        ClasslibTable {
            entries: [None; ClasslibFunction::COUNT],
        }
    }

    pub const fn with(mut self, slot: ClasslibFunction, function: ClasslibFn) -> Self {
        self.entries[slot as usize] = Some(function);
        self
    }

    pub fn get(&self, slot: ClasslibFunction) -> Option<ClasslibFn> {
        self.entries[slot as usize]
    }

    pub fn is_set(&self, slot: ClasslibFunction) -> bool {
        self.get(slot).is_some()
    }

    /// `(table, count)` as the runtime's image registration expects them.
    pub fn as_raw_parts(&self) -> (*const *const c_void, u32) {
        // Option<fn> is pointer sized, with None as null.
        (self.entries.as_ptr() as *const *const c_void, ClasslibFunction::COUNT as u32)
    }
}
