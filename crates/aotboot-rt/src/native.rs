//! Bindings to the real runtime library and the compiled managed image.
//!
//! Only built with the `native` feature: linking this module requires the
//! runtime's static library and the managed object file.

use crate::args::{NativeChar, NativeEntry};
use crate::bridge::{ReverseTransitionFrame, TransitionBridge};
use crate::classlib::{ClasslibFn, ClasslibFunction, ClasslibTable};
use crate::literals::ObjectAllocator;
use crate::platform::Platform;
#[cfg(windows)]
use crate::platform::ImageRegistration;
use aotboot_layout::TypeDescriptor;
use aotboot_registry::ModuleList;
use std::ffi::{c_int, c_void};
use std::mem;
use std::ptr;

const DLL_PROCESS_ATTACH: u32 = 1;

extern "C" {
    fn PalInit() -> bool;
    fn RtuDllMain(pal_instance: *mut c_void, reason: u32, reserved: *mut c_void) -> i32;
    fn RhpEnableConservativeStackReporting() -> i32;

    fn RhNewObject(type_descriptor: *const TypeDescriptor) -> *mut u8;
    fn RhNewArray(type_descriptor: *const TypeDescriptor, elements: i32) -> *mut u8;
    fn RhTypeCast_IsInstanceOf(object: *mut u8, type_descriptor: *const TypeDescriptor) -> *mut u8;
    fn RhpStelemRef(array: *mut u8, index: c_int, object: *mut u8);
    fn RhpLdelemaRef(array: *mut u8, index: c_int, type_descriptor: *const TypeDescriptor) -> *mut u8;
}

// Anything that runs managed code may reach a diagnostic stub and unwind.
extern "C-unwind" {
    fn InitializeModules(modules: *const *mut c_void, count: c_int);

    fn RhpReversePInvoke2(frame: *mut ReverseTransitionFrame);
    fn RhpReversePInvokeReturn(frame: *mut ReverseTransitionFrame);

    fn RhpThrowEx(exception: *mut u8) -> !;

    fn __managed__Main(argc: c_int, argv: *mut *mut NativeChar) -> c_int;
}

#[cfg(windows)]
extern "C" {
    fn RhpRegisterCoffModule(
        os_module: *mut c_void,
        code_start: *const c_void,
        code_size: u32,
        classlib: *const *const c_void,
        classlib_count: u32,
    ) -> bool;

    // Emitted by the compiler around the managed code it generates.
    fn __managedcode_a();
    fn __managedcode_z();
}

#[cfg(windows)]
extern "system" {
    fn GetModuleHandleW(name: *const u16) -> *mut c_void;
}

macro_rules! classlib_fn {
    ($function:expr, $signature:ty) => {
        // SAFETY: the runtime calls each slot with the signature it declares.
        unsafe { mem::transmute::<$signature, ClasslibFn>($function) }
    };
}

/// Callbacks handed to the runtime with the image registration.
pub static CLASSLIB: ClasslibTable = ClasslibTable::new()
    .with(
        ClasslibFunction::NewObject,
        classlib_fn!(RhNewObject, unsafe extern "C" fn(*const TypeDescriptor) -> *mut u8),
    )
    .with(
        ClasslibFunction::NewArray,
        classlib_fn!(RhNewArray, unsafe extern "C" fn(*const TypeDescriptor, i32) -> *mut u8),
    )
    .with(
        ClasslibFunction::IsInstanceOf,
        classlib_fn!(
            RhTypeCast_IsInstanceOf,
            unsafe extern "C" fn(*mut u8, *const TypeDescriptor) -> *mut u8
        ),
    )
    .with(
        ClasslibFunction::StelemRef,
        classlib_fn!(RhpStelemRef, unsafe extern "C" fn(*mut u8, c_int, *mut u8)),
    )
    .with(
        ClasslibFunction::LdelemaRef,
        classlib_fn!(
            RhpLdelemaRef,
            unsafe extern "C" fn(*mut u8, c_int, *const TypeDescriptor) -> *mut u8
        ),
    )
    .with(
        ClasslibFunction::ThrowException,
        classlib_fn!(RhpThrowEx, unsafe extern "C-unwind" fn(*mut u8) -> !),
    );

/// The linked runtime library.
#[derive(Debug, Default)]
pub struct NativePlatform {
    _private: (),
}

impl NativePlatform {
    pub fn new() -> Self {
        NativePlatform::default()
    }
}

impl Platform for NativePlatform {
    fn pal_init(&mut self) -> bool {
        unsafe { PalInit() }
    }

    fn attach(&mut self) -> bool {
        unsafe { RtuDllMain(ptr::null_mut(), DLL_PROCESS_ATTACH, ptr::null_mut()) != 0 }
    }

    fn enable_conservative_stack_scanning(&mut self) -> bool {
        unsafe { RhpEnableConservativeStackReporting() != 0 }
    }

    #[cfg(windows)]
    fn image(&self) -> Option<ImageRegistration> {
        let start = __managedcode_a as usize;
        let end = __managedcode_z as usize;
        let code_size = u32::try_from(end.checked_sub(start)?).ok()?;
        Some(ImageRegistration {
            os_module: unsafe { GetModuleHandleW(ptr::null()) },
            code_start: start as *const u8,
            code_size,
            classlib: &CLASSLIB,
        })
    }

    #[cfg(windows)]
    fn register_image(&mut self, image: &ImageRegistration) -> bool {
        let (classlib, count) = image.classlib.as_raw_parts();
        unsafe {
            RhpRegisterCoffModule(
                image.os_module,
                image.code_start as *const c_void,
                image.code_size,
                classlib,
                count,
            )
        }
    }

    fn initialize_modules(&mut self, modules: &ModuleList) {
        let (modules, count) = modules.as_raw_parts();
        unsafe { InitializeModules(modules, count) }
    }
}

/// Reverse transitions through the runtime's own frame helpers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBridge;

impl TransitionBridge for NativeBridge {
    unsafe fn enter(&self, frame: *mut ReverseTransitionFrame) {
        RhpReversePInvoke2(frame)
    }

    unsafe fn leave(&self, frame: *mut ReverseTransitionFrame) {
        RhpReversePInvokeReturn(frame)
    }
}

/// Called by generated code on entry to a method reachable from native code.
///
/// # Safety
/// `frame` must point to a frame on the caller's stack.
#[export_name = "__reverse_pinvoke"]
pub unsafe extern "C-unwind" fn reverse_pinvoke(frame: *mut ReverseTransitionFrame) {
    NativeBridge.enter(frame)
}

/// # Safety
/// `frame` must be the frame passed to the matching `__reverse_pinvoke`.
#[export_name = "__reverse_pinvoke_return"]
pub unsafe extern "C-unwind" fn reverse_pinvoke_return(frame: *mut ReverseTransitionFrame) {
    NativeBridge.leave(frame)
}

/// Allocates through the runtime's heap.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeAllocator;

// SAFETY: the runtime's allocators return null or a zeroed object of the
// requested type, laid out per the contract the image was compiled against.
unsafe impl ObjectAllocator for NativeAllocator {
    fn new_object(&self, type_descriptor: *const TypeDescriptor) -> *mut u8 {
        unsafe { RhNewObject(type_descriptor) }
    }

    fn new_array(&self, type_descriptor: *const TypeDescriptor, length: u32) -> *mut u8 {
        match i32::try_from(length) {
            Ok(elements) => unsafe { RhNewArray(type_descriptor, elements) },
            Err(_) => ptr::null_mut(),
        }
    }
}

/// The image's managed entry point.
pub fn managed_entry() -> NativeEntry {
    // SAFETY: `__managed__Main` is the compiler-emitted entry point.
    unsafe { NativeEntry::new(__managed__Main) }
}
