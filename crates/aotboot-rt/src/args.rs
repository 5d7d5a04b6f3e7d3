use std::ffi::{c_int, OsStr};
use std::iter;
use std::ptr;

/// Character type of the platform's native argument vector.
#[cfg(windows)]
pub type NativeChar = u16;
#[cfg(not(windows))]
pub type NativeChar = std::ffi::c_char;

/// Signature of the managed entry point emitted by the compiler. Managed code
/// may unwind out of it through a diagnostic stub.
pub type ManagedMain = unsafe extern "C-unwind" fn(argc: c_int, argv: *mut *mut NativeChar) -> c_int;

/// The process argument vector in its native shape: `argc` entries followed
/// by a null pointer.
pub struct NativeArgs {
    argc: c_int,
    argv: *mut *mut NativeChar,
    _storage: Option<ArgStorage>,
}

struct ArgStorage {
    _strings: Vec<Vec<NativeChar>>,
    _pointers: Vec<*mut NativeChar>,
}

impl NativeArgs {
    /// Wraps the vector the C runtime handed to `main`, unchanged.
    ///
    /// # Safety
    /// `argv` must hold `argc` valid NUL-terminated strings and outlive the value.
    pub unsafe fn from_raw(argc: c_int, argv: *mut *mut NativeChar) -> Self {
        NativeArgs { argc, argv, _storage: None }
    }

    /// Re-encodes arguments into a native vector owned by the value.
    /// Anything after an interior NUL is dropped, as C would see it.
    pub fn from_os_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut strings: Vec<Vec<NativeChar>> = args.into_iter().map(|arg| encode(arg.as_ref())).collect();
        let mut pointers: Vec<*mut NativeChar> = strings
            .iter_mut()
            .map(|s| s.as_mut_ptr())
            .chain(iter::once(ptr::null_mut()))
            .collect();

        let argc = c_int::try_from(strings.len()).unwrap_or(c_int::MAX);
        let argv = pointers.as_mut_ptr();
        NativeArgs {
            argc,
            argv,
            _storage: Some(ArgStorage {
                _strings: strings,
                _pointers: pointers,
            }),
        }
    }

    pub fn argc(&self) -> c_int {
        self.argc
    }

    pub fn argv(&self) -> *mut *mut NativeChar {
        self.argv
    }

    pub fn len(&self) -> usize {
        self.argc.max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the vector for logging and inspection.
    pub fn to_strings_lossy(&self) -> Vec<String> {
        (0..self.len())
            .map(|i| {
                // SAFETY: argv holds argc valid strings by construction.
                unsafe { decode(*self.argv.add(i)) }
            })
            .collect()
    }
}

impl std::fmt::Debug for NativeArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.to_strings_lossy()).finish()
    }
}

#[cfg(unix)]
fn encode(arg: &OsStr) -> Vec<NativeChar> {
    use std::os::unix::ffi::OsStrExt;
    arg.as_bytes()
        .iter()
        .take_while(|b| **b != 0)
        .map(|&b| b as NativeChar)
        .chain(iter::once(0))
        .collect()
}

#[cfg(windows)]
fn encode(arg: &OsStr) -> Vec<NativeChar> {
    use std::os::windows::ffi::OsStrExt;
    arg.encode_wide().take_while(|u| *u != 0).chain(iter::once(0)).collect()
}

#[cfg(not(any(unix, windows)))]
fn encode(arg: &OsStr) -> Vec<NativeChar> {
    arg.to_string_lossy()
        .bytes()
        .take_while(|b| *b != 0)
        .map(|b| b as NativeChar)
        .chain(iter::once(0))
        .collect()
}

#[cfg(not(windows))]
unsafe fn decode(arg: *const NativeChar) -> String {
    if arg.is_null() {
        return String::new();
    }
    std::ffi::CStr::from_ptr(arg).to_string_lossy().into_owned()
}

#[cfg(windows)]
unsafe fn decode(arg: *const NativeChar) -> String {
    if arg.is_null() {
        return String::new();
    }
    let mut len = 0;
    while *arg.add(len) != 0 {
        len += 1;
    }
    String::from_utf16_lossy(std::slice::from_raw_parts(arg, len))
}

/// Something that can run as the program's managed entry point.
pub trait ManagedEntry {
    fn invoke(&mut self, args: &mut NativeArgs) -> i32;
}

/// The compiler-emitted entry point.
#[derive(Debug, Clone, Copy)]
pub struct NativeEntry(ManagedMain);

impl NativeEntry {
    /// # Safety
    /// `main` must be the image's managed entry point.
    pub unsafe fn new(main: ManagedMain) -> Self {
        NativeEntry(main)
    }
}

impl ManagedEntry for NativeEntry {
    fn invoke(&mut self, args: &mut NativeArgs) -> i32 {
        // SAFETY: guaranteed by `NativeEntry::new`.
        unsafe { (self.0)(args.argc(), args.argv()) }
    }
}

impl<F> ManagedEntry for F
where
    F: FnMut(&mut NativeArgs) -> i32,
{
    fn invoke(&mut self, args: &mut NativeArgs) -> i32 {
        self(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_vector_is_null_terminated() {
        let args = NativeArgs::from_os_args(["app", "--flag", "värde"]);
        assert_eq!(args.argc(), 3);
        unsafe {
            assert!((*args.argv().add(3)).is_null());
        }
        assert_eq!(args.to_strings_lossy(), ["app", "--flag", "värde"]);
    }

    #[test]
    fn interior_nul_truncates_the_argument() {
        let args = NativeArgs::from_os_args(["ab\0cd"]);
        assert_eq!(args.to_strings_lossy(), ["ab"]);
    }

    #[test]
    fn raw_vector_is_forwarded_unchanged() {
        let owned = NativeArgs::from_os_args(["x", "y"]);
        let forwarded = unsafe { NativeArgs::from_raw(owned.argc(), owned.argv()) };
        assert_eq!(forwarded.argv(), owned.argv());
        assert_eq!(forwarded.to_strings_lossy(), ["x", "y"]);
    }

    unsafe extern "C-unwind" fn count_args(argc: c_int, _argv: *mut *mut NativeChar) -> c_int {
        argc * 10
    }

    #[test]
    fn native_entry_receives_argc_and_argv() {
        let mut args = NativeArgs::from_os_args(["a", "b"]);
        let mut entry = unsafe { NativeEntry::new(count_args) };
        assert_eq!(entry.invoke(&mut args), 20);
    }
}
