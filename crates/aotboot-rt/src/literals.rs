use aotboot_layout::{StringRef, TypeDescriptor};
use std::ptr;

/// Allocation callbacks into the runtime's heap.
///
/// # Safety
/// A non-null pointer returned by `new_array` must be a zeroed array object
/// of `type_descriptor` holding at least `length` elements, laid out per the
/// host layout contract. `new_object` likewise returns null or an object of
/// `type_descriptor`.
pub unsafe trait ObjectAllocator {
    fn new_object(&self, type_descriptor: *const TypeDescriptor) -> *mut u8;

    fn new_array(&self, type_descriptor: *const TypeDescriptor, length: u32) -> *mut u8;
}

/// Materializes a string literal as a managed string of `string_type`.
///
/// Returns `None` when the literal is too long or the allocator fails.
/// Literals are neither cached nor interned; every call allocates.
pub fn load_string_literal(
    allocator: &dyn ObjectAllocator,
    string_type: *const TypeDescriptor,
    text: &str,
) -> Option<StringRef> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let length = i32::try_from(units.len()).ok()? as u32;

    let raw = allocator.new_array(string_type, length);
    // SAFETY: the allocator contract guarantees a string-shaped array or null.
    let string = unsafe { StringRef::from_raw(raw) };
    let Some(string) = string else {
        log::warn!("String literal allocation of {} code unit(s) failed", length);
        return None;
    };
    // SAFETY: the array holds `length` UTF-16 code units past the header.
    unsafe {
        let data = string.array().data_pointer() as *mut u16;
        ptr::copy_nonoverlapping(units.as_ptr(), data, units.len());
    }
    Some(string)
}
