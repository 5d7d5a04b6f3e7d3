use crate::contract::{LayoutContract, TypeDescriptor, CHAR_SIZE, DATA_OFFSET, LENGTH_OFFSET, POINTER_SIZE};
use crate::object::{ArrayRef, ObjectRef, StringRef};
use crate::LayoutError;
use std::alloc;
use std::mem;
use std::ptr::{self, NonNull};

/// A zeroed, word-aligned buffer laid out as a managed object.
///
/// This memory is NOT managed by the collector. It backs objects built on the
/// native side (tests, string literals handed to diagnostics) and is freed on drop.
pub struct OwnedObject {
    ptr: NonNull<u8>,
    layout: alloc::Layout,
}

impl OwnedObject {
    /// Allocates `size` zeroed bytes. The buffer must at least hold the header word.
    pub fn zeroed(size: usize) -> Result<Self, LayoutError> {
        if size < POINTER_SIZE {
            return Err(LayoutError::InvalidSize(size));
        }
        let layout = alloc::Layout::from_size_align(size, mem::align_of::<usize>())
            .map_err(|_| LayoutError::InvalidSize(size))?;

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };
        Ok(OwnedObject { ptr, layout })
    }

    /// An array of `length` zeroed elements of `element_size` bytes each.
    pub fn array(
        type_descriptor: *const TypeDescriptor,
        length: u32,
        element_size: usize,
    ) -> Result<Self, LayoutError> {
        let size = LayoutContract::host()
            .array_size(length as usize, element_size)
            .ok_or(LayoutError::InvalidSize(usize::MAX))?;
        let object = Self::zeroed(size)?;
        // SAFETY: the buffer is at least DATA_OFFSET bytes and word aligned.
        unsafe {
            ptr::write(object.ptr.as_ptr() as *mut *const TypeDescriptor, type_descriptor);
            ptr::write(object.ptr.as_ptr().add(LENGTH_OFFSET) as *mut u32, length);
        }
        Ok(object)
    }

    /// A string holding `text` re-encoded as UTF-16.
    pub fn string(type_descriptor: *const TypeDescriptor, text: &str) -> Result<Self, LayoutError> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let length = u32::try_from(units.len()).map_err(|_| LayoutError::InvalidSize(units.len()))?;
        let object = Self::array(type_descriptor, length, CHAR_SIZE)?;
        // SAFETY: the array was sized for `length` code units.
        unsafe {
            let data = object.ptr.as_ptr().add(DATA_OFFSET) as *mut u16;
            ptr::copy_nonoverlapping(units.as_ptr(), data, units.len());
        }
        Ok(object)
    }

    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub fn size(&self) -> usize {
        self.layout.size()
    }

    pub fn as_object(&self) -> ObjectRef {
        ObjectRef::from_non_null(self.ptr)
    }

    pub fn as_array(&self) -> ArrayRef {
        self.as_object().as_array()
    }

    pub fn as_string(&self) -> StringRef {
        self.as_object().as_string()
    }
}

impl Drop for OwnedObject {
    fn drop(&mut self) {
        // SAFETY: allocated in `zeroed` with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl std::fmt::Debug for OwnedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedObject")
            .field("ptr", &self.ptr)
            .field("size", &self.layout.size())
            .finish()
    }
}
