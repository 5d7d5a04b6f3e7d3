use crate::contract::{TypeDescriptor, DATA_OFFSET, LENGTH_OFFSET, TYPE_DESCRIPTOR_OFFSET};
use std::io;
use std::ptr::{self, NonNull};
use std::slice;
use widestring::U16Str;

/// Address of a managed heap instance.
///
/// Nothing is validated against the object's real type; every read trusts
/// the layout contract.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(NonNull<u8>);

impl ObjectRef {
    /// # Safety
    /// `ptr` must be null or point at an object laid out per the contract.
    pub unsafe fn from_raw(ptr: *mut u8) -> Option<Self> {
        NonNull::new(ptr).map(ObjectRef)
    }

    pub(crate) fn from_non_null(ptr: NonNull<u8>) -> Self {
        ObjectRef(ptr)
    }

    pub fn as_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// # Safety
    /// The object must be live.
    pub unsafe fn type_descriptor(self) -> *const TypeDescriptor {
        ptr::read(self.as_ptr().add(TYPE_DESCRIPTOR_OFFSET) as *const *const TypeDescriptor)
    }

    /// Reinterprets the object as an array. No type check is made.
    pub fn as_array(self) -> ArrayRef {
        ArrayRef(self)
    }

    /// Reinterprets the object as a string. No type check is made.
    pub fn as_string(self) -> StringRef {
        StringRef(ArrayRef(self))
    }
}

/// An object with the array prefix: header, 32-bit length, element data.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayRef(ObjectRef);

impl ArrayRef {
    /// # Safety
    /// `ptr` must be null or point at an array laid out per the contract.
    pub unsafe fn from_raw(ptr: *mut u8) -> Option<Self> {
        ObjectRef::from_raw(ptr).map(ArrayRef)
    }

    pub fn object(self) -> ObjectRef {
        self.0
    }

    /// # Safety
    /// The array must be live.
    pub unsafe fn length(self) -> u32 {
        ptr::read(self.0.as_ptr().add(LENGTH_OFFSET) as *const u32)
    }

    /// Address of the first element. Valid to compute for any live array,
    /// including an empty one.
    pub fn data_pointer(self) -> *mut u8 {
        // SAFETY: the prefix is part of the same allocation as the object.
        unsafe { self.0.as_ptr().add(DATA_OFFSET) }
    }
}

/// A string object: the array prefix over UTF-16 code units.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef(ArrayRef);

impl StringRef {
    /// # Safety
    /// `ptr` must be null or point at a string laid out per the contract.
    pub unsafe fn from_raw(ptr: *mut u8) -> Option<Self> {
        ArrayRef::from_raw(ptr).map(StringRef)
    }

    pub fn array(self) -> ArrayRef {
        self.0
    }

    /// The string's code units, exactly `length` of them.
    ///
    /// # Safety
    /// The string must stay live and unmoved for `'a`.
    pub unsafe fn code_units<'a>(self) -> &'a [u16] {
        let len = self.0.length() as usize;
        slice::from_raw_parts(self.0.data_pointer() as *const u16, len)
    }

    /// Walks the string and writes its characters to `out`. Unpaired
    /// surrogates come out as U+FFFD.
    ///
    /// # Safety
    /// The string must be live.
    pub unsafe fn write_to<W: io::Write + ?Sized>(self, out: &mut W) -> io::Result<()> {
        let text = U16Str::from_slice(self.code_units()).to_string_lossy();
        out.write_all(text.as_bytes())
    }

    /// # Safety
    /// The string must be live.
    pub unsafe fn to_string_lossy(self) -> String {
        U16Str::from_slice(self.code_units()).to_string_lossy()
    }
}

/// Word 0 of `obj`.
///
/// # Safety
/// `obj` must point at a live managed object.
pub unsafe fn type_descriptor_of(obj: *const u8) -> *const TypeDescriptor {
    ptr::read(obj.add(TYPE_DESCRIPTOR_OFFSET) as *const *const TypeDescriptor)
}

/// The 32-bit length field right after the type descriptor.
///
/// # Safety
/// `array` must point at a live managed array.
pub unsafe fn length_of(array: *const u8) -> u32 {
    ptr::read(array.add(LENGTH_OFFSET) as *const u32)
}

/// # Safety
/// `array` must point at a managed array.
pub unsafe fn data_pointer_of(array: *const u8) -> *const u8 {
    array.add(DATA_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OwnedObject;

    #[test]
    fn reads_through_typed_and_raw_accessors_agree() {
        let descriptor = 0x1000 as *const TypeDescriptor;
        let array = OwnedObject::array(descriptor, 5, 8).unwrap();
        let raw = array.as_ptr() as *const u8;

        unsafe {
            let typed = ArrayRef::from_raw(array.as_ptr()).unwrap();
            assert_eq!(typed.length(), length_of(raw));
            assert_eq!(typed.data_pointer() as *const u8, data_pointer_of(raw));
            assert_eq!(typed.object().type_descriptor(), type_descriptor_of(raw));
        }
    }

    #[test]
    fn null_is_not_an_object() {
        unsafe {
            assert!(ObjectRef::from_raw(ptr::null_mut()).is_none());
            assert!(StringRef::from_raw(ptr::null_mut()).is_none());
        }
    }

    #[test]
    fn unpaired_surrogate_is_replaced() {
        let descriptor = ptr::null();
        let string = OwnedObject::string(descriptor, "ab").unwrap();
        unsafe {
            let units = string.as_ptr().add(DATA_OFFSET) as *mut u16;
            ptr::write(units.add(1), 0xD800);
            let s = StringRef::from_raw(string.as_ptr()).unwrap();
            assert_eq!(s.to_string_lossy(), "a\u{FFFD}");
        }
    }
}
