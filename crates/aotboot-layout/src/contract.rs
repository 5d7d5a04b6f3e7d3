//! The object layout agreed with the code generator.
//!
//! Every heap instance starts with a pointer to its type descriptor. Arrays
//! follow it with a 32-bit element count and then the element data. Strings
//! are arrays of UTF-16 code units with the same prefix.
//!
//! `ObjectHeader` and `ArrayHeader` are the single definition of that layout;
//! the offset constants below must agree with them, and `LayoutContract::host`
//! derives the same numbers from the structs.

use crate::LayoutError;
use memoffset::offset_of;
use serde::{Deserialize, Serialize};
use std::mem;

/// Opaque type descriptor emitted by the code generator.
#[repr(C)]
pub struct TypeDescriptor {
    _private: [u8; 0],
}

/// First word of every managed object.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ObjectHeader {
    pub type_descriptor: *const TypeDescriptor,
}

/// Prefix shared by arrays and strings. Element data starts right after
/// `length`, not after the struct's trailing padding.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ArrayHeader {
    pub object: ObjectHeader,
    pub length: u32,
}

pub const POINTER_SIZE: usize = mem::size_of::<*const u8>();
pub const TYPE_DESCRIPTOR_OFFSET: usize = 0;
pub const LENGTH_OFFSET: usize = POINTER_SIZE;
pub const DATA_OFFSET: usize = POINTER_SIZE + mem::size_of::<u32>();
/// Size of one string character (a UTF-16 code unit).
pub const CHAR_SIZE: usize = mem::size_of::<u16>();

/// Byte offsets of the object layout as seen by one side of the agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutContract {
    pub pointer_size: usize,
    pub type_descriptor_offset: usize,
    pub length_offset: usize,
    pub data_offset: usize,
    pub char_size: usize,
}

impl LayoutContract {
    /// The contract this build of the runtime reads objects with.
    pub fn host() -> Self {
        let length_offset = offset_of!(ArrayHeader, length);
        LayoutContract {
            pointer_size: mem::size_of::<*const TypeDescriptor>(),
            type_descriptor_offset: offset_of!(ObjectHeader, type_descriptor),
            length_offset,
            data_offset: length_offset + mem::size_of::<u32>(),
            char_size: mem::size_of::<u16>(),
        }
    }

    /// Checks that an image was generated against the same layout.
    /// Reports the first field that differs.
    pub fn ensure_matches(&self, image: &LayoutContract) -> Result<(), LayoutError> {
        let fields = [
            ("pointer_size", self.pointer_size, image.pointer_size),
            ("type_descriptor_offset", self.type_descriptor_offset, image.type_descriptor_offset),
            ("length_offset", self.length_offset, image.length_offset),
            ("data_offset", self.data_offset, image.data_offset),
            ("char_size", self.char_size, image.char_size),
        ];

        for (field, host, image) in fields {
            if host != image {
                log::error!("Layout contract mismatch on {}: host {} vs image {}", field, host, image);
                return Err(LayoutError::Mismatch { field, host, image });
            }
        }
        Ok(())
    }

    /// Total size of an array with `length` elements of `element_size` bytes.
    pub fn array_size(&self, length: usize, element_size: usize) -> Option<usize> {
        length.checked_mul(element_size)?.checked_add(self.data_offset)
    }
}

impl Default for LayoutContract {
    fn default() -> Self {
        Self::host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_agree_with_header_structs() {
        let host = LayoutContract::host();
        assert_eq!(host.pointer_size, POINTER_SIZE);
        assert_eq!(host.type_descriptor_offset, TYPE_DESCRIPTOR_OFFSET);
        assert_eq!(host.length_offset, LENGTH_OFFSET);
        assert_eq!(host.data_offset, DATA_OFFSET);
        assert_eq!(host.char_size, CHAR_SIZE);
    }

    #[test]
    fn data_follows_length_field_directly() {
        assert_eq!(DATA_OFFSET, POINTER_SIZE + 4);
    }

    #[test]
    fn mismatch_names_first_differing_field() {
        let host = LayoutContract::host();
        let image = LayoutContract {
            data_offset: host.data_offset + 4,
            char_size: 1,
            ..host
        };

        let err = host.ensure_matches(&image).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Mismatch {
                field: "data_offset",
                host: host.data_offset,
                image: host.data_offset + 4,
            }
        );
        assert!(host.ensure_matches(&host).is_ok());
    }

    #[test]
    fn array_size_overflow() {
        let host = LayoutContract::host();
        assert_eq!(host.array_size(3, 2), Some(DATA_OFFSET + 6));
        assert_eq!(host.array_size(usize::MAX, 2), None);
    }
}
