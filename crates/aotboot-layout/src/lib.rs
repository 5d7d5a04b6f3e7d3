use thiserror::Error;

mod contract;
mod object;
mod owned;

// Publicly export key types
pub use contract::{
    ArrayHeader, LayoutContract, ObjectHeader, TypeDescriptor, CHAR_SIZE, DATA_OFFSET,
    LENGTH_OFFSET, POINTER_SIZE, TYPE_DESCRIPTOR_OFFSET,
};
pub use object::{data_pointer_of, length_of, type_descriptor_of, ArrayRef, ObjectRef, StringRef};
pub use owned::OwnedObject;

/// Errors raised when the layout agreement with the code generator is checked.
///
/// Reads through the accessors themselves never fail; a broken agreement there
/// is undefined behavior, not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Layout contract mismatch on `{field}`: host expects {host}, image uses {image}")]
    Mismatch {
        field: &'static str,
        host: usize,
        image: usize,
    },

    #[error("Object of {0} bytes cannot be laid out")]
    InvalidSize(usize),
}
