use crate::RegistryError;
use rustc_hash::FxHashSet;
use std::ffi::c_void;
use std::ptr::NonNull;

/// Opaque address of one unit's metadata blob.
///
/// The blob lives for the whole program and is never written through this
/// handle, so sharing it between threads is fine.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleDescriptor(NonNull<c_void>);

// SAFETY: points at immutable, program-lifetime data.
unsafe impl Send for ModuleDescriptor {}
unsafe impl Sync for ModuleDescriptor {}

impl ModuleDescriptor {
    /// Returns `None` for null; null is never a descriptor.
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(ModuleDescriptor)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }
}

/// Most descriptors the runtime's module-init routine can take in one call.
pub const MAX_MODULES: usize = i32::MAX as usize;

/// The collected descriptors, one per contributing unit.
///
/// Order is whatever the strategy produced and carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleList {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleList {
    /// Builds the list, rejecting any descriptor seen twice and lists longer
    /// than [`MAX_MODULES`].
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        Self::bounded(descriptors, MAX_MODULES)
    }

    fn bounded<I>(descriptors: I, limit: usize) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        let mut seen = FxHashSet::default();
        let mut modules = Vec::new();
        for descriptor in descriptors {
            if modules.len() == limit {
                return Err(RegistryError::TooManyModules(limit + 1));
            }
            if !seen.insert(descriptor) {
                return Err(RegistryError::DuplicateModule(descriptor.addr()));
            }
            modules.push(descriptor);
        }
        Ok(ModuleList { modules })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ModuleDescriptor> + '_ {
        self.modules.iter().copied()
    }

    pub fn as_slice(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// `(array, count)` in the shape the runtime's module-init routine takes.
    /// The array stays valid while `self` is alive and unmodified.
    pub fn as_raw_parts(&self) -> (*const *mut c_void, i32) {
        // ModuleDescriptor is a transparent non-null pointer.
        let ptr = self.modules.as_ptr() as *const *mut c_void;
        // Length never exceeds MAX_MODULES.
        (ptr, self.modules.len() as i32)
    }
}

impl<'a> IntoIterator for &'a ModuleList {
    type Item = ModuleDescriptor;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, ModuleDescriptor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter().copied()
    }
}
