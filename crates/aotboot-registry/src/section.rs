use crate::source::{ModuleSource, Strategy};
use crate::{ModuleDescriptor, ModuleList, RegistryError};
use std::ffi::c_void;
use std::marker::PhantomData;
use std::{mem, ptr, slice};

/// One pointer-sized entry in a module section.
///
/// Bookends hold [`SectionSlot::NULL`]; each contributing unit holds one slot
/// pointing at its metadata blob.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSlot(*const c_void);

// SAFETY: slots are written by the linker and only read afterwards.
unsafe impl Sync for SectionSlot {}
unsafe impl Send for SectionSlot {}

impl SectionSlot {
    pub const NULL: SectionSlot = SectionSlot(ptr::null());

    pub const fn new(blob: *const c_void) -> Self {
        SectionSlot(blob)
    }

    pub fn descriptor(self) -> Option<ModuleDescriptor> {
        ModuleDescriptor::new(self.0 as *mut c_void)
    }
}

/// The slots strictly between a leading and a trailing bookend.
#[derive(Debug, Clone, Copy)]
pub struct SectionRange {
    start: *const SectionSlot,
    end: *const SectionSlot,
}

impl SectionRange {
    /// Builds the range from the two bookend arrays. Each bookend holds a
    /// single null slot, so the real data starts one slot past `leading` and
    /// ends at `trailing`.
    ///
    /// # Safety
    /// Both pointers must point into the same merged section, with every
    /// slot between them initialized by the linker.
    pub unsafe fn from_bookends(
        leading: *const SectionSlot,
        trailing: *const SectionSlot,
    ) -> Result<Self, RegistryError> {
        let start = leading.wrapping_add(1);
        if (trailing as usize) < (start as usize) {
            return Err(RegistryError::InvertedBounds {
                start: leading as usize,
                end: trailing as usize,
            });
        }
        Ok(SectionRange { start, end: trailing })
    }

    /// Number of slots in the range, padding included.
    pub fn slot_count(&self) -> usize {
        (self.end as usize - self.start as usize) / mem::size_of::<SectionSlot>()
    }

    pub fn slots(&self) -> &[SectionSlot] {
        // SAFETY: guaranteed by the `from_bookends` contract.
        unsafe { slice::from_raw_parts(self.start, self.slot_count()) }
    }

    /// Reads every descriptor in the range. Null slots are alignment padding
    /// some linkers insert between grouped sections and are skipped.
    pub fn read(&self) -> Result<ModuleList, RegistryError> {
        let slots = self.slots();
        let mut padding = 0usize;
        let descriptors = slots.iter().filter_map(|slot| {
            let descriptor = slot.descriptor();
            if descriptor.is_none() {
                padding += 1;
            }
            descriptor
        });
        let list = ModuleList::from_descriptors(descriptors)?;
        if padding > 0 {
            log::trace!("Skipped {} padding slot(s) in the module section", padding);
        }
        Ok(list)
    }
}

/// Which linker feature laid out a merged module section.
///
/// The two layouts are read identically; only the reported strategy differs.
pub trait MergeKind {
    const STRATEGY: Strategy;
}

/// Grouped sections folded by name through a linker merge directive.
#[derive(Debug, Clone, Copy)]
pub enum MergeDirective {}

impl MergeKind for MergeDirective {
    const STRATEGY: Strategy = Strategy::SectionMerge;
}

/// Sections ordered by a linker script.
#[derive(Debug, Clone, Copy)]
pub enum MergeScript {}

impl MergeKind for MergeScript {
    const STRATEGY: Strategy = Strategy::ScriptMerge;
}

/// Module list bounded by bookends the linker placed around every unit slot.
#[derive(Debug, Clone, Copy)]
pub struct MergedSection<K: MergeKind> {
    range: SectionRange,
    _kind: PhantomData<K>,
}

pub type SectionMerge = MergedSection<MergeDirective>;
pub type ScriptMerge = MergedSection<MergeScript>;

impl<K: MergeKind> MergedSection<K> {
    pub fn new(range: SectionRange) -> Self {
        MergedSection {
            range,
            _kind: PhantomData,
        }
    }
}

impl<K: MergeKind> ModuleSource for MergedSection<K> {
    fn strategy(&self) -> Strategy {
        K::STRATEGY
    }

    fn collect(&mut self) -> Result<ModuleList, RegistryError> {
        let list = self.range.read()?;
        log::debug!("{}: {} module(s) between bookends", K::STRATEGY, list.len());
        Ok(list)
    }
}
