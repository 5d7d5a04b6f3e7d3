//! Bookends emitted into the final image, and the build-selected source.

use crate::source::{ModuleSource, Strategy};
use crate::RegistryError;

#[cfg(not(target_vendor = "apple"))]
use crate::section::{ScriptMerge, SectionMerge, SectionRange, SectionSlot};

#[cfg(not(target_vendor = "apple"))]
#[used]
#[link_section = ".modules$A"]
static MODULES_A: [SectionSlot; 1] = [SectionSlot::NULL];

#[cfg(not(target_vendor = "apple"))]
#[used]
#[link_section = ".modules$Z"]
static MODULES_Z: [SectionSlot; 1] = [SectionSlot::NULL];

/// The merged range between this image's bookends.
#[cfg(not(target_vendor = "apple"))]
pub fn linked_range() -> Result<SectionRange, RegistryError> {
    // Go through integers: the slots between the bookends belong to other
    // statics, not to either bookend array.
    let leading = std::ptr::addr_of!(MODULES_A) as usize as *const SectionSlot;
    let trailing = std::ptr::addr_of!(MODULES_Z) as usize as *const SectionSlot;
    // SAFETY: both bookends live in the merged `.modules` output section.
    unsafe { SectionRange::from_bookends(leading, trailing) }
}

/// The module source this build was configured for.
#[cfg(not(target_vendor = "apple"))]
pub fn linked_source() -> Result<Box<dyn ModuleSource>, RegistryError> {
    let strategy = Strategy::for_target();
    log::debug!("Using {} module registration", strategy);

    let range = linked_range()?;
    match strategy {
        Strategy::SectionMerge => Ok(Box::new(SectionMerge::new(range))),
        _ => Ok(Box::new(ScriptMerge::new(range))),
    }
}

/// The module source this build was configured for.
#[cfg(target_vendor = "apple")]
pub fn linked_source() -> Result<Box<dyn ModuleSource>, RegistryError> {
    log::debug!("Using {} module registration", Strategy::for_target());
    Ok(Box::new(crate::ActiveRegistration::from_pending()?))
}
