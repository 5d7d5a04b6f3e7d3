//! Module registration.
//!
//! Every unit compiled from managed code carries one pointer to its metadata
//! blob (eager constructors, frozen data). Before the runtime starts, those
//! pointers must be gathered into a single list holding exactly one entry per
//! unit. How they are gathered depends on what the platform's linker can do:
//!
//! * [`SectionMerge`]: each unit drops its pointer into `.modules$I`; the
//!   linker folds `.modules$A`, the units, and `.modules$Z` together in name
//!   order, and the list is everything between the two bookends.
//! * [`ScriptMerge`]: the same layout, produced by a linker script
//!   (`linker/modules.ld`) where no merge directive exists.
//! * [`ActiveRegistration`]: each unit registers itself through an explicit
//!   call on a [`ModuleRegistry`].
//!
//! The initializer only ever sees the [`ModuleSource`] trait.

use thiserror::Error;

mod active;
mod descriptor;
mod section;
mod source;

#[cfg(feature = "linked-sections")]
mod linked;

pub use active::{register_ready_to_run_module, ActiveRegistration, ModuleRegistry, RegisterFn};
pub use descriptor::{ModuleDescriptor, ModuleList, MAX_MODULES};
pub use section::{
    MergeDirective, MergeKind, MergeScript, MergedSection, ScriptMerge, SectionMerge, SectionRange,
    SectionSlot,
};
pub use source::{ModuleSource, Strategy};

#[cfg(all(feature = "linked-sections", not(target_vendor = "apple")))]
pub use linked::linked_range;
#[cfg(feature = "linked-sections")]
pub use linked::linked_source;

/// Name of the section holding the leading bookend.
pub const LEADING_SECTION: &str = ".modules$A";
/// Name of the section each contributing unit places its pointer in.
pub const UNIT_SECTION: &str = ".modules$I";
/// Name of the section holding the trailing bookend.
pub const TRAILING_SECTION: &str = ".modules$Z";

/// Errors raised while building the module list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A null module descriptor was registered")]
    NullModule,

    #[error("Module descriptor {0:#x} was registered more than once")]
    DuplicateModule(usize),

    #[error("Trailing module bookend {end:#x} lies before the leading bookend {start:#x}")]
    InvertedBounds { start: usize, end: usize },

    #[error("{0} module descriptors exceed what the runtime can be handed")]
    TooManyModules(usize),

    #[error("Module registration attempted after the module list was collected")]
    Sealed,
}

/// Places one module descriptor pointer in the unit section.
///
/// ```ignore
/// static HEADER: MyHeader = ...;
/// aotboot_registry::module_slot!(HEADER_SLOT, &HEADER);
/// ```
#[cfg(not(target_vendor = "apple"))]
#[macro_export]
macro_rules! module_slot {
    ($name:ident, $blob:expr) => {
        #[used]
        #[link_section = ".modules$I"]
        static $name: $crate::SectionSlot = $crate::SectionSlot::new($blob as *const _ as *const ::std::ffi::c_void);
    };
}
