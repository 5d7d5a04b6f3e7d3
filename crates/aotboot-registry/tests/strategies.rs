use aotboot_registry::{
    ActiveRegistration, ModuleDescriptor, ModuleList, ModuleRegistry, ModuleSource, RegisterFn,
    RegistryError, ScriptMerge, SectionMerge, SectionRange, SectionSlot, Strategy,
};
use std::collections::HashSet;
use std::ffi::c_void;

/// Stand-in for a unit's metadata blob.
#[repr(C)]
struct UnitHeader {
    id: u32,
}

static UNIT_0: UnitHeader = UnitHeader { id: 0 };
static UNIT_1: UnitHeader = UnitHeader { id: 1 };
static UNIT_2: UnitHeader = UnitHeader { id: 2 };
static UNIT_3: UnitHeader = UnitHeader { id: 3 };

const fn slot(unit: &'static UnitHeader) -> SectionSlot {
    SectionSlot::new(unit as *const UnitHeader as *const c_void)
}

fn addr(unit: &'static UnitHeader) -> usize {
    unit as *const UnitHeader as usize
}

// What the linker produces after merging: leading bookend, one slot per unit,
// trailing bookend.
static MERGED: [SectionSlot; 6] = [
    SectionSlot::NULL,
    slot(&UNIT_0),
    slot(&UNIT_1),
    slot(&UNIT_2),
    slot(&UNIT_3),
    SectionSlot::NULL,
];

// Same, with alignment padding between grouped input sections.
static PADDED: [SectionSlot; 8] = [
    SectionSlot::NULL,
    SectionSlot::NULL,
    slot(&UNIT_0),
    slot(&UNIT_1),
    SectionSlot::NULL,
    slot(&UNIT_2),
    slot(&UNIT_3),
    SectionSlot::NULL,
];

fn merged_range(section: &'static [SectionSlot]) -> SectionRange {
    let last = section.len() - 1;
    unsafe { SectionRange::from_bookends(&section[0], &section[last]) }.unwrap()
}

fn assert_one_entry_per_unit(list: &ModuleList) {
    let expected: HashSet<usize> = [&UNIT_0, &UNIT_1, &UNIT_2, &UNIT_3].into_iter().map(addr).collect();
    let got: HashSet<usize> = list.iter().map(ModuleDescriptor::addr).collect();
    assert_eq!(list.len(), 4, "exactly one entry per unit");
    assert_eq!(got, expected);
}

#[test]
fn section_merge_yields_every_unit_once() {
    let mut source = SectionMerge::new(merged_range(&MERGED));
    assert_eq!(source.strategy(), Strategy::SectionMerge);
    assert_one_entry_per_unit(&source.collect().unwrap());
}

#[test]
fn script_merge_yields_every_unit_once() {
    let mut source = ScriptMerge::new(merged_range(&MERGED));
    assert_eq!(source.strategy(), Strategy::ScriptMerge);
    assert_one_entry_per_unit(&source.collect().unwrap());
}

#[test]
fn padding_between_units_is_not_an_entry() {
    let range = merged_range(&PADDED);
    assert_eq!(range.slot_count(), 6);
    assert_one_entry_per_unit(&range.read().unwrap());
}

#[test]
fn bookend_placeholders_are_excluded() {
    let range = merged_range(&MERGED);
    assert_eq!(range.slot_count(), 4);
    assert!(range.slots().iter().all(|s| s.descriptor().is_some()));
}

#[test]
fn duplicated_slot_is_rejected() {
    static DUPLICATED: [SectionSlot; 4] = [SectionSlot::NULL, slot(&UNIT_1), slot(&UNIT_1), SectionSlot::NULL];
    let err = merged_range(&DUPLICATED).read().unwrap_err();
    assert_eq!(err, RegistryError::DuplicateModule(addr(&UNIT_1)));
}

fn register_unit_0(registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
    registry.register(&UNIT_0 as *const UnitHeader as *mut c_void)
}
fn register_unit_1(registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
    registry.register(&UNIT_1 as *const UnitHeader as *mut c_void)
}
fn register_unit_2(registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
    registry.register(&UNIT_2 as *const UnitHeader as *mut c_void)
}
fn register_unit_3(registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
    registry.register(&UNIT_3 as *const UnitHeader as *mut c_void)
}

#[test]
fn active_registration_yields_every_unit_once() {
    let units: [RegisterFn; 4] = [register_unit_0, register_unit_1, register_unit_2, register_unit_3];
    let mut source = ActiveRegistration::from_units(&units).unwrap();
    assert_eq!(source.strategy(), Strategy::ActiveRegistration);
    assert_one_entry_per_unit(&source.collect().unwrap());
}

#[test]
fn active_registration_rejects_a_unit_registering_twice() {
    let units: [RegisterFn; 3] = [register_unit_0, register_unit_1, register_unit_0];
    let err = ActiveRegistration::from_units(&units).unwrap_err();
    assert_eq!(err, RegistryError::DuplicateModule(addr(&UNIT_0)));
}

#[test]
fn strategies_are_interchangeable_behind_the_trait() {
    let units: [RegisterFn; 4] = [register_unit_0, register_unit_1, register_unit_2, register_unit_3];
    let mut sources: Vec<Box<dyn ModuleSource>> = vec![
        Box::new(SectionMerge::new(merged_range(&MERGED))),
        Box::new(ScriptMerge::new(merged_range(&PADDED))),
        Box::new(ActiveRegistration::from_units(&units).unwrap()),
    ];

    for source in sources.iter_mut() {
        let list = source.collect().unwrap();
        assert_one_entry_per_unit(&list);
    }
}

#[cfg(not(target_vendor = "apple"))]
mod slot_macro {
    use super::*;

    static BLOB: UnitHeader = UnitHeader { id: 42 };
    aotboot_registry::module_slot!(BLOB_SLOT, &BLOB);

    #[test]
    fn macro_slot_points_at_the_blob() {
        let descriptor = BLOB_SLOT.descriptor().unwrap();
        assert_eq!(descriptor.addr(), addr(&BLOB));
        assert_eq!(BLOB.id, 42);
    }
}
