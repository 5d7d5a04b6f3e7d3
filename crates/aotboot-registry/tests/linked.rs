#![cfg(all(feature = "linked-sections", unix, not(target_vendor = "apple")))]

use aotboot_registry::{linked_range, linked_source, module_slot, ModuleDescriptor, Strategy};
use std::collections::HashSet;

#[repr(C)]
struct UnitHeader {
    id: u32,
}

static UNIT_A: UnitHeader = UnitHeader { id: 1 };
static UNIT_B: UnitHeader = UnitHeader { id: 2 };
static UNIT_C: UnitHeader = UnitHeader { id: 3 };

module_slot!(SLOT_A, &UNIT_A);
module_slot!(SLOT_B, &UNIT_B);
module_slot!(SLOT_C, &UNIT_C);

fn addr(unit: &'static UnitHeader) -> usize {
    unit as *const UnitHeader as usize
}

#[test]
fn linker_places_every_slot_between_the_bookends() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut source = linked_source().unwrap();
    assert_eq!(source.strategy(), Strategy::ScriptMerge);

    let list = source.collect().unwrap();
    let got: HashSet<usize> = list.iter().map(ModuleDescriptor::addr).collect();
    let expected: HashSet<usize> = [&UNIT_A, &UNIT_B, &UNIT_C].into_iter().map(addr).collect();
    assert_eq!(list.len(), 3);
    assert_eq!(got, expected);
}

#[test]
fn merged_range_holds_only_unit_slots() {
    let range = linked_range().unwrap();
    assert!(range.slot_count() >= 3);
    let list = range.read().unwrap();
    assert_eq!(list.len(), 3);

    let first = list.iter().next().unwrap().as_ptr() as *const UnitHeader;
    assert!([1, 2, 3].contains(&unsafe { (*first).id }));
}
