use crate::source::{ModuleSource, Strategy};
use crate::{ModuleDescriptor, ModuleList, RegistryError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::ffi::c_void;

/// A unit's registration hook. Each unit calls [`ModuleRegistry::register`]
/// exactly once with its own descriptor.
pub type RegisterFn = fn(&mut ModuleRegistry) -> Result<(), RegistryError>;

/// Explicit registry that units append their descriptors to.
///
/// Owned by whoever drives startup and passed to each unit in turn, so no
/// unit depends on static-initialization order.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
    seen: FxHashSet<ModuleDescriptor>,
    sealed: bool,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: *mut c_void) -> Result<(), RegistryError> {
        let descriptor = ModuleDescriptor::new(module).ok_or(RegistryError::NullModule)?;
        self.register_descriptor(descriptor)
    }

    pub fn register_descriptor(&mut self, descriptor: ModuleDescriptor) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        if !self.seen.insert(descriptor) {
            return Err(RegistryError::DuplicateModule(descriptor.addr()));
        }
        log::trace!("Registered module descriptor {:#x}", descriptor.addr());
        self.modules.push(descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Hands out the final list. Later registrations are refused.
    fn seal(&mut self) -> Result<ModuleList, RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        self.sealed = true;
        self.seen.clear();
        ModuleList::from_descriptors(std::mem::take(&mut self.modules))
    }
}

/// Module list built by explicit registration calls.
#[derive(Debug, Default)]
pub struct ActiveRegistration {
    registry: ModuleRegistry,
}

impl ActiveRegistration {
    pub fn new(registry: ModuleRegistry) -> Self {
        ActiveRegistration { registry }
    }

    /// Runs each unit's hook once against a fresh registry.
    pub fn from_units(units: &[RegisterFn]) -> Result<Self, RegistryError> {
        let mut registry = ModuleRegistry::new();
        for unit in units {
            unit(&mut registry)?;
        }
        Ok(Self::new(registry))
    }

    /// Takes over everything queued through `RegisterReadyToRunModule`.
    /// The queue closes afterwards.
    pub fn from_pending() -> Result<Self, RegistryError> {
        let queued = {
            let mut pending = PENDING.lock();
            if pending.drained {
                return Err(RegistryError::Sealed);
            }
            pending.drained = true;
            std::mem::take(&mut pending.modules)
        };

        let mut registry = ModuleRegistry::new();
        for addr in queued {
            registry.register(addr as *mut c_void)?;
        }
        Ok(Self::new(registry))
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }
}

impl ModuleSource for ActiveRegistration {
    fn strategy(&self) -> Strategy {
        Strategy::ActiveRegistration
    }

    fn collect(&mut self) -> Result<ModuleList, RegistryError> {
        let list = self.registry.seal()?;
        log::debug!("active-registration: {} module(s) registered", list.len());
        Ok(list)
    }
}

#[derive(Default)]
struct PendingModules {
    modules: Vec<usize>,
    drained: bool,
}

// Platform static-init hooks run before `main`, with no registry to pass in.
static PENDING: Lazy<Mutex<PendingModules>> = Lazy::new(|| Mutex::new(PendingModules::default()));

/// Entry point for images whose loader calls back once per unit during
/// static initialization (Mach-O `__mod_init_func` stubs).
#[export_name = "RegisterReadyToRunModule"]
pub extern "C" fn register_ready_to_run_module(module: *mut c_void) {
    let mut pending = PENDING.lock();
    if pending.drained {
        log::error!("Module {:p} registered after the module list was collected; ignored", module);
        return;
    }
    pending.modules.push(module as usize);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_registration_is_rejected() {
        let mut registry = ModuleRegistry::new();
        assert_eq!(registry.register(std::ptr::null_mut()), Err(RegistryError::NullModule));
        assert!(registry.is_empty());
    }

    #[test]
    fn registration_after_collect_is_refused() {
        let mut source = ActiveRegistration::default();
        source.registry_mut().register(0x40 as *mut c_void).unwrap();
        assert_eq!(source.collect().unwrap().len(), 1);

        assert!(source.registry_mut().is_sealed());
        assert_eq!(
            source.registry_mut().register(0x80 as *mut c_void),
            Err(RegistryError::Sealed)
        );
        assert_eq!(source.collect(), Err(RegistryError::Sealed));
    }
}
