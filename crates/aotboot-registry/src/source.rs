use crate::{ModuleList, RegistryError};
use std::fmt;

/// How module descriptors reach the registry on a given platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Linker merges grouped sections by name (COFF `$` grouping).
    SectionMerge,
    /// A link-time script lays out the same sections (ELF).
    ScriptMerge,
    /// Each unit registers itself explicitly (Mach-O).
    ActiveRegistration,
}

impl Strategy {
    /// The strategy this build was configured for.
    pub const fn for_target() -> Self {
        if cfg!(windows) {
            Strategy::SectionMerge
        } else if cfg!(target_vendor = "apple") {
            Strategy::ActiveRegistration
        } else {
            Strategy::ScriptMerge
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::SectionMerge => "section-merge",
            Strategy::ScriptMerge => "script-merge",
            Strategy::ActiveRegistration => "active-registration",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A way of producing the module list.
///
/// `collect` is called once, after every contributing unit has been loaded
/// and before any managed code runs.
pub trait ModuleSource {
    fn strategy(&self) -> Strategy;

    fn collect(&mut self) -> Result<ModuleList, RegistryError>;
}

impl<S: ModuleSource + ?Sized> ModuleSource for Box<S> {
    fn strategy(&self) -> Strategy {
        (**self).strategy()
    }

    fn collect(&mut self) -> Result<ModuleList, RegistryError> {
        (**self).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_strategy_matches_platform() {
        let strategy = Strategy::for_target();
        if cfg!(windows) {
            assert_eq!(strategy, Strategy::SectionMerge);
        } else if cfg!(target_os = "macos") {
            assert_eq!(strategy, Strategy::ActiveRegistration);
        } else if cfg!(target_os = "linux") {
            assert_eq!(strategy, Strategy::ScriptMerge);
        }
    }
}
