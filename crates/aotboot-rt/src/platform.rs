use crate::classlib::ClasslibTable;
use aotboot_layout::LayoutContract;
use aotboot_registry::ModuleList;
use std::ffi::c_void;

/// Everything the runtime needs to register a native image: its OS handle,
/// the address range of its managed code and the callback table.
#[derive(Debug, Clone, Copy)]
pub struct ImageRegistration {
    pub os_module: *mut c_void,
    pub code_start: *const u8,
    pub code_size: u32,
    pub classlib: &'static ClasslibTable,
}

/// The runtime collaborators the bootstrap drives, in the order it drives them.
///
/// Every `bool` is a success flag; `false` is fatal.
pub trait Platform {
    fn pal_init(&mut self) -> bool;

    fn attach(&mut self) -> bool;

    fn enable_conservative_stack_scanning(&mut self) -> bool;

    /// The image to register, on platforms where the runtime must be told
    /// about it explicitly.
    fn image(&self) -> Option<ImageRegistration> {
        None
    }

    fn register_image(&mut self, _image: &ImageRegistration) -> bool {
        true
    }

    /// Layout the image's code generator was built against, when the image
    /// records it.
    fn image_layout(&self) -> Option<LayoutContract> {
        None
    }

    /// Runs every module's eager initializers.
    fn initialize_modules(&mut self, modules: &ModuleList);
}

impl<P: Platform + ?Sized> Platform for &mut P {
    fn pal_init(&mut self) -> bool {
        (**self).pal_init()
    }

    fn attach(&mut self) -> bool {
        (**self).attach()
    }

    fn enable_conservative_stack_scanning(&mut self) -> bool {
        (**self).enable_conservative_stack_scanning()
    }

    fn image(&self) -> Option<ImageRegistration> {
        (**self).image()
    }

    fn register_image(&mut self, image: &ImageRegistration) -> bool {
        (**self).register_image(image)
    }

    fn image_layout(&self) -> Option<LayoutContract> {
        (**self).image_layout()
    }

    fn initialize_modules(&mut self, modules: &ModuleList) {
        (**self).initialize_modules(modules)
    }
}
