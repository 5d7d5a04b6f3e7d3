pub mod classlib;
pub mod config;
pub mod layout;
pub mod stubs;
