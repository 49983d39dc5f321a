//! Command implementations for wfpm-cli

pub mod install;
pub mod list;
pub mod nextver;
pub mod workon;

pub use install::run_install;
pub use list::run_list;
pub use nextver::run_nextver;
pub use test::run_test;
pub use workon::run_workon;
