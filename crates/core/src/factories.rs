//! Factories for generating instances of peer selection modules.

pub mod mem_directory;
pub use mem_directory::MemDirectoryFactory;

mod core_report;
pub use core_report::*;
