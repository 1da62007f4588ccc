//! I/O helpers: configuration, file access, and change reporting.

pub mod config;
pub mod file_store;
pub mod report;
