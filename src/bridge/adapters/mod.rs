//! Adapter implementations for the bridge ports.

pub mod http;
pub mod memory;

mod json_file;

pub use json_file::JsonFileSettingsStore;
