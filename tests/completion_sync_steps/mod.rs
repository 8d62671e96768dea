//! Step definitions for export and completion sync scenarios.

mod then;
mod when;
pub mod world;
