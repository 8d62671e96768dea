//! Bridge between SiYuan blocks and Todoist tasks.
//!
//! Exporting turns a block into a checkbox item, creates a remote task that
//! links back to the block and embeds a link to the task in the block.
//! Completion sync polls the task service for tasks completed since the
//! stored cursor and ticks the linked blocks. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
