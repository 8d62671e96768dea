//! SiYuan to Todoist task sync.
//!
//! This crate sends SiYuan blocks to Todoist as tasks and ticks the blocks
//! again once their tasks are completed in Todoist.
//!
//! # Architecture
//!
//! The bridge follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the editor, the task service
//!   and settings storage
//! - **Adapters**: HTTP clients, a JSON settings file and in-memory doubles
//!
//! # Modules
//!
//! - [`markup`]: Kramdown block rewriting for tags, links and checkboxes
//! - [`bridge`]: Export and completion sync across the editor and the task
//!   service
//! - [`logging`]: Tracing subscriber setup

pub mod bridge;
pub mod logging;
pub mod markup;
