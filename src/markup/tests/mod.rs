//! Unit tests for the markup transformer.
//!
//! Tests are organised by operation, covering the exact strings the editor
//! produces and the idempotence of every insertion.
