//! Unit tests for the bridge.
//!
//! Tests are organised by area: domain validation and serialisation, the
//! export service, the completion cycle and the poller state machine.
