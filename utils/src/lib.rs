//! Shared utilities for the Sidequest protocol.

pub mod id;
pub mod logging;

pub use id::generate_id;
pub use logging::init_tracing;
