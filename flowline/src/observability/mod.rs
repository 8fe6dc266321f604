//! Observability layer.
//!
//! Central home for structured event names and field keys so log consumers
//! can match on stable strings. The library never installs a global
//! subscriber; binaries and tests own one-time `tracing_subscriber` setup.

pub mod events;
pub mod fields;
