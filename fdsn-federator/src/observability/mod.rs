//! Structured logging vocabulary.
//!
//! Library code emits `tracing` events keyed by the names in [`events`] and the
//! field keys in [`fields`]; it never installs a subscriber.

pub mod events;
pub mod fields;
