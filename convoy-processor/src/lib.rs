//! Chained entry processing.
//!
//! A [`processor::ChainProcessor`] walks an ordered list of sources as
//! one logically contiguous entry sequence. Sources after the first are
//! opened lazily, empty ones are skipped, and each yielded
//! [`entry::Entry`] resolves fields against the source it came from.

pub mod entry;
pub mod error;
pub mod processor;
