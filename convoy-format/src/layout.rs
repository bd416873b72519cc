//! Shared on-disk layout constants.
//!
//! These constants define file names and version numbers used throughout the
//! `convoy-format` crate. Centralizing them helps avoid drift between
//! writers, readers, tests, and documentation.

/// JSON file inside a container directory that holds the descriptor.
pub const DESCRIPTOR_FILE: &str = "descriptor.json";

/// Container-level blob that contains all page payloads.
pub const PAGES_BLOB_FILE: &str = "pages.blob";

/// Conventional extension for container directories.
pub const CONTAINER_EXT: &str = "ntc";

/// Highest descriptor format version readers of this crate understand.
pub const FORMAT_VERSION: u32 = 1;
