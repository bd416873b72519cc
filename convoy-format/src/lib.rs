//! Building blocks for the convoy container format.
//!
//! This crate hosts the addressing vocabulary and the low-level readers and
//! writers that manage columnar entry containers stored inside an object
//! store.  Each module focuses on a single concern so applications can pick
//! the components they need: from `column` for the closed registry of cell
//! encodings, to `locator` for describing where page payloads live, to
//! `container` for authoring and opening container directories.
//!
//! The public API is intentionally granular; production services typically
//! compose higher-level workflows (chaining, scanning) on top of the
//! provided readers rather than inside this crate.
//!
//!
//! Format Overview
//!
//! /<name>.ntc/
//!     ├── descriptor.json (name, schema, clusters and the page locators addressing pages.blob)
//!     ├── pages.blob (concatenated page payloads; individual pages are resolved via the locators in descriptor.json)

pub mod cardinality;
pub mod column;
pub mod container;
pub mod descriptor;
pub mod error;
pub mod index;
pub mod layout;
pub mod locator;
pub mod naming;
pub mod range;
pub mod value;
