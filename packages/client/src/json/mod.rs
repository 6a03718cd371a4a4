//! Dynamic JSON access layer.
//!
//! A [`Json`] view owns one parsed `serde_json::Value` tree and exposes
//! path-based navigation ([`PathSegment`] keys and indices) together with
//! default-valued typed accessors. Parsing and serialization of the byte
//! grammar are delegated to `serde_json`; this module only wraps the
//! resulting value tree.

pub mod path;
pub mod view;

pub use path::{PathError, PathSegment};
pub use view::Json;
