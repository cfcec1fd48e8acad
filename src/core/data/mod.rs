//! Core data types shared by the scanner, the store and the reporters.
//!
//! ## Module Structure
//!
//! - `catalog`: Loaded ARB data (Catalog, Entry, Placeholder)
//! - `message`: Locations inside ARB files (MessageContext, MessageLocation)
//! - `reference`: Key usages found in Dart source (Reference, PatternKind, Span)
//! - `source`: Locations inside Dart source files (SourceContext, SourceLocation)

pub mod catalog;
pub mod message;
pub mod reference;
pub mod source;

pub use catalog::{Catalog, Entry, Placeholder};
pub use message::{MessageContext, MessageLocation};
pub use reference::{PatternKind, Position, Range, Reference, Span};
pub use source::{SourceContext, SourceLocation};
