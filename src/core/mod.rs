//! The localization engine.
//!
//! ## Module Structure
//!
//! - `data`: Shared types (Catalog, Entry, Reference, locations)
//! - `document`: Host text-buffer traits and an in-memory document
//! - `matcher`: Key patterns and the extractors that apply them
//! - `scanner`: Reference scanning, validation and replacement
//! - `parsers`: ARB file parsing and serialization
//! - `store`: Per-locale catalogs kept in sync with the ARB files
//! - `status`: Completeness of a key across locales
//! - `validate`: Structural checks over loaded catalogs
//! - `watcher`: Debounced file-system watching for the ARB directory
//! - `file_scanner`: Dart source discovery

pub mod data;
pub mod document;
pub mod file_scanner;
pub mod matcher;
pub mod parsers;
pub mod scanner;
pub mod status;
pub mod store;
pub mod validate;
pub mod watcher;

pub use data::{
    Catalog, Entry, MessageContext, MessageLocation, PatternKind, Placeholder, Position, Range,
    Reference, SourceContext, SourceLocation, Span,
};
pub use document::{EditSink, SourceText, TextDocument};
pub use scanner::{ReferenceScanner, ScanDiagnostic, ScanResult};
pub use status::{KeyStatus, TranslationStatus};
pub use store::{ResourceStore, StoreError};
