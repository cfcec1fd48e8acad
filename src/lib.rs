//! arbsync - Flutter ARB localization engine
//!
//! arbsync is a CLI tool and library for Flutter projects that keep their
//! translations in ARB files. It loads the catalogs, finds key references in
//! Dart sources, reports keys that are missing or only partly translated, and
//! edits the ARB files in place.
//!
//! ## Module Structure
//!
//! - `cache`: Time-bounded cache with prefix invalidation
//! - `cli`: Command-line interface layer
//! - `config`: `.arbsyncrc.json` loading
//! - `core`: Catalogs, reference scanning, resource store and validation
//! - `engine`: Wires the store, scanner, caches and event bus together
//! - `events`: Change notification bus
//! - `issues`: Issue type definitions and reporting
//! - `project`: Flutter project and `l10n.yaml` detection
//! - `utils`: Shared utility functions

pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod events;
pub mod issues;
pub mod project;
pub mod utils;
