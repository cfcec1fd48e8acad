//! File parsers.
//!
//! - `arb`: ARB resource files (parse, serialize, locale inference, directory scan)

pub mod arb;
