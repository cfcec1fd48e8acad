/// Where an ARB entry sits in its file.
///
/// ARB entries are located by the line of their `"key":` member, and the
/// column is 1 for entries found that way. The `@key` metadata object never gets a location of its own; its problems
/// are reported on the entry it describes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MessageLocation {
    /// Path of the `.arb` file, e.g. `./lib/l10n/app_en.arb`.
    pub file_path: String,
    /// 1-based; line 1 when the key could not be found in the raw text.
    pub line: usize,
    pub col: usize,
}

impl MessageLocation {
    pub fn new(file_path: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            col,
        }
    }

    /// Entry start at column 1.
    pub fn with_line(file_path: impl Into<String>, line: usize) -> Self {
        Self::new(file_path, line, 1)
    }
}

/// An ARB entry together with its location: the message key and the value
/// of that key in this file's locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    pub location: MessageLocation,
    /// ARB key, which is also the getter name on the generated class.
    pub key: String,
    /// ICU message text, e.g. `Hello {name}`.
    pub value: String,
}

impl MessageContext {
    pub fn new(
        location: MessageLocation,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            location,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn file_path(&self) -> &str {
        &self.location.file_path
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn col(&self) -> usize {
        self.location.col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_location_starts_at_column_one() {
        let loc = MessageLocation::with_line("./lib/l10n/app_de.arb", 7);
        assert_eq!(loc, MessageLocation::new("./lib/l10n/app_de.arb", 7, 1));
    }

    #[test]
    fn test_message_context_accessors() {
        let ctx = MessageContext::new(
            MessageLocation::new("./lib/l10n/app_en.arb", 3, 1),
            "greet",
            "Hello {name}",
        );
        assert_eq!(ctx.file_path(), "./lib/l10n/app_en.arb");
        assert_eq!((ctx.line(), ctx.col()), (3, 1));
        assert_eq!(ctx.key, "greet");
        assert_eq!(ctx.value, "Hello {name}");
    }
}
