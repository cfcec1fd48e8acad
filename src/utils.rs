//! Common utility functions shared across the codebase.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Build an index of line start byte offsets for O(log n) line lookups.
///
/// The returned vector contains byte offsets where each line starts.
/// Line 1 starts at offset 0, line 2 starts after the first '\n', etc.
pub fn build_line_index(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, c) in content.char_indices() {
        if c == '\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// Find line number for a byte offset using binary search.
///
/// Returns 1-based line number.
///
/// # Examples
///
/// ```
/// use arbsync::utils::{build_line_index, offset_to_line};
///
/// let index = build_line_index("a\nbc\nd");
/// assert_eq!(offset_to_line(&index, 0), 1);
/// assert_eq!(offset_to_line(&index, 3), 2);
/// assert_eq!(offset_to_line(&index, 5), 3);
/// ```
pub fn offset_to_line(line_index: &[usize], offset: usize) -> usize {
    match line_index.binary_search(&offset) {
        Ok(line) => line + 1,
        Err(line) => line,
    }
}

/// Pick the singular or plural form of a noun for summary lines.
pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

#[cfg(test)]
mod tests {
    use crate::utils::*;

    #[test]
    fn test_build_line_index() {
        assert_eq!(build_line_index(""), vec![0]);
        assert_eq!(build_line_index("abc"), vec![0]);
        assert_eq!(build_line_index("a\nb\n"), vec![0, 2, 4]);
    }

    #[test]
    fn test_offset_to_line_multibyte() {
        // "你好" is 6 bytes; the second line starts at byte 7.
        let content = "你好\nworld";
        let index = build_line_index(content);
        assert_eq!(offset_to_line(&index, 3), 1);
        assert_eq!(offset_to_line(&index, 7), 2);
        assert_eq!(offset_to_line(&index, 10), 2);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "file", "files"), "file");
        assert_eq!(pluralize(0, "file", "files"), "files");
        assert_eq!(pluralize(3, "key", "keys"), "keys");
    }
}
