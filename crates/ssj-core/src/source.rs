//! On-demand fetch and line-index of source text retrieved from the target.

use std::collections::HashMap;

/// One cached, immutable source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    file_name: String,
    raw_text: String,
    /// Byte offset of each line's first character, 0-indexed by line number.
    line_offsets: Vec<usize>,
}

impl SourceEntry {
    /// Build an entry from raw text, scanning for line-feed bytes once.
    /// CRLF pairs index to the LF position, matching the source's own line
    /// splitting.
    #[must_use]
    pub fn new(file_name: String, raw_text: String) -> Self {
        let mut line_offsets = vec![0];
        for (i, byte) in raw_text.bytes().enumerate() {
            if byte == b'\n' {
                line_offsets.push(i + 1);
            }
        }
        Self {
            file_name,
            raw_text,
            line_offsets,
        }
    }

    /// The file name this entry was fetched for.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The 1-based source line `n`, stripped of its trailing newline.
    /// Out-of-range returns an empty string.
    #[must_use]
    pub fn line(&self, n: usize) -> &str {
        if n == 0 || n > self.line_offsets.len() {
            return "";
        }
        let start = self.line_offsets[n - 1];
        let end = self
            .line_offsets
            .get(n)
            .copied()
            .unwrap_or(self.raw_text.len());
        self.raw_text[start..end].trim_end_matches(['\n', '\r'])
    }

    /// Total number of lines in this entry.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }
}

/// Cache of source files fetched from the target, keyed by file name.
///
/// Entries are immutable once inserted; eviction is unnecessary since the
/// total source set is bounded by the target's own file count.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<String, SourceEntry>,
}

impl SourceCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached entry. Returns `None` on miss; the caller is
    /// responsible for issuing a `GetSource` request and calling
    /// [`SourceCache::insert`] with the result.
    #[must_use]
    pub fn get(&self, file_name: &str) -> Option<&SourceEntry> {
        self.entries.get(file_name)
    }

    /// Insert a freshly-fetched source file, building its line index.
    pub fn insert(&mut self, file_name: String, raw_text: String) -> &SourceEntry {
        let entry = SourceEntry::new(file_name.clone(), raw_text);
        self.entries.entry(file_name).or_insert(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_lf_lines() {
        let entry = SourceEntry::new("main.js".into(), "one\ntwo\nthree".into());
        assert_eq!(entry.line(1), "one");
        assert_eq!(entry.line(2), "two");
        assert_eq!(entry.line(3), "three");
        assert_eq!(entry.line(4), "");
        assert_eq!(entry.line_count(), 3);
    }

    #[test]
    fn crlf_indexes_to_lf_position() {
        let entry = SourceEntry::new("main.js".into(), "one\r\ntwo\r\n".into());
        assert_eq!(entry.line(1), "one");
        assert_eq!(entry.line(2), "two");
    }

    #[test]
    fn cache_miss_then_insert_then_hit() {
        let mut cache = SourceCache::new();
        assert!(cache.get("main.js").is_none());
        cache.insert("main.js".into(), "console.log(1);\n".into());
        assert_eq!(cache.get("main.js").unwrap().line(1), "console.log(1);");
    }
}
