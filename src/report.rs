//! Bounded text report over all containers.
//!
//! The report is written into a buffer of fixed capacity `C`. Content never
//! exceeds `C - 1` bytes so a terminator always fits. Each section is a label,
//! the values (`" v"` for the first, `", v"` after) and a newline:
//!
//! ```text
//! Linked list: 3, 1, 2
//! ```
//!
//! A value is written only while at least `headroom` bytes are free and only
//! if it fits whole. The first refused value ends its section and marks the
//! report truncated; bytes already written are never touched again.

use std::fmt::{self, Display, Write as _};

use tracing::debug;

use crate::config::Config;

/// A rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    text: String,
    capacity: usize,
    truncated: bool,
}

impl Report {
    /// Report text, terminator excluded.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Content length in bytes, terminator excluded.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Capacity of the buffer the report was written into.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether any value was left out for lack of room.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Content followed by a NUL terminator; never longer than the capacity.
    pub fn to_bytes_with_nul(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.text.len() + 1);
        bytes.extend_from_slice(self.text.as_bytes());
        bytes.push(0);
        bytes
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Writes sections into a bounded buffer.
pub struct Reporter {
    text: String,
    scratch: String,
    capacity: usize,
    limit: usize,
    headroom: usize,
    truncated: bool,
}

impl Reporter {
    /// Create a writer over a buffer of `capacity` bytes.
    pub fn new(capacity: usize, headroom: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            text: String::with_capacity(capacity),
            scratch: String::new(),
            capacity,
            limit: capacity - 1,
            headroom,
            truncated: false,
        }
    }

    /// Create a writer sized by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.report_capacity, config.report_headroom)
    }

    /// Write one labeled section.
    pub fn section<'a, V, I>(&mut self, label: &str, values: I)
    where
        V: Display + 'a,
        I: IntoIterator<Item = &'a V>,
    {
        let start = self.text.len();
        self.push_str(label);

        let mut written = 0usize;
        for value in values {
            if !self.push_field(written == 0, value) {
                self.truncated = true;
                break;
            }
            written += 1;
        }

        debug!(
            section = label,
            values = written,
            offset = self.text.len(),
            "{}",
            &self.text[start..]
        );
        self.push_str("\n");
    }

    /// Finish writing.
    pub fn finish(self) -> Report {
        debug_assert!(self.text.len() < self.capacity);
        Report {
            text: self.text,
            capacity: self.capacity,
            truncated: self.truncated,
        }
    }

    /// Append as much of `s` as fits.
    fn push_str(&mut self, s: &str) {
        let room = self.limit - self.text.len();
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        if take < s.len() {
            self.truncated = true;
        }
        self.text.push_str(&s[..take]);
    }

    /// Append one value with its separator, all or nothing.
    fn push_field(&mut self, first: bool, value: &dyn Display) -> bool {
        if self.limit - self.text.len() < self.headroom {
            return false;
        }

        self.scratch.clear();
        if !first {
            self.scratch.push(',');
        }
        // Writing into a String cannot fail.
        let _ = write!(self.scratch, " {value}");

        if self.text.len() + self.scratch.len() > self.limit {
            return false;
        }
        self.text.push_str(&self.scratch);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_section(capacity: usize, values: &[i32]) -> Report {
        let mut reporter = Reporter::new(capacity, 4);
        reporter.section("Linked list:", values);
        reporter.finish()
    }

    #[test]
    fn test_format() {
        let report = one_section(2048, &[3, 1, 2]);
        assert_eq!(report.as_str(), "Linked list: 3, 1, 2\n");
        assert!(!report.is_truncated());
        assert_eq!(report.capacity(), 2048);
    }

    #[test]
    fn test_empty_section() {
        let mut reporter = Reporter::new(2048, 4);
        reporter.section::<i32, _>("Hash table:", &[]);
        reporter.section("XArray:", &[-7]);
        assert_eq!(reporter.finish().as_str(), "Hash table:\nXArray: -7\n");
    }

    #[test]
    fn test_stops_at_headroom() {
        // Limit is 23 bytes: after ", 3" only 3 bytes remain.
        let report = one_section(24, &[1, 2, 3, 4, 5]);
        assert_eq!(report.as_str(), "Linked list: 1, 2, 3\n");
        assert!(report.is_truncated());

        let report = one_section(16, &[1]);
        assert_eq!(report.as_str(), "Linked list:\n");
        assert!(report.is_truncated());
    }

    #[test]
    fn test_field_must_fit_whole() {
        let report = one_section(20, &[i32::MIN]);
        assert_eq!(report.as_str(), "Linked list:\n");
        assert!(report.is_truncated());
    }

    #[test]
    fn test_label_cut_at_limit() {
        let report = one_section(6, &[1]);
        assert_eq!(report.as_str(), "Linke");
        assert_eq!(report.to_bytes_with_nul(), b"Linke\0".to_vec());
        assert!(report.is_truncated());
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let values: Vec<i32> = (0..1000).map(|i| i32::MIN + i).collect();
        for capacity in [1, 2, 5, 17, 64, 300, 2048] {
            let mut reporter = Reporter::new(capacity, 4);
            for label in ["Linked list:", "Hash table:", "Red-black tree:"] {
                reporter.section(label, &values);
            }
            let report = reporter.finish();
            assert!(report.len() < capacity, "capacity {capacity}");
            assert!(report.to_bytes_with_nul().len() <= capacity);
            assert!(report.is_truncated());
        }
    }
}
