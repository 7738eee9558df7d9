//! Key Pattern Module
//!
//! Wildcard matching for key scans. `*` matches zero or more characters and is
//! the only special character; the pattern is anchored at both ends.

// == Key Pattern ==
/// A compiled key pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    /// Literal pieces between `*` wildcards
    segments: Vec<String>,
    starts_with_wildcard: bool,
    ends_with_wildcard: bool,
}

impl KeyPattern {
    /// Compiles `pattern`.
    pub fn new(pattern: &str) -> Self {
        Self {
            segments: pattern.split('*').map(str::to_string).collect(),
            starts_with_wildcard: pattern.starts_with('*'),
            ends_with_wildcard: pattern.ends_with('*'),
        }
    }

    /// Returns true if the whole of `key` matches.
    pub fn matches(&self, key: &str) -> bool {
        // No wildcard: exact comparison.
        if self.segments.len() == 1 {
            return key == self.segments[0];
        }

        let first = &self.segments[0];
        let last = &self.segments[self.segments.len() - 1];
        if !key.starts_with(first.as_str()) {
            return false;
        }
        let mut rest = &key[first.len()..];

        // Middle segments are matched leftmost-first, which is optimal for `*`-only globs.
        for segment in &self.segments[1..self.segments.len() - 1] {
            match rest.find(segment.as_str()) {
                Some(pos) => rest = &rest[pos + segment.len()..],
                None => return false,
            }
        }

        rest.ends_with(last.as_str())
    }

    /// True when the pattern is a lone `*`.
    pub fn matches_everything(&self) -> bool {
        self.starts_with_wildcard && self.ends_with_wildcard && self.segments.iter().all(String::is_empty)
    }
}
