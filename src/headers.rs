//! Ordered header storage where a repeated name turns into a list of values.

use std::fmt;

/// The value(s) stored for one header name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderValue {
    /// Header seen once.
    Single(String),
    /// Header seen several times, in insertion order.
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// The first value, which for a scalar is the only one.
    pub fn as_str(&self) -> &str {
        match self {
            HeaderValue::Single(v) => v,
            // invariant: a list is only created by promoting a scalar, so never empty.
            HeaderValue::Multiple(v) => v.first().map(|s| s.as_str()).unwrap_or(""),
        }
    }

    /// Whether the header was seen more than once.
    pub fn is_multiple(&self) -> bool {
        matches!(self, HeaderValue::Multiple(_))
    }

    /// Iterate all values.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            HeaderValue::Single(v) => std::slice::from_ref(v),
            HeaderValue::Multiple(v) => &v[..],
        };
        slice.iter().map(|s| s.as_str())
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(prev) => {
                let prev = std::mem::take(prev);
                *self = HeaderValue::Multiple(vec![prev, value]);
            }
            HeaderValue::Multiple(v) => v.push(value),
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Single(v) => write!(f, "{}", v),
            HeaderValue::Multiple(v) => write!(f, "{}", v.join(", ")),
        }
    }
}

impl PartialEq<&str> for HeaderValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, HeaderValue::Single(v) if v == other)
    }
}

/// Headers of a request or response.
///
/// Names are compared ignoring ASCII case, but keep the casing of the first insertion.
/// Entries keep insertion order, which is also the order they are written to the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    entries: Vec<(String, HeaderValue)>,
}

impl HeaderCollection {
    /// Empty collection.
    pub fn new() -> Self {
        HeaderCollection::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Add a value. A name already present is promoted to a list and the value appended.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((name, HeaderValue::Single(value))),
        }
        self
    }

    /// Parse and add a single `Name: value` header line.
    ///
    /// The first colon separates name from value, both are trimmed. A line without a
    /// colon (or with nothing before it) is ignored.
    pub fn add_from_line(&mut self, line: &str) -> &mut Self {
        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                self.add(name.trim(), value.trim());
            }
            _ => {
                debug!("Dropping bad header line: {:?}", line);
            }
        }
        self
    }

    /// Parse and add a sequence of header lines.
    pub fn set_from_lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.add_from_line(line.as_ref());
        }
        self
    }

    /// Parse and add a raw header block, lines separated by `\r\n` or `\n`.
    pub fn set_from_block(&mut self, block: &str) -> &mut Self {
        self.set_from_lines(
            block
                .split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .filter(|l| !l.is_empty()),
        )
    }

    /// Replace whatever is stored under `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = HeaderValue::Single(value.into());
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Remove a header and all its values. Absent names are ignored.
    pub fn remove(&mut self, name: &str) -> &mut Self {
        if let Some(idx) = self.position(name) {
            self.entries.remove(idx);
        }
        self
    }

    /// Value(s) stored under `name`.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.position(name).map(|idx| &self.entries[idx].1)
    }

    /// Get the first value of a header.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).map(|v| v.as_str())
    }

    /// Tells if a header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// All entries in insertion order.
    pub fn all(&self) -> &[(String, HeaderValue)] {
        &self.entries
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Tells if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to wire lines (no line terminator). Lists become one line per value.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .flat_map(|(name, value)| value.iter().map(move |v| format_line(name, v)))
    }
}

/// Format a single `Name: value` header line.
pub fn format_line(name: &str, value: &str) -> String {
    format!("{}: {}", name, value)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_once_is_scalar() {
        let mut h = HeaderCollection::new();
        h.add("Accept", "*/*");
        assert_eq!(h.get("Accept"), Some(&HeaderValue::Single("*/*".into())));
    }

    #[test]
    fn add_twice_is_ordered_list() {
        let mut h = HeaderCollection::new();
        h.add("Set-Cookie", "a=1").add("Set-Cookie", "b=2");
        assert_eq!(
            h.get("Set-Cookie"),
            Some(&HeaderValue::Multiple(vec!["a=1".into(), "b=2".into()]))
        );
        h.add("set-cookie", "c=3");
        let all: Vec<_> = h.get("SET-COOKIE").unwrap().iter().collect();
        assert_eq!(all, vec!["a=1", "b=2", "c=3"]);
    }

    #[test]
    fn set_replaces_list() {
        let mut h = HeaderCollection::new();
        h.add("X-Foo", "1").add("X-Foo", "2");
        h.set("x-foo", "3");
        assert_eq!(h.get("X-Foo"), Some(&HeaderValue::Single("3".into())));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn add_from_line() {
        let mut h = HeaderCollection::new();
        h.add_from_line("Content-Type: text/html");
        assert_eq!(h.get_str("Content-Type"), Some("text/html"));

        // first colon separates
        h.add_from_line("Location:   http://example.com:8080/x  ");
        assert_eq!(h.get_str("location"), Some("http://example.com:8080/x"));
    }

    #[test]
    fn line_without_colon_is_ignored() {
        let mut h = HeaderCollection::new();
        h.add_from_line("HTTP/1.1 200 OK");
        h.add_from_line(": no name");
        assert!(h.is_empty());
    }

    #[test]
    fn set_from_block_mixed_endings() {
        let mut h = HeaderCollection::new();
        h.set_from_block("A: 1\r\nB: 2\nA: 3\r\n");
        let names: Vec<_> = h.all().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(h.get("A").unwrap().is_multiple());
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut h = HeaderCollection::new();
        h.add("A", "1");
        h.remove("B").remove("a");
        assert!(h.get("A").is_none());
    }

    #[test]
    fn lines_repeat_list_values() {
        let mut h = HeaderCollection::new();
        h.add("Accept", "*/*").add("X-Tag", "a").add("X-Tag", "b");
        let lines: Vec<_> = h.lines().collect();
        assert_eq!(lines, vec!["Accept: */*", "X-Tag: a", "X-Tag: b"]);
    }
}
