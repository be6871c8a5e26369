//! Output matchers used as assertion oracles by the checks.

use std::fmt;

pub trait OutputMatcher: fmt::Display + Send + Sync {
    fn matches(&self, output: &str) -> bool;
}

/// A Java main class name in a process listing.
///
/// The name must be preceded by a delimiter (start of text, whitespace, `.`,
/// `/`, `:` or `$`) and must not run on into further word characters, so
/// `NameNode` matches `org.apache.hadoop.hdfs.server.namenode.NameNode` but
/// not `...namenode.SecondaryNameNode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessName {
    name: String,
}

impl ProcessName {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | '/' | ':' | '$')
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl OutputMatcher for ProcessName {
    fn matches(&self, output: &str) -> bool {
        output.match_indices(self.name.as_str()).any(|(start, found)| {
            let before = output[..start].chars().next_back();
            let after = output[start + found.len()..].chars().next();
            before.map_or(true, is_delimiter) && !after.is_some_and(is_word)
        })
    }
}

impl fmt::Display for ProcessName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Plain substring match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contains {
    needle: String,
}

impl Contains {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl OutputMatcher for Contains {
    fn matches(&self, output: &str) -> bool {
        output.contains(self.needle.as_str())
    }
}

impl fmt::Display for Contains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.needle)
    }
}
