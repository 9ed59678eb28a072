//! Shell-style glob patterns for archive file names, compiled to regexes.

#![allow(missing_docs)]

use regex::Regex;

use crate::core::errors::{Result, WhError};

/// Compiled file-name glob.
///
/// `*` matches within a name, `?` matches one character, everything else is
/// literal. Matching is against the bare file name, never a full path.
#[derive(Debug, Clone)]
pub struct ArchivePattern {
    original: String,
    compiled: Regex,
}

impl ArchivePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            original: pattern.to_string(),
            compiled: glob_to_regex(pattern)?,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.compiled.is_match(file_name)
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}

/// Validate that a glob pattern can be compiled.
pub fn validate_glob_pattern(pattern: &str) -> Result<()> {
    glob_to_regex(pattern).map(|_| ())
}

fn glob_to_regex(pattern: &str) -> Result<Regex> {
    if pattern.is_empty() {
        return Err(WhError::InvalidConfig {
            details: "archive pattern must not be empty".to_string(),
        });
    }
    if pattern.contains('/') || pattern.contains('\\') {
        return Err(WhError::InvalidConfig {
            details: format!("archive pattern {pattern:?} must match file names, not paths"),
        });
    }

    let mut regex_str = String::with_capacity(pattern.len() * 2);
    regex_str.push('^');
    for c in pattern.chars() {
        match c {
            '*' => regex_str.push_str(".*"),
            '?' => regex_str.push('.'),
            '.' | '+' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '$' | '|' => {
                regex_str.push('\\');
                regex_str.push(c);
            }
            c => regex_str.push(c),
        }
    }
    regex_str.push('$');

    Regex::new(&regex_str).map_err(|err| WhError::InvalidConfig {
        details: format!("invalid glob pattern {pattern:?}: {err}"),
    })
}
