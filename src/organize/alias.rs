//! Package tokens and the alias table that maps them to canonical names.

#![allow(missing_docs)]

use std::collections::BTreeMap;

/// Package token of an archive file name: everything before the first `-`.
///
/// A name without a hyphen yields the whole name.
pub fn package_token(file_name: &str) -> &str {
    file_name
        .split_once('-')
        .map_or(file_name, |(token, _)| token)
}

/// Mapping from filename-safe package tokens to their canonical names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Canonical name for `token`, or `token` itself when no alias exists.
    pub fn canonical_name<'a>(&'a self, token: &'a str) -> &'a str {
        self.aliases.get(token).map_or(token, String::as_str)
    }

    /// Canonical package name for an archive file name.
    pub fn package_name<'a>(&'a self, file_name: &'a str) -> &'a str {
        self.canonical_name(package_token(file_name))
    }

    /// File name with the first occurrence of an aliased token replaced.
    ///
    /// Later occurrences are left alone so version or tag segments that happen
    /// to contain the token survive untouched.
    pub fn resolve_filename(&self, file_name: &str) -> String {
        let token = package_token(file_name);
        match self.aliases.get(token) {
            Some(canonical) => file_name.replacen(token, canonical, 1),
            None => file_name.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
