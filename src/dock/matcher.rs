// SPDX-License-Identifier: MIT

//! Entry matching.
//!
//! A query matches an entry on an attribute when the attribute is non-empty on the
//! entry and equal to the query (exact, case-sensitive). With [`MatchOn::Any`] the
//! attributes are tried in [`MatchPolicy`] order: label, path, file name with
//! extension, file name without extension.

use std::{borrow::Cow, ffi::OsStr, path::Path, str::FromStr};

use crate::{
    core::error::DockError,
    dock::entry::{Entry, EntryKind},
};

/// Attribute of an entry a query can be compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchAttribute {
    /// `file-label` (or `label` for URL tiles), e.g. `Safari`.
    Label,
    /// Path on disk, e.g. `/System/Applications/Safari.app`; the URL for URL tiles.
    Path,
    /// Last path component, e.g. `Safari.app`.
    NameWithExtension,
    /// Last path component without its extension, e.g. `Safari`.
    NameWithoutExtension,
}

impl MatchAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchAttribute::Label => "label",
            MatchAttribute::Path => "path",
            MatchAttribute::NameWithExtension => "name_ext",
            MatchAttribute::NameWithoutExtension => "name_noext",
        }
    }

    /// The attribute's value on `entry`; `None` when it does not apply or is empty.
    pub fn value_of<'a>(&self, entry: &'a Entry) -> Option<Cow<'a, str>> {
        let value = match self {
            MatchAttribute::Label => entry.label().map(Cow::Borrowed),
            MatchAttribute::Path => entry.path().map(Cow::Owned),
            MatchAttribute::NameWithExtension => file_name(entry, Path::file_name),
            MatchAttribute::NameWithoutExtension => file_name(entry, Path::file_stem),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// File name attributes only exist for filesystem entries.
fn file_name(
    entry: &Entry,
    component: fn(&Path) -> Option<&OsStr>,
) -> Option<Cow<'static, str>> {
    if !matches!(entry.kind(), EntryKind::Application | EntryKind::FileOrFolder) {
        return None;
    }
    let path = entry.path()?;
    component(Path::new(&path)).map(|c| Cow::Owned(c.to_string_lossy().into_owned()))
}

impl FromStr for MatchAttribute {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(MatchAttribute::Label),
            "path" => Ok(MatchAttribute::Path),
            "name_ext" => Ok(MatchAttribute::NameWithExtension),
            "name_noext" => Ok(MatchAttribute::NameWithoutExtension),
            other => Err(DockError::UnknownMatchAttribute(other.to_string())),
        }
    }
}

impl std::fmt::Display for MatchAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which attributes a lookup compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchOn {
    /// Every attribute, in policy order.
    #[default]
    Any,
    Only(MatchAttribute),
}

impl FromStr for MatchOn {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(MatchOn::Any),
            other => other.parse().map(MatchOn::Only),
        }
    }
}

impl From<MatchAttribute> for MatchOn {
    fn from(attr: MatchAttribute) -> Self {
        MatchOn::Only(attr)
    }
}

/// Precedence of attributes for [`MatchOn::Any`]. Labels come first by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPolicy {
    order: Vec<MatchAttribute>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy {
            order: vec![
                MatchAttribute::Label,
                MatchAttribute::Path,
                MatchAttribute::NameWithExtension,
                MatchAttribute::NameWithoutExtension,
            ],
        }
    }
}

impl MatchPolicy {
    pub fn new(order: Vec<MatchAttribute>) -> Self {
        MatchPolicy { order }
    }

    pub fn order(&self) -> &[MatchAttribute] {
        &self.order
    }

    pub fn criteria(&self, match_on: MatchOn) -> Criteria<'_> {
        match match_on {
            MatchOn::Any => Criteria::Policy(&self.order),
            MatchOn::Only(attr) => Criteria::Single(attr),
        }
    }
}

/// The attribute list a lookup walks through.
#[derive(Debug, Clone, Copy)]
pub enum Criteria<'a> {
    Policy(&'a [MatchAttribute]),
    Single(MatchAttribute),
}

impl Criteria<'_> {
    pub fn as_slice(&self) -> &[MatchAttribute] {
        match self {
            Criteria::Policy(order) => order,
            Criteria::Single(attr) => std::slice::from_ref(attr),
        }
    }
}

/// Attribute on which `query` matches `entry`, trying `criteria` in order.
pub fn matching_attribute(entry: &Entry, query: &str, criteria: &Criteria<'_>) -> Option<MatchAttribute> {
    criteria
        .as_slice()
        .iter()
        .copied()
        .find(|attr| attr.value_of(entry).is_some_and(|v| v == query))
}

pub fn matches(entry: &Entry, query: &str, match_on: MatchOn, policy: &MatchPolicy) -> bool {
    matching_attribute(entry, query, &policy.criteria(match_on)).is_some()
}

/// Index of the first match, scanning the whole list once per attribute.
///
/// An entry matching on an earlier attribute wins over an entry earlier in the list
/// that only matches on a later attribute.
pub fn first_match(entries: &[Entry], query: &str, criteria: &Criteria<'_>) -> Option<usize> {
    for attr in criteria.as_slice() {
        tracing::debug!("searching using match criterion: {attr}");
        let found = entries
            .iter()
            .position(|e| attr.value_of(e).is_some_and(|v| v == query));
        if let Some(index) = found {
            tracing::debug!("found match at index {index} using {attr} criterion");
            return Some(index);
        }
    }
    None
}

/// Lazy iterator over matching positions, in list order. Clone it to restart.
///
/// Its first item is the leftmost entry matching on any criterion, not necessarily
/// what [`first_match`] returns.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    entries: &'a [Entry],
    query: &'a str,
    criteria: Criteria<'a>,
    next: usize,
}

impl<'a> Matches<'a> {
    pub fn new(entries: &'a [Entry], query: &'a str, criteria: Criteria<'a>) -> Self {
        Matches {
            entries,
            query,
            criteria,
            next: 0,
        }
    }
}

impl Iterator for Matches<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.next < self.entries.len() {
            let index = self.next;
            self.next += 1;
            if matching_attribute(&self.entries[index], self.query, &self.criteria).is_some() {
                return Some(index);
            }
        }
        None
    }
}
