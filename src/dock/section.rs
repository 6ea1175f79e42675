// SPDX-License-Identifier: MIT

//! Ordered sections of the Dock.

use std::str::FromStr;

use crate::{core::error::DockError, dock::entry::Entry};

/// Array-valued keys of the Dock domain that hold entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKey {
    /// Applications placed by the user.
    PersistentApps,
    /// Files, folders and URLs right of the divider.
    PersistentOthers,
    /// Applications placed by a management profile.
    StaticApps,
    /// Other items placed by a management profile.
    StaticOthers,
}

impl SectionKey {
    pub const ALL: [SectionKey; 4] = [
        SectionKey::PersistentApps,
        SectionKey::PersistentOthers,
        SectionKey::StaticApps,
        SectionKey::StaticOthers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::PersistentApps => "persistent-apps",
            SectionKey::PersistentOthers => "persistent-others",
            SectionKey::StaticApps => "static-apps",
            SectionKey::StaticOthers => "static-others",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for SectionKey {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DockError::UnknownSection(s.to_string()))
    }
}

impl AsRef<str> for SectionKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for SectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entries of one section in on-screen order.
///
/// Out-of-range positions are reported through the return value, never as errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    entries: Vec<Entry>,
    /// Whether the key existed in the loaded store.
    persisted: bool,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn loaded(entries: Vec<Entry>) -> Self {
        Section {
            entries,
            persisted: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Entry> {
        self.entries.get(position)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Inserts before `position`, shifting later entries right.
    /// Returns `false` and drops `entry` when `position > len`.
    pub fn insert_at(&mut self, position: usize, entry: Entry) -> bool {
        if position > self.entries.len() {
            return false;
        }
        self.entries.insert(position, entry);
        true
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Removes the entry at `position`, shifting later entries left.
    pub fn remove_at(&mut self, position: usize) -> Option<Entry> {
        (position < self.entries.len()).then(|| self.entries.remove(position))
    }

    /// Swaps in `entry` at `position`, returning the previous one.
    pub fn replace_at(&mut self, position: usize, entry: Entry) -> Option<Entry> {
        let slot = self.entries.get_mut(position)?;
        Some(std::mem::replace(slot, entry))
    }

    pub(crate) fn is_persisted(&self) -> bool {
        self.persisted
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::builder::EntryBuilder;

    fn app(name: &str) -> Entry {
        EntryBuilder::default()
            .application(&format!("/Applications/{name}.app"), Some(name))
            .unwrap()
    }

    fn labels(section: &Section) -> Vec<&str> {
        section.iter().filter_map(Entry::label).collect()
    }

    #[test]
    fn insert_front_and_append_keep_relative_order() {
        let mut section = Section::new();
        section.push(app("A"));
        section.push(app("B"));

        assert!(section.insert_at(0, app("Front")));
        section.push(app("Back"));
        assert_eq!(labels(&section), vec!["Front", "A", "B", "Back"]);

        assert!(section.insert_at(section.len(), app("End")));
        assert_eq!(labels(&section).last(), Some(&"End"));
    }

    #[test]
    fn out_of_range_positions_are_soft_failures() {
        let mut section = Section::new();
        section.push(app("A"));

        assert!(!section.insert_at(5, app("Far")));
        assert!(section.remove_at(1).is_none());
        assert!(section.replace_at(3, app("X")).is_none());
        assert_eq!(labels(&section), vec!["A"]);
    }

    #[test]
    fn remove_and_replace_shift_correctly() {
        let mut section = Section::new();
        for name in ["A", "B", "C"] {
            section.push(app(name));
        }
        let removed = section.remove_at(1).unwrap();
        assert_eq!(removed.label(), Some("B"));
        assert_eq!(labels(&section), vec!["A", "C"]);

        let old = section.replace_at(0, app("Z")).unwrap();
        assert_eq!(old.label(), Some("A"));
        assert_eq!(labels(&section), vec!["Z", "C"]);
    }

    #[test]
    fn section_keys_parse() {
        assert_eq!(
            "persistent-others".parse::<SectionKey>().unwrap(),
            SectionKey::PersistentOthers
        );
        assert!(matches!(
            "recent-apps".parse::<SectionKey>(),
            Err(DockError::UnknownSection(_))
        ));
    }
}
