// SPDX-License-Identifier: MIT

//! The in-memory Dock configuration.
//!
//! [`DockDocument`] is built from a [`RawStore`] with [`DockDocument::load`], mutated
//! through its lookup/insert/remove/replace operations and turned back into a
//! [`RawStore`] with [`DockDocument::flush`]. Keys it does not model travel through
//! a passthrough bag, so `flush(load(raw)) == raw`.
//!
//! Read-modify-write is not transactional. Two processes editing the Dock at the same
//! time will lose one side's changes; callers must load, mutate and save in a single
//! uninterrupted sequence.

use std::{collections::HashMap, str::FromStr};

use tracing::{debug, info, warn};

use crate::{
    core::{
        error::DockError,
        types::{PrefValue, RawStore},
    },
    dock::{
        entry::{Entry, EntryKind},
        matcher::{self, MatchOn, MatchPolicy, Matches},
        scalars::{self, MinimizeEffect, Orientation, Scalars},
        section::{Section, SectionKey},
    },
    gateway::PersistenceGateway,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DockDocument {
    sections: [Section; 4],
    scalars: Scalars,
    passthrough: HashMap<String, PrefValue>,
    policy: MatchPolicy,
}

impl DockDocument {
    /// Builds a document from a decoded store.
    ///
    /// Missing sections start empty. Fails with [`DockError::MalformedEntry`] when a
    /// section holds something that is not an entry dictionary.
    pub fn load(mut raw: RawStore) -> Result<Self, DockError> {
        let mut doc = DockDocument::default();

        for key in SectionKey::ALL {
            match raw.remove(key.as_str()) {
                Some(PrefValue::Array(items)) => {
                    let entries = items
                        .into_iter()
                        .map(Entry::from_value)
                        .collect::<Result<Vec<_>, _>>()?;
                    debug!("loaded {} entries into {key}", entries.len());
                    doc.sections[key.index()] = Section::loaded(entries);
                }
                Some(other) => {
                    warn!(
                        "{key} holds a {} instead of an array; keeping it untouched",
                        other.get_type()
                    );
                    doc.passthrough.insert(key.as_str().to_string(), other);
                }
                None => {}
            }
        }

        for (key, value) in raw {
            if scalars::domain_of(&key).is_some() {
                doc.scalars.insert_loaded(key, value);
            } else {
                doc.passthrough.insert(key, value);
            }
        }

        Ok(doc)
    }

    /// Reads the store through `gateway` and loads it.
    pub fn load_from(gateway: &impl PersistenceGateway) -> Result<Self, DockError> {
        Self::load(gateway.read()?)
    }

    /// Encodes the document back into a store.
    pub fn flush(&self) -> RawStore {
        let mut out = self.passthrough.clone();
        for (key, value) in self.scalars.iter() {
            out.insert(key.clone(), value.clone());
        }
        for key in SectionKey::ALL {
            let section = &self.sections[key.index()];
            if section.is_persisted() || !section.is_empty() {
                out.insert(
                    key.as_str().to_string(),
                    PrefValue::Array(section.iter().map(Entry::to_value).collect()),
                );
            }
        }
        out
    }

    /// Flushes, writes through `gateway` and asks the Dock to reload.
    ///
    /// A failed reload is logged and otherwise ignored: the data is already written.
    pub fn save_to(&self, gateway: &impl PersistenceGateway) -> Result<(), DockError> {
        gateway.write(&self.flush())?;
        if let Err(e) = gateway.notify_consumer_reload() {
            warn!("preferences saved, but the Dock did not reload: {e}");
        }
        Ok(())
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_match_policy(&mut self, policy: MatchPolicy) {
        self.policy = policy;
    }

    pub fn match_policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn section(&self, section: impl AsRef<str>) -> Result<&Section, DockError> {
        let key = SectionKey::from_str(section.as_ref())?;
        Ok(&self.sections[key.index()])
    }

    fn section_mut(&mut self, section: &str) -> Result<(SectionKey, &mut Section), DockError> {
        let key = SectionKey::from_str(section)?;
        Ok((key, &mut self.sections[key.index()]))
    }

    /// Entries of a section in on-screen order.
    pub fn entries(&self, section: impl AsRef<str>) -> Result<&[Entry], DockError> {
        self.section(section).map(Section::entries)
    }

    /// Index of the first entry matching `query`, or `None`.
    pub fn find_existing_entry(
        &self,
        query: &str,
        section: impl AsRef<str>,
        match_on: MatchOn,
    ) -> Result<Option<usize>, DockError> {
        let section = section.as_ref();
        let entries = self.entries(section)?;
        debug!("searching {section} ({} entries) for {query:?}", entries.len());
        let found = matcher::first_match(entries, query, &self.policy.criteria(match_on));
        if found.is_none() {
            debug!("no match found for {query:?} in {section}");
        }
        Ok(found)
    }

    /// All matching positions in section order.
    ///
    /// An entry is yielded when it matches on any attribute the criteria allow, so the
    /// first item is the leftmost match. That can differ from
    /// [`find_existing_entry`](Self::find_existing_entry), which prefers a match on an
    /// earlier attribute (a label) anywhere in the section over a leftmost match on a
    /// later one (a file name). Use `find_existing_entry` for "the" match.
    pub fn find_all<'a>(
        &'a self,
        query: &'a str,
        section: impl AsRef<str>,
        match_on: MatchOn,
    ) -> Result<Matches<'a>, DockError> {
        let entries = self.entries(section)?;
        Ok(Matches::new(entries, query, self.policy.criteria(match_on)))
    }

    /// Inserts at `position`; returns `false` when the position is past the end.
    pub fn insert_entry(
        &mut self,
        section: impl AsRef<str>,
        position: usize,
        entry: Entry,
    ) -> Result<bool, DockError> {
        let (key, section) = self.section_mut(section.as_ref())?;
        let inserted = section.insert_at(position, entry);
        if inserted {
            info!("inserted Dock entry into {key} at index {position}");
        } else {
            debug!("position {position} is past the end of {key}");
        }
        Ok(inserted)
    }

    pub fn append_entry(&mut self, section: impl AsRef<str>, entry: Entry) -> Result<(), DockError> {
        let (key, section) = self.section_mut(section.as_ref())?;
        section.push(entry);
        info!("appended Dock entry to {key}");
        Ok(())
    }

    /// Removes the first match and returns it.
    pub fn remove_entry(
        &mut self,
        query: &str,
        section: impl AsRef<str>,
        match_on: MatchOn,
    ) -> Result<Option<Entry>, DockError> {
        let section = section.as_ref();
        let Some(index) = self.find_existing_entry(query, section, match_on)? else {
            info!("no Dock entry found to remove for {query:?}");
            return Ok(None);
        };
        let (key, section) = self.section_mut(section)?;
        let removed = section.remove_at(index);
        if removed.is_some() {
            info!("removed Dock entry {query:?} from {key} at index {index}");
        }
        Ok(removed)
    }

    /// Removes matches until none is left; returns how many were removed.
    pub fn remove_all_matching(
        &mut self,
        query: &str,
        section: impl AsRef<str>,
        match_on: MatchOn,
    ) -> Result<usize, DockError> {
        let section = section.as_ref();
        let mut count = 0;
        // positions shift after each removal, so search again every time
        while self.remove_entry(query, section, match_on)?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// Removes the first match from every section.
    pub fn remove_from_all_sections(
        &mut self,
        query: &str,
        match_on: MatchOn,
    ) -> Vec<(SectionKey, Entry)> {
        let mut removed = Vec::new();
        for key in SectionKey::ALL {
            let criteria = self.policy.criteria(match_on);
            let found = matcher::first_match(self.sections[key.index()].entries(), query, &criteria);
            if let Some(index) = found {
                if let Some(entry) = self.sections[key.index()].remove_at(index) {
                    info!("removed Dock entry {query:?} from {key} at index {index}");
                    removed.push((key, entry));
                }
            }
        }
        if removed.is_empty() {
            info!("no Dock entry found to remove for {query:?}");
        }
        removed
    }

    /// Puts `new_entry` in place of the first match; `false` when nothing matched.
    pub fn replace_entry(
        &mut self,
        query: &str,
        new_entry: Entry,
        section: impl AsRef<str>,
        match_on: MatchOn,
    ) -> Result<bool, DockError> {
        let section = section.as_ref();
        let Some(index) = self.find_existing_entry(query, section, match_on)? else {
            info!("no existing Dock entry found to replace for {query:?}");
            return Ok(false);
        };
        let (key, section) = self.section_mut(section)?;
        let replaced = section.replace_at(index, new_entry).is_some();
        if replaced {
            info!("replaced Dock entry {query:?} in {key} at index {index}");
        }
        Ok(replaced)
    }

    /// Index of the URL entry in `persistent-others` whose URL is exactly `url`.
    pub fn find_existing_url(&self, url: &str) -> Option<usize> {
        let found = self.sections[SectionKey::PersistentOthers.index()]
            .iter()
            .position(|e| e.kind() == EntryKind::Url && e.url().is_some_and(|u| u.as_str() == url));
        debug!("URL lookup for {url:?}: {found:?}");
        found
    }

    pub fn remove_url_entry(&mut self, url: &str) -> Option<Entry> {
        let index = self.find_existing_url(url)?;
        let removed = self.sections[SectionKey::PersistentOthers.index()].remove_at(index);
        info!("removed Dock URL entry {url:?} from persistent-others at index {index}");
        removed
    }

    /// Raw value of any known scalar key.
    pub fn scalar(&self, key: &str) -> Option<&PrefValue> {
        self.scalars.get(key)
    }

    pub fn set_scalar(&mut self, key: &str, value: PrefValue) -> Result<(), DockError> {
        self.scalars.set(key, value)
    }

    /// Logical value of a flag key such as `show-recents`.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.scalars.flag(key)
    }

    pub fn set_flag(&mut self, key: &str, value: bool) -> Result<(), DockError> {
        self.scalars.set_flag(key, value)
    }

    /// A top-level key the document does not model.
    pub fn passthrough(&self, key: &str) -> Option<&PrefValue> {
        self.passthrough.get(key)
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.scalar("orientation")
            .and_then(PrefValue::as_str)
            .and_then(|s| s.parse().ok())
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), DockError> {
        self.set_scalar("orientation", orientation.as_str().into())
    }

    pub fn autohide(&self) -> Option<bool> {
        self.flag("autohide")
    }

    pub fn set_autohide(&mut self, value: bool) -> Result<(), DockError> {
        self.set_flag("autohide", value)
    }

    pub fn magnification(&self) -> Option<bool> {
        self.flag("magnification")
    }

    pub fn set_magnification(&mut self, value: bool) -> Result<(), DockError> {
        self.set_flag("magnification", value)
    }

    pub fn show_recents(&self) -> Option<bool> {
        self.flag("show-recents")
    }

    pub fn set_show_recents(&mut self, value: bool) -> Result<(), DockError> {
        self.set_flag("show-recents", value)
    }

    pub fn tile_size(&self) -> Option<f64> {
        self.scalar("tilesize").and_then(PrefValue::as_f64)
    }

    pub fn set_tile_size(&mut self, size: f64) -> Result<(), DockError> {
        self.set_scalar("tilesize", PrefValue::Float(size))
    }

    /// Icon size while magnified.
    pub fn large_size(&self) -> Option<f64> {
        self.scalar("largesize").and_then(PrefValue::as_f64)
    }

    pub fn set_large_size(&mut self, size: f64) -> Result<(), DockError> {
        self.set_scalar("largesize", PrefValue::Float(size))
    }

    pub fn minimize_effect(&self) -> Option<MinimizeEffect> {
        self.scalar("mineffect")
            .and_then(PrefValue::as_str)
            .and_then(|s| s.parse().ok())
    }

    pub fn set_minimize_effect(&mut self, effect: MinimizeEffect) -> Result<(), DockError> {
        self.set_scalar("mineffect", effect.as_str().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::{
        builder::EntryBuilder,
        entry::tests::{chess_tile, dict, support_folder_tile},
        matcher::MatchAttribute,
    };

    fn finder() -> Entry {
        Entry::from_value(dict(vec![
            ("tile-type", "file-tile".into()),
            (
                "tile-data",
                dict(vec![
                    ("file-label", "Finder".into()),
                    ("file-type", PrefValue::Integer(41)),
                ]),
            ),
        ]))
        .unwrap()
    }

    fn mail() -> Entry {
        EntryBuilder::default()
            .application("/Applications/Mail.app", None)
            .unwrap()
    }

    fn document() -> DockDocument {
        let mut doc = DockDocument::default();
        doc.append_entry("persistent-apps", finder()).unwrap();
        doc.append_entry("persistent-apps", mail()).unwrap();
        doc
    }

    fn raw_store() -> RawStore {
        let mut raw = RawStore::new();
        raw.insert(
            "persistent-apps".into(),
            PrefValue::Array(vec![chess_tile()]),
        );
        raw.insert(
            "persistent-others".into(),
            PrefValue::Array(vec![support_folder_tile()]),
        );
        raw.insert("autohide".into(), PrefValue::Integer(1));
        raw.insert("tilesize".into(), PrefValue::Float(48.0));
        raw.insert("orientation".into(), "left".into());
        raw.insert("mod-count".into(), PrefValue::Integer(42));
        raw.insert("loc".into(), "en_US".into());
        raw.insert("some-future-key".into(), PrefValue::Data(vec![1, 2, 3]));
        raw
    }

    #[test]
    fn flush_of_load_is_identity() {
        let raw = raw_store();
        let doc = DockDocument::load(raw.clone()).unwrap();
        assert_eq!(doc.flush(), raw);
    }

    #[test]
    fn missing_sections_load_empty_and_stay_absent() {
        let doc = DockDocument::load(RawStore::new()).unwrap();
        for key in SectionKey::ALL {
            assert!(doc.entries(key).unwrap().is_empty());
        }
        assert!(doc.flush().is_empty());
    }

    #[test]
    fn passthrough_keys_are_preserved() {
        let doc = DockDocument::load(raw_store()).unwrap();
        assert_eq!(doc.passthrough("loc"), Some(&PrefValue::from("en_US")));
        assert_eq!(doc.scalar("mod-count"), Some(&PrefValue::Integer(42)));
    }

    #[test]
    fn non_array_section_is_kept_verbatim() {
        let mut raw = RawStore::new();
        raw.insert("static-apps".into(), "oops".into());
        let doc = DockDocument::load(raw.clone()).unwrap();
        assert!(doc.entries(SectionKey::StaticApps).unwrap().is_empty());
        assert_eq!(doc.flush(), raw);
    }

    #[test]
    fn malformed_entry_fails_load() {
        let mut raw = RawStore::new();
        raw.insert(
            "persistent-apps".into(),
            PrefValue::Array(vec![PrefValue::Integer(3)]),
        );
        assert!(matches!(
            DockDocument::load(raw),
            Err(DockError::MalformedEntry(_))
        ));
    }

    #[test]
    fn finds_unlabelled_app_by_name_without_extension() {
        let doc = document();
        assert_eq!(
            doc.find_existing_entry("Mail", "persistent-apps", MatchOn::Any)
                .unwrap(),
            Some(1)
        );
        assert_eq!(
            doc.find_existing_entry("Finder", SectionKey::PersistentApps, MatchOn::Any)
                .unwrap(),
            Some(0)
        );
    }

    #[test]
    fn replace_keeps_position() {
        let mut doc = document();
        let calendar = EntryBuilder::default()
            .application("/System/Applications/Calendar.app", Some("Calendar"))
            .unwrap();
        assert!(doc
            .replace_entry("Mail", calendar.clone(), "persistent-apps", MatchOn::Any)
            .unwrap());
        let entries = doc.entries("persistent-apps").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], finder());
        assert_eq!(entries[1], calendar);
    }

    #[test]
    fn replace_without_match_changes_nothing() {
        let mut doc = document();
        let before = doc.clone();
        assert!(!doc
            .replace_entry("Safari", mail(), "persistent-apps", MatchOn::Any)
            .unwrap());
        assert_eq!(doc, before);
    }

    #[test]
    fn removing_a_missing_entry_is_not_an_error() {
        let mut doc = document();
        let before = doc.clone();
        assert!(doc
            .remove_entry("Calendar", "persistent-apps", MatchOn::Any)
            .unwrap()
            .is_none());
        assert_eq!(doc, before);
    }

    #[test]
    fn remove_returns_the_removed_entry() {
        let mut doc = document();
        let removed = doc
            .remove_entry("/Applications/Mail.app", "persistent-apps", MatchAttribute::Path.into())
            .unwrap();
        assert_eq!(removed, Some(mail()));
        assert_eq!(doc.entries("persistent-apps").unwrap(), &[finder()]);
    }

    #[test]
    fn unknown_section_is_a_caller_error() {
        let mut doc = document();
        assert!(matches!(
            doc.find_existing_entry("Mail", "persistent-aps", MatchOn::Any),
            Err(DockError::UnknownSection(_))
        ));
        assert!(matches!(
            doc.remove_all_matching("Mail", "trash", MatchOn::Any),
            Err(DockError::UnknownSection(_))
        ));
        assert!(matches!(
            doc.append_entry("recent-apps", mail()),
            Err(DockError::UnknownSection(_))
        ));
    }

    #[test]
    fn remove_all_handles_adjacent_duplicates_and_is_idempotent() {
        let mut doc = document();
        doc.insert_entry("persistent-apps", 0, mail()).unwrap();
        doc.insert_entry("persistent-apps", 1, mail()).unwrap();
        doc.append_entry("persistent-apps", mail()).unwrap();

        assert_eq!(
            doc.remove_all_matching("Mail", "persistent-apps", MatchOn::Any)
                .unwrap(),
            4
        );
        assert_eq!(doc.entries("persistent-apps").unwrap(), &[finder()]);
        assert_eq!(
            doc.remove_all_matching("Mail", "persistent-apps", MatchOn::Any)
                .unwrap(),
            0
        );
    }

    #[test]
    fn remove_all_never_removes_spacers() {
        let mut doc = document();
        let builder = EntryBuilder::default();
        doc.insert_entry("persistent-apps", 1, builder.spacer("spacer-tile").unwrap())
            .unwrap();
        doc.append_entry("persistent-apps", builder.spacer("spacer-tile").unwrap())
            .unwrap();

        for query in ["spacer-tile", "Finder", "Mail"] {
            doc.remove_all_matching(query, "persistent-apps", MatchOn::Any)
                .unwrap();
        }
        let left = doc.entries("persistent-apps").unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|e| e.kind() == EntryKind::Spacer));
    }

    #[test]
    fn insert_past_end_is_soft() {
        let mut doc = document();
        assert!(!doc.insert_entry("persistent-apps", 9, mail()).unwrap());
        assert_eq!(doc.entries("persistent-apps").unwrap().len(), 2);
    }

    #[test]
    fn find_all_lists_matches_in_order() {
        let mut doc = document();
        doc.append_entry("persistent-apps", mail()).unwrap();
        let matches: Vec<_> = doc
            .find_all("Mail", "persistent-apps", MatchOn::Any)
            .unwrap()
            .collect();
        assert_eq!(matches, vec![1, 2]);
        assert_eq!(
            doc.find_all("Nope", "persistent-apps", MatchOn::Any)
                .unwrap()
                .next(),
            None
        );
    }

    #[test]
    fn remove_from_all_sections_takes_one_per_section() {
        let mut doc = DockDocument::load(raw_store()).unwrap();
        let support = EntryBuilder::default()
            .application("/Applications/Application Support.app", None)
            .unwrap();
        doc.append_entry("persistent-apps", support).unwrap();

        let removed = doc.remove_from_all_sections("Application Support", MatchOn::Any);
        let keys: Vec<_> = removed.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![SectionKey::PersistentApps, SectionKey::PersistentOthers]);
        assert!(doc.entries("persistent-others").unwrap().is_empty());
    }

    #[test]
    fn url_lookup_and_removal() {
        let mut doc = document();
        let builder = EntryBuilder::default();
        doc.append_entry("persistent-others", builder.url("https://www.github.com/", Some("GitHub")).unwrap())
            .unwrap();

        assert_eq!(doc.find_existing_url("https://www.github.com/"), Some(0));
        assert_eq!(doc.find_existing_url("https://www.example.com/"), None);
        assert!(doc.remove_url_entry("https://www.github.com/").is_some());
        assert!(doc.remove_url_entry("https://www.github.com/").is_none());
    }

    #[test]
    fn scalar_accessors_translate_and_validate() {
        let mut doc = DockDocument::load(raw_store()).unwrap();
        assert_eq!(doc.autohide(), Some(true));
        assert_eq!(doc.orientation(), Some(Orientation::Left));
        assert_eq!(doc.tile_size(), Some(48.0));
        assert_eq!(doc.magnification(), None);

        doc.set_autohide(true).unwrap();
        assert_eq!(doc.flush().get("autohide"), Some(&PrefValue::Integer(1)));
        doc.set_autohide(false).unwrap();
        assert_eq!(doc.flush().get("autohide"), Some(&PrefValue::Boolean(false)));

        doc.set_orientation(Orientation::Bottom).unwrap();
        doc.set_magnification(true).unwrap();
        doc.set_large_size(96.0).unwrap();
        doc.set_minimize_effect(MinimizeEffect::Scale).unwrap();
        assert_eq!(doc.orientation(), Some(Orientation::Bottom));
        assert_eq!(doc.large_size(), Some(96.0));
        assert_eq!(doc.minimize_effect(), Some(MinimizeEffect::Scale));

        assert!(matches!(
            doc.set_tile_size(4.0),
            Err(DockError::InvalidPreferenceValue { .. })
        ));
        assert!(matches!(
            doc.set_scalar("orientation", "top".into()),
            Err(DockError::InvalidPreferenceValue { .. })
        ));
        assert_eq!(doc.tile_size(), Some(48.0));
    }

    #[test]
    fn custom_match_policy_is_used_for_any() {
        let doc = document().with_match_policy(MatchPolicy::new(vec![MatchAttribute::Path]));
        assert_eq!(
            doc.find_existing_entry("Mail", "persistent-apps", MatchOn::Any)
                .unwrap(),
            None
        );
        assert_eq!(
            doc.find_existing_entry("Mail", "persistent-apps", MatchAttribute::NameWithoutExtension.into())
                .unwrap(),
            Some(1)
        );
    }

    #[test]
    fn find_all_is_positional_while_find_existing_prefers_labels() {
        let mut doc = document();
        let relabelled = EntryBuilder::default()
            .application("/Applications/Mail Beta.app", Some("Mail"))
            .unwrap();
        doc.append_entry("persistent-apps", relabelled).unwrap();

        let first_positional = doc
            .find_all("Mail", "persistent-apps", MatchOn::Any)
            .unwrap()
            .next();
        assert_eq!(first_positional, Some(1));
        assert_eq!(
            doc.find_existing_entry("Mail", "persistent-apps", MatchOn::Any)
                .unwrap(),
            Some(2)
        );
    }
}
