// SPDX-License-Identifier: MIT

//! Construction of new Dock entries from minimal input.
//!
//! Defaults for optional folder options come from an explicit [`EntryDefaults`]
//! record rather than module constants.

use std::{collections::HashMap, path::Path, str::FromStr};

use crate::{
    core::{error::DockError, types::PrefValue},
    dock::entry::{
        APPLICATION_FILE_TYPE, CfUrl, Entry, FolderView, SpacerType, Tile, has_app_suffix,
    },
};

/// Sort order of a folder's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    Name = 1,
    DateAdded = 2,
    DateModified = 3,
    DateCreated = 4,
    Kind = 5,
}

/// How a folder tile looks in the Dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayAs {
    Stack = 0,
    Folder = 1,
}

/// How a folder's contents open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowAs {
    Automatic = 0,
    Fan = 1,
    Grid = 2,
    List = 3,
}

impl FromStr for Arrangement {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Arrangement::Name),
            "date-added" => Ok(Arrangement::DateAdded),
            "date-modified" => Ok(Arrangement::DateModified),
            "date-created" => Ok(Arrangement::DateCreated),
            "kind" => Ok(Arrangement::Kind),
            other => Err(invalid_option("arrangement", other)),
        }
    }
}

impl FromStr for DisplayAs {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stack" => Ok(DisplayAs::Stack),
            "folder" => Ok(DisplayAs::Folder),
            other => Err(invalid_option("displayas", other)),
        }
    }
}

impl FromStr for ShowAs {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" | "automatic" => Ok(ShowAs::Automatic),
            "fan" => Ok(ShowAs::Fan),
            "grid" => Ok(ShowAs::Grid),
            "list" => Ok(ShowAs::List),
            other => Err(invalid_option("showas", other)),
        }
    }
}

fn invalid_option(key: &str, value: &str) -> DockError {
    DockError::InvalidPreferenceValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Defaults applied when a folder entry is built without explicit options.
///
/// | field | default |
/// |---|---|
/// | `arrangement` | [`Arrangement::Name`] |
/// | `downloads_arrangement` | [`Arrangement::DateAdded`], used for folders named `Downloads` |
/// | `display_as` | [`DisplayAs::Folder`] |
/// | `show_as` | [`ShowAs::Automatic`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryDefaults {
    pub arrangement: Arrangement,
    pub downloads_arrangement: Arrangement,
    pub display_as: DisplayAs,
    pub show_as: ShowAs,
}

impl Default for EntryDefaults {
    fn default() -> Self {
        EntryDefaults {
            arrangement: Arrangement::Name,
            downloads_arrangement: Arrangement::DateAdded,
            display_as: DisplayAs::Folder,
            show_as: ShowAs::Automatic,
        }
    }
}

/// Optional inputs of [`EntryBuilder::file_or_folder`].
#[derive(Debug, Clone, Default)]
pub struct FolderOptions {
    pub arrangement: Option<Arrangement>,
    pub display_as: Option<DisplayAs>,
    pub show_as: Option<ShowAs>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EntryBuilder {
    defaults: EntryDefaults,
}

impl EntryBuilder {
    pub fn new(defaults: EntryDefaults) -> Self {
        EntryBuilder { defaults }
    }

    pub fn defaults(&self) -> &EntryDefaults {
        &self.defaults
    }

    /// Application entry for the bundle at `path`.
    ///
    /// The path is not checked on disk; it only has to be absolute and end in `.app`.
    /// Without a label the Dock derives the display name itself.
    pub fn application(&self, path: &str, label: Option<&str>) -> Result<Entry, DockError> {
        if !has_app_suffix(path) {
            return Err(DockError::InvalidPath(path.to_string()));
        }
        let file = CfUrl::for_file(path.trim_end_matches('/'), true)?;

        let mut data = HashMap::new();
        data.insert(
            "file-type".to_string(),
            PrefValue::Integer(APPLICATION_FILE_TYPE),
        );
        Ok(Entry::new(
            Tile::Application {
                file: Some(file),
                label: label.map(str::to_string),
            },
            data,
        ))
    }

    /// File or folder entry.
    ///
    /// Paths naming an existing regular file become `file-tile` entries; anything else
    /// is treated as a folder and gets the presentation options.
    pub fn file_or_folder(&self, path: &str, options: FolderOptions) -> Result<Entry, DockError> {
        if path.is_empty() {
            return Err(DockError::InvalidPath(path.to_string()));
        }
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        let directory = !Path::new(trimmed).is_file();
        let file = CfUrl::for_file(trimmed, directory)?;

        let name = Path::new(trimmed)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = options.label.or_else(|| Some(name.clone()));

        let mut data = HashMap::new();
        data.insert("dock-extra".to_string(), PrefValue::Boolean(false));

        let view = if directory {
            let fallback = if name == "Downloads" {
                self.defaults.downloads_arrangement
            } else {
                self.defaults.arrangement
            };
            FolderView {
                arrangement: Some(options.arrangement.unwrap_or(fallback) as i64),
                display_as: Some(options.display_as.unwrap_or(self.defaults.display_as) as i64),
                show_as: Some(options.show_as.unwrap_or(self.defaults.show_as) as i64),
            }
        } else {
            FolderView::default()
        };

        Ok(Entry::new(
            Tile::FileOrFolder {
                file: Some(file),
                label,
                directory,
                view,
            },
            data,
        ))
    }

    /// URL entry. The scheme is not validated; without a label the URL is shown.
    pub fn url(&self, url: &str, label: Option<&str>) -> Result<Entry, DockError> {
        if url.is_empty() {
            return Err(DockError::InvalidUrl(url.to_string()));
        }
        Ok(Entry::new(
            Tile::Url {
                url: Some(CfUrl::absolute(url.to_string())),
                label: Some(label.unwrap_or(url).to_string()),
            },
            HashMap::new(),
        ))
    }

    /// Spacer entry from its tile type name (`spacer-tile`, `small-spacer-tile`,
    /// `flex-spacer-tile`).
    pub fn spacer(&self, tile_type: &str) -> Result<Entry, DockError> {
        SpacerType::from_str(tile_type).map(|t| self.spacer_of(t))
    }

    pub fn spacer_of(&self, spacer: SpacerType) -> Entry {
        Entry::new(Tile::Spacer(spacer), HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::entry::EntryKind;

    fn tile_data(entry: &Entry) -> HashMap<String, PrefValue> {
        match entry.to_value() {
            PrefValue::Dictionary(mut d) => match d.remove("tile-data") {
                Some(PrefValue::Dictionary(data)) => data,
                other => panic!("unexpected tile-data {other:?}"),
            },
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn application_entry_leaves_label_unset() {
        let entry = EntryBuilder::default()
            .application("/Applications/Mail.app", None)
            .unwrap();
        assert_eq!(entry.kind(), EntryKind::Application);
        assert_eq!(entry.label(), None);
        assert_eq!(entry.path().as_deref(), Some("/Applications/Mail.app"));

        let data = tile_data(&entry);
        assert!(!data.contains_key("file-label"));
        assert_eq!(data.get("file-type"), Some(&PrefValue::Integer(41)));
        let file_data = data.get("file-data").and_then(PrefValue::as_dictionary).unwrap();
        assert_eq!(
            file_data.get("_CFURLString"),
            Some(&PrefValue::from("file:///Applications/Mail.app/"))
        );
        assert_eq!(file_data.get("_CFURLStringType"), Some(&PrefValue::Integer(15)));
    }

    #[test]
    fn application_entry_percent_encodes_path() {
        let entry = EntryBuilder::default()
            .application("/Applications/Microsoft Word.app", Some("Word"))
            .unwrap();
        assert_eq!(entry.label(), Some("Word"));
        assert_eq!(
            entry.url().map(|u| u.as_str()),
            Some("file:///Applications/Microsoft%20Word.app/")
        );
        assert_eq!(
            entry.path().as_deref(),
            Some("/Applications/Microsoft Word.app")
        );
    }

    #[test]
    fn application_entry_rejects_non_bundles() {
        let builder = EntryBuilder::default();
        for bad in ["", "/Applications/Mail", "/Applications/.app", "Mail.app"] {
            assert!(
                matches!(builder.application(bad, None), Err(DockError::InvalidPath(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn folder_entry_uses_defaults() {
        let entry = EntryBuilder::default()
            .file_or_folder("/Users/Shared/Projects", FolderOptions::default())
            .unwrap();
        assert_eq!(entry.tile_type(), Some("directory-tile"));
        assert_eq!(entry.label(), Some("Projects"));
        assert_eq!(entry.arrangement(), Some(Arrangement::Name as i64));
        assert_eq!(entry.display_as(), Some(DisplayAs::Folder as i64));
        assert_eq!(entry.show_as(), Some(ShowAs::Automatic as i64));
        assert_eq!(
            tile_data(&entry).get("dock-extra"),
            Some(&PrefValue::Boolean(false))
        );
    }

    #[test]
    fn downloads_folder_sorts_by_date_added() {
        let entry = EntryBuilder::default()
            .file_or_folder("/Users/test/Downloads", FolderOptions::default())
            .unwrap();
        assert_eq!(entry.arrangement(), Some(Arrangement::DateAdded as i64));
    }

    #[test]
    fn explicit_folder_options_win() {
        let entry = EntryBuilder::default()
            .file_or_folder(
                "/Users/test/Downloads",
                FolderOptions {
                    arrangement: Some(Arrangement::Kind),
                    display_as: Some(DisplayAs::Stack),
                    show_as: Some(ShowAs::Grid),
                    label: Some("Stuff".into()),
                },
            )
            .unwrap();
        assert_eq!(entry.arrangement(), Some(5));
        assert_eq!(entry.display_as(), Some(0));
        assert_eq!(entry.show_as(), Some(2));
        assert_eq!(entry.label(), Some("Stuff"));
    }

    #[test]
    fn configured_defaults_are_applied() {
        let builder = EntryBuilder::new(EntryDefaults {
            arrangement: Arrangement::DateModified,
            show_as: ShowAs::List,
            ..EntryDefaults::default()
        });
        let entry = builder
            .file_or_folder("/Users/test/Documents", FolderOptions::default())
            .unwrap();
        assert_eq!(entry.arrangement(), Some(3));
        assert_eq!(entry.show_as(), Some(3));
    }

    #[test]
    fn existing_file_becomes_file_tile() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let entry = EntryBuilder::default()
            .file_or_folder(&path, FolderOptions::default())
            .unwrap();
        assert_eq!(entry.tile_type(), Some("file-tile"));
        assert_eq!(entry.kind(), EntryKind::FileOrFolder);
        assert_eq!(entry.arrangement(), None);
        assert_eq!(entry.path(), Some(path));
    }

    #[test]
    fn relative_folder_paths_are_rejected() {
        assert!(matches!(
            EntryBuilder::default().file_or_folder("Documents", FolderOptions::default()),
            Err(DockError::InvalidPath(_))
        ));
    }

    #[test]
    fn url_entry_defaults_label_to_url() {
        let builder = EntryBuilder::default();
        let entry = builder.url("https://www.apple.com/", None).unwrap();
        assert_eq!(entry.tile_type(), Some("url-tile"));
        assert_eq!(entry.label(), Some("https://www.apple.com/"));

        let entry = builder.url("not a url at all", Some("Odd")).unwrap();
        assert_eq!(entry.label(), Some("Odd"));
        assert_eq!(entry.path().as_deref(), Some("not a url at all"));

        assert!(matches!(builder.url("", None), Err(DockError::InvalidUrl(_))));
    }

    #[test]
    fn spacer_types() {
        let builder = EntryBuilder::default();
        for name in ["spacer-tile", "small-spacer-tile", "flex-spacer-tile"] {
            let entry = builder.spacer(name).unwrap();
            assert_eq!(entry.kind(), EntryKind::Spacer);
            assert_eq!(entry.tile_type(), Some(name));
            assert!(tile_data(&entry).is_empty());
        }
        assert!(matches!(
            builder.spacer("big-spacer-tile"),
            Err(DockError::InvalidSpacerType(_))
        ));
    }

    #[test]
    fn folder_options_parse_from_names() {
        assert_eq!("date-added".parse::<Arrangement>().unwrap(), Arrangement::DateAdded);
        assert_eq!("stack".parse::<DisplayAs>().unwrap(), DisplayAs::Stack);
        assert_eq!("grid".parse::<ShowAs>().unwrap(), ShowAs::Grid);
        assert!(matches!(
            "sideways".parse::<ShowAs>(),
            Err(DockError::InvalidPreferenceValue { .. })
        ));
    }
}
