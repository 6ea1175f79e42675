// SPDX-License-Identifier: MIT

//! Typed Dock entries.
//!
//! A persisted entry is a dictionary with a `tile-type` and a `tile-data` sub-dictionary.
//! Decoding pulls out the fields the crate understands (location, label, folder view
//! options) and keeps everything else in two passthrough bags, one for `tile-data` and
//! one for the entry itself, so that encoding reproduces the original dictionary.

use std::{collections::HashMap, path::Path, str::FromStr};

use url::Url;

use crate::core::{error::DockError, types::PrefValue};

type Dict = HashMap<String, PrefValue>;

const TILE_TYPE: &str = "tile-type";
const TILE_DATA: &str = "tile-data";
const FILE_DATA: &str = "file-data";
const FILE_LABEL: &str = "file-label";
const FILE_TYPE: &str = "file-type";
const URL_LABEL: &str = "label";
const URL: &str = "url";
const ARRANGEMENT: &str = "arrangement";
const DISPLAY_AS: &str = "displayas";
const SHOW_AS: &str = "showas";
const CF_URL_STRING: &str = "_CFURLString";
const CF_URL_STRING_TYPE: &str = "_CFURLStringType";

/// `file-type` the Dock assigns to application bundles.
pub(crate) const APPLICATION_FILE_TYPE: i64 = 41;
/// `_CFURLStringType` of an absolute URL string.
pub(crate) const ABSOLUTE_URL_STRING_TYPE: i64 = 15;

/// Coarse category of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Application,
    FileOrFolder,
    Url,
    Spacer,
    /// A tile type this crate does not model (e.g. `recents-tile`); kept verbatim.
    Other,
}

/// Spacer variants understood by the Dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpacerType {
    #[default]
    Regular,
    Small,
    Flexible,
}

impl SpacerType {
    pub const ALL: [SpacerType; 3] = [SpacerType::Regular, SpacerType::Small, SpacerType::Flexible];

    pub fn as_tile_type(&self) -> &'static str {
        match self {
            SpacerType::Regular => "spacer-tile",
            SpacerType::Small => "small-spacer-tile",
            SpacerType::Flexible => "flex-spacer-tile",
        }
    }
}

impl FromStr for SpacerType {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpacerType::ALL
            .into_iter()
            .find(|t| t.as_tile_type() == s)
            .ok_or_else(|| DockError::InvalidSpacerType(s.to_string()))
    }
}

/// A `_CFURLString` reference as stored in `file-data` or `url`.
#[derive(Debug, Clone, PartialEq)]
pub struct CfUrl {
    string: String,
    string_type: Option<i64>,
    extra: Dict,
    bare: bool,
}

impl CfUrl {
    /// File URL for an absolute filesystem path; directories get a trailing slash.
    pub(crate) fn for_file(path: &str, directory: bool) -> Result<Self, DockError> {
        let url = if directory {
            Url::from_directory_path(path)
        } else {
            Url::from_file_path(path)
        }
        .map_err(|_| DockError::InvalidPath(path.to_string()))?;
        Ok(Self::absolute(url.to_string()))
    }

    pub(crate) fn absolute(string: String) -> Self {
        CfUrl {
            string,
            string_type: Some(ABSOLUTE_URL_STRING_TYPE),
            extra: Dict::new(),
            bare: false,
        }
    }

    fn from_value(value: &PrefValue) -> Option<Self> {
        match value {
            PrefValue::String(s) => Some(CfUrl {
                string: s.clone(),
                string_type: None,
                extra: Dict::new(),
                bare: true,
            }),
            PrefValue::Dictionary(d) => {
                let string = d.get(CF_URL_STRING)?.as_str()?.to_string();
                let mut extra = d.clone();
                extra.remove(CF_URL_STRING);
                let string_type = match extra.get(CF_URL_STRING_TYPE) {
                    Some(PrefValue::Integer(t)) => {
                        let t = *t;
                        extra.remove(CF_URL_STRING_TYPE);
                        Some(t)
                    }
                    _ => None,
                };
                Some(CfUrl {
                    string,
                    string_type,
                    extra,
                    bare: false,
                })
            }
            _ => None,
        }
    }

    fn to_value(&self) -> PrefValue {
        if self.bare {
            return PrefValue::String(self.string.clone());
        }
        let mut d = self.extra.clone();
        d.insert(CF_URL_STRING.into(), PrefValue::String(self.string.clone()));
        if let Some(t) = self.string_type {
            d.insert(CF_URL_STRING_TYPE.into(), PrefValue::Integer(t));
        }
        PrefValue::Dictionary(d)
    }

    /// The URL string exactly as persisted.
    pub fn as_str(&self) -> &str {
        &self.string
    }

    /// Percent-decoded filesystem path without a trailing slash.
    ///
    /// Strings that are not `file://` URLs are taken as plain paths.
    pub fn file_path(&self) -> String {
        let decoded = match Url::parse(&self.string) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|_| url.path().to_string()),
            _ => self.string.clone(),
        };
        match decoded.trim_end_matches('/') {
            "" if decoded.starts_with('/') => "/".to_string(),
            trimmed => trimmed.to_string(),
        }
    }
}

/// Folder presentation options of a `directory-tile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FolderView {
    pub arrangement: Option<i64>,
    pub display_as: Option<i64>,
    pub show_as: Option<i64>,
}

/// The modeled part of an entry, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Tile {
    Application {
        file: Option<CfUrl>,
        label: Option<String>,
    },
    FileOrFolder {
        file: Option<CfUrl>,
        label: Option<String>,
        directory: bool,
        view: FolderView,
    },
    Url {
        url: Option<CfUrl>,
        label: Option<String>,
    },
    Spacer(SpacerType),
    Other,
}

/// One Dock item.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    tile: Tile,
    /// Unmodeled `tile-data` fields; `None` when the entry has no `tile-data`.
    tile_data: Option<Dict>,
    /// Unmodeled entry fields (`GUID`, ...). Holds everything for [`Tile::Other`].
    extra: Dict,
}

impl Entry {
    pub(crate) fn new(tile: Tile, tile_data: Dict) -> Self {
        Entry {
            tile,
            tile_data: Some(tile_data),
            extra: Dict::new(),
        }
    }

    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    pub fn kind(&self) -> EntryKind {
        match self.tile {
            Tile::Application { .. } => EntryKind::Application,
            Tile::FileOrFolder { .. } => EntryKind::FileOrFolder,
            Tile::Url { .. } => EntryKind::Url,
            Tile::Spacer(_) => EntryKind::Spacer,
            Tile::Other => EntryKind::Other,
        }
    }

    /// The persisted `tile-type` tag.
    pub fn tile_type(&self) -> Option<&str> {
        match &self.tile {
            Tile::Application { .. } => Some("file-tile"),
            Tile::FileOrFolder { directory, .. } => Some(if *directory {
                "directory-tile"
            } else {
                "file-tile"
            }),
            Tile::Url { .. } => Some("url-tile"),
            Tile::Spacer(t) => Some(t.as_tile_type()),
            Tile::Other => self.extra.get(TILE_TYPE).and_then(PrefValue::as_str),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.tile {
            Tile::Application { label, .. }
            | Tile::FileOrFolder { label, .. }
            | Tile::Url { label, .. } => label.as_deref(),
            Tile::Spacer(_) | Tile::Other => None,
        }
    }

    /// Filesystem path for file tiles, the URL for URL tiles.
    pub fn path(&self) -> Option<String> {
        match &self.tile {
            Tile::Application { file, .. } | Tile::FileOrFolder { file, .. } => {
                file.as_ref().map(CfUrl::file_path)
            }
            Tile::Url { url, .. } => url.as_ref().map(|u| u.as_str().to_string()),
            Tile::Spacer(_) | Tile::Other => None,
        }
    }

    /// The persisted URL reference, if any.
    pub fn url(&self) -> Option<&CfUrl> {
        match &self.tile {
            Tile::Application { file, .. } | Tile::FileOrFolder { file, .. } => file.as_ref(),
            Tile::Url { url, .. } => url.as_ref(),
            Tile::Spacer(_) | Tile::Other => None,
        }
    }

    pub fn arrangement(&self) -> Option<i64> {
        self.folder_view().and_then(|v| v.arrangement)
    }

    pub fn display_as(&self) -> Option<i64> {
        self.folder_view().and_then(|v| v.display_as)
    }

    pub fn show_as(&self) -> Option<i64> {
        self.folder_view().and_then(|v| v.show_as)
    }

    fn folder_view(&self) -> Option<&FolderView> {
        match &self.tile {
            Tile::FileOrFolder { view, .. } => Some(view),
            _ => None,
        }
    }

    /// An unmodeled field, looked up in `tile-data` first, then on the entry itself.
    pub fn passthrough_field(&self, key: &str) -> Option<&PrefValue> {
        self.tile_data
            .as_ref()
            .and_then(|d| d.get(key))
            .or_else(|| self.extra.get(key))
    }

    /// Decodes a persisted entry.
    pub fn from_value(value: PrefValue) -> Result<Self, DockError> {
        let mut extra = match value {
            PrefValue::Dictionary(d) => d,
            other => {
                return Err(DockError::MalformedEntry(format!(
                    "expected a dictionary, found {}",
                    other.get_type()
                )));
            }
        };

        let tile_type = match extra.get(TILE_TYPE).and_then(PrefValue::as_str) {
            Some(t) => t.to_string(),
            None => return Ok(Self::opaque(extra)),
        };
        if let Some(data) = extra.get(TILE_DATA) {
            if !matches!(data, PrefValue::Dictionary(_)) {
                return Ok(Self::opaque(extra));
            }
        }

        let tile_data = match extra.remove(TILE_DATA) {
            Some(PrefValue::Dictionary(d)) => Some(d),
            _ => None,
        };
        let mut data = tile_data.clone().unwrap_or_default();

        let tile = match tile_type.as_str() {
            "file-tile" => {
                let file = take_url(&mut data, FILE_DATA);
                let label = take_string(&mut data, FILE_LABEL);
                let is_app = data.get(FILE_TYPE).and_then(PrefValue::as_integer)
                    == Some(APPLICATION_FILE_TYPE)
                    || file
                        .as_ref()
                        .is_some_and(|f| has_app_suffix(&f.file_path()));
                if is_app {
                    Tile::Application { file, label }
                } else {
                    Tile::FileOrFolder {
                        file,
                        label,
                        directory: false,
                        view: FolderView::default(),
                    }
                }
            }
            "directory-tile" => Tile::FileOrFolder {
                file: take_url(&mut data, FILE_DATA),
                label: take_string(&mut data, FILE_LABEL),
                directory: true,
                view: FolderView {
                    arrangement: take_integer(&mut data, ARRANGEMENT),
                    display_as: take_integer(&mut data, DISPLAY_AS),
                    show_as: take_integer(&mut data, SHOW_AS),
                },
            },
            "url-tile" => Tile::Url {
                url: take_url(&mut data, URL),
                label: take_string(&mut data, URL_LABEL),
            },
            other => match SpacerType::from_str(other) {
                Ok(spacer) => Tile::Spacer(spacer),
                Err(_) => {
                    if let Some(d) = tile_data {
                        extra.insert(TILE_DATA.into(), PrefValue::Dictionary(d));
                    }
                    return Ok(Self::opaque(extra));
                }
            },
        };

        extra.remove(TILE_TYPE);
        Ok(Entry {
            tile,
            tile_data: tile_data.map(|_| data),
            extra,
        })
    }

    fn opaque(extra: Dict) -> Self {
        Entry {
            tile: Tile::Other,
            tile_data: None,
            extra,
        }
    }

    /// Encodes the entry back into its persisted dictionary.
    pub fn to_value(&self) -> PrefValue {
        if matches!(self.tile, Tile::Other) {
            return PrefValue::Dictionary(self.extra.clone());
        }
        let mut entry = self.extra.clone();
        let tile_type = self.tile_type().unwrap_or_default().to_string();

        let mut data = self.tile_data.clone().unwrap_or_default();
        let mut modeled = Dict::new();
        match &self.tile {
            Tile::Application { file, label } => {
                put_url(&mut modeled, FILE_DATA, file);
                put_string(&mut modeled, FILE_LABEL, label);
            }
            Tile::FileOrFolder {
                file, label, view, ..
            } => {
                put_url(&mut modeled, FILE_DATA, file);
                put_string(&mut modeled, FILE_LABEL, label);
                put_integer(&mut modeled, ARRANGEMENT, view.arrangement);
                put_integer(&mut modeled, DISPLAY_AS, view.display_as);
                put_integer(&mut modeled, SHOW_AS, view.show_as);
            }
            Tile::Url { url, label } => {
                put_url(&mut modeled, URL, url);
                put_string(&mut modeled, URL_LABEL, label);
            }
            Tile::Spacer(_) | Tile::Other => {}
        }

        if self.tile_data.is_some() || !modeled.is_empty() {
            data.extend(modeled);
            entry.insert(TILE_DATA.into(), PrefValue::Dictionary(data));
        }
        entry.insert(TILE_TYPE.into(), PrefValue::String(tile_type));
        PrefValue::Dictionary(entry)
    }
}

/// Whether `path` names an application bundle.
pub(crate) fn has_app_suffix(path: &str) -> bool {
    let trimmed = path.trim_end_matches('/');
    Path::new(trimmed)
        .extension()
        .is_some_and(|ext| ext == "app")
        && Path::new(trimmed)
            .file_stem()
            .is_some_and(|stem| !stem.is_empty())
}

fn take_string(data: &mut Dict, key: &str) -> Option<String> {
    match data.get(key) {
        Some(PrefValue::String(_)) => match data.remove(key) {
            Some(PrefValue::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn take_integer(data: &mut Dict, key: &str) -> Option<i64> {
    let value = data.get(key)?.as_integer()?;
    data.remove(key);
    Some(value)
}

fn take_url(data: &mut Dict, key: &str) -> Option<CfUrl> {
    let url = CfUrl::from_value(data.get(key)?)?;
    data.remove(key);
    Some(url)
}

fn put_string(data: &mut Dict, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        data.insert(key.into(), PrefValue::String(v.clone()));
    }
}

fn put_integer(data: &mut Dict, key: &str, value: Option<i64>) {
    if let Some(v) = value {
        data.insert(key.into(), PrefValue::Integer(v));
    }
}

fn put_url(data: &mut Dict, key: &str, value: &Option<CfUrl>) {
    if let Some(v) = value {
        data.insert(key.into(), v.to_value());
    }
}
