// SPDX-License-Identifier: MIT

//! Scalar Dock preferences and their legal values.
//!
//! Flags may be persisted as booleans, integers or strings (`defaults write -int 1`
//! and friends). Reading decodes any of those; writing a flag that already holds the
//! requested logical value keeps its persisted form, otherwise a boolean is stored.

use std::{collections::HashMap, str::FromStr};

use crate::core::{error::DockError, types::PrefValue};

pub const MIN_TILE_SIZE: f64 = 16.0;
pub const MAX_TILE_SIZE: f64 = 128.0;

/// Legal values of a scalar key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarDomain {
    Flag,
    Orientation,
    /// Icon size in points, [`MIN_TILE_SIZE`]..=[`MAX_TILE_SIZE`].
    Size,
    MinimizeEffect,
    /// Free-form string.
    Text,
    /// Written by the Dock itself; round-trips but cannot be set.
    ReadOnly,
}

const SCALARS: &[(&str, ScalarDomain)] = &[
    ("autohide", ScalarDomain::Flag),
    ("autohide-immutable", ScalarDomain::Flag),
    ("contents-immutable", ScalarDomain::Flag),
    ("dblclickbehavior", ScalarDomain::Text),
    ("largesize", ScalarDomain::Size),
    ("launchanim", ScalarDomain::Flag),
    ("launchanim-immutable", ScalarDomain::Flag),
    ("magnification", ScalarDomain::Flag),
    ("magnification-immutable", ScalarDomain::Flag),
    ("magsize-immutable", ScalarDomain::Flag),
    ("mineffect", ScalarDomain::MinimizeEffect),
    ("mineffect-immutable", ScalarDomain::Flag),
    ("minimize-to-application", ScalarDomain::Flag),
    ("minimize-to-application-immutable", ScalarDomain::Flag),
    ("orientation", ScalarDomain::Orientation),
    ("orientation-immutable", ScalarDomain::Flag),
    ("position-immutable", ScalarDomain::Flag),
    ("tilesize", ScalarDomain::Size),
    ("show-process-indicators", ScalarDomain::Flag),
    ("show-progress-indicators", ScalarDomain::Flag),
    ("show-recents", ScalarDomain::Flag),
    ("show-recents-immutable", ScalarDomain::Flag),
    ("size-immutable", ScalarDomain::Flag),
    ("windowtabbing", ScalarDomain::Text),
    ("AllowDockFixupOverride", ScalarDomain::Flag),
    ("mod-count", ScalarDomain::ReadOnly),
    ("recent-apps", ScalarDomain::ReadOnly),
    ("trash-full", ScalarDomain::ReadOnly),
];

/// Domain of a known scalar key.
pub fn domain_of(key: &str) -> Option<ScalarDomain> {
    SCALARS.iter().find(|(k, _)| *k == key).map(|(_, d)| *d)
}

pub fn is_read_only(key: &str) -> bool {
    domain_of(key) == Some(ScalarDomain::ReadOnly)
}

/// Known scalar keys, in table order.
pub fn known_keys() -> impl Iterator<Item = &'static str> {
    SCALARS.iter().map(|(k, _)| *k)
}

/// Screen edge the Dock sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Bottom,
    Left,
    Right,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Bottom => "bottom",
            Orientation::Left => "left",
            Orientation::Right => "right",
        }
    }
}

impl FromStr for Orientation {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom" => Ok(Orientation::Bottom),
            "left" => Ok(Orientation::Left),
            "right" => Ok(Orientation::Right),
            other => Err(invalid("orientation", other)),
        }
    }
}

/// Window minimize animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimizeEffect {
    Genie,
    Scale,
    Suck,
}

impl MinimizeEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            MinimizeEffect::Genie => "genie",
            MinimizeEffect::Scale => "scale",
            MinimizeEffect::Suck => "suck",
        }
    }
}

impl FromStr for MinimizeEffect {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genie" => Ok(MinimizeEffect::Genie),
            "scale" => Ok(MinimizeEffect::Scale),
            "suck" => Ok(MinimizeEffect::Suck),
            other => Err(invalid("mineffect", other)),
        }
    }
}

fn invalid(key: &str, value: impl std::fmt::Display) -> DockError {
    DockError::InvalidPreferenceValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Logical value of a persisted flag.
pub fn decode_flag(value: &PrefValue) -> Option<bool> {
    match value {
        PrefValue::Boolean(b) => Some(*b),
        PrefValue::Integer(0) => Some(false),
        PrefValue::Integer(1) => Some(true),
        PrefValue::String(s) => match s.to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Values of the known scalar keys, as persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scalars {
    values: HashMap<String, PrefValue>,
}

impl Scalars {
    /// Stores a loaded value without validation.
    pub(crate) fn insert_loaded(&mut self, key: String, value: PrefValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PrefValue)> {
        self.values.iter()
    }

    /// Validates `value` against the key's domain and stores it.
    pub fn set(&mut self, key: &str, value: PrefValue) -> Result<(), DockError> {
        let domain = domain_of(key).ok_or_else(|| DockError::UnknownPreference(key.to_string()))?;
        let value = match domain {
            ScalarDomain::ReadOnly => return Err(DockError::ReadOnlyPreference(key.to_string())),
            ScalarDomain::Flag => {
                let flag = decode_flag(&value).ok_or_else(|| invalid(key, &value))?;
                return self.set_flag(key, flag);
            }
            ScalarDomain::Orientation => {
                let s = value.as_str().ok_or_else(|| invalid(key, &value))?;
                Orientation::from_str(s)?;
                value
            }
            ScalarDomain::MinimizeEffect => {
                let s = value.as_str().ok_or_else(|| invalid(key, &value))?;
                MinimizeEffect::from_str(s)?;
                value
            }
            ScalarDomain::Size => {
                let size = value.as_f64().ok_or_else(|| invalid(key, &value))?;
                if !(MIN_TILE_SIZE..=MAX_TILE_SIZE).contains(&size) {
                    return Err(invalid(key, size));
                }
                if self.get(key).and_then(PrefValue::as_f64) == Some(size) {
                    return Ok(());
                }
                value
            }
            ScalarDomain::Text => {
                if value.as_str().is_none() {
                    return Err(invalid(key, &value));
                }
                value
            }
        };
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(decode_flag)
    }

    pub fn set_flag(&mut self, key: &str, flag: bool) -> Result<(), DockError> {
        match domain_of(key) {
            Some(ScalarDomain::Flag) => {}
            Some(ScalarDomain::ReadOnly) => {
                return Err(DockError::ReadOnlyPreference(key.to_string()));
            }
            Some(_) => return Err(invalid(key, flag)),
            None => return Err(DockError::UnknownPreference(key.to_string())),
        }
        if self.flag(key) != Some(flag) {
            self.values
                .insert(key.to_string(), PrefValue::Boolean(flag));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_decode_from_sentinel_forms() {
        assert_eq!(decode_flag(&PrefValue::Boolean(true)), Some(true));
        assert_eq!(decode_flag(&PrefValue::Integer(0)), Some(false));
        assert_eq!(decode_flag(&PrefValue::from("YES")), Some(true));
        assert_eq!(decode_flag(&PrefValue::from("no")), Some(false));
        assert_eq!(decode_flag(&PrefValue::Integer(2)), None);
        assert_eq!(decode_flag(&PrefValue::from("maybe")), None);
    }

    #[test]
    fn unchanged_flag_keeps_persisted_form() {
        let mut scalars = Scalars::default();
        scalars.insert_loaded("autohide".into(), PrefValue::Integer(1));

        scalars.set_flag("autohide", true).unwrap();
        assert_eq!(scalars.get("autohide"), Some(&PrefValue::Integer(1)));

        scalars.set_flag("autohide", false).unwrap();
        assert_eq!(scalars.get("autohide"), Some(&PrefValue::Boolean(false)));
        assert_eq!(scalars.flag("autohide"), Some(false));
    }

    #[test]
    fn set_validates_against_domain() {
        let mut scalars = Scalars::default();
        scalars.set("orientation", "left".into()).unwrap();
        scalars.set("tilesize", PrefValue::Integer(64)).unwrap();
        scalars.set("mineffect", "scale".into()).unwrap();
        scalars.set("magnification", "YES".into()).unwrap();
        assert_eq!(scalars.get("magnification"), Some(&PrefValue::Boolean(true)));

        assert!(matches!(
            scalars.set("orientation", "top".into()),
            Err(DockError::InvalidPreferenceValue { .. })
        ));
        assert!(matches!(
            scalars.set("tilesize", PrefValue::Float(512.0)),
            Err(DockError::InvalidPreferenceValue { .. })
        ));
        assert!(matches!(
            scalars.set("tilesize", "big".into()),
            Err(DockError::InvalidPreferenceValue { .. })
        ));
        assert!(matches!(
            scalars.set("autohide", PrefValue::Integer(7)),
            Err(DockError::InvalidPreferenceValue { .. })
        ));
        assert!(matches!(
            scalars.set("mod-count", PrefValue::Integer(3)),
            Err(DockError::ReadOnlyPreference(_))
        ));
        assert!(matches!(
            scalars.set("favourite-colour", "blue".into()),
            Err(DockError::UnknownPreference(_))
        ));
        assert!(matches!(
            scalars.set_flag("orientation", true),
            Err(DockError::InvalidPreferenceValue { .. })
        ));
    }

    #[test]
    fn equal_size_keeps_integer_representation() {
        let mut scalars = Scalars::default();
        scalars.insert_loaded("tilesize".into(), PrefValue::Integer(48));
        scalars.set("tilesize", PrefValue::Float(48.0)).unwrap();
        assert_eq!(scalars.get("tilesize"), Some(&PrefValue::Integer(48)));
    }

    #[test]
    fn read_only_keys_are_known() {
        assert!(is_read_only("recent-apps"));
        assert!(!is_read_only("autohide"));
        assert!(known_keys().any(|k| k == "trash-full"));
    }
}
