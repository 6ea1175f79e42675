// SPDX-License-Identifier: MIT

//! This module defines the raw value tree a decoded preference store is made of.
//!
//! [`RawStore`] is the top-level mapping handed between the persistence gateways and
//! [`DockDocument`](crate::DockDocument); every nested value is a [`PrefValue`].

use std::collections::HashMap;

/// Top-level mapping of a decoded preference store.
pub type RawStore = HashMap<String, PrefValue>;

/// Value stored in preferences.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<PrefValue>),
    Dictionary(HashMap<String, PrefValue>),
    Data(Vec<u8>),
    Date(f64), // seconds since the Apple epoch (CFAbsoluteTime)
    Uid(u64),
}

impl Default for PrefValue {
    fn default() -> Self {
        PrefValue::String(String::default())
    }
}

impl std::fmt::Display for PrefValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefValue::Boolean(b) => write!(f, "{}", b),
            PrefValue::Integer(i) => write!(f, "{}", i),
            PrefValue::Float(fl) => write!(f, "{}", fl),
            PrefValue::String(s) => write!(f, "{}", s),
            PrefValue::Array(arr) => {
                write!(
                    f,
                    "[{}]",
                    arr.iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            PrefValue::Dictionary(dict) => {
                let mut pairs: Vec<_> = dict.iter().collect();
                pairs.sort_by(|a, b| a.0.cmp(b.0));
                write!(
                    f,
                    "{{{}}}",
                    pairs
                        .iter()
                        .map(|(k, v)| format!("{}: {}", k, v))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            PrefValue::Data(data) => write!(f, "<Data: {} bytes>", data.len()),
            PrefValue::Date(dt) => write!(f, "<Date: {}>", dt),
            PrefValue::Uid(uid) => write!(f, "<Uid: {}>", uid),
        }
    }
}

impl PrefValue {
    /// Returns the name of the type for the PrefValue instance.
    pub fn get_type(&self) -> &'static str {
        match self {
            PrefValue::String(_) => "string",
            PrefValue::Integer(_) => "integer",
            PrefValue::Float(_) => "float",
            PrefValue::Boolean(_) => "boolean",
            PrefValue::Array(_) => "array",
            PrefValue::Dictionary(_) => "dictionary",
            PrefValue::Data(_) => "data",
            PrefValue::Date(_) => "date",
            PrefValue::Uid(_) => "uid",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PrefValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integers and reals alike.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PrefValue::Integer(i) => Some(*i as f64),
            PrefValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&HashMap<String, PrefValue>> {
        match self {
            PrefValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

impl From<&str> for PrefValue {
    fn from(s: &str) -> Self {
        PrefValue::String(s.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(s: String) -> Self {
        PrefValue::String(s)
    }
}

impl From<bool> for PrefValue {
    fn from(b: bool) -> Self {
        PrefValue::Boolean(b)
    }
}

impl From<i64> for PrefValue {
    fn from(i: i64) -> Self {
        PrefValue::Integer(i)
    }
}

impl From<f64> for PrefValue {
    fn from(f: f64) -> Self {
        PrefValue::Float(f)
    }
}
