// SPDX-License-Identifier: MIT

//! Error types for Dock preference management.
//!
//! "Not found" is never an error here: lookups report absence through `Option`,
//! `bool` or a zero count. Every variant below is either a caller mistake or an
//! I/O failure of the backing store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockError {
    #[error("invalid application path: {0:?}")]
    InvalidPath(String),

    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),

    #[error("{0}: invalid spacer type")]
    InvalidSpacerType(String),

    #[error("unknown Dock section: {0}")]
    UnknownSection(String),

    #[error("unknown match attribute: {0}")]
    UnknownMatchAttribute(String),

    #[error("unknown Dock preference: {0}")]
    UnknownPreference(String),

    #[error("invalid value for {key}: {value}")]
    InvalidPreferenceValue { key: String, value: String },

    #[error("{0} is managed by the Dock and cannot be changed")]
    ReadOnlyPreference(String),

    #[error("malformed Dock entry: {0}")]
    MalformedEntry(String),

    #[error("preference store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("failed to write preference store: {0}")]
    StoreWrite(String),

    #[error("failed to reload the Dock: {0}")]
    Reload(String),
}

pub type Result<T> = std::result::Result<T, DockError>;
