// SPDX-License-Identifier: MIT

//! Library API for dockprefs: load, edit and save the macOS Dock configuration.
//!
//! ```no_run
//! use dockprefs::{DockDocument, EntryBuilder, MatchOn, PlistFileGateway};
//!
//! # fn main() -> dockprefs::Result<()> {
//! let gateway = PlistFileGateway::dock()?;
//! let mut dock = DockDocument::load_from(&gateway)?;
//! let calendar = EntryBuilder::default().application("/System/Applications/Calendar.app", None)?;
//! if dock.find_existing_entry("Calendar", "persistent-apps", MatchOn::Any)?.is_none() {
//!     dock.append_entry("persistent-apps", calendar)?;
//! }
//! dock.save_to(&gateway)?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
mod core;
pub mod dock;
pub mod gateway;
pub mod prettifier;

pub use crate::core::{
    error::{DockError, Result},
    types::{PrefValue, RawStore},
};
pub use dock::{
    Arrangement, DisplayAs, DockDocument, Entry, EntryBuilder, EntryDefaults, EntryKind,
    FolderOptions, MatchAttribute, MatchOn, MatchPolicy, MinimizeEffect, Orientation, SectionKey,
    ShowAs, SpacerType,
};
#[cfg(target_os = "macos")]
pub use gateway::CfPreferencesGateway;
pub use gateway::{LaunchAgent, MemoryGateway, PersistenceGateway, PlistFileGateway};
