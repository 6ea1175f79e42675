// SPDX-License-Identifier: MIT

pub mod builder;
pub mod document;
pub mod entry;
pub mod matcher;
pub mod scalars;
pub mod section;

pub use builder::{Arrangement, DisplayAs, EntryBuilder, EntryDefaults, FolderOptions, ShowAs};
pub use document::DockDocument;
pub use entry::{CfUrl, Entry, EntryKind, FolderView, SpacerType, Tile};
pub use matcher::{MatchAttribute, MatchOn, MatchPolicy, Matches};
pub use scalars::{MinimizeEffect, Orientation, ScalarDomain};
pub use section::{Section, SectionKey};
