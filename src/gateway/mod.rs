// SPDX-License-Identifier: MIT

//! Backing stores for the Dock's preferences.
//!
//! A [`PersistenceGateway`] moves whole [`RawStore`]s in and out of somewhere and
//! knows how to tell the Dock to pick up a new configuration. The document never
//! touches disk or CoreFoundation directly.

#[cfg(target_os = "macos")]
mod cf;
mod file;
mod memory;
mod reload;

#[cfg(target_os = "macos")]
pub use cf::CfPreferencesGateway;
pub use file::PlistFileGateway;
pub use memory::MemoryGateway;
pub use reload::LaunchAgent;

use tracing::warn;

use crate::core::{error::DockError, types::RawStore};

/// Preference domain of the Dock.
pub const DOCK_DOMAIN: &str = "com.apple.dock";

/// Runs `write` with the Dock agent booted out, if there is one.
///
/// When the write fails after the agent was stopped, the agent is bootstrapped again
/// before the error is returned, since no reload request will follow.
pub(crate) fn write_with_dock_stopped(
    reloader: Option<&LaunchAgent>,
    write: impl FnOnce() -> Result<(), DockError>,
) -> Result<(), DockError> {
    let stopped = match reloader {
        Some(agent) => match agent.bootout() {
            Ok(()) => Some(agent),
            Err(e) => {
                warn!("could not stop the Dock before writing: {e}");
                None
            }
        },
        None => None,
    };

    let result = write();
    if let (Err(e), Some(agent)) = (&result, stopped) {
        warn!("write failed, starting the Dock again: {e}");
        if let Err(e) = agent.bootstrap() {
            warn!("could not restart the Dock: {e}");
        }
    }
    result
}

pub trait PersistenceGateway {
    /// Reads the full preference store.
    fn read(&self) -> Result<RawStore, DockError>;

    /// Replaces the full preference store.
    fn write(&self, store: &RawStore) -> Result<(), DockError>;

    /// Asks the Dock to reload its configuration.
    fn notify_consumer_reload(&self) -> Result<(), DockError> {
        Ok(())
    }
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for &G {
    fn read(&self) -> Result<RawStore, DockError> {
        (**self).read()
    }

    fn write(&self, store: &RawStore) -> Result<(), DockError> {
        (**self).write(store)
    }

    fn notify_consumer_reload(&self) -> Result<(), DockError> {
        (**self).notify_consumer_reload()
    }
}
