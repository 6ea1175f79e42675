// SPDX-License-Identifier: MIT

use tracing::{debug, warn};

use crate::{
    core::{error::DockError, foundation, types::RawStore},
    dock::scalars,
    gateway::{DOCK_DOMAIN, PersistenceGateway, reload::LaunchAgent, write_with_dock_stopped},
};

/// The Dock's domain through CFPreferences (current user, any host).
///
/// Goes through the preferences daemon, so there is no file to lock. Keys the Dock
/// maintains itself are never written back.
#[derive(Debug, Clone)]
pub struct CfPreferencesGateway {
    domain: String,
    reloader: Option<LaunchAgent>,
}

impl CfPreferencesGateway {
    pub fn new(domain: impl Into<String>) -> Self {
        CfPreferencesGateway {
            domain: domain.into(),
            reloader: None,
        }
    }

    pub fn dock() -> Self {
        Self::new(DOCK_DOMAIN).with_reloader(LaunchAgent::dock())
    }

    pub fn with_reloader(mut self, agent: LaunchAgent) -> Self {
        self.reloader = Some(agent);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl PersistenceGateway for CfPreferencesGateway {
    fn read(&self) -> Result<RawStore, DockError> {
        foundation::read_domain(&self.domain)
    }

    fn write(&self, store: &RawStore) -> Result<(), DockError> {
        write_with_dock_stopped(self.reloader.as_ref(), || {
            match foundation::read_domain(&self.domain) {
                Ok(current) => {
                    let stale = stale_keys(&current, store);
                    if !stale.is_empty() {
                        debug!("clearing {} keys from {}", stale.len(), self.domain);
                        foundation::clear_keys(&self.domain, &stale);
                    }
                }
                Err(e) => warn!("not clearing removed keys of {}: {e}", self.domain),
            }
            foundation::write_domain(&self.domain, &writable(store))
        })
    }

    fn notify_consumer_reload(&self) -> Result<(), DockError> {
        match &self.reloader {
            Some(agent) => agent.bootstrap(),
            None => Ok(()),
        }
    }
}

/// Keys present in the domain but no longer in `store`. Read-only keys are left alone.
fn stale_keys<'a>(current: &'a RawStore, store: &RawStore) -> Vec<&'a str> {
    current
        .keys()
        .filter(|k| !store.contains_key(*k) && !scalars::is_read_only(k))
        .map(String::as_str)
        .collect()
}

fn writable(store: &RawStore) -> RawStore {
    store
        .iter()
        .filter(|(k, _)| !scalars::is_read_only(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PrefValue;

    fn store(keys: &[&str]) -> RawStore {
        keys.iter()
            .map(|k| (k.to_string(), PrefValue::Integer(1)))
            .collect()
    }

    #[test]
    fn removed_keys_are_stale_except_read_only_ones() {
        let current = store(&["autohide", "tilesize", "mod-count", "loc"]);
        let mut stale = stale_keys(&current, &store(&["autohide"]));
        stale.sort();
        assert_eq!(stale, vec!["loc", "tilesize"]);
    }

    #[test]
    fn read_only_keys_are_never_written() {
        let out = writable(&store(&["autohide", "mod-count", "trash-full"]));
        assert_eq!(out, store(&["autohide"]));
    }
}
