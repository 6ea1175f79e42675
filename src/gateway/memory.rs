// SPDX-License-Identifier: MIT

use std::cell::{Cell, RefCell};

use crate::{
    core::{error::DockError, types::RawStore},
    gateway::PersistenceGateway,
};

/// In-memory store for tests and dry runs.
///
/// Counts writes and reload requests. A gateway created with [`MemoryGateway::empty`]
/// behaves like a machine without Dock preferences until something is written.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    store: RefCell<Option<RawStore>>,
    writes: Cell<usize>,
    reloads: Cell<usize>,
    fail_reload: bool,
}

impl MemoryGateway {
    pub fn new(store: RawStore) -> Self {
        MemoryGateway {
            store: RefCell::new(Some(store)),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Makes every reload request fail.
    pub fn failing_reload(mut self) -> Self {
        self.fail_reload = true;
        self
    }

    /// The last written (or initial) store.
    pub fn store(&self) -> Option<RawStore> {
        self.store.borrow().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn read(&self) -> Result<RawStore, DockError> {
        self.store
            .borrow()
            .clone()
            .ok_or_else(|| DockError::StoreUnavailable("no preferences stored".into()))
    }

    fn write(&self, store: &RawStore) -> Result<(), DockError> {
        *self.store.borrow_mut() = Some(store.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn notify_consumer_reload(&self) -> Result<(), DockError> {
        self.reloads.set(self.reloads.get() + 1);
        if self.fail_reload {
            return Err(DockError::Reload("reload disabled".into()));
        }
        Ok(())
    }
}
