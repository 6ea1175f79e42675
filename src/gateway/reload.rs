// SPDX-License-Identifier: MIT

//! Restarting the Dock through `launchctl`.
//!
//! The Dock caches its configuration. After new preferences are written, the agent is
//! booted out of the user's GUI domain and bootstrapped again from its property list.

use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use tracing::{debug, info};

use crate::core::error::DockError;

const LAUNCHCTL: &str = "/bin/launchctl";
const DOCK_AGENT_LABEL: &str = "com.apple.Dock.agent";
const DOCK_AGENT_PLIST: &str = "/System/Library/LaunchAgents/com.apple.Dock.plist";

/// Messages `launchctl bootout` prints for a service that is not loaded.
const NOT_LOADED: [&str; 2] = ["No such process", "Could not find service"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchAgent {
    launchctl: PathBuf,
    domain_target: String,
    label: String,
    plist: PathBuf,
}

impl LaunchAgent {
    /// The Dock's agent in the current user's GUI domain.
    pub fn dock() -> Self {
        // safety: getuid has no preconditions and cannot fail
        let uid = unsafe { libc::getuid() };
        LaunchAgent {
            launchctl: PathBuf::from(LAUNCHCTL),
            domain_target: format!("gui/{uid}"),
            label: DOCK_AGENT_LABEL.to_string(),
            plist: PathBuf::from(DOCK_AGENT_PLIST),
        }
    }

    pub fn new(domain_target: impl Into<String>, label: impl Into<String>, plist: impl Into<PathBuf>) -> Self {
        LaunchAgent {
            launchctl: PathBuf::from(LAUNCHCTL),
            domain_target: domain_target.into(),
            label: label.into(),
            plist: plist.into(),
        }
    }

    /// Uses another program in place of `/bin/launchctl`.
    pub fn with_launchctl(mut self, program: impl Into<PathBuf>) -> Self {
        self.launchctl = program.into();
        self
    }

    /// `gui/<uid>/<label>`.
    pub fn service_target(&self) -> String {
        format!("{}/{}", self.domain_target, self.label)
    }

    pub fn plist(&self) -> &Path {
        &self.plist
    }

    fn run(&self, args: &[&str]) -> Result<Output, DockError> {
        debug!("executing {} {}", self.launchctl.display(), args.join(" "));
        Command::new(&self.launchctl)
            .args(args)
            .output()
            .map_err(|e| DockError::Reload(format!("{}: {e}", self.launchctl.display())))
    }

    /// Unloads the agent. An agent that is not loaded counts as success.
    pub fn bootout(&self) -> Result<(), DockError> {
        let target = self.service_target();
        let output = self.run(&["bootout", &target])?;
        if output.status.success() {
            info!("booted out {target}");
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if NOT_LOADED.iter().any(|m| stderr.contains(m)) {
            info!("{target} was not loaded");
            return Ok(());
        }
        Err(DockError::Reload(format!(
            "bootout {target}: {}",
            stderr.trim()
        )))
    }

    /// Loads the agent from its property list.
    pub fn bootstrap(&self) -> Result<(), DockError> {
        if !self.plist.exists() {
            return Err(DockError::Reload(format!(
                "{}: no such LaunchAgent",
                self.plist.display()
            )));
        }
        let plist = self.plist.to_string_lossy();
        let output = self.run(&["bootstrap", &self.domain_target, &plist])?;
        if output.status.success() {
            info!("bootstrapped {plist}");
            return Ok(());
        }
        Err(DockError::Reload(format!(
            "bootstrap {plist}: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }

    pub fn is_loaded(&self) -> Result<bool, DockError> {
        let target = self.service_target();
        Ok(self.run(&["print", &target])?.status.success())
    }

    /// Bootout followed by bootstrap.
    pub fn reload(&self) -> Result<(), DockError> {
        self.bootout()?;
        self.bootstrap()
    }
}
