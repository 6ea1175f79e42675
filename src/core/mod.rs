// SPDX-License-Identifier: MIT

pub(crate) mod convert;
pub mod error;
#[cfg(target_os = "macos")]
pub(crate) mod foundation;
pub mod types;
