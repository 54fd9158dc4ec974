//! Device-state query consulted by special expansions.

use serde::{Deserialize, Serialize};

/// Read-only view of the device under test.
///
/// Only one question is asked during resolution: whether the device runs in
/// headless-system-user mode. The answer must stay fixed while a run is
/// being planned.
pub trait DeviceState {
    fn is_headless_system_user_mode(&self) -> bool;
}

/// Fixed device description, usually loaded from a suite file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticDeviceState {
    pub headless_system_user_mode: bool,
}

impl StaticDeviceState {
    pub fn headless() -> Self {
        Self {
            headless_system_user_mode: true,
        }
    }
}

impl DeviceState for StaticDeviceState {
    fn is_headless_system_user_mode(&self) -> bool {
        self.headless_system_user_mode
    }
}
