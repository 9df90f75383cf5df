//! What the two-button call panel shows for a given session snapshot.

use crate::CallSessionSnapshot;

pub const START_LABEL: &str = "Start Call";
pub const STOP_LABEL: &str = "Stop Call";
pub const READOUT_ACTIVE: &str = "Call in progress...";
/// Shown both before the first call and after any call ends.
pub const READOUT_ENDED: &str = "Call ended";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPanelView {
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub readout: &'static str,
    pub error: Option<String>,
}

impl CallPanelView {
    pub fn from_snapshot(snapshot: &CallSessionSnapshot) -> Self {
        let active = snapshot.status.is_active();
        Self {
            start_enabled: !active && !snapshot.starting,
            stop_enabled: active,
            readout: if active { READOUT_ACTIVE } else { READOUT_ENDED },
            error: snapshot.last_error.clone(),
        }
    }
}

impl Default for CallPanelView {
    fn default() -> Self {
        Self::from_snapshot(&CallSessionSnapshot::default())
    }
}

#[cfg(test)]
#[path = "tests/panel_tests.rs"]
mod tests;
