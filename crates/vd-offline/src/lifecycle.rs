//! Controller lifecycle states and errors.

use std::fmt;

/// Where a controller version is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, install not started.
    Parsed,
    Installing,
    /// Precache complete; waiting to activate.
    Installed,
    Activating,
    /// Handling fetches.
    Activated,
    /// Install failed; this version will never activate.
    Redundant,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Lifecycle transition errors.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: LifecycleState,
    },

    #[error("shell path {path:?} does not resolve against the scope")]
    InvalidShellPath { path: String },

    #[error("failed to precache {url}: {reason}")]
    Precache { url: String, reason: String },
}
