//! Control channel between pages and the controller.

use serde::{Deserialize, Serialize};

/// Out-of-band message sent by a page.
///
/// Serialized as `{"type": "GET_VERSION"}` and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate a waiting version without waiting for pages to close.
    SkipWaiting,
    /// Ask for the current version token.
    GetVersion,
    /// Drop the runtime generation. The precache is untouched.
    ClearRuntime,
}

/// Reply posted back to the sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlReply {
    Version { cache: String },
    Cleared { cleared: bool },
}
