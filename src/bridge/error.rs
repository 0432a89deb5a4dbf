//! Error taxonomy for the bridged client.

// All lovingly made without thiserror, matching crate::error's convention.

/// The five kinds of failure a [`crate::bridge::BridgedClient`] operation can produce.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    /// A caller-supplied value failed validation before anything was sent on the wire.
    Validation(String),
    /// The session is not in a state that permits the requested operation.
    Lifecycle(&'static str),
    /// The network rejected the operation with an IRC numeric/command error.
    Protocol(String),
    /// A bounded wait for a correlated server reply elapsed.
    Timeout(String),
    /// The underlying connection reported a fatal, unrecoverable disconnect.
    Fatal(String),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::Validation(msg) => write!(f, "{msg}"),
            BridgeError::Lifecycle(msg) => write!(f, "{msg}"),
            BridgeError::Protocol(msg) => write!(f, "{msg}"),
            BridgeError::Timeout(msg) => write!(f, "{msg}"),
            BridgeError::Fatal(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for BridgeError {}

impl BridgeError {
    /// Builds the "not connected"/"disconnected mid-op" family of lifecycle rejections.
    pub const fn not_connected() -> Self {
        BridgeError::Lifecycle("not connected")
    }
    /// Builds the lifecycle rejection used once a session has been killed.
    pub const fn killed() -> Self {
        BridgeError::Lifecycle("client has been killed")
    }
}
