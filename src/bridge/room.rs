//! Result types returned by the bridged client's channel and lookup operations.

use std::collections::HashMap;
use std::time::Instant;

/// A channel the session is (or was momentarily) joined to, as returned by `JoinChannel`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IrcRoom {
    /// The domain name of the network the channel lives on.
    pub server: String,
    /// The channel name, including its sigil.
    pub channel: String,
}

impl IrcRoom {
    /// Builds a room descriptor.
    pub fn new(server: impl Into<String>, channel: impl Into<String>) -> Self {
        Self { server: server.into(), channel: channel.into() }
    }
}

/// Reply to a `Whois` lookup.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WhoisInfo {
    /// The domain name of the network queried.
    pub server: String,
    /// The nick that was queried.
    pub nick: String,
    /// Human-readable summary (user@host, realname, channels, idle seconds).
    pub msg: String,
}

/// Reply to `GetNicks`: the current membership of a channel.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NamesResult {
    /// The domain name of the network queried.
    pub server: String,
    /// The channel queried.
    pub channel: String,
    /// Every nick currently in the channel, per the `NAMES` reply.
    pub nicks: Vec<String>,
    /// Maps each nick to its prefix string (e.g. `"@"`, `"+"`, or empty).
    pub names: HashMap<String, String>,
}

/// Reply to `GetOperators`: channel membership plus the subset holding operator power.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OperatorsResult {
    /// The underlying membership snapshot.
    pub names: NamesResult,
    /// Nicks whose prefix is `@` or ranks stronger per the network's PREFIX table.
    pub operator_nicks: Vec<String>,
}

/// Options accepted by `GetOperators`.
#[derive(Clone, Debug, Default)]
pub struct GetOperatorsOpts {
    /// Channel key to use if a join is required to answer the query.
    pub key: Option<String>,
    /// When set, a prior result for the same channel younger than this many milliseconds is
    /// returned without re-querying the network.
    pub cache_duration_ms: Option<u64>,
}

/// A cached `GetOperators` result, tagged with when it was captured.
#[derive(Clone, Debug)]
pub(super) struct CachedOperators {
    pub(super) result: OperatorsResult,
    pub(super) captured_at: Instant,
}

impl CachedOperators {
    pub(super) fn is_fresh(&self, now: Instant, duration_ms: u64) -> bool {
        now.saturating_duration_since(self.captured_at).as_millis() < duration_ms as u128
    }
}
