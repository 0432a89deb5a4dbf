//! Static server configuration and the per-connect-attempt client config it seeds.

use std::collections::HashSet;
use std::net::Ipv6Addr;

/// A lifecycle phase membership-mirror policy is evaluated against.
///
/// Only `Initial` is consulted by the idle timer today; the type is kept open so a server
/// descriptor can carry policy for phases the core doesn't yet branch on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum MirrorPhase {
    /// The phase consulted when the idle timer fires.
    Initial,
}

/// Immutable, injected description of one IRC network a bridged session connects to.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerDescriptor {
    /// Network domain name (used for connecting and for log/metadata identification).
    pub domain: String,
    /// Password sent in `PASS`, when the network requires one and the per-connect
    /// `ClientConfig` doesn't supply one of its own.
    pub default_password: Option<String>,
    /// Whether to connect over TLS. Ignored if the `tls-tokio` feature is disabled.
    pub use_tls: bool,
    /// Template for the desired nick, with `{user_id}` and `{display_name}` placeholders.
    pub desired_nick_template: String,
    /// User-mode string applied via `MODE` once registered, for non-bot sessions.
    pub user_mode: Option<String>,
    /// Idle timeout in seconds; `0` disables the idle timer entirely.
    pub idle_timeout_secs: u64,
    /// Message expiry window in seconds; `0` means messages never expire.
    pub message_expiry_secs: u64,
    /// Source address prefix for the IPv6 allocator, as `(network, prefix_len)`.
    pub ipv6_prefix: Option<(Ipv6Addr, u8)>,
    /// Phases for which home-side membership mirrors IRC join/part state.
    pub membership_mirror: HashSet<MirrorPhase>,
    /// Channels the bridge refuses to track (never joined, `JoinChannel` rejects).
    pub excluded_channels: HashSet<String>,
    /// Whether channels outside `hardcoded_room_ids` may be joined dynamically.
    pub allow_dynamic_aliases: bool,
    /// Channel names always considered valid join targets regardless of alias resolution.
    pub hardcoded_room_ids: Vec<String>,
    /// Home-side user-naming pattern, recorded for the surrounding bridge; not evaluated here.
    pub user_regex: Option<String>,
    /// Home-side alias-naming pattern, recorded for the surrounding bridge; not evaluated here.
    pub alias_regex: Option<String>,
}

impl ServerDescriptor {
    /// Renders [`desired_nick_template`][Self::desired_nick_template] for one home identity.
    pub fn render_desired_nick(&self, home_user_id: &str, display_name: Option<&str>) -> String {
        self.desired_nick_template
            .replace("{user_id}", home_user_id)
            .replace("{display_name}", display_name.unwrap_or(home_user_id))
    }

    /// Returns the membership-mirror policy for `phase`.
    pub fn mirrors_membership(&self, phase: MirrorPhase) -> bool {
        self.membership_mirror.contains(&phase)
    }

    /// Returns `true` if `channel` must never be joined.
    pub fn is_excluded_channel(&self, channel: &str) -> bool {
        self.excluded_channels.contains(channel)
    }
}

/// Mutable identity state filled in during `Connect`, before registration.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    /// Nick requested in `NICK`, before any server-side coercion.
    pub desired_nick: String,
    /// Password sent in `PASS`, if any.
    pub password: Option<String>,
    /// Source address allocated by the IPv6 allocator, if the server has a configured prefix.
    pub ipv6_address: Option<Ipv6Addr>,
    /// Username assigned by the identity generator.
    pub username: String,
    /// Realname assigned by the identity generator.
    pub realname: String,
}
