//! The per-user bridged IRC client session.
//!
//! This module builds on [`crate::client`] and [`crate::ircmsg`] (the
//! line-level transport) to implement a single user's virtualized IRC
//! presence: identity assignment, connection and registration, channel
//! membership tracking, nick-change/join/whois/names correlation over
//! IRC's asynchronous line protocol, and idle-based liveness.

mod broker;
mod client;
mod config;
mod connection;
mod error;
mod ident;
mod identity;
mod ipv6;
mod isupport;
mod nick;
mod numerics;
mod room;

pub use broker::{BridgeEvent, EventBroker, LoggingEventBroker, Metadata};
pub use client::{Action, ActionKind, BridgedClient, ClientState};
pub use config::{ClientConfig, MirrorPhase, ServerDescriptor};
pub use connection::ConnectionInstance;
pub use error::BridgeError;
pub use ident::IdentRegistry;
pub use identity::{DefaultIdentityGenerator, IdentityGenerator};
pub use ipv6::{DefaultIpv6Allocator, Ipv6Allocator};
pub use nick::validate as validate_nick;
pub use room::{GetOperatorsOpts, IrcRoom, NamesResult, OperatorsResult, WhoisInfo};
