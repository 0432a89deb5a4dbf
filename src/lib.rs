//! A per-user bridged IRC client session.
//!
//! This crate implements the connection, registration, and channel-membership
//! state machine used to run one end user's IRC presence on behalf of a
//! chat-federation bridge: nickname validation and collision handling,
//! ident/DNS/TLS connection setup, join/part/kick/nick-change correlation
//! over IRC's asynchronous line protocol, and an idle-based liveness policy.
//!
//! The low-level line protocol (message parsing, string subtypes, connection
//! transport) lives in [`ircmsg`], [`string`], and [`client::conn`]; the
//! bridge-specific orchestration lives in [`bridge`].
#![allow(clippy::borrow_interior_mutable_const)]
#![allow(clippy::mutable_key_type)]
#![deny(clippy::missing_safety_doc)]
#![deny(clippy::redundant_else)]
#![deny(clippy::semicolon_if_nothing_returned)]
#![deny(missing_docs)]
#![deny(rustdoc::bare_urls)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::invalid_rust_codeblocks)]
#![deny(rustdoc::private_intra_doc_links)]
#![cfg_attr(doc_unstable, feature(doc_auto_cfg))]

pub mod bridge;
pub mod client;
pub mod error;
pub mod ircmsg;
pub mod known;
pub mod string;
mod util;
