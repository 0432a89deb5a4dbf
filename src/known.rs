//! Well-known values for IRC messages.
//!
//! These constants exist to sidestep needing to use `from_unchecked` all over the place
//! for a large subset of possible messages.

/// Commands.
pub mod cmd;
