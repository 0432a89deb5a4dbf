//! Mapping between RFC 2812 (and common extension) numeric replies and the
//! lowercase `err_*` identifiers the component design (§4) matches against.
//!
//! Numeric assignments for the handful of non-RFC2812 extension replies
//! (`err_banonchan`, `err_nicktoofast`, `err_eventnickchange`,
//! `err_needreggednick`, `err_nononreg`) are not standardized across IRC
//! daemons; the values below follow common ircd/Unreal/Bahamut conventions.

use crate::ircmsg::Numeric;

macro_rules! numeric_table {
    ($($numeric:literal => $name:ident),+ $(,)?) => {
        /// Returns the lowercase error identifier for a numeric reply, if known.
        pub fn error_name(num: Numeric) -> Option<&'static str> {
            match num.as_str() {
                $($numeric => Some(stringify!($name)),)+
                _ => None,
            }
        }
        $(
            #[allow(missing_docs, dead_code)]
            pub const $name: &str = $numeric;
        )+
    };
}

numeric_table! {
    "401" => err_nosuchnick,
    "403" => err_nosuchchannel,
    "405" => err_toomanychannels,
    "431" => err_nonicknamegiven,
    "432" => err_erroneusnickname,
    "433" => err_nicknameinuse,
    "435" => err_banonchan,
    "436" => err_nickcollision,
    "437" => err_unavailresource,
    "438" => err_nicktoofast,
    "439" => err_eventnickchange,
    "471" => err_channelisfull,
    "473" => err_inviteonlychan,
    "474" => err_bannedfromchan,
    "475" => err_badchannelkey,
    "477" => err_needreggednick,
    "486" => err_nononreg,
}

/// Error codes that must be delivered to the event broker with the force-notice flag set,
/// per §4.5's Connect contract.
pub const FORCE_NOTICE_CODES: &[&str] = &[err_needreggednick, err_nononreg];

/// Error codes `ChangeNick` treats as terminal protocol failures.
pub const NICK_CHANGE_ERROR_CODES: &[&str] = &[
    err_banonchan,
    err_nickcollision,
    err_nicknameinuse,
    err_erroneusnickname,
    err_nonicknamegiven,
    err_eventnickchange,
    err_nicktoofast,
    err_unavailresource,
];

/// Error codes `JoinChannel` treats as terminal protocol failures, when their
/// `args` name the channel being joined.
pub const JOIN_ERROR_CODES: &[&str] = &[
    err_nosuchchannel,
    err_toomanychannels,
    err_channelisfull,
    err_inviteonlychan,
    err_bannedfromchan,
    err_badchannelkey,
    err_needreggednick,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_numerics_to_names() {
        let num = Numeric::from_bytes(b"474").unwrap();
        assert_eq!(error_name(num), Some("err_bannedfromchan"));
    }

    #[test]
    fn unknown_numeric_resolves_to_none() {
        let num = Numeric::from_bytes(b"999").unwrap();
        assert_eq!(error_name(num), None);
    }

    #[test]
    fn join_error_codes_cover_spec_list() {
        assert!(JOIN_ERROR_CODES.contains(&err_bannedfromchan));
        assert!(JOIN_ERROR_CODES.contains(&err_needreggednick));
    }
}
