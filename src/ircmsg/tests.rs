use super::ServerMsg;
use crate::string::Line;

macro_rules! server_msg {
    ($lit:expr) => {
        ServerMsg::parse(Line::from_bytes($lit).unwrap()).unwrap()
    };
}

#[test]
pub fn parse_cmd() {
    assert_eq!(server_msg!("privMSG").kind, "PRIVMSG");
    assert_eq!(server_msg!("  NOTICE").kind, "NOTICE");
}

#[test]
pub fn parse_source_nickonly() {
    let msg = server_msg!(":server PING");
    assert_eq!(msg.kind, "PING");
    let source = msg.source.unwrap();
    assert_eq!(source.to_string(), "server");
    assert_eq!(source.nick, "server");
    assert!(source.userhost.is_none());
}

#[test]
pub fn parse_source_full() {
    let msg = server_msg!(":nick!user@host QUIT");
    assert_eq!(msg.kind, "QUIT");
    let source = msg.source.unwrap();
    assert_eq!(source.to_string(), "nick!user@host");
    assert_eq!(source.nick, "nick");
    let userhost = source.userhost.unwrap();
    assert_eq!(userhost.user.unwrap(), "user");
    assert_eq!(userhost.host, "host");
}

#[test]
pub fn parse_arg() {
    let msg = server_msg!("PONG 123");
    let (leading_args, last_arg) = msg.args.split_last();
    assert!(leading_args.is_empty());
    assert_eq!(last_arg.unwrap(), "123");
}

#[test]
pub fn parse_args() {
    let msg = server_msg!("NOTICE #foo :beep");
    assert_eq!(msg.args.args(), ["#foo", "beep"]);
}

#[test]
pub fn parse_args_long() {
    let msg = server_msg!("PRIVMSG #foo #bar :Hello world");
    let (chans, last) = msg.args.split_last();
    let last = last.unwrap();
    assert_eq!(chans, ["#foo", "#bar"]);
    assert_eq!(last, "Hello world");
}

#[test]
pub fn parse_tag_any() {
    let msg = server_msg!("@tag TAGMSG");
    assert!(msg.source.is_none());
    assert_eq!(msg.kind, "TAGMSG");
}

#[test]
pub fn parse_numeric() {
    let msg = server_msg!(":irc.example.net 001 nick :Welcome");
    assert_eq!(msg.kind, "001");
}

#[test]
pub fn to_string() {
    let cases = [
        "CMD",
        "CMD word :some words",
        ":src CMD word",
        ":irc.example.net 001",
        ":nick!user@host CMD",
    ];
    for case in cases {
        let looped = server_msg!(case).to_string();
        assert_eq!(looped, case);
    }
}

#[test]
pub fn bytes_left() {
    let cases = [
        "CMD",
        "CMD word",
        "CMD word1 word2",
        "CMD word :some words",
        ":src CMD word",
        "CMD uniçödé",
        "001",
    ];
    for case in cases {
        let testlen = 510 - server_msg!(case).bytes_left();
        let caselen = case.as_bytes().len() as isize;
        assert_eq!(testlen, caselen, "wrong length calculation for: {}", case);
    }
}
