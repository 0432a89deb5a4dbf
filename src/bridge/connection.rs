//! One TCP/TLS socket to an IRC server and its registration handshake.

use crate::client::conn::tokio::StreamTokio;
use crate::client::conn::ServerAddr;
use crate::client::queue::Queue;
#[cfg(feature = "tls-tokio")]
use crate::client::tls::TlsConfig;
use crate::ircmsg::{Args, ClientCodec, ClientMsg, ServerMsg, Tags};
use crate::known::cmd;
use crate::string::Arg;

use super::isupport::IsupportTable;

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::BufReader;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

const EVENTS_CAPACITY: usize = 256;
/// Registration is a handful of `err_nicknameinuse`-style retries, not an unbounded loop.
const MAX_REGISTRATION_NICK_ATTEMPTS: u32 = 5;

#[derive(Debug)]
struct Shared {
    dead: AtomicBool,
    nick: Mutex<String>,
    local_port: u16,
    isupport: Mutex<IsupportTable>,
    chans: Mutex<HashSet<String>>,
}

/// Owns one connection's socket and background I/O tasks.
///
/// Reads are fanned out to every [`subscribe`][Self::subscribe]r via a broadcast channel;
/// writes are funneled through a [`Queue`] that enforces the RFC 1459 burst-then-throttle
/// rate limit. `create` does not return until IRC registration (numeric `001`) completes
/// or fails.
#[derive(Debug)]
pub struct ConnectionInstance {
    shared: Arc<Shared>,
    outbound: mpsc::UnboundedSender<ClientMsg<'static>>,
    events: broadcast::Sender<Arc<ServerMsg<'static>>>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
    disconnect_once: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

impl ConnectionInstance {
    /// Opens a connection to `addr`, invokes `on_created` with the local port the moment the
    /// socket is up, then registers as `nick`/`username`/`realname` and blocks until
    /// registration succeeds or fails.
    ///
    /// `on_created` fires synchronously once the raw socket exists, distinct from and
    /// regardless of whether IRC registration subsequently succeeds. Callers that key
    /// port-scoped state (e.g. an ident mapping) off the connection's lifetime must attach it
    /// here rather than after `create` returns, since a registration failure after a successful
    /// connect still needs that state recorded so it can be torn down correctly.
    ///
    /// Returns the instance alongside a one-shot receiver that resolves at most once, with
    /// the reason for the eventual disconnect (local or upstream-initiated).
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        addr: &ServerAddr<'_>,
        #[cfg(feature = "tls-tokio")] tls_config: Option<TlsConfig>,
        password: Option<&str>,
        nick: &str,
        username: &str,
        realname: &str,
        on_created: impl FnOnce(u16),
    ) -> io::Result<(Self, oneshot::Receiver<String>)> {
        #[cfg(feature = "tls-tokio")]
        let buffered = match tls_config {
            Some(cfg) => addr.connect_tokio(|| Ok(cfg)).await?,
            None => addr.connect_tokio_no_tls().await?,
        };
        #[cfg(not(feature = "tls-tokio"))]
        let buffered = addr.connect_tokio_no_tls().await?;

        let local_port = buffered.get_ref().local_addr()?.port();
        on_created(local_port);
        let stream: StreamTokio = buffered.into_inner();
        let (read_half, write_half) = tokio::io::split(stream);
        let read_half = BufReader::with_capacity(crate::client::conn::BUFSIZE, read_half);

        let shared = Arc::new(Shared {
            dead: AtomicBool::new(false),
            nick: Mutex::new(nick.to_string()),
            local_port,
            isupport: Mutex::new(IsupportTable::new()),
            chans: Mutex::new(HashSet::new()),
        });

        let (events_tx, _) = broadcast::channel(EVENTS_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (disconnect_tx, disconnect_rx) = oneshot::channel();
        let disconnect_once = Arc::new(Mutex::new(Some(disconnect_tx)));

        let reader_task = tokio::spawn(run_reader(
            read_half,
            shared.clone(),
            events_tx.clone(),
            disconnect_once.clone(),
        ));
        let writer_task =
            tokio::spawn(run_writer(write_half, outbound_rx, shared.clone(), disconnect_once.clone()));

        let inst = ConnectionInstance {
            shared,
            outbound: outbound_tx,
            events: events_tx,
            reader_task,
            writer_task,
            disconnect_once,
        };

        inst.register(password, nick, username, realname).await?;

        Ok((inst, disconnect_rx))
    }

    async fn register(
        &self,
        password: Option<&str>,
        nick: &str,
        username: &str,
        realname: &str,
    ) -> io::Result<()> {
        let mut events = self.events.subscribe();

        if let Some(password) = password {
            self.send(client_msg_one_arg(cmd::PASS, password)?);
        }
        self.send(nick_msg(nick)?);
        self.send(user_msg(username, realname)?);

        let mut attempted_nick = nick.to_string();
        let mut attempts = 0u32;
        loop {
            let msg = match events.recv().await {
                Ok(msg) => msg,
                Err(_) => {
                    return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "disconnected during registration"))
                }
            };
            match msg.kind.as_str() {
                "001" => {
                    if let Some(welcome_nick) = msg.args.args().first() {
                        *self.shared.nick.lock().unwrap() = welcome_nick.to_string();
                    }
                    return Ok(());
                }
                "005" => {
                    apply_inbound_state(&self.shared, msg.as_ref());
                }
                "432" | "433" | "436" | "437" => {
                    attempts += 1;
                    if attempts >= MAX_REGISTRATION_NICK_ATTEMPTS {
                        return Err(io::Error::new(
                            io::ErrorKind::Other,
                            format!("registration failed: {}", msg.kind.as_str()),
                        ));
                    }
                    attempted_nick = format!("{attempted_nick}_");
                    self.send(nick_msg(&attempted_nick)?);
                }
                "ERROR" => {
                    return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "server sent ERROR during registration"))
                }
                _ => {}
            }
        }
    }

    /// Returns `true` once the connection is no longer usable.
    pub fn dead(&self) -> bool {
        self.shared.dead.load(Ordering::Acquire)
    }

    /// The session's current effective nick (server-coerced, if applicable).
    pub fn nick(&self) -> String {
        self.shared.nick.lock().unwrap().clone()
    }

    /// The server-advertised `NICKLEN`, if known.
    pub fn nicklen(&self) -> Option<usize> {
        self.shared.isupport.lock().unwrap().nicklen()
    }

    /// Returns `true` if `prefix` denotes operator power or stronger on this network.
    pub fn is_operator_or_stronger(&self, prefix: char) -> bool {
        self.shared.isupport.lock().unwrap().is_operator_or_stronger(prefix)
    }

    /// A snapshot of the channels this connection believes itself joined to.
    pub fn chans(&self) -> HashSet<String> {
        self.shared.chans.lock().unwrap().clone()
    }

    /// The local TCP port this connection is bound to (for ident mapping).
    pub fn local_port(&self) -> u16 {
        self.shared.local_port
    }

    /// Subscribes to every inbound server message from this point forward.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ServerMsg<'static>>> {
        self.events.subscribe()
    }

    /// Queues `msg` for sending, subject to the outbound rate limit.
    ///
    /// Silently drops the message if the connection is already dead.
    pub fn send(&self, msg: ClientMsg<'static>) {
        let _ = self.outbound.send(msg);
    }

    /// Idempotently tears down the connection, firing the disconnect receiver with `reason`
    /// unless it has already fired.
    pub async fn disconnect(&self, reason: impl Into<String>) {
        if self.shared.dead.swap(true, Ordering::AcqRel) {
            return;
        }
        self.reader_task.abort();
        self.writer_task.abort();
        if let Some(tx) = self.disconnect_once.lock().unwrap().take() {
            let _ = tx.send(reason.into());
        }
    }
}

fn nick_msg(nick: &str) -> io::Result<ClientMsg<'static>> {
    let arg = Arg::from_bytes(nick.to_string())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut args = Args::new();
    args.add(arg);
    Ok(ClientMsg { tags: Tags::new(), cmd: cmd::NICK, args })
}

fn user_msg(username: &str, realname: &str) -> io::Result<ClientMsg<'static>> {
    let username_arg = Arg::from_bytes(username.to_string())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let realname_line = crate::string::Line::from_bytes(realname.to_string())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut args = Args::new();
    args.add(username_arg);
    args.add(Arg::from_bytes("0".to_string()).unwrap());
    args.add(Arg::from_bytes("*".to_string()).unwrap());
    args.add_long(realname_line);
    Ok(ClientMsg { tags: Tags::new(), cmd: cmd::USER, args })
}

fn client_msg_one_arg(cmd: crate::string::Cmd<'static>, value: &str) -> io::Result<ClientMsg<'static>> {
    let line = crate::string::Line::from_bytes(value.to_string())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut args = Args::new();
    args.add_long(line);
    Ok(ClientMsg { tags: Tags::new(), cmd, args })
}

async fn run_reader(
    mut read: BufReader<tokio::io::ReadHalf<StreamTokio>>,
    shared: Arc<Shared>,
    events: broadcast::Sender<Arc<ServerMsg<'static>>>,
    disconnect_once: Arc<Mutex<Option<oneshot::Sender<String>>>>,
) {
    let mut buf = Vec::new();
    loop {
        let msg: io::Result<ServerMsg<'static>> =
            ClientCodec::read_owning_from_tokio(&mut read, &mut buf).await;
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                finish(&shared, &disconnect_once, e.to_string());
                return;
            }
        };

        apply_inbound_state(&shared, &msg);

        if msg.kind.as_str() == "ERROR" {
            let reason = msg.args.args().last().map(|a| a.to_string()).unwrap_or_default();
            let _ = events.send(Arc::new(msg));
            finish(&shared, &disconnect_once, reason);
            return;
        }

        let _ = events.send(Arc::new(msg));
    }
}

fn apply_inbound_state(shared: &Shared, msg: &ServerMsg<'static>) {
    match msg.kind.as_str() {
        "005" => {
            let owned: Vec<String> = msg.args.args().iter().map(|a| a.to_string()).collect();
            let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
            shared.isupport.lock().unwrap().apply(&refs);
        }
        "NICK" => {
            if let Some(source) = &msg.source {
                let old = source.nick.to_string();
                let mut nick = shared.nick.lock().unwrap();
                if *nick == old {
                    if let Some(new_nick) = msg.args.args().first() {
                        *nick = new_nick.to_string();
                    }
                }
            }
        }
        "JOIN" => {
            if is_own_nick(shared, msg) {
                if let Some(channel) = msg.args.args().first() {
                    shared.chans.lock().unwrap().insert(channel.to_string());
                }
            }
        }
        "PART" => {
            if is_own_nick(shared, msg) {
                if let Some(channel) = msg.args.args().first() {
                    shared.chans.lock().unwrap().remove(&channel.to_string());
                }
            }
        }
        "KICK" => {
            let own_nick = shared.nick.lock().unwrap().clone();
            let args = msg.args.args();
            if let (Some(channel), Some(kicked)) = (args.first(), args.get(1)) {
                if kicked.to_string() == own_nick {
                    shared.chans.lock().unwrap().remove(&channel.to_string());
                }
            }
        }
        _ => {}
    }
}

fn is_own_nick(shared: &Shared, msg: &ServerMsg<'static>) -> bool {
    let own_nick = shared.nick.lock().unwrap().clone();
    msg.source.as_ref().is_some_and(|s| s.nick.to_string() == own_nick)
}

fn finish(
    shared: &Shared,
    disconnect_once: &Arc<Mutex<Option<oneshot::Sender<String>>>>,
    reason: String,
) {
    shared.dead.store(true, Ordering::Release);
    if let Some(tx) = disconnect_once.lock().unwrap().take() {
        let _ = tx.send(reason);
    }
}

async fn run_writer(
    mut write: tokio::io::WriteHalf<StreamTokio>,
    mut outbound: mpsc::UnboundedReceiver<ClientMsg<'static>>,
    shared: Arc<Shared>,
    disconnect_once: Arc<Mutex<Option<oneshot::Sender<String>>>>,
) {
    let mut queue = Queue::new();
    let mut buf = Vec::new();
    loop {
        let Some(msg) = outbound.recv().await else {
            finish(&shared, &disconnect_once, "connection closed locally".to_string());
            return;
        };
        queue.edit().push(msg);
        loop {
            let mut wait = None;
            let Some(next) = queue.pop(|d| wait = d) else {
                if let Some(wait) = wait {
                    tokio::time::sleep(wait).await;
                    continue;
                }
                break;
            };
            if let Err(e) = ClientCodec::send_to_tokio(&next, &mut write, &mut buf).await {
                finish(&shared, &disconnect_once, e.to_string());
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nick_msg_builds_a_nick_command() {
        let msg = nick_msg("alice").unwrap();
        assert_eq!(msg.to_string(), "NICK alice");
    }

    #[test]
    fn user_msg_builds_a_user_command() {
        let msg = user_msg("alice", "Alice Example").unwrap();
        assert_eq!(msg.to_string(), "USER alice 0 * :Alice Example");
    }
}
