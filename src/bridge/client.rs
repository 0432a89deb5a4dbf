//! The per-user bridged client: connect/join/nick/message orchestration and liveness.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::client::conn::ServerAddr;
#[cfg(feature = "tls-tokio")]
use crate::client::tls::TlsConfig;
use crate::ircmsg::{Args, ClientMsg, ServerMsg, ServerMsgKind, Tags};
use crate::known::cmd;
use crate::string::{Arg, Cmd, Line, Word};

use super::broker::{BridgeEvent, EventBroker, Metadata};
use super::config::{ClientConfig, MirrorPhase, ServerDescriptor};
use super::connection::ConnectionInstance;
use super::error::BridgeError;
use super::ident::IdentRegistry;
use super::identity::IdentityGenerator;
use super::ipv6::Ipv6Allocator;
use super::nick;
use super::numerics;
use super::room::{CachedOperators, GetOperatorsOpts, IrcRoom, NamesResult, OperatorsResult, WhoisInfo};

const CHANGE_NICK_TIMEOUT: Duration = Duration::from_secs(10);
const GET_NICKS_TIMEOUT: Duration = Duration::from_secs(5);
const JOIN_ROUND: Duration = Duration::from_secs(15);
const JOIN_MAX_ROUNDS: u32 = 5;

/// One message to send into a room via [`BridgedClient::send_action`].
#[derive(Clone, Debug)]
pub struct Action {
    /// What to send.
    pub kind: ActionKind,
    /// When the action was produced on the home side, used against the server's message
    /// expiry window. `None` disables expiry checking for this action.
    pub produced_at: Option<Instant>,
}

/// The payload of an [`Action`].
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum ActionKind {
    /// A regular `PRIVMSG`.
    Message(String),
    /// A `NOTICE`.
    Notice(String),
    /// A CTCP ACTION (`/me`).
    Emote(String),
    /// A `TOPIC` change.
    Topic(String),
}

/// The state machine a [`BridgedClient`] occupies.
///
/// See the component design for the full transition table; `Failed` is a sink reached only
/// if `Connecting` never completes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClientState {
    /// No connection attempt has been made yet.
    Fresh,
    /// Identity generation and/or the TCP/TLS handshake and IRC registration are in flight.
    Connecting,
    /// Registration completed; channel and message operations are legal.
    Registered,
    /// A local `Disconnect`/`Kill` was requested; waiting for the connection to confirm.
    Disconnecting,
    /// The connection is gone and will not be recreated.
    Dead,
    /// `Connect` failed before registration completed.
    Failed,
}

struct Shared {
    server: ServerDescriptor,
    client_config: Mutex<ClientConfig>,
    home_user_id: Option<String>,
    display_name: Option<String>,
    is_bot: bool,
    instance_id: String,
    state: Mutex<ClientState>,
    conn: Mutex<Option<Arc<ConnectionInstance>>>,
    nick: Mutex<String>,
    chan_list: Mutex<HashSet<String>>,
    idle_timer: Mutex<Option<JoinHandle<()>>>,
    inst_creation_failed: AtomicBool,
    explicit_disconnect: AtomicBool,
    killed: AtomicBool,
    disconnect_reason: Mutex<Option<String>>,
    connect_ready: watch::Sender<bool>,
    operator_cache: Mutex<HashMap<String, CachedOperators>>,
    event_broker: Arc<dyn EventBroker>,
    ident_registry: Arc<IdentRegistry>,
    ipv6_allocator: Arc<dyn Ipv6Allocator>,
    identity_generator: Arc<dyn IdentityGenerator>,
    listener_task: Mutex<Option<JoinHandle<()>>>,
    disconnect_task: Mutex<Option<JoinHandle<()>>>,
}

/// A per-user IRC session bridging a home-side identity to one IRC network.
///
/// Cloning a `BridgedClient` shares the same underlying session (cheap `Arc` clone); this is
/// the shape background tasks (the idle timer, the disconnect handler, the permanent nick/error
/// listener) need to call back into the session without owning it outright.
#[derive(Clone)]
pub struct BridgedClient {
    shared: Arc<Shared>,
}

impl BridgedClient {
    /// Builds a fresh, unconnected session for one home identity against one server.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        server: ServerDescriptor,
        client_config: ClientConfig,
        home_user_id: Option<String>,
        display_name: Option<String>,
        is_bot: bool,
        event_broker: Arc<dyn EventBroker>,
        ident_registry: Arc<IdentRegistry>,
        ipv6_allocator: Arc<dyn Ipv6Allocator>,
        identity_generator: Arc<dyn IdentityGenerator>,
    ) -> Self {
        let instance_id = format!("{:08x}", rand::random::<u32>());
        let (connect_ready, _) = watch::channel(false);
        let nick = client_config.desired_nick.clone();
        let shared = Arc::new(Shared {
            server,
            client_config: Mutex::new(client_config),
            home_user_id,
            display_name,
            is_bot,
            instance_id,
            state: Mutex::new(ClientState::Fresh),
            conn: Mutex::new(None),
            nick: Mutex::new(nick),
            chan_list: Mutex::new(HashSet::new()),
            idle_timer: Mutex::new(None),
            inst_creation_failed: AtomicBool::new(false),
            explicit_disconnect: AtomicBool::new(false),
            killed: AtomicBool::new(false),
            disconnect_reason: Mutex::new(None),
            connect_ready,
            operator_cache: Mutex::new(HashMap::new()),
            event_broker,
            ident_registry,
            ipv6_allocator,
            identity_generator,
            listener_task: Mutex::new(None),
            disconnect_task: Mutex::new(None),
        });
        BridgedClient { shared }
    }

    /// The short tag used to correlate this session's log lines and metadata.
    pub fn instance_id(&self) -> &str {
        &self.shared.instance_id
    }

    /// The current state-machine state.
    pub fn state(&self) -> ClientState {
        *self.shared.state.lock().unwrap()
    }

    /// `true` once this session cannot be used again, per the invariant
    /// `isDead() ⇔ instCreationFailed ∨ (conn ≠ nil ∧ conn.dead)`.
    pub fn is_dead(&self) -> bool {
        self.shared.inst_creation_failed.load(Ordering::Acquire)
            || self.shared.conn.lock().unwrap().as_ref().is_some_and(|c| c.dead())
    }

    /// The session's current effective nick.
    pub fn nick(&self) -> String {
        self.shared.nick.lock().unwrap().clone()
    }

    /// A snapshot of the channels this session believes itself joined to.
    ///
    /// Unlike the connection instance's own confirmed channel set, this reflects channels
    /// added optimistically before their `JOIN` was acknowledged (invariant 6).
    pub fn chan_list(&self) -> HashSet<String> {
        self.shared.chan_list.lock().unwrap().clone()
    }

    fn require_not_killed(&self) -> Result<(), BridgeError> {
        if self.shared.killed.load(Ordering::Acquire) {
            return Err(BridgeError::killed());
        }
        Ok(())
    }

    fn live_conn(&self) -> Result<Arc<ConnectionInstance>, BridgeError> {
        self.require_not_killed()?;
        let conn = self.shared.conn.lock().unwrap().clone();
        match conn {
            Some(conn) if !conn.dead() => Ok(conn),
            _ => Err(BridgeError::not_connected()),
        }
    }

    /// Performs identity acquisition, opens the connection, installs the permanent listeners,
    /// emits `client-connected`, sets any configured user mode for non-bot sessions, and arms
    /// the idle timer.
    pub async fn connect(&self) -> Result<(), BridgeError> {
        {
            let mut state = self.shared.state.lock().unwrap();
            if *state != ClientState::Fresh {
                return Err(BridgeError::Lifecycle("connect already attempted"));
            }
            *state = ClientState::Connecting;
        }

        match self.connect_inner().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.shared.inst_creation_failed.store(true, Ordering::Release);
                *self.shared.state.lock().unwrap() = ClientState::Failed;
                // Unblocks anyone parked in `wait_connect_ready`; they'll observe the
                // failure via `live_conn()` rather than stall forever.
                let _ = self.shared.connect_ready.send(true);
                Err(e)
            }
        }
    }

    async fn connect_inner(&self) -> Result<(), BridgeError> {
        let identity_key = self
            .shared
            .home_user_id
            .clone()
            .unwrap_or_else(|| self.shared.instance_id.clone());

        let (username, realname) = self
            .shared
            .identity_generator
            .generate(&identity_key, self.shared.display_name.as_deref());

        let ipv6_address = self.shared.server.ipv6_prefix.map(|(prefix, len)| {
            self.shared.ipv6_allocator.allocate(prefix, len, &identity_key)
        });

        let rendered_nick = self
            .shared
            .server
            .render_desired_nick(&identity_key, self.shared.display_name.as_deref());

        let desired_nick = {
            let mut config = self.shared.client_config.lock().unwrap();
            config.username = username.clone();
            config.realname = realname.clone();
            config.ipv6_address = ipv6_address;
            config.desired_nick = rendered_nick;
            config.desired_nick.clone()
        };
        let validated_nick = nick::validate(&desired_nick, false, None)?;

        let addr = ServerAddr::from_host(self.shared.server.domain.as_str())
            .map_err(|e| BridgeError::Validation(e.to_string()))?;
        let password = self
            .shared
            .client_config
            .lock()
            .unwrap()
            .password
            .clone()
            .or_else(|| self.shared.server.default_password.clone());

        #[cfg(feature = "tls-tokio")]
        let tls_config: Option<TlsConfig> = if self.shared.server.use_tls {
            Some(
                crate::client::tls::TlsConfigOptions::default()
                    .build()
                    .map_err(|e| BridgeError::Fatal(e.to_string()))?,
            )
        } else {
            None
        };

        let ident_registry = self.shared.ident_registry.clone();
        let ident_username = username.clone();
        let (inst, disconnect_rx) = ConnectionInstance::create(
            &addr,
            #[cfg(feature = "tls-tokio")]
            tls_config,
            password.as_deref(),
            &validated_nick,
            &username,
            &realname,
            move |local_port| ident_registry.register(local_port, ident_username),
        )
        .await
        .map_err(|e| BridgeError::Fatal(e.to_string()))?;
        let inst = Arc::new(inst);

        *self.shared.nick.lock().unwrap() = inst.nick();
        *self.shared.conn.lock().unwrap() = Some(inst.clone());

        let listener = tokio::spawn(run_event_listener(self.shared.clone(), inst.subscribe()));
        *self.shared.listener_task.lock().unwrap() = Some(listener);

        let disconnect_task =
            tokio::spawn(run_disconnect_handler(self.shared.clone(), disconnect_rx));
        *self.shared.disconnect_task.lock().unwrap() = Some(disconnect_task);

        if !self.shared.is_bot {
            if let Some(mode) = &self.shared.server.user_mode {
                let nick = inst.nick();
                if let Ok(msg) = simple_msg(cmd::MODE, &[nick.as_str(), mode.as_str()], None) {
                    inst.send(msg);
                }
            }
        }

        *self.shared.state.lock().unwrap() = ClientState::Registered;
        let _ = self.shared.connect_ready.send(true);
        touch_activity(&self.shared);

        self.shared.event_broker.on_event(&self.shared.instance_id, BridgeEvent::ClientConnected);
        Ok(())
    }

    async fn wait_connect_ready(&self) {
        let mut rx = self.shared.connect_ready.subscribe();
        if !*rx.borrow() {
            let _ = rx.wait_for(|ready| *ready).await;
        }
    }

    /// Validates and attempts to change the session's nick.
    ///
    /// See the component design for the full correlation contract; in short this races a
    /// matching `NICK` confirmation against the protocol errors in
    /// [`numerics::NICK_CHANGE_ERROR_CODES`] and a 10-second timeout.
    pub async fn change_nick(&self, new_nick: &str, strict: bool) -> Result<String, BridgeError> {
        let conn = self.live_conn()?;
        let nicklen = conn.nicklen();
        let validated = nick::validate(new_nick, strict, nicklen)?;
        let current = conn.nick();
        if validated == current {
            return Ok(format!("Nick is already {current}."));
        }

        let mut events = conn.subscribe();
        let msg = simple_msg(cmd::NICK, &[validated.as_str()], None)?;
        conn.send(msg);

        let outcome = tokio::time::timeout(CHANGE_NICK_TIMEOUT, async {
            loop {
                let msg = match events.recv().await {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(BridgeError::Fatal("connection closed".into()))
                    }
                };
                if msg.kind.as_str() == "NICK" {
                    let was_own = msg
                        .source
                        .as_ref()
                        .is_some_and(|s| s.nick.to_string() == current);
                    if was_own && conn.nick() == validated {
                        return Ok(format!("Nick changed to {validated}."));
                    }
                } else if let Some(code) = numeric_code(&msg.kind) {
                    if numerics::NICK_CHANGE_ERROR_CODES.contains(&code) {
                        return Err(BridgeError::Protocol(format!(
                            "Failed to change nick: {code}"
                        )));
                    }
                }
            }
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Timeout("ChangeNick timed out after 10s.".into())),
        }
    }

    /// Joins `channel`, or resolves immediately for already-joined channels, direct-message
    /// targets, and queued connect-in-flight retries.
    pub async fn join_channel(
        &self,
        channel: &str,
        key: Option<&str>,
    ) -> Result<IrcRoom, BridgeError> {
        self.require_not_killed()?;

        if *self.shared.state.lock().unwrap() == ClientState::Connecting {
            self.wait_connect_ready().await;
        }

        let conn = self.live_conn()?;

        if conn.chans().contains(channel) {
            return Ok(IrcRoom::new(self.shared.server.domain.clone(), channel));
        }
        if !is_channel_name(channel) {
            return Ok(IrcRoom::new(self.shared.server.domain.clone(), channel));
        }
        if self.shared.server.is_excluded_channel(channel) {
            return Err(BridgeError::Validation(format!("{channel} is not tracked.")));
        }

        self.shared.chan_list.lock().unwrap().insert(channel.to_string());

        let mut rounds = 0u32;
        loop {
            let mut events = conn.subscribe();
            let msg = simple_msg(cmd::JOIN, &join_args(channel, key), None)?;
            conn.send(msg);

            let round_result = tokio::time::timeout(JOIN_ROUND, async {
                loop {
                    let msg = match events.recv().await {
                        Ok(msg) => msg,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => {
                            return Some(Err(BridgeError::Fatal("connection closed".into())))
                        }
                    };
                    if msg.kind.as_str() == "JOIN" {
                        if let Some(joined) = msg.args.args().first() {
                            if joined.to_string() == channel
                                && msg.source.as_ref().is_some_and(|s| s.nick.to_string() == conn.nick())
                            {
                                return Some(Ok(()));
                            }
                        }
                    } else if let Some(code) = numeric_code(&msg.kind) {
                        if numerics::JOIN_ERROR_CODES.contains(&code)
                            && msg.args.args().iter().any(|a| a.to_string() == channel)
                        {
                            return Some(Err(BridgeError::Protocol(code.to_string())));
                        }
                    }
                }
            })
            .await;

            match round_result {
                Ok(Some(Ok(()))) => {
                    return Ok(IrcRoom::new(self.shared.server.domain.clone(), channel));
                }
                Ok(Some(Err(e))) => {
                    self.shared.chan_list.lock().unwrap().remove(channel);
                    self.shared.event_broker.on_event(
                        &self.shared.instance_id,
                        BridgeEvent::JoinError { channel: channel.to_string(), code: e.to_string() },
                    );
                    self.shared.event_broker.on_metadata(Metadata {
                        instance_id: self.shared.instance_id.clone(),
                        text: format!("Failed to join {channel}: {e}"),
                        force_notice: true,
                    });
                    return Err(e);
                }
                Ok(None) | Err(_) => {
                    if conn.chans().contains(channel) {
                        return Ok(IrcRoom::new(self.shared.server.domain.clone(), channel));
                    }
                    rounds += 1;
                    if rounds >= JOIN_MAX_ROUNDS {
                        self.shared.chan_list.lock().unwrap().remove(channel);
                        return Err(BridgeError::Timeout(format!(
                            "Joining {channel} failed after multiple tries."
                        )));
                    }
                }
            }
        }
    }

    /// Leaves `channel`, removing it from the local channel set before `PART` is sent.
    ///
    /// A no-op if disconnected, not presently tracked, or not a real channel name.
    pub async fn leave_channel(&self, channel: &str, reason: Option<&str>) -> Result<(), BridgeError> {
        self.require_not_killed()?;
        let Ok(conn) = self.live_conn() else { return Ok(()) };
        if !is_channel_name(channel) || !self.shared.chan_list.lock().unwrap().remove(channel) {
            return Ok(());
        }
        let msg = simple_msg(cmd::PART, &[channel], reason)?;
        conn.send(msg);
        Ok(())
    }

    /// Kicks `nick` from `channel`. Fire-and-forget: IRC gives no reliable success reply.
    pub async fn kick(&self, nick: &str, channel: &str, reason: Option<&str>) -> Result<(), BridgeError> {
        self.require_not_killed()?;
        let Ok(conn) = self.live_conn() else { return Ok(()) };
        if !is_channel_name(channel) || !conn.chans().contains(channel) {
            return Ok(());
        }
        let msg = simple_msg(cmd::KICK, &[channel, nick], reason)?;
        conn.send(msg);
        Ok(())
    }

    /// Sends a message/notice/emote/topic to `room`, joining it first if needed.
    pub async fn send_action(&self, room: &IrcRoom, action: Action) -> Result<(), BridgeError> {
        self.require_not_killed()?;
        touch_activity(&self.shared);

        if let Some(produced_at) = action.produced_at {
            let expiry_secs = self.shared.server.message_expiry_secs;
            if expiry_secs > 0 && produced_at.elapsed() > Duration::from_secs(expiry_secs) {
                return Ok(());
            }
        }

        self.wait_connect_ready().await;
        self.join_channel(&room.channel, None).await?;
        let conn = self.live_conn()?;

        let msg = match &action.kind {
            ActionKind::Message(text) => {
                simple_msg(cmd::PRIVMSG, &[room.channel.as_str()], Some(text.as_str()))?
            }
            ActionKind::Notice(text) => {
                simple_msg(cmd::NOTICE, &[room.channel.as_str()], Some(text.as_str()))?
            }
            ActionKind::Emote(text) => action_msg(&room.channel, text)?,
            ActionKind::Topic(text) => {
                simple_msg(cmd::TOPIC, &[room.channel.as_str()], Some(text.as_str()))?
            }
        };
        conn.send(msg);
        Ok(())
    }

    /// Looks up `nick` via `WHOIS`.
    pub async fn whois(&self, nick: &str) -> Result<WhoisInfo, BridgeError> {
        let conn = self.live_conn()?;
        let mut events = conn.subscribe();
        conn.send(simple_msg(cmd::WHOIS, &[nick], None)?);

        let mut user_host: Option<String> = None;
        let mut realname: Option<String> = None;
        let mut channels: Option<String> = None;
        let mut idle_secs: Option<String> = None;

        loop {
            let msg = match events.recv().await {
                Ok(msg) => msg,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(BridgeError::Fatal("connection closed".into()))
                }
            };
            let code = msg.kind.as_str();
            let args = msg.args.args();
            match code {
                "311" => {
                    if args.len() >= 4 {
                        user_host = Some(format!("{}@{}", args[2], args[3]));
                    }
                    if let (_, Some(line)) = msg.args.split_last() {
                        realname = Some(line.to_string());
                    }
                }
                "319" => {
                    if let (_, Some(line)) = msg.args.split_last() {
                        channels = Some(line.to_string());
                    }
                }
                "317" => {
                    if args.len() >= 3 {
                        idle_secs = Some(args[2].to_string());
                    }
                }
                "318" => break,
                _ => {}
            }
        }

        let Some(user_host) = user_host else {
            return Err(BridgeError::Protocol(format!("No such nick: {nick}")));
        };

        let mut msg = user_host;
        if let Some(realname) = realname {
            msg.push_str(&format!(" ({realname})"));
        }
        if let Some(channels) = channels.filter(|c| !c.is_empty()) {
            msg.push_str(&format!(" on {channels}"));
        }
        if let Some(idle_secs) = idle_secs {
            msg.push_str(&format!(", idle {idle_secs}s"));
        }

        Ok(WhoisInfo { server: self.shared.server.domain.clone(), nick: nick.to_string(), msg })
    }

    /// Retrieves the current membership of `channel` via `NAMES`, with a 5-second timeout.
    pub async fn get_nicks(&self, channel: &str) -> Result<NamesResult, BridgeError> {
        let conn = self.live_conn()?;
        let mut events = conn.subscribe();
        conn.send(simple_msg(cmd::NAMES, &[channel], None)?);

        let result = tokio::time::timeout(GET_NICKS_TIMEOUT, async {
            let mut names = HashMap::new();
            loop {
                let msg = match events.recv().await {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(BridgeError::Fatal("connection closed".into()))
                    }
                };
                let code = msg.kind.as_str();
                match code {
                    "353" => {
                        if let (_, Some(line)) = msg.args.split_last() {
                            for token in line.to_string().split_whitespace() {
                                let (prefix, bare) = split_prefix(token);
                                names.insert(bare.to_string(), prefix.to_string());
                            }
                        }
                    }
                    "366" => return Ok(names),
                    _ => {}
                }
            }
        })
        .await;

        let names = match result {
            Ok(Ok(names)) => names,
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(BridgeError::Timeout(format!("GetNicks timed out for {channel}."))),
        };
        let nicks = names.keys().cloned().collect();
        Ok(NamesResult { server: self.shared.server.domain.clone(), channel: channel.to_string(), nicks, names })
    }

    /// Returns the operators in `channel`, joining and leaving unconditionally around the
    /// lookup, honoring [`GetOperatorsOpts::cache_duration_ms`] when present.
    pub async fn get_operators(
        &self,
        channel: &str,
        opts: GetOperatorsOpts,
    ) -> Result<OperatorsResult, BridgeError> {
        if let Some(duration) = opts.cache_duration_ms {
            if duration == 0 {
                return Err(BridgeError::Validation(
                    "cacheDurationMs must be a positive integer".into(),
                ));
            }
            if let Some(cached) = self.shared.operator_cache.lock().unwrap().get(channel) {
                if cached.is_fresh(Instant::now(), duration) {
                    return Ok(cached.result.clone());
                }
            }
        }

        self.join_channel(channel, opts.key.as_deref()).await?;
        let names = self.get_nicks(channel).await?;
        self.leave_channel(channel, None).await?;

        let conn = self.live_conn()?;
        let operator_nicks = names
            .names
            .iter()
            .filter(|(_, prefix)| {
                prefix.chars().next().is_some_and(|p| conn.is_operator_or_stronger(p))
            })
            .map(|(nick, _)| nick.clone())
            .collect();

        let result = OperatorsResult { names, operator_nicks };
        if opts.cache_duration_ms.is_some() {
            self.shared.operator_cache.lock().unwrap().insert(
                channel.to_string(),
                CachedOperators { result: result.clone(), captured_at: Instant::now() },
            );
        }
        Ok(result)
    }

    /// Marks the session explicitly disconnected and tears down the connection, if any.
    pub async fn disconnect(&self, reason: impl Into<String>) {
        do_disconnect(&self.shared, reason.into()).await;
    }

    /// Blocks further commands, then disconnects with `reason` (defaulting to a standard
    /// "killed" message).
    pub async fn kill(&self, reason: Option<String>) {
        self.shared.killed.store(true, Ordering::Release);
        do_disconnect(&self.shared, reason.unwrap_or_else(|| "Bridged client killed".into())).await;
    }
}

async fn do_disconnect(shared: &Arc<Shared>, reason: String) {
    shared.explicit_disconnect.store(true, Ordering::Release);
    let conn = shared.conn.lock().unwrap().clone();
    let Some(conn) = conn else { return };
    if conn.dead() {
        return;
    }
    {
        let mut state = shared.state.lock().unwrap();
        if *state == ClientState::Registered {
            *state = ClientState::Disconnecting;
        }
    }
    conn.disconnect(reason).await;
}

fn touch_activity(shared: &Arc<Shared>) {
    let idle_secs = shared.server.idle_timeout_secs;
    let mut guard = shared.idle_timer.lock().unwrap();
    if let Some(old) = guard.take() {
        old.abort();
    }
    if idle_secs == 0 {
        return;
    }
    let shared = shared.clone();
    *guard = Some(tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(idle_secs)).await;
        on_idle_expiry(&shared).await;
    }));
}

async fn on_idle_expiry(shared: &Arc<Shared>) {
    if shared.server.mirrors_membership(MirrorPhase::Initial) {
        return;
    }
    if shared.is_bot {
        return;
    }
    let reason = format!("Idle timeout reached: {}s", shared.server.idle_timeout_secs);
    do_disconnect(shared, reason).await;
}

async fn run_event_listener(shared: Arc<Shared>, mut events: broadcast::Receiver<Arc<ServerMsg<'static>>>) {
    loop {
        let msg = match events.recv().await {
            Ok(msg) => msg,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return,
        };
        if msg.kind.as_str() == "NICK" {
            if let Some(source) = &msg.source {
                let old_candidate = source.nick.to_string();
                let mut nick_guard = shared.nick.lock().unwrap();
                if *nick_guard == old_candidate {
                    if let Some(new_nick) = msg.args.args().first() {
                        let old = nick_guard.clone();
                        let new = new_nick.to_string();
                        *nick_guard = new.clone();
                        drop(nick_guard);
                        shared
                            .event_broker
                            .on_event(&shared.instance_id, BridgeEvent::NickChange { old, new });
                    }
                }
            }
        } else if let Some(code) = numeric_code(&msg.kind) {
            let force_notice = numerics::FORCE_NOTICE_CODES.contains(&code);
            shared.event_broker.on_metadata(Metadata {
                instance_id: shared.instance_id.clone(),
                text: format!("IRC error: {code}"),
                force_notice,
            });
        }
    }
}

async fn run_disconnect_handler(shared: Arc<Shared>, rx: tokio::sync::oneshot::Receiver<String>) {
    let reason = rx.await.unwrap_or_else(|_| "connection dropped".to_string());
    *shared.disconnect_reason.lock().unwrap() = Some(reason.clone());

    if let Some(conn) = shared.conn.lock().unwrap().as_ref() {
        shared.ident_registry.unregister(conn.local_port());
    }
    let config = shared.client_config.lock().unwrap();
    shared.identity_generator.release(&config.username);
    if let Some(addr) = config.ipv6_address {
        shared.ipv6_allocator.release(addr);
    }
    drop(config);
    if reason == "banned" {
        shared.explicit_disconnect.store(true, Ordering::Release);
    }
    *shared.state.lock().unwrap() = ClientState::Dead;
    shared
        .event_broker
        .on_event(&shared.instance_id, BridgeEvent::ClientDisconnected { reason: Some(reason.clone()) });
    shared.event_broker.on_metadata(Metadata {
        instance_id: shared.instance_id.clone(),
        text: format!("Disconnected: {reason}"),
        force_notice: false,
    });
    if let Some(timer) = shared.idle_timer.lock().unwrap().take() {
        timer.abort();
    }
}

fn numeric_code(kind: &ServerMsgKind<'_>) -> Option<&'static str> {
    match kind {
        ServerMsgKind::Numeric(num) => numerics::error_name(*num),
        ServerMsgKind::Cmd(_) => None,
    }
}

fn is_channel_name(name: &str) -> bool {
    matches!(name.as_bytes().first(), Some(b'#' | b'!' | b'&' | b'+'))
}

fn split_prefix(token: &str) -> (&str, &str) {
    let prefix_len = token.chars().take_while(|c| "~&@%+".contains(*c)).count();
    token.split_at(prefix_len)
}

fn join_args<'a>(channel: &'a str, key: Option<&'a str>) -> Vec<&'a str> {
    match key {
        Some(key) => vec![channel, key],
        None => vec![channel],
    }
}

fn simple_msg(
    cmd: Cmd<'static>,
    words: &[&str],
    long: Option<&str>,
) -> Result<ClientMsg<'static>, BridgeError> {
    let mut args = Args::new();
    for word in words {
        let arg = Arg::from_bytes(word.to_string()).map_err(|e| BridgeError::Validation(e.to_string()))?;
        args.add(arg);
    }
    if let Some(long) = long {
        let line = Line::from_bytes(long.to_string()).map_err(|e| BridgeError::Validation(e.to_string()))?;
        args.add_long(line);
    }
    Ok(ClientMsg { tags: Tags::new(), cmd, args })
}

fn action_msg(channel: &str, text: &str) -> Result<ClientMsg<'static>, BridgeError> {
    use crate::ircmsg::MaybeCtcp;
    let body = Line::from_bytes(text.to_string()).map_err(|e| BridgeError::Validation(e.to_string()))?;
    let ctcp_cmd = Word::from_bytes("ACTION".to_string()).map_err(|e| BridgeError::Validation(e.to_string()))?;
    let ctcp = MaybeCtcp { cmd: ctcp_cmd, body };
    let line: Line<'static> = ctcp.into_line();
    let mut args = Args::new();
    let target = Arg::from_bytes(channel.to_string()).map_err(|e| BridgeError::Validation(e.to_string()))?;
    args.add(target);
    args.add_long(line);
    Ok(ClientMsg { tags: Tags::new(), cmd: cmd::PRIVMSG, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_channel_name_matches_irc_sigils() {
        assert!(is_channel_name("#general"));
        assert!(is_channel_name("&local"));
        assert!(!is_channel_name("someuser"));
    }

    #[test]
    fn split_prefix_separates_operator_symbol() {
        assert_eq!(split_prefix("@alice"), ("@", "alice"));
        assert_eq!(split_prefix("bob"), ("", "bob"));
    }

    #[test]
    fn join_args_includes_key_when_present() {
        assert_eq!(join_args("#a", Some("secret")), vec!["#a", "secret"]);
        assert_eq!(join_args("#a", None), vec!["#a"]);
    }

    fn test_server_descriptor(idle_timeout_secs: u64) -> ServerDescriptor {
        ServerDescriptor {
            domain: "irc.example.org".into(),
            default_password: None,
            use_tls: false,
            desired_nick_template: "{user_id}".into(),
            user_mode: None,
            idle_timeout_secs,
            message_expiry_secs: 0,
            ipv6_prefix: None,
            membership_mirror: HashSet::new(),
            excluded_channels: HashSet::new(),
            allow_dynamic_aliases: true,
            hardcoded_room_ids: Vec::new(),
            user_regex: None,
            alias_regex: None,
        }
    }

    fn test_client(server: ServerDescriptor, is_bot: bool) -> BridgedClient {
        let broker: Arc<dyn EventBroker> = Arc::new(super::super::broker::LoggingEventBroker);
        let config = ClientConfig {
            desired_nick: "tester".into(),
            password: None,
            ipv6_address: None,
            username: "tester".into(),
            realname: "Tester".into(),
        };
        BridgedClient::new(
            server,
            config,
            None,
            None,
            is_bot,
            broker,
            Arc::new(IdentRegistry::new()),
            Arc::new(super::super::ipv6::DefaultIpv6Allocator::new()),
            Arc::new(super::super::identity::DefaultIdentityGenerator::new()),
        )
    }

    #[tokio::test]
    async fn idle_expiry_skips_bot_sessions() {
        let client = test_client(test_server_descriptor(300), true);
        on_idle_expiry(&client.shared).await;
        assert!(!client.shared.explicit_disconnect.load(Ordering::Acquire));
    }

    #[tokio::test(start_paused = true)]
    async fn touch_activity_disconnects_after_the_real_idle_timer_elapses() {
        let client = test_client(test_server_descriptor(300), false);
        touch_activity(&client.shared);

        tokio::time::advance(Duration::from_secs(299)).await;
        tokio::task::yield_now().await;
        assert!(!client.shared.explicit_disconnect.load(Ordering::Acquire));

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(client.shared.explicit_disconnect.load(Ordering::Acquire));
    }

    async fn mock_ircd<Fut>(
        script: impl FnOnce(tokio::net::tcp::OwnedWriteHalf) -> Fut + Send + 'static,
    ) -> ServerAddr<'static>
    where
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (_read, write) = stream.into_split();
            script(write).await;
        });
        ServerAddr { address: Word::from_str("127.0.0.1"), tls: false, port: Some(port) }
    }

    #[tokio::test(start_paused = true)]
    async fn change_nick_times_out_after_ten_seconds_without_confirmation() {
        use tokio::io::AsyncWriteExt;

        let addr = mock_ircd(|mut write| async move {
            write.write_all(b":srv 001 tester :Welcome\r\n").await.unwrap();
            std::future::pending::<()>().await;
        })
        .await;

        let (inst, _disconnect_rx) = ConnectionInstance::create(
            &addr,
            #[cfg(feature = "tls-tokio")]
            None,
            None,
            "tester",
            "tester",
            "Tester",
            |_| {},
        )
        .await
        .unwrap();

        let client = test_client(test_server_descriptor(0), false);
        *client.shared.conn.lock().unwrap() = Some(Arc::new(inst));
        *client.shared.nick.lock().unwrap() = "tester".into();
        *client.shared.state.lock().unwrap() = ClientState::Registered;

        let call = client.change_nick("newnick", false);
        tokio::pin!(call);
        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(matches!(call.await, Err(BridgeError::Timeout(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn join_channel_retries_into_a_second_round_after_a_silent_first_round() {
        use tokio::io::AsyncWriteExt;

        let addr = mock_ircd(|mut write| async move {
            write.write_all(b":srv 001 tester :Welcome\r\n").await.unwrap();
            // Stay silent through the whole first join round (15s), then confirm just after
            // it times out, landing in the second round's freshly-opened subscription.
            tokio::time::sleep(Duration::from_secs(16)).await;
            write.write_all(b":tester JOIN #test\r\n").await.unwrap();
            std::future::pending::<()>().await;
        })
        .await;

        let (inst, _disconnect_rx) = ConnectionInstance::create(
            &addr,
            #[cfg(feature = "tls-tokio")]
            None,
            None,
            "tester",
            "tester",
            "Tester",
            |_| {},
        )
        .await
        .unwrap();

        let client = test_client(test_server_descriptor(0), false);
        *client.shared.conn.lock().unwrap() = Some(Arc::new(inst));
        *client.shared.nick.lock().unwrap() = "tester".into();
        *client.shared.state.lock().unwrap() = ClientState::Registered;

        let call = client.join_channel("#test", None);
        tokio::pin!(call);
        tokio::time::advance(Duration::from_secs(16)).await;
        let room = call.await.expect("join succeeds once the second round's confirmation arrives");
        assert_eq!(room.channel, "#test");
    }
}
