//! IRC command handlers.
//!
//! This module contains the Handler trait and command registry for dispatching
//! incoming IRC messages to appropriate handlers.

mod cap;
mod channel;
mod connection;
mod helpers;
mod messaging;
mod misc;
mod mode;
mod oper;
mod server_query;
mod user_query;

pub use cap::CapHandler;
pub use channel::{JoinHandler, KickHandler, NamesHandler, PartHandler, TopicHandler};
pub use connection::{NickHandler, PassHandler, PingHandler, PongHandler, QuitHandler, UserHandler};
pub use helpers::{
    labeled_ack, matches_hostmask, server_notice, user_prefix, with_label,
};
pub use messaging::{NoticeHandler, PrivmsgHandler};
pub use misc::{AwayHandler, InviteHandler, IsonHandler, KnockHandler, UserhostHandler};
pub use mode::ModeHandler;
pub use oper::{DieHandler, KillHandler, OperHandler, RehashHandler, WallopsHandler};
pub use server_query::{
    AdminHandler, InfoHandler, ListHandler, LusersHandler, MotdHandler, StatsHandler,
    TimeHandler, VersionHandler,
};
pub use user_query::{WhoHandler, WhoisHandler, WhowasHandler};

use crate::state::Matrix;
use async_trait::async_trait;
use hearth_proto::{Message, MessageRef, Prefix, Response};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The user's unique ID.
    pub uid: &'a str,
    /// Shared server state.
    pub matrix: &'a Arc<Matrix>,
    /// Sender for outgoing messages to this client.
    pub sender: &'a mpsc::Sender<Message>,
    /// Current handshake state.
    pub handshake: &'a mut HandshakeState,
    /// Remote address this connection was accepted from.
    pub remote_addr: SocketAddr,
    /// Label tag (IRCv3 labeled-response) carried by the message currently being dispatched.
    pub label: Option<String>,
}

/// State tracked during client registration handshake.
#[derive(Debug, Default)]
pub struct HandshakeState {
    /// Nick provided by NICK command.
    pub nick: Option<String>,
    /// Username provided by USER command.
    pub user: Option<String>,
    /// Realname provided by USER command.
    pub realname: Option<String>,
    /// Whether registration is complete.
    pub registered: bool,
    /// Account name, set once SASL or similar authentication succeeds.
    pub account: Option<String>,
    /// Password supplied via PASS, checked against the server's connection
    /// password (if configured) when registration completes.
    pub password: Option<String>,
    /// IRCv3 capabilities negotiated via CAP REQ.
    pub capabilities: std::collections::HashSet<String>,
    /// Set once the client sends `CAP LS`/`CAP REQ`; cleared by `CAP END`.
    /// While true, registration is held even if NICK/USER are both present.
    pub cap_negotiating: bool,
    /// Number of consecutive failed OPER attempts (brute-force throttling).
    pub failed_oper_attempts: u8,
    /// Timestamp of the most recent OPER attempt.
    pub last_oper_attempt: Option<std::time::Instant>,
}

impl HandshakeState {
    /// Check if we have both NICK and USER, aren't mid-CAP-negotiation, and can complete registration.
    pub fn can_register(&self) -> bool {
        self.nick.is_some() && self.user.is_some() && !self.registered && !self.cap_negotiating
    }
}

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
#[allow(dead_code)] // Variants will be used as error handling improves
#[allow(clippy::large_enum_variant)] // Send variant is large but rarely constructed
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,
    #[error("nickname in use: {0}")]
    NicknameInUse(String),
    #[error("erroneous nickname: {0}")]
    ErroneousNickname(String),
    #[error("not registered")]
    NotRegistered,
    #[error("already registered")]
    AlreadyRegistered,
    #[error("nick or user missing from handshake state")]
    NickOrUserMissing,
    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<Message>),
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Trait implemented by all command handlers.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle an incoming message.
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult;
}

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Connection/registration handlers
        handlers.insert("CAP", Box::new(CapHandler));
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("USER", Box::new(UserHandler));
        handlers.insert("PASS", Box::new(PassHandler));
        handlers.insert("PING", Box::new(PingHandler));
        handlers.insert("PONG", Box::new(PongHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));

        // Channel handlers
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("TOPIC", Box::new(TopicHandler));
        handlers.insert("NAMES", Box::new(NamesHandler));
        handlers.insert("MODE", Box::new(ModeHandler));
        handlers.insert("KICK", Box::new(KickHandler));
        handlers.insert("LIST", Box::new(ListHandler));
        handlers.insert("INVITE", Box::new(InviteHandler));

        // Messaging handlers
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));
        handlers.insert("NOTICE", Box::new(NoticeHandler));

        // User query handlers
        handlers.insert("WHO", Box::new(WhoHandler));
        handlers.insert("WHOIS", Box::new(WhoisHandler));
        handlers.insert("WHOWAS", Box::new(WhowasHandler));

        // Server query handlers
        handlers.insert("VERSION", Box::new(VersionHandler));
        handlers.insert("TIME", Box::new(TimeHandler));
        handlers.insert("ADMIN", Box::new(AdminHandler));
        handlers.insert("INFO", Box::new(InfoHandler));
        handlers.insert("LUSERS", Box::new(LusersHandler));
        handlers.insert("STATS", Box::new(StatsHandler));
        handlers.insert("MOTD", Box::new(MotdHandler));

        // Misc handlers
        handlers.insert("AWAY", Box::new(AwayHandler));
        handlers.insert("USERHOST", Box::new(UserhostHandler));
        handlers.insert("ISON", Box::new(IsonHandler));
        handlers.insert("KNOCK", Box::new(KnockHandler));

        // Operator handlers
        handlers.insert("OPER", Box::new(OperHandler));
        handlers.insert("KILL", Box::new(KillHandler));
        handlers.insert("WALLOPS", Box::new(WallopsHandler));
        handlers.insert("DIE", Box::new(DieHandler));
        handlers.insert("REHASH", Box::new(RehashHandler));

        Self { handlers }
    }

    /// Dispatch a message to the appropriate handler.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let cmd_name = msg.command_name().to_ascii_uppercase();

        if let Some(handler) = self.handlers.get(cmd_name.as_str()) {
            handler.handle(ctx, msg).await
        } else {
            // Unknown command: silently ignored rather than replying ERR_UNKNOWNCOMMAND.
            Ok(())
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to create a server reply message.
pub fn server_reply(server_name: &str, response: Response, params: Vec<String>) -> Message {
    Message {
        tags: None,
        prefix: Some(Prefix::ServerName(server_name.to_string())),
        command: Command::Response(response, params),
    }
}

/// Wire-format line budget, per RFC 1459, including the trailing CRLF.
const MAX_LINE_LEN: usize = 512;

/// Batch a list-style numeric reply (NAMES, WHO, ...) into as few lines as
/// fit under [`MAX_LINE_LEN`], re-emitting `fixed` on every line and joining
/// each batch of `items` with a space as the trailing parameter. An empty
/// `items` still produces one reply, with an empty trailing parameter, so
/// callers don't need a special case for "nothing to list".
pub fn numeric_list_reply(
    server_name: &str,
    response: Response,
    fixed: &[String],
    items: &[String],
) -> Vec<Message> {
    if items.is_empty() {
        let mut params = fixed.to_vec();
        params.push(String::new());
        return vec![server_reply(server_name, response, params)];
    }

    let mut replies = Vec::new();
    let mut batch: Vec<&str> = Vec::new();

    let line_len = |batch: &[&str]| -> usize {
        let mut params = fixed.to_vec();
        params.push(batch.join(" "));
        server_reply(server_name, response, params).to_string().len()
    };

    for item in items {
        batch.push(item.as_str());
        if batch.len() > 1 && line_len(&batch) > MAX_LINE_LEN {
            batch.pop();
            let mut params = fixed.to_vec();
            params.push(batch.join(" "));
            replies.push(server_reply(server_name, response, params));
            batch = vec![item.as_str()];
        }
    }
    if !batch.is_empty() {
        let mut params = fixed.to_vec();
        params.push(batch.join(" "));
        replies.push(server_reply(server_name, response, params));
    }

    replies
}

// ============================================================================
// Common error reply helpers
// ============================================================================

/// Create ERR_NOPRIVILEGES reply (481) - user is not an IRC operator.
pub fn err_noprivileges(server_name: &str, nick: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NOPRIVILEGES,
        vec![
            nick.to_string(),
            "Permission Denied - You're not an IRC operator".to_string(),
        ],
    )
}

/// Create ERR_NEEDMOREPARAMS reply (461) - not enough parameters.
pub fn err_needmoreparams(server_name: &str, nick: &str, command: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NEEDMOREPARAMS,
        vec![
            nick.to_string(),
            command.to_string(),
            "Not enough parameters".to_string(),
        ],
    )
}

/// Create ERR_NOSUCHNICK reply (401) - no such nick/channel.
pub fn err_nosuchnick(server_name: &str, nick: &str, target: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NOSUCHNICK,
        vec![
            nick.to_string(),
            target.to_string(),
            "No such nick/channel".to_string(),
        ],
    )
}

/// Create ERR_NOSUCHCHANNEL reply (403) - no such channel.
pub fn err_nosuchchannel(server_name: &str, nick: &str, channel: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NOSUCHCHANNEL,
        vec![
            nick.to_string(),
            channel.to_string(),
            "No such channel".to_string(),
        ],
    )
}

/// Create ERR_NOTONCHANNEL reply (442) - you're not on that channel.
#[allow(dead_code)] // Will be used in future channel.rs refactoring
pub fn err_notonchannel(server_name: &str, nick: &str, channel: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NOTONCHANNEL,
        vec![
            nick.to_string(),
            channel.to_string(),
            "You're not on that channel".to_string(),
        ],
    )
}

/// Create ERR_CHANOPRIVSNEEDED reply (482) - you're not channel operator.
#[allow(dead_code)] // Will be used in future channel.rs/mode.rs refactoring
pub fn err_chanoprivsneeded(server_name: &str, nick: &str, channel: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_CHANOPRIVSNEEDED,
        vec![
            nick.to_string(),
            channel.to_string(),
            "You're not channel operator".to_string(),
        ],
    )
}

/// Create ERR_NOSUCHBAN reply (490) - no such ban/list entry to remove.
pub fn err_nosuchban(server_name: &str, nick: &str, channel: &str, mask: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NOSUCHBAN,
        vec![
            nick.to_string(),
            channel.to_string(),
            mask.to_string(),
            "No such ban".to_string(),
        ],
    )
}

/// Create ERR_USERNOTINCHANNEL reply (441) - they aren't on that channel.
#[allow(dead_code)] // Will be used in future channel.rs refactoring
pub fn err_usernotinchannel(server_name: &str, nick: &str, target: &str, channel: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_USERNOTINCHANNEL,
        vec![
            nick.to_string(),
            target.to_string(),
            channel.to_string(),
            "They aren't on that channel".to_string(),
        ],
    )
}

/// Create ERR_NOTREGISTERED reply (451) - command requires registration first.
pub fn err_notregistered(server_name: &str) -> Message {
    server_reply(
        server_name,
        Response::ERR_NOTREGISTERED,
        vec!["*".to_string(), "You have not registered".to_string()],
    )
}

// ============================================================================
// User lookup helpers
// ============================================================================

/// Return the connection's current nick, or `"*"` if it hasn't registered one yet.
pub async fn get_nick_or_star(ctx: &Context<'_>) -> String {
    ctx.handshake
        .nick
        .clone()
        .unwrap_or_else(|| "*".to_string())
}

/// Resolve a nickname to the UID currently holding it, case-insensitively.
pub fn resolve_nick_to_uid(ctx: &Context<'_>, nick: &str) -> Option<String> {
    let lower = hearth_proto::irc_to_lower(nick);
    ctx.matrix.nicks.get(&lower).map(|entry| entry.value().clone())
}

/// Ensure the connection belongs to an IRC operator.
///
/// On success, returns the caller's current nick. On failure, sends
/// ERR_NOPRIVILEGES and returns `Err(())`.
pub async fn require_oper(ctx: &Context<'_>) -> Result<String, ()> {
    let nick = get_nick_or_star(ctx).await;

    let is_oper = match ctx.matrix.users.get(ctx.uid) {
        Some(user_ref) => user_ref.read().await.modes.oper,
        None => false,
    };

    if is_oper {
        Ok(nick)
    } else {
        let _ = ctx
            .sender
            .send(err_noprivileges(&ctx.matrix.server_info.name, &nick))
            .await;
        Err(())
    }
}

