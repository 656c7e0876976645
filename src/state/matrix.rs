//! The Matrix - Central shared state for the IRC server.
//!
//! The Matrix holds every piece of state shared across connections: the
//! user and channel tables, nickname index, per-session senders, rate
//! limiter, and the server's static identity and configuration.
//!
//! # Lock Order (Deadlock Prevention)
//!
//! When acquiring multiple locks, always follow this order:
//!
//! 1. DashMap shard lock (acquired during `.get()` / `.iter()`)
//! 2. Channel `RwLock` (read or write)
//! 3. User `RwLock` (read or write)
//!
//! Never acquire locks in reverse order: holding a User write lock while
//! trying to access a Channel (or iterate the DashMap) can deadlock.

use crate::config::{Config, IdleTimeoutsConfig, OperBlock, SecurityConfig};
use crate::security::{RateLimitManager, XLine};
use crate::state::{Channel, SnoticeBus, User, WhowasEntry};
use dashmap::DashMap;
use hearth_proto::{Command, Message, Prefix, irc_to_lower};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

/// Type alias for user identifiers (UID strings, TS6 format).
pub type Uid = String;

/// Maximum WHOWAS entries retained per nickname.
const MAX_WHOWAS_ENTRIES: usize = 10;

/// The Matrix - central shared state container.
///
/// This is the core state of the IRC server, holding all users, channels,
/// and related data in thread-safe concurrent collections.
pub struct Matrix {
    /// All connected users, keyed by UID.
    pub users: DashMap<Uid, Arc<RwLock<User>>>,
    /// All channels, keyed by lowercased name.
    pub channels: DashMap<String, Arc<RwLock<Channel>>>,
    /// Nickname (lowercased) to UID index.
    pub nicks: DashMap<String, Uid>,
    /// Per-connection outgoing message senders, keyed by UID.
    pub senders: DashMap<Uid, mpsc::Sender<Message>>,
    /// WHOWAS history, keyed by lowercased nickname.
    pub whowas: DashMap<String, Vec<WhowasEntry>>,
    /// Server-level bans (K/G/Z/R-lines), keyed by mask.
    pub xlines: DashMap<String, XLine>,
    /// Outstanding INVITE records: lowercased channel name to the set of
    /// invited UIDs, consumed (removed) once the invited user joins.
    pub invites: DashMap<String, HashSet<Uid>>,

    /// This server's identity.
    pub server_info: ServerInfo,
    /// Server configuration shared with handlers.
    pub config: MatrixConfig,
    /// Rate limiter for flood protection.
    pub rate_limiter: RateLimitManager,
    /// UID generator for newly-accepted connections.
    pub uid_gen: super::UidGenerator,
    /// Oper server-notice bus (snomasks).
    pub snotice: SnoticeBus,
}

/// Configuration accessible to handlers via the Matrix.
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    /// Operator blocks, for OPER authentication.
    pub oper_blocks: Vec<OperBlock>,
    /// Security configuration (cloaking, rate limiting).
    pub security: SecurityConfig,
    /// Global connection password required via PASS before registration, if set.
    pub connection_password: Option<String>,
}

/// This server's identity information.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub network: String,
    pub sid: String,
    pub description: String,
    pub created: i64,
    /// MOTD lines loaded from config at startup.
    pub motd_lines: Vec<String>,
    /// Idle timeout configuration for ping/pong keepalive.
    pub idle_timeouts: IdleTimeoutsConfig,
}

impl Matrix {
    /// Create a new Matrix from server configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            users: DashMap::new(),
            channels: DashMap::new(),
            nicks: DashMap::new(),
            senders: DashMap::new(),
            whowas: DashMap::new(),
            xlines: DashMap::new(),
            invites: DashMap::new(),
            server_info: ServerInfo {
                name: config.server.name.clone(),
                network: config.server.network.clone(),
                sid: config.server.sid.clone(),
                description: config.server.description.clone(),
                created: chrono::Utc::now().timestamp(),
                motd_lines: config.motd.load_lines(),
                idle_timeouts: config.server.idle_timeouts.clone(),
            },
            config: MatrixConfig {
                oper_blocks: config.oper.clone(),
                security: config.security.clone(),
                connection_password: config.server.password.clone(),
            },
            rate_limiter: RateLimitManager::new(config.security.rate_limits.clone()),
            uid_gen: super::UidGenerator::new(config.server.sid.clone()),
            snotice: SnoticeBus::new(),
        }
    }

    /// Register a connection's outgoing message sender.
    pub fn register_sender(&self, uid: &str, sender: mpsc::Sender<Message>) {
        self.senders.insert(uid.to_string(), sender);
    }

    /// Remove a connection's outgoing message sender.
    pub fn unregister_sender(&self, uid: &str) {
        self.senders.remove(uid);
    }

    /// Broadcast a message to every member of a channel, optionally excluding one UID.
    pub async fn broadcast_to_channel(
        &self,
        channel_name: &str,
        msg: Message,
        exclude_uid: Option<&str>,
    ) {
        let channel_lower = irc_to_lower(channel_name);
        let Some(channel) = self.channels.get(&channel_lower) else {
            return;
        };
        let member_uids: Vec<Uid> = {
            let channel = channel.read().await;
            channel.members.keys().cloned().collect()
        };

        for uid in member_uids {
            if exclude_uid == Some(uid.as_str()) {
                continue;
            }
            if let Some(sender) = self.senders.get(&uid) {
                let _ = sender.send(msg.clone()).await;
            }
        }
    }

    /// Disconnect a user from the server.
    ///
    /// This is the canonical kill logic, used by KILL, QUIT, and ping-timeout
    /// enforcement. It removes the user from every channel (broadcasting
    /// QUIT to the remaining members), records a WHOWAS entry, and drops
    /// the sender so the connection task's write loop terminates.
    pub async fn disconnect_user(&self, uid: &str, quit_reason: &str) -> Vec<String> {
        let Some((_, user_arc)) = self.users.remove(uid) else {
            return Vec::new();
        };
        let user = user_arc.read().await;

        let nick_lower = irc_to_lower(&user.nick);
        if self
            .nicks
            .get(&nick_lower)
            .map(|entry| entry.value() == uid)
            .unwrap_or(false)
        {
            self.nicks.remove(&nick_lower);
        }

        self.record_whowas(&user.nick, &user.user, &user.host, &user.realname);

        let quit_msg = Message {
            tags: None,
            prefix: Some(Prefix::new(
                user.nick.clone(),
                user.user.clone(),
                user.visible_host.clone(),
            )),
            command: Command::QUIT(Some(quit_reason.to_string())),
        };

        let channels: Vec<String> = user.channels.iter().cloned().collect();
        for channel_name in &channels {
            if let Some(channel_ref) = self.channels.get(channel_name) {
                let channel_arc = channel_ref.value().clone();
                drop(channel_ref);
                let mut channel = channel_arc.write().await;
                channel.remove_member(uid);
                let should_remove = channel.members.is_empty();

                // Remove from the map before releasing the channel's own
                // lock, so a concurrent JOIN holding the same Arc (fetched
                // before this removal) sees it's been culled once it
                // acquires the write lock and retries against a fresh entry.
                if should_remove {
                    self.channels.remove(channel_name);
                }
                drop(channel);

                self.broadcast_to_channel(channel_name, quit_msg.clone(), None)
                    .await;
            }
        }

        self.rate_limiter.remove_client(&uid.to_string());
        self.senders.remove(uid);

        channels
    }

    /// Record a WHOWAS entry for a disconnecting user, trimming old entries.
    fn record_whowas(&self, nick: &str, user: &str, host: &str, realname: &str) {
        let nick_lower = irc_to_lower(nick);
        let entry = WhowasEntry {
            nick: nick.to_string(),
            user: user.to_string(),
            host: host.to_string(),
            realname: realname.to_string(),
            server: self.server_info.name.clone(),
            logout_time: chrono::Utc::now().timestamp(),
        };

        let mut entries = self.whowas.entry(nick_lower).or_default();
        entries.insert(0, entry);
        entries.truncate(MAX_WHOWAS_ENTRIES);
    }
}
