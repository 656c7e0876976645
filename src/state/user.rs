//! User-related types and state.

use std::collections::HashSet;
use uuid::Uuid;

/// A connected user.
#[derive(Debug)]
pub struct User {
    pub uid: String,
    pub nick: String,
    pub user: String,
    pub realname: String,
    pub host: String,
    /// Real IP address of the connection.
    pub ip: String,
    /// Visible hostname shown to other users (cloaked for privacy).
    pub visible_host: String,
    /// Unique session identifier for this connection (guards against ghost joins).
    pub session_id: Uuid,
    /// Channels this user is in (lowercase names).
    pub channels: HashSet<String>,
    /// User modes.
    pub modes: UserModes,
    /// Account name if identified to NickServ.
    pub account: Option<String>,
    /// Away message if user is marked away (RFC 2812).
    pub away: Option<String>,
    /// IRCv3 capabilities negotiated by this client.
    pub caps: HashSet<String>,
    /// TLS certificate fingerprint (SHA-256 hex) if client presented one.
    pub certfp: Option<String>,
    /// SILENCE list: masks of users to ignore (server-side ignore).
    pub silence_list: HashSet<String>,
    /// ACCEPT list: nicknames allowed to PM even if +R is set (Caller ID).
    pub accept_list: HashSet<String>,
    /// Unix timestamp when this user connected.
    pub created_at: i64,
}

/// User modes.
#[derive(Debug, Default, Clone)]
pub struct UserModes {
    pub invisible: bool,       // +i
    pub wallops: bool,         // +w
    pub oper: bool,            // +o (IRC operator)
    pub registered: bool,      // +r (identified to NickServ)
    pub secure: bool,          // +Z (TLS connection)
    pub registered_only: bool, // +R (only registered users can PM)
    pub no_ctcp: bool,         // +T (block CTCP except ACTION)
    pub bot: bool,             // +B (marked as a bot)
    pub service: bool,         // +S (network service - protected)
    /// +s - Server notices with granular snomasks (c, r, k, o, etc.)
    /// Empty set means no server notices
    pub snomasks: HashSet<char>,
    /// Operator type (e.g., "admin", "oper") for privilege differentiation.
    /// None means not an operator, Some("oper") for regular opers,
    /// Some("admin") for server admins.
    pub oper_type: Option<String>,
}

impl UserModes {
    /// Convert modes to a string like "+iw".
    pub fn as_mode_string(&self) -> String {
        let mut s = String::from("+");
        if self.invisible {
            s.push('i');
        }
        if self.wallops {
            s.push('w');
        }
        if self.oper {
            s.push('o');
        }
        if self.registered {
            s.push('r');
        }
        if self.secure {
            s.push('Z');
        }
        if self.registered_only {
            s.push('R');
        }
        if self.no_ctcp {
            s.push('T');
        }
        if self.bot {
            s.push('B');
        }
        if self.service {
            s.push('S');
        }
        if !self.snomasks.is_empty() {
            s.push('s');
        }
        if s == "+" { "+".to_string() } else { s }
    }

    /// Check if user has a specific snomask.
    pub fn has_snomask(&self, mask: char) -> bool {
        self.snomasks.contains(&mask)
    }
}

impl User {
    /// Create a new user.
    ///
    /// `host` is the connecting IP (or hostname), stored verbatim and also
    /// cloaked with HMAC-SHA256 into `visible_host` using the given secret
    /// and suffix.
    pub fn new(
        uid: String,
        nick: String,
        user: String,
        realname: String,
        host: String,
        cloak_secret: &str,
        cloak_suffix: &str,
    ) -> Self {
        let visible_host = if let Ok(addr) = host.parse::<std::net::IpAddr>() {
            crate::security::cloaking::cloak_ip_hmac_with_suffix(&addr, cloak_secret, cloak_suffix)
        } else {
            crate::security::cloaking::cloak_hostname(&host, cloak_secret)
        };

        Self {
            uid,
            nick,
            user,
            realname,
            ip: host.clone(),
            host,
            visible_host,
            session_id: Uuid::new_v4(),
            channels: HashSet::new(),
            modes: UserModes::default(),
            account: None,
            away: None,
            caps: HashSet::new(),
            certfp: None,
            silence_list: HashSet::new(),
            accept_list: HashSet::new(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// An entry in the WHOWAS history for a disconnected user.
#[derive(Debug, Clone)]
pub struct WhowasEntry {
    /// The user's nickname (case-preserved).
    pub nick: String,
    /// The user's username.
    pub user: String,
    /// The user's hostname.
    pub host: String,
    /// The user's realname.
    pub realname: String,
    /// Server name they were connected to.
    pub server: String,
    /// When they logged out (Unix timestamp in milliseconds).
    pub logout_time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== UserModes::as_mode_string tests ==========

    #[test]
    fn mode_string_default_returns_plus() {
        let modes = UserModes::default();
        assert_eq!(modes.as_mode_string(), "+");
    }

    #[test]
    fn mode_string_invisible_only() {
        let modes = UserModes {
            invisible: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+i");
    }

    #[test]
    fn mode_string_wallops_only() {
        let modes = UserModes {
            wallops: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+w");
    }

    #[test]
    fn mode_string_oper_only() {
        let modes = UserModes {
            oper: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+o");
    }

    #[test]
    fn mode_string_registered_only() {
        let modes = UserModes {
            registered: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+r");
    }

    #[test]
    fn mode_string_secure_only() {
        let modes = UserModes {
            secure: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+Z");
    }

    #[test]
    fn mode_string_registered_only_flag() {
        let modes = UserModes {
            registered_only: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+R");
    }

    #[test]
    fn mode_string_no_ctcp_only() {
        let modes = UserModes {
            no_ctcp: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+T");
    }

    #[test]
    fn mode_string_bot_only() {
        let modes = UserModes {
            bot: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+B");
    }

    #[test]
    fn mode_string_service_only() {
        let modes = UserModes {
            service: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+S");
    }

    #[test]
    fn mode_string_snomasks_appends_s() {
        let mut snomasks = HashSet::new();
        snomasks.insert('c');
        let modes = UserModes {
            snomasks,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+s");
    }

    #[test]
    fn mode_string_multiple_modes() {
        let modes = UserModes {
            invisible: true,
            wallops: true,
            oper: true,
            ..Default::default()
        };
        assert_eq!(modes.as_mode_string(), "+iwo");
    }

    #[test]
    fn mode_string_all_modes_set() {
        let mut snomasks = HashSet::new();
        snomasks.insert('c');
        snomasks.insert('r');
        let modes = UserModes {
            invisible: true,
            wallops: true,
            oper: true,
            registered: true,
            secure: true,
            registered_only: true,
            no_ctcp: true,
            bot: true,
            service: true,
            snomasks,
            oper_type: Some("admin".to_string()),
        };
        assert_eq!(modes.as_mode_string(), "+iworZRTBSs");
    }

    // ========== UserModes::has_snomask tests ==========

    #[test]
    fn has_snomask_empty_returns_false() {
        let modes = UserModes::default();
        assert!(!modes.has_snomask('c'));
        assert!(!modes.has_snomask('r'));
    }

    #[test]
    fn has_snomask_with_c_returns_true_for_c() {
        let mut snomasks = HashSet::new();
        snomasks.insert('c');
        let modes = UserModes {
            snomasks,
            ..Default::default()
        };
        assert!(modes.has_snomask('c'));
        assert!(!modes.has_snomask('r'));
    }

    #[test]
    fn has_snomask_multiple_masks() {
        let mut snomasks = HashSet::new();
        snomasks.insert('c');
        snomasks.insert('r');
        snomasks.insert('k');
        let modes = UserModes {
            snomasks,
            ..Default::default()
        };
        assert!(modes.has_snomask('c'));
        assert!(modes.has_snomask('r'));
        assert!(modes.has_snomask('k'));
        assert!(!modes.has_snomask('o'));
    }
}
