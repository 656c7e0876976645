//! Extended bans and server-level X-lines.
//!
//! # Extended Ban Types
//!
//! | Prefix | Description |
//! |--------|-------------|
//! | `$a:` | Account name |
//! | `$r:` | Realname field |
//! | `$s:` | Server name |
//! | `$c:` | Channel membership |
//! | `$o:` | Operator type |
//! | `$x:` | Certificate fingerprint |
//! | `$z:` | SASL mechanism |
//! | `$U` | Unregistered users |
//!
//! X-lines (K/G/Z/R-lines) are server-level bans configured statically and
//! checked once at registration time, see [`matches_xline`].

use hearth_proto::wildcard_match;
use std::net::IpAddr;

/// Extended Ban types for advanced pattern matching.
///
/// Used for channel bans (+b) to match on user attributes beyond nick!user@host.
#[derive(Debug, Clone)]
pub enum ExtendedBan {
    /// `$a:account` - Matches users logged into a specific account.
    Account(String),
    /// `$r:pattern` - Matches user's realname field.
    Realname(String),
    /// `$s:server` - Matches user's connected server.
    Server(String),
    /// `$c:channel` - Matches users in a specific channel.
    Channel(String),
    /// `$o:type` - Matches IRC operators of a given type.
    Oper(String),
    /// `$x:fingerprint` - Matches SSL certificate fingerprint.
    Certificate(String),
    /// `$z:mechanism` - Matches SASL authentication mechanism.
    Sasl(String),
    /// `$j:pattern` - Matches channel join patterns.
    Join(String),
    /// `$U` - Matches unregistered (not identified) users.
    Unregistered,
}

impl ExtendedBan {
    /// Parse extended ban from string format like "$a:nickname" or "$r:*bot*".
    ///
    /// Returns `None` if the string is not a valid extended ban format.
    pub fn parse(ban_string: &str) -> Option<Self> {
        if !ban_string.starts_with('$') {
            return None;
        }

        let parts: Vec<&str> = ban_string.splitn(2, ':').collect();
        if parts.len() < 2 {
            // Handle special cases like $U (unregistered)
            return match ban_string {
                "$U" => Some(ExtendedBan::Unregistered),
                _ => None,
            };
        }

        let ban_type = parts[0];
        let pattern = parts[1].to_string();

        match ban_type {
            "$a" => Some(ExtendedBan::Account(pattern)),
            "$r" => Some(ExtendedBan::Realname(pattern)),
            "$s" => Some(ExtendedBan::Server(pattern)),
            "$c" => Some(ExtendedBan::Channel(pattern)),
            "$o" => Some(ExtendedBan::Oper(pattern)),
            "$x" => Some(ExtendedBan::Certificate(pattern)),
            "$z" => Some(ExtendedBan::Sasl(pattern)),
            "$j" => Some(ExtendedBan::Join(pattern)),
            _ => None,
        }
    }

}

/// User context for evaluating extended bans.
///
/// Contains all user attributes that extended bans can match against.
#[derive(Debug, Clone)]
pub struct UserContext {
    /// User's current nickname.
    pub nickname: String,
    /// User's username (ident).
    pub username: String,
    /// User's hostname (may be cloaked).
    pub hostname: String,
    /// User's realname (GECOS).
    pub realname: String,
    /// Account name if identified to NickServ.
    pub account: Option<String>,
    /// Server the user is connected to.
    pub server: String,
    /// Channels the user is in (lowercase).
    pub channels: Vec<String>,
    /// Whether the user is an IRC operator.
    pub is_oper: bool,
    /// Type of operator (e.g., "admin", "oper").
    pub oper_type: Option<String>,
    /// TLS certificate fingerprint if available.
    pub certificate_fp: Option<String>,
    /// SASL mechanism used for authentication.
    pub sasl_mechanism: Option<String>,
    /// Whether the user has identified to an account.
    pub is_registered: bool,
    /// Whether the user is connected via TLS.
    pub is_tls: bool,
}

impl UserContext {
    /// Create a context for registration-time checks (after NICK/USER, before welcome).
    ///
    /// Operator status and TLS/certificate/SASL details aren't known yet at
    /// this point in the handshake, so they're left at their defaults; a
    /// richer context gets built once those facts are available (e.g. for
    /// channel ban checks after OPER or STARTTLS).
    pub fn for_registration(
        _ip: IpAddr,
        hostname: String,
        nickname: String,
        username: String,
        realname: String,
        server: String,
        account: Option<String>,
    ) -> Self {
        Self {
            is_registered: account.is_some(),
            nickname,
            username,
            hostname,
            realname,
            account,
            server,
            channels: Vec::new(),
            is_oper: false,
            oper_type: None,
            certificate_fp: None,
            sasl_mechanism: None,
            is_tls: false,
        }
    }
}

/// Server-level ban types, checked once at registration time.
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone)]
pub enum XLine {
    /// K-line: local user ban (nick!user@host mask).
    KLine {
        mask: String,
        reason: String,
        set_by: String,
    },
    /// G-line: network-wide user ban (nick!user@host mask).
    GLine {
        mask: String,
        reason: String,
        set_by: String,
    },
    /// Z-line: IP address ban.
    ZLine {
        ip_mask: String,
        reason: String,
        set_by: String,
    },
    /// R-line: realname (GECOS) pattern ban.
    RLine {
        pattern: String,
        reason: String,
        set_by: String,
    },
}

impl XLine {
    /// Short type code used in ban notices (K, G, Z, R).
    pub fn type_name(&self) -> &'static str {
        match self {
            XLine::KLine { .. } => "K",
            XLine::GLine { .. } => "G",
            XLine::ZLine { .. } => "Z",
            XLine::RLine { .. } => "R",
        }
    }

    /// The reason given for this ban.
    pub fn reason(&self) -> &str {
        match self {
            XLine::KLine { reason, .. }
            | XLine::GLine { reason, .. }
            | XLine::ZLine { reason, .. }
            | XLine::RLine { reason, .. } => reason,
        }
    }
}

/// Check whether an X-line applies to a connecting user.
pub fn matches_xline(xline: &XLine, context: &UserContext) -> bool {
    let user_mask = format!(
        "{}!{}@{}",
        context.nickname, context.username, context.hostname
    );
    match xline {
        XLine::KLine { mask, .. } | XLine::GLine { mask, .. } => {
            wildcard_match(mask, &user_mask)
        }
        XLine::ZLine { ip_mask, .. } => wildcard_match(ip_mask, &context.hostname),
        XLine::RLine { pattern, .. } => wildcard_match(pattern, &context.realname),
    }
}

/// Check if an extended ban matches a user context.
pub fn matches_extended_ban(ban: &ExtendedBan, context: &UserContext) -> bool {
    match ban {
        ExtendedBan::Account(pattern) => {
            if let Some(account) = &context.account {
                wildcard_match(pattern, account)
            } else {
                false
            }
        }
        ExtendedBan::Realname(pattern) => wildcard_match(pattern, &context.realname),
        ExtendedBan::Server(pattern) => wildcard_match(pattern, &context.server),
        ExtendedBan::Channel(pattern) => context
            .channels
            .iter()
            .any(|chan| wildcard_match(pattern, chan)),
        ExtendedBan::Oper(pattern) => {
            if context.is_oper {
                if let Some(oper_type) = &context.oper_type {
                    wildcard_match(pattern, oper_type)
                } else {
                    pattern == "*" // Match any oper if no specific type
                }
            } else {
                false
            }
        }
        ExtendedBan::Certificate(pattern) => {
            if let Some(cert_fp) = &context.certificate_fp {
                wildcard_match(pattern, cert_fp)
            } else {
                false
            }
        }
        ExtendedBan::Sasl(pattern) => {
            if let Some(sasl) = &context.sasl_mechanism {
                wildcard_match(pattern, sasl)
            } else {
                false
            }
        }
        ExtendedBan::Join(pattern) => {
            // Match against nickname for join patterns
            wildcard_match(pattern, &context.nickname)
        }
        ExtendedBan::Unregistered => !context.is_registered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> UserContext {
        UserContext {
            nickname: "TestUser".to_string(),
            username: "testuser".to_string(),
            hostname: "example.com".to_string(),
            realname: "Test User".to_string(),
            account: Some("testaccount".to_string()),
            server: "irc.straylight.net".to_string(),
            channels: vec!["#test".to_string(), "#rust".to_string()],
            is_oper: false,
            oper_type: None,
            certificate_fp: None,
            sasl_mechanism: Some("PLAIN".to_string()),
            is_tls: false,
            is_registered: true,
        }
    }

    #[test]
    fn test_extended_ban_parsing() {
        assert!(matches!(
            ExtendedBan::parse("$a:testaccount"),
            Some(ExtendedBan::Account(_))
        ));
        assert!(matches!(
            ExtendedBan::parse("$r:*bot*"),
            Some(ExtendedBan::Realname(_))
        ));
        assert!(matches!(
            ExtendedBan::parse("$U"),
            Some(ExtendedBan::Unregistered)
        ));
        assert!(ExtendedBan::parse("not-a-ban").is_none());
        assert!(ExtendedBan::parse("$x").is_none()); // Missing pattern
    }



    #[test]
    fn test_account_ban_match() {
        let context = test_context();
        let ban = ExtendedBan::Account("testaccount".to_string());
        assert!(matches_extended_ban(&ban, &context));

        let ban_nomatch = ExtendedBan::Account("otheraccount".to_string());
        assert!(!matches_extended_ban(&ban_nomatch, &context));
    }

    #[test]
    fn test_unregistered_ban() {
        let mut context = test_context();
        let ban = ExtendedBan::Unregistered;

        // Registered user should not match
        assert!(!matches_extended_ban(&ban, &context));

        // Unregistered user should match
        context.is_registered = false;
        assert!(matches_extended_ban(&ban, &context));
    }

    #[test]
    fn test_channel_ban() {
        let context = test_context();
        let ban = ExtendedBan::Channel("#test".to_string());
        assert!(matches_extended_ban(&ban, &context));

        let ban_nomatch = ExtendedBan::Channel("#secret".to_string());
        assert!(!matches_extended_ban(&ban_nomatch, &context));
    }

    #[test]
    fn test_for_registration_unregistered_by_default() {
        let ctx = UserContext::for_registration(
            "127.0.0.1".parse().unwrap(),
            "127.0.0.1".to_string(),
            "Newbie".to_string(),
            "newbie".to_string(),
            "New User".to_string(),
            "irc.straylight.net".to_string(),
            None,
        );
        assert!(!ctx.is_registered);
        assert!(!ctx.is_oper);
    }

    #[test]
    fn test_kline_matches_hostmask() {
        let context = test_context();
        let kline = XLine::KLine {
            mask: "*!*@example.com".to_string(),
            reason: "banned".to_string(),
            set_by: "admin".to_string(),
        };
        assert!(matches_xline(&kline, &context));

        let nomatch = XLine::KLine {
            mask: "*!*@other.com".to_string(),
            reason: "banned".to_string(),
            set_by: "admin".to_string(),
        };
        assert!(!matches_xline(&nomatch, &context));
    }

    #[test]
    fn test_rline_matches_realname() {
        let context = test_context();
        let rline = XLine::RLine {
            pattern: "*Test*".to_string(),
            reason: "spam".to_string(),
            set_by: "admin".to_string(),
        };
        assert!(matches_xline(&rline, &context));
    }
}
