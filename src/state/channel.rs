//! Channel-related types and state.

use std::collections::HashMap;

/// An entry in a list (bans, excepts, invex, quiets).
#[derive(Debug, Clone)]
pub struct ListEntry {
    pub mask: String,
    pub set_by: String,
    pub set_at: i64,
}

/// Channel topic with metadata.
#[derive(Debug, Clone)]
pub struct Topic {
    pub text: String,
    pub set_by: String,
    pub set_at: i64,
}

/// Member modes (op, voice, etc.).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemberModes {
    pub owner: bool, // +q (~)
    pub admin: bool, // +a (&)
    pub op: bool,    // +o (@)
    pub halfop: bool, // +h (%)
    pub voice: bool, // +v (+)
    /// Timestamp when the user joined the channel.
    pub join_time: Option<i64>,
}

impl MemberModes {
    /// Get the highest prefix character for this member.
    /// Priority: ~ > & > @ > % > +
    pub fn prefix_char(&self) -> Option<char> {
        if self.owner {
            Some('~')
        } else if self.admin {
            Some('&')
        } else if self.op {
            Some('@')
        } else if self.halfop {
            Some('%')
        } else if self.voice {
            Some('+')
        } else {
            None
        }
    }

    /// Get all prefix characters for this member (for multi-prefix CAP).
    /// Returns in order from highest to lowest: ~ & @ % +
    pub fn all_prefix_chars(&self) -> String {
        let mut s = String::with_capacity(5);
        if self.owner {
            s.push('~');
        }
        if self.admin {
            s.push('&');
        }
        if self.op {
            s.push('@');
        }
        if self.halfop {
            s.push('%');
        }
        if self.voice {
            s.push('+');
        }
        s
    }

    /// Check if this member has operator privileges (op or higher).
    pub fn has_op_or_higher(&self) -> bool {
        self.owner || self.admin || self.op
    }

    /// Check if this member has voice or higher (can speak in moderated channel).
    pub fn has_voice_or_higher(&self) -> bool {
        self.owner || self.admin || self.op || self.halfop || self.voice
    }

    /// Check if this member has halfop or higher (can kick, change some modes).
    pub fn has_halfop_or_higher(&self) -> bool {
        self.owner || self.admin || self.op || self.halfop
    }

    /// Numeric privilege rank, highest first: owner=5, admin=4, op=3, halfop=2,
    /// voice=1, none=0. Used to compare two members' standing (e.g. can A kick B).
    pub fn rank(&self) -> u8 {
        if self.owner {
            5
        } else if self.admin {
            4
        } else if self.op {
            3
        } else if self.halfop {
            2
        } else if self.voice {
            1
        } else {
            0
        }
    }
}

/// Channel-wide mode flags, independent of any particular member.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChannelModes {
    pub no_external: bool,    // +n
    pub topic_lock: bool,     // +t
    pub invite_only: bool,    // +i
    pub moderated: bool,      // +m
    pub secret: bool,         // +s
    pub registered_only: bool, // +r
    pub key: Option<String>,  // +k
    pub limit: Option<u32>,   // +l
}

impl ChannelModes {
    /// Render the currently-set simple/parameter modes as an RFC mode string,
    /// e.g. `+ntk secretkey` or `+s`.
    pub fn as_mode_string(&self) -> String {
        let mut flags = String::from("+");
        let mut args = Vec::new();

        if self.no_external {
            flags.push('n');
        }
        if self.topic_lock {
            flags.push('t');
        }
        if self.invite_only {
            flags.push('i');
        }
        if self.moderated {
            flags.push('m');
        }
        if self.secret {
            flags.push('s');
        }
        if self.registered_only {
            flags.push('r');
        }
        if let Some(key) = &self.key {
            flags.push('k');
            args.push(key.clone());
        }
        if let Some(limit) = self.limit {
            flags.push('l');
            args.push(limit.to_string());
        }

        if flags == "+" {
            return String::new();
        }
        if args.is_empty() {
            flags
        } else {
            format!("{} {}", flags, args.join(" "))
        }
    }
}

/// A channel and its members, topic, modes, and lists.
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: String,
    pub members: HashMap<String, MemberModes>,
    pub topic: Option<Topic>,
    pub modes: ChannelModes,
    pub bans: Vec<ListEntry>,
    pub excepts: Vec<ListEntry>,
    pub invex: Vec<ListEntry>,
    pub quiets: Vec<ListEntry>,
    pub extended_bans: Vec<ListEntry>,
    pub created: i64,
}

impl Channel {
    /// Create a new, empty channel.
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: HashMap::new(),
            topic: None,
            modes: ChannelModes::default(),
            bans: Vec::new(),
            excepts: Vec::new(),
            invex: Vec::new(),
            quiets: Vec::new(),
            extended_bans: Vec::new(),
            created: chrono::Utc::now().timestamp(),
        }
    }

    /// Whether the given UID is a member of this channel.
    pub fn is_member(&self, uid: &str) -> bool {
        self.members.contains_key(uid)
    }

    /// Whether the given UID holds op (or higher) privileges.
    pub fn is_op(&self, uid: &str) -> bool {
        self.members
            .get(uid)
            .map(|m| m.has_op_or_higher())
            .unwrap_or(false)
    }

    /// Add a member with the given modes, overwriting any existing entry.
    pub fn add_member(&mut self, uid: String, modes: MemberModes) {
        self.members.insert(uid, modes);
    }

    /// Remove a member from this channel.
    pub fn remove_member(&mut self, uid: &str) {
        self.members.remove(uid);
    }
}
