//! Helper functions shared across IRC command handlers.
//!
//! User lookup helpers (`resolve_nick_to_uid`, `get_nick_or_star`, `require_oper`)
//! remain in `mod.rs` because they depend on `Context`, which is defined there.

use hearth_proto::{Command, Message, Prefix, Response, Tag};

pub use hearth_proto::matches_hostmask;

/// Helper to create a server reply message (numeric response).
pub fn server_reply(server_name: &str, response: Response, params: Vec<String>) -> Message {
    Message {
        tags: None,
        prefix: Some(Prefix::ServerName(server_name.to_string())),
        command: Command::Response(response, params),
    }
}

/// Helper to create a server NOTICE message.
pub fn server_notice<T: Into<String>>(server_name: &str, target: &str, text: T) -> Message {
    Message::notice(target, text).with_prefix(Prefix::ServerName(server_name.to_string()))
}

/// Attach a label tag to a message if one was provided.
pub fn with_label(msg: Message, label: Option<&str>) -> Message {
    match label {
        Some(value) => msg.with_tag("label", Some(value)),
        None => msg,
    }
}

/// Create a labeled ACK response for commands that normally produce no output.
///
/// Per the IRCv3 labeled-response spec, servers MUST respond with ACK when a
/// labeled command would normally produce no response (e.g. PONG).
pub fn labeled_ack(server_name: &str, label: &str) -> Message {
    Message {
        tags: Some(vec![Tag(
            std::borrow::Cow::Borrowed("label"),
            Some(label.to_string()),
        )]),
        prefix: Some(Prefix::ServerName(server_name.to_string())),
        command: Command::ACK,
    }
}

/// Helper to create a user prefix (nick!user@host).
#[inline]
pub fn user_prefix(nick: &str, user: &str, host: &str) -> Prefix {
    Prefix::new(nick, user, host)
}
