//! # hearth-proto
//!
//! A Rust library for parsing and serializing IRC protocol messages,
//! with full support for IRCv3 extensions.
//!
//! ## Features
//!
//! - IRC message parsing with tags, prefixes, commands, and parameters
//! - IRCv3 capability negotiation and message tags
//! - Zero-copy parsing with borrowed message types
//! - Optional Tokio integration for async networking
//! - User and channel mode parsing
//! - ISUPPORT (RPL_ISUPPORT) parsing
//! - Convenient message construction with builder pattern

#![deny(clippy::all)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Creating IRC Messages
//!
//! ```rust
//! use hearth_proto::{Message, prefix::Prefix};
//!
//! // Basic message construction
//! let privmsg = Message::privmsg("#rust", "Hello, world!");
//! let notice = Message::notice("nick", "Server notice");
//! let join = Message::join("#channel");
//!
//! // Messages with IRCv3 tags and prefixes
//! let tagged_msg = Message::privmsg("#dev", "Tagged message")
//!     .with_tag("time", Some("2023-01-01T12:00:00Z"))
//!     .with_tag("msgid", Some("abc123"))
//!     .with_prefix(Prefix::new_from_str("bot!bot@example.com"));
//!
//! println!("{}", tagged_msg); // Serializes to IRC protocol format
//! ```
//!
//! ### Parsing IRC Messages
//!
//! ```rust
//! use hearth_proto::Message;
//!
//! let raw = "@time=2023-01-01T12:00:00Z :nick!user@host PRIVMSG #channel :Hello!";
//! let message: Message = raw.parse().expect("Valid IRC message");
//!
//! if let Some(tags) = &message.tags {
//!     println!("Message has {} tags", tags.len());
//! }
//! ```
//!
//! ## Acknowledgments
//!
//! This project was inspired by the architectural patterns established by
//! [Aaron Weiss (aatxe)](https://github.com/aatxe) in the
//! [irc](https://github.com/aatxe/irc) crate. We are grateful for Aaron's
//! foundational work on IRC protocol handling in Rust.

pub mod caps;
pub mod casemap;
pub mod chan;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod command;
pub mod encode;
pub mod error;
pub mod isupport;
pub mod message;
pub mod mode;
pub mod nick;
pub mod prefix;
pub mod response;
pub mod util;

pub use self::caps::{Capability, NegotiationVersion};
pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::chan::ChannelExt;
#[cfg(feature = "tokio")]
pub use self::codec::IrcLineCodec;
pub use self::command::{
    BatchSubCommand, CapSubCommand, ChatHistorySubCommand, Command, CommandRef, MessageReference,
};
pub use self::encode::IrcEncode;
pub use self::isupport::{
    ChanModes, Isupport, IsupportBuilder, IsupportEntry, MaxList, PrefixSpec, TargMax,
};
pub use self::message::{Message, MessageRef, Tag};
pub use self::mode::{ChannelMode, Mode, UserMode};
pub use self::nick::{NickExt, DEFAULT_NICK_MAX_LEN};
pub use self::prefix::{Prefix, PrefixRef};
pub use self::response::Response;
pub use self::util::{matches_hostmask, wildcard_match};
