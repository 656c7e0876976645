//! Server notice bus ("snomasks").
//!
//! Oper-only notices are routed through 52 topics (`a`-`z` local, `A`-`Z`
//! global) that opers subscribe to via user mode `+s<letters>`. Identical
//! consecutive notices on the same topic are coalesced: a repeat of the
//! current pending message just bumps its counter instead of resending, and
//! the pending text is flushed (with a "repeated N times" suffix) either
//! when a different message supersedes it or by the periodic background
//! flush.

use crate::state::Matrix;
use hearth_proto::{Command, Message, Prefix};
use std::sync::Mutex;

struct Pending {
    text: String,
    count: u32,
}

/// Coalescing cache and dispatch for one snomask topic.
struct Topic {
    pending: Mutex<Option<Pending>>,
}

impl Topic {
    fn new() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }
}

/// Routes server notices to opers subscribed to the relevant snomask letter.
pub struct SnoticeBus {
    topics: Vec<Topic>,
}

impl SnoticeBus {
    pub fn new() -> Self {
        Self {
            topics: (0..52).map(|_| Topic::new()).collect(),
        }
    }

    fn index(letter: char) -> Option<usize> {
        match letter {
            'a'..='z' => Some(letter as usize - 'a' as usize),
            'A'..='Z' => Some(26 + letter as usize - 'A' as usize),
            _ => None,
        }
    }

    /// Queue a notice for `letter`. Identical consecutive text is coalesced;
    /// a different message flushes whatever was pending first.
    pub async fn notify(&self, matrix: &Matrix, letter: char, text: impl Into<String>) {
        let Some(idx) = Self::index(letter) else {
            return;
        };
        let text = text.into();

        let flushed = {
            let mut pending = self.topics[idx].pending.lock().unwrap();
            match pending.as_mut() {
                Some(p) if p.text == text => {
                    p.count += 1;
                    None
                }
                Some(_) => pending.replace(Pending { text, count: 1 }),
                None => {
                    *pending = Some(Pending { text, count: 1 });
                    None
                }
            }
        };

        if let Some(flushed) = flushed {
            self.send(matrix, letter, &flushed.text, flushed.count).await;
        }
    }

    /// Flush any lingering coalesced entries. Called periodically (<=5s) so a
    /// topic that only ever receives one message still eventually reaches opers.
    pub async fn flush_all(&self, matrix: &Matrix) {
        for (idx, topic) in self.topics.iter().enumerate() {
            let flushed = topic.pending.lock().unwrap().take();
            if let Some(flushed) = flushed {
                let letter = if idx < 26 {
                    (b'a' + idx as u8) as char
                } else {
                    (b'A' + (idx - 26) as u8) as char
                };
                self.send(matrix, letter, &flushed.text, flushed.count).await;
            }
        }
    }

    async fn send(&self, matrix: &Matrix, letter: char, text: &str, count: u32) {
        let body = if count > 1 {
            format!("{text} (last message repeated {count} times)")
        } else {
            text.to_string()
        };

        let notice = Message {
            tags: None,
            prefix: Some(Prefix::ServerName(matrix.server_info.name.clone())),
            command: Command::NOTICE("$*".to_string(), format!("*** {body}")),
        };

        for entry in matrix.users.iter() {
            let user = entry.value().read().await;
            if user.modes.has_snomask(letter)
                && let Some(sender) = matrix.senders.get(&user.uid)
            {
                let _ = sender.send(notice.clone()).await;
            }
        }
    }
}

impl Default for SnoticeBus {
    fn default() -> Self {
        Self::new()
    }
}
