//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task. Frames are decoded with
//! [`IrcLineCodec`] into owned [`Message`] values; handlers operate on the
//! borrowed [`MessageRef`] view so a single dispatch path serves both the
//! registration handshake and the steady-state loop.

use crate::handlers::{Context, HandshakeState, Registry};
use crate::state::Matrix;
use futures_util::{SinkExt, StreamExt};
use hearth_proto::codec::IrcLineCodec;
use hearth_proto::{irc_to_lower, Command, Message, MessageRef};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, instrument, warn};

/// A client connection handler.
pub struct Connection {
    uid: String,
    addr: SocketAddr,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
    stream: TcpStream,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(
        uid: String,
        stream: TcpStream,
        addr: SocketAddr,
        matrix: Arc<Matrix>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            uid,
            addr,
            matrix,
            registry,
            stream,
        }
    }

    /// Run the connection read/write loop until the client disconnects.
    #[instrument(skip(self), fields(uid = %self.uid, addr = %self.addr), name = "connection")]
    pub async fn run(self) -> anyhow::Result<()> {
        info!(server = %self.matrix.server_info.name, "Client connected");

        let framed = Framed::new(self.stream, IrcLineCodec::new());
        let (mut sink, mut stream) = framed.split();

        let mut handshake = HandshakeState::default();
        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Message>(32);

        self.matrix.register_sender(&self.uid, outgoing_tx.clone());

        loop {
            tokio::select! {
                incoming = stream.next() => {
                    match incoming {
                        Some(Ok(msg)) => {
                            if !self.matrix.rate_limiter.check_message_rate(&self.uid) {
                                warn!(uid = %self.uid, "message rate limit exceeded");
                                let _ = sink.send(Message::from(Command::ERROR("Excess Flood".into()))).await;
                                break;
                            }

                            let raw = msg.to_string();
                            let msg_ref = match MessageRef::parse(&raw) {
                                Ok(r) => r,
                                Err(e) => {
                                    debug!(error = ?e, "failed to parse message for handler");
                                    continue;
                                }
                            };

                            let mut ctx = Context {
                                uid: &self.uid,
                                matrix: &self.matrix,
                                sender: &outgoing_tx,
                                handshake: &mut handshake,
                                remote_addr: self.addr,
                                label: msg_ref.tag_value("label").map(|v| v.to_string()),
                            };

                            if let Err(e) = self.registry.dispatch(&mut ctx, &msg_ref).await {
                                debug!(error = ?e, "handler error");
                                if matches!(e, crate::handlers::HandlerError::NotRegistered) {
                                    break;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            warn!(error = ?e, "read error");
                            break;
                        }
                        None => {
                            info!("client disconnected");
                            break;
                        }
                    }
                }
                Some(msg) = outgoing_rx.recv() => {
                    if let Err(e) = sink.send(msg).await {
                        warn!(error = ?e, "write error");
                        break;
                    }
                }
            }
        }

        self.cleanup(&handshake).await;

        info!("client disconnected");
        Ok(())
    }

    /// Remove this connection's user from channels, nick index, and sender routing table.
    async fn cleanup(&self, handshake: &HandshakeState) {
        self.matrix.rate_limiter.remove_client(&self.uid);

        if let Some(user) = self.matrix.users.get(&self.uid) {
            let user = user.read().await;
            let channels: Vec<String> = user.channels.iter().cloned().collect();
            drop(user);

            for channel_lower in channels {
                if let Some(channel) = self.matrix.channels.get(&channel_lower) {
                    let mut channel = channel.write().await;
                    channel.remove_member(&self.uid);
                }
            }
        }
        self.matrix.users.remove(&self.uid);

        if let Some(nick) = &handshake.nick {
            let nick_lower = irc_to_lower(nick);
            self.matrix.nicks.remove(&nick_lower);
            info!(nick = %nick, "nick released");
        }

        self.matrix.unregister_sender(&self.uid);
    }
}
