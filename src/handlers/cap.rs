//! IRCv3 capability negotiation (`CAP`).
//!
//! Supports the `LS`/`LIST`/`REQ`/`END` subcommands against a small, genuinely
//! supported capability set. Unknown subcommands are ignored per the spec's
//! guidance to tolerate forward-compatible extensions.

use super::connection::send_welcome_burst;
use super::{Context, Handler, HandlerResult, get_nick_or_star};
use async_trait::async_trait;
use hearth_proto::{CapSubCommand, Command, Message, MessageRef, Prefix};

/// Capabilities this server actually implements behavior for.
const SUPPORTED_CAPS: &[&str] = &["message-tags", "labeled-response"];

fn cap_reply(server_name: &str, target: &str, sub: CapSubCommand, caps: String) -> Message {
    let params = if caps.contains(' ') {
        Some(format!(":{caps}"))
    } else if caps.is_empty() {
        None
    } else {
        Some(caps)
    };

    Message {
        tags: None,
        prefix: Some(Prefix::ServerName(server_name.to_string())),
        command: Command::CAP(Some(target.to_string()), sub, None, params),
    }
}

/// Handler for the `CAP` command.
pub struct CapHandler;

#[async_trait]
impl Handler for CapHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let server_name = ctx.matrix.server_info.name.clone();
        let target = get_nick_or_star(ctx).await;

        let Some(sub_raw) = msg.arg(0) else {
            return Ok(());
        };
        let Ok(sub) = sub_raw.parse::<CapSubCommand>() else {
            return Ok(());
        };

        match sub {
            CapSubCommand::LS | CapSubCommand::LIST => {
                if !ctx.handshake.registered {
                    ctx.handshake.cap_negotiating = true;
                }

                let caps = if sub == CapSubCommand::LIST {
                    ctx.handshake
                        .capabilities
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(" ")
                } else {
                    SUPPORTED_CAPS.join(" ")
                };

                ctx.sender
                    .send(cap_reply(&server_name, &target, sub, caps))
                    .await?;
            }

            CapSubCommand::REQ => {
                if !ctx.handshake.registered {
                    ctx.handshake.cap_negotiating = true;
                }

                let requested = msg.arg(1).unwrap_or("");
                let wanted: Vec<&str> = requested.split_whitespace().collect();
                let all_supported = wanted.iter().all(|c| SUPPORTED_CAPS.contains(c));

                let ack_sub = if all_supported {
                    CapSubCommand::ACK
                } else {
                    CapSubCommand::NAK
                };

                if all_supported {
                    for cap in &wanted {
                        ctx.handshake.capabilities.insert((*cap).to_string());
                    }
                }

                ctx.sender
                    .send(cap_reply(&server_name, &target, ack_sub, requested.to_string()))
                    .await?;
            }

            CapSubCommand::END => {
                ctx.handshake.cap_negotiating = false;
                if ctx.handshake.can_register() {
                    send_welcome_burst(ctx).await?;
                }
            }

            _ => {}
        }

        Ok(())
    }
}
