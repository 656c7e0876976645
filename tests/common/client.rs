//! Test IRC client.
//!
//! Provides an IRC client for integration testing that can send commands
//! and assert on received responses.

use hearth_proto::{Command, Message};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A test IRC client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    #[allow(dead_code)]
    nick: String,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str, nick: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            nick: nick.to_string(),
        })
    }

    /// Send a command, serialized via the wire codec.
    pub async fn send(&mut self, cmd: Command) -> anyhow::Result<()> {
        let msg = Message::from(cmd);
        self.writer.write_all(msg.to_string().as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a raw IRC line.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single message from the server.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.recv_timeout(Duration::from_secs(15)).await
    }

    /// Receive a message with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        line.trim_end()
            .parse::<Message>()
            .map_err(|e| anyhow::anyhow!("parse error: {}", e))
    }

    /// Receive messages until the given predicate returns true.
    #[allow(dead_code)]
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Message>>
    where
        F: FnMut(&Message) -> bool,
    {
        let mut messages = Vec::new();
        loop {
            let msg = self.recv().await?;
            let done = predicate(&msg);
            messages.push(msg);
            if done {
                break;
            }
        }
        Ok(messages)
    }

    /// Register with the server (NICK + USER), waiting for RPL_WELCOME (001).
    #[allow(dead_code)]
    pub async fn register(&mut self) -> anyhow::Result<()> {
        self.send_raw(&format!("NICK {}", self.nick)).await?;
        self.send_raw(&format!("USER {} 0 * :Test User {}", self.nick, self.nick))
            .await?;

        let messages = self
            .recv_until(
                |msg| matches!(&msg.command, Command::Response(resp, _) if resp.code() == 1),
            )
            .await?;

        if messages
            .iter()
            .any(|msg| matches!(&msg.command, Command::Response(resp, _) if resp.code() == 1))
        {
            Ok(())
        } else {
            anyhow::bail!("registration failed: no RPL_WELCOME received")
        }
    }

    /// Join a channel.
    #[allow(dead_code)]
    pub async fn join(&mut self, channel: &str) -> anyhow::Result<()> {
        self.send_raw(&format!("JOIN {}", channel)).await
    }

    /// Send a PRIVMSG.
    #[allow(dead_code)]
    pub async fn privmsg(&mut self, target: &str, text: &str) -> anyhow::Result<()> {
        self.send_raw(&format!("PRIVMSG {} :{}", target, text)).await
    }

    /// Send QUIT and close the connection.
    #[allow(dead_code)]
    pub async fn quit(&mut self, reason: Option<&str>) -> anyhow::Result<()> {
        match reason {
            Some(r) => self.send_raw(&format!("QUIT :{}", r)).await,
            None => self.send_raw("QUIT").await,
        }
    }

    /// Part a channel.
    #[allow(dead_code)]
    pub async fn part(&mut self, channel: &str, reason: Option<&str>) -> anyhow::Result<()> {
        match reason {
            Some(r) => self.send_raw(&format!("PART {} :{}", channel, r)).await,
            None => self.send_raw(&format!("PART {}", channel)).await,
        }
    }

    /// Set a channel topic.
    #[allow(dead_code)]
    pub async fn topic(&mut self, channel: &str, topic: &str) -> anyhow::Result<()> {
        self.send_raw(&format!("TOPIC {} :{}", channel, topic)).await
    }

    /// Grant +o to a user in a channel via MODE.
    #[allow(dead_code)]
    pub async fn mode_channel_op(&mut self, channel: &str, nick: &str) -> anyhow::Result<()> {
        self.send_raw(&format!("MODE {} +o {}", channel, nick)).await
    }
}
