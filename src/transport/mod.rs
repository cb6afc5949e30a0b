use crate::protocol::Reply;

/// Line-based duplex connection to one client.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Send one line; the terminator is added by the transport.
    async fn send_line(&mut self, line: &str) -> anyhow::Result<()>;

    /// Next line without its terminator, or `None` once the peer has closed
    /// the connection.
    async fn recv_line(&mut self) -> anyhow::Result<Option<String>>;

    /// Send a reply, one line per line of its text.
    async fn send(&mut self, reply: &Reply) -> anyhow::Result<()> {
        let text = reply.to_string();
        for line in text.lines() {
            self.send_line(line).await?;
        }
        Ok(())
    }
}

pub mod in_memory;
pub mod tcp;
