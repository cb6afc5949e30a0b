use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::transport::Transport;

/// Longest client line accepted by default, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Timeout for writing one line.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TcpTransport {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    max_line_len: usize,
    idle_timeout: Option<Duration>,
}

fn map_io_error(e: std::io::Error, op: &str) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::ConnectionAborted => anyhow::anyhow!("Connection closed by peer"),
        _ => anyhow::anyhow!("{} error: {}", op, e),
    }
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_MAX_LINE_LEN, None)
    }

    /// `idle_timeout` bounds how long [`Transport::recv_line`] waits for the
    /// client; `None` waits forever.
    pub fn with_config(
        stream: TcpStream,
        max_line_len: usize,
        idle_timeout: Option<Duration>,
    ) -> Self {
        let (read, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer,
            max_line_len,
            idle_timeout,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    async fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut buf = Vec::new();
        // One byte over the limit tells an overlong line from a full one.
        let limit = (self.max_line_len as u64).saturating_add(1);
        let n = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| map_io_error(e, "Read"))?;
        if n == 0 {
            return Ok(None);
        }
        if buf.last() != Some(&b'\n') && n as u64 >= limit {
            return Err(anyhow::anyhow!(
                "Line too long (max: {} bytes)",
                self.max_line_len
            ));
        }
        let line = String::from_utf8(buf)
            .map_err(|_| anyhow::anyhow!("Line is not valid UTF-8"))?;
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        let send_op = async {
            self.writer
                .write_all(line.as_bytes())
                .await
                .map_err(|e| map_io_error(e, "Write"))?;
            self.writer
                .write_all(b"\n")
                .await
                .map_err(|e| map_io_error(e, "Write"))?;
            anyhow::Ok(())
        };
        timeout(SEND_TIMEOUT, send_op)
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", SEND_TIMEOUT))?
    }

    async fn recv_line(&mut self) -> anyhow::Result<Option<String>> {
        match self.idle_timeout {
            Some(limit) => timeout(limit, self.read_line())
                .await
                .map_err(|_| anyhow::anyhow!("Connection idle for {:?}", limit))?,
            None => self.read_line().await,
        }
    }
}
