//! TCP line transport.
//!
//! One [`LineStream`] per channel per connection attempt. The stream owns
//! its socket; dropping it closes the connection, which is how the
//! supervisor guarantees every socket is released exactly once per attempt
//! even when a channel is cancelled mid-read. There is no retry at this
//! layer; retry policy lives in [`crate::session`].

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::error::{Error, Result};

/// A newline-framed UTF-8 text connection.
pub struct LineStream {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    line_buf: String,
}

impl LineStream {
    /// Open a TCP connection to `host:port`.
    ///
    /// DNS failures and refused connections surface as [`Error::Io`],
    /// which the supervisor treats as retryable.
    pub async fn open(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        tracing::debug!(host, port, "tcp connected");
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            line_buf: String::new(),
        })
    }

    /// Read one line, trailing newline intact.
    ///
    /// EOF (the server closed the connection) maps to
    /// [`Error::ConnectionClosed`].
    pub async fn read_line(&mut self) -> Result<String> {
        self.line_buf.clear();
        let n = self.reader.read_line(&mut self.line_buf).await?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
        Ok(self.line_buf.clone())
    }

    /// Frame `text` as a single protocol line and flush it.
    ///
    /// `text` must already be newline-free; an empty string produces the
    /// bare-newline keep-alive frame.
    pub async fn write_line(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    async fn listener() -> (TcpListener, String, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr.ip().to_string(), addr.port())
    }

    #[tokio::test]
    async fn read_line_keeps_trailing_newline() {
        let (listener, host, port) = listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"Hello\nWorld\n").await.unwrap();
        });

        let mut stream = LineStream::open(&host, port).await.unwrap();
        assert_eq!(stream.read_line().await.unwrap(), "Hello\n");
        assert_eq!(stream.read_line().await.unwrap(), "World\n");
    }

    #[tokio::test]
    async fn eof_is_connection_closed() {
        let (listener, host, port) = listener().await;
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut stream = LineStream::open(&host, port).await.unwrap();
        assert!(matches!(
            stream.read_line().await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn write_line_frames_and_flushes() {
        let (listener, host, port) = listener().await;
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64];
            let n = socket.read(&mut buf).await.unwrap();
            buf.truncate(n);
            buf
        });

        let mut stream = LineStream::open(&host, port).await.unwrap();
        stream.write_line("hi there").await.unwrap();
        assert_eq!(server.await.unwrap(), b"hi there\n");
    }

    #[tokio::test]
    async fn connect_refused_is_io() {
        // Bind then drop to get a port nothing is listening on.
        let (listener, host, port) = listener().await;
        drop(listener);
        assert!(matches!(
            LineStream::open(&host, port).await,
            Err(Error::Io(_))
        ));
    }
}
