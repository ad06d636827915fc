// Framed stream socket with the JDWP handshake
//
// A thin layer over a TCP stream: connect walks the resolver's address
// list, the 14-byte handshake runs before any packet I/O, and reads and
// writes get exact-length semantics. The connection engine splits the
// stream so the writer and reader tasks never contend on it.
//
// On broken pipe the kernel may raise SIGPIPE; neutralising it
// process-wide is the embedding binary's job (tokio sockets already send
// with the no-signal flag where the platform offers one).

use std::task::Poll;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::protocol::{JdwpError, JdwpResult, JDWP_HANDSHAKE};

/// Map transport errors that mean "peer went away" onto the connection
/// taxonomy; everything else stays an I/O error.
pub(crate) fn map_closed(e: std::io::Error) -> JdwpError {
    use std::io::ErrorKind;
    match e.kind() {
        ErrorKind::UnexpectedEof
        | ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted => JdwpError::ConnectionClosed,
        _ => JdwpError::Io(e),
    }
}

/// A TCP stream that has completed the JDWP handshake.
#[derive(Debug)]
pub struct JdwpSocket {
    stream: TcpStream,
}

impl JdwpSocket {
    /// Resolve `host`, connect on `port`, and perform the handshake.
    ///
    /// `TcpStream::connect` tries each resolved address until one
    /// accepts; resolution and connect failures surface as
    /// `JdwpError::Connect`.
    pub async fn connect(host: &str, port: u16) -> JdwpResult<Self> {
        debug!("connecting to JDWP endpoint {host}:{port}");
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(JdwpError::Connect)?;
        let _ = stream.set_nodelay(true);

        let mut socket = Self { stream };
        socket.handshake().await?;
        Ok(socket)
    }

    async fn handshake(&mut self) -> JdwpResult<()> {
        self.write_all(JDWP_HANDSHAKE).await?;

        let reply = self.read_exact(JDWP_HANDSHAKE.len()).await?;
        if reply != JDWP_HANDSHAKE {
            warn!("handshake reply mismatch: {:?}", String::from_utf8_lossy(&reply));
            return Err(JdwpError::InvalidHandshake);
        }
        info!("JDWP handshake complete");
        Ok(())
    }

    /// Write every byte of `data`, retrying short writes.
    pub async fn write_all(&mut self, data: &[u8]) -> JdwpResult<()> {
        self.stream.write_all(data).await.map_err(map_closed)?;
        self.stream.flush().await.map_err(map_closed)
    }

    /// Read exactly `len` bytes; EOF beforehand is `ConnectionClosed`.
    pub async fn read_exact(&mut self, len: usize) -> JdwpResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.stream
            .read_exact(&mut buf)
            .await
            .map_err(map_closed)?;
        Ok(buf)
    }

    /// Non-blocking readiness probe: true iff at least one byte (or EOF)
    /// is waiting. Completes immediately in either case.
    pub async fn can_read(&self) -> JdwpResult<bool> {
        std::future::poll_fn(|cx| match self.stream.poll_read_ready(cx) {
            Poll::Ready(Ok(())) => Poll::Ready(Ok(true)),
            Poll::Ready(Err(e)) => Poll::Ready(Err(JdwpError::Io(e))),
            Poll::Pending => Poll::Ready(Ok(false)),
        })
        .await
    }

    /// Hand the two directions to their owning tasks.
    pub fn into_split(self) -> (OwnedReadHalf, OwnedWriteHalf) {
        self.stream.into_split()
    }
}
