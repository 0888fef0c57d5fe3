//! Server connection: dial or adopt, then split into reader and writer.
//!
//! ```text
//! Connection::dial / Connection::adopt
//!        │
//!        └── split() ──► LineReader      (owned by the read loop)
//!                    └─► ConnectionWriter (cloned into every handler)
//! ```
//!
//! Both halves share one idle deadline. Every successful read or write
//! pushes it forward by the idle timeout; once it passes, the next read or
//! write fails with [`ConnectionError::TimedOut`].

use super::{ConnectionError, Stream};
use autimaat_proto::LineCodec;
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::ClientConfig;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Idle window after which the peer is considered dead.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// An open connection to the server, before it is split.
pub struct Connection {
    stream: Stream,
    idle_timeout: Duration,
}

impl Connection {
    /// Open a fresh connection to `address` (`host:port`).
    ///
    /// With a TLS config the stream is wrapped in a client handshake; the
    /// host part of the address is used as the server name.
    pub async fn dial(
        address: &str,
        tls: Option<Arc<ClientConfig>>,
    ) -> Result<Self, ConnectionError> {
        let tcp = TcpStream::connect(address)
            .await
            .map_err(|e| ConnectionError::ConnectFailed(format!("{address}: {e}")))?;
        info!(%address, tls = tls.is_some(), "Connected");
        Self::wrap(tcp, address, tls).await
    }

    /// Rebuild a connection from an inherited, already connected socket.
    pub async fn adopt(
        fd: OwnedFd,
        address: &str,
        tls: Option<Arc<ClientConfig>>,
    ) -> Result<Self, ConnectionError> {
        let std_stream = std::net::TcpStream::from(fd);
        std_stream
            .set_nonblocking(true)
            .map_err(|e| ConnectionError::ConnectFailed(format!("inherited socket: {e}")))?;
        let tcp = TcpStream::from_std(std_stream)
            .map_err(|e| ConnectionError::ConnectFailed(format!("inherited socket: {e}")))?;
        let peer = tcp
            .peer_addr()
            .map_err(|e| ConnectionError::ConnectFailed(format!("inherited socket: {e}")))?;
        info!(%address, %peer, tls = tls.is_some(), "Adopted inherited connection");
        Self::wrap(tcp, address, tls).await
    }

    async fn wrap(
        tcp: TcpStream,
        address: &str,
        tls: Option<Arc<ClientConfig>>,
    ) -> Result<Self, ConnectionError> {
        if let Err(e) = enable_keepalive(&tcp) {
            warn!(error = %e, "Failed to enable TCP keepalive");
        }

        let stream = match tls {
            Some(config) => Stream::Tls(Box::new(handshake(tcp, address, config).await?)),
            None => Stream::Plain(tcp),
        };

        Ok(Self {
            stream,
            idle_timeout: IDLE_TIMEOUT,
        })
    }

    /// Replace the idle timeout. Mostly useful in tests.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// True if the stream is TLS-wrapped.
    pub fn is_tls(&self) -> bool {
        self.stream.is_tls()
    }

    /// Descriptor of the underlying socket, for handoff.
    pub fn raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }

    /// Split into the read side and a cloneable write side.
    pub fn split(self) -> (LineReader, ConnectionWriter) {
        let fd = self.stream.as_raw_fd();
        let shared = Arc::new(Shared {
            deadline: IdleDeadline::new(self.idle_timeout),
            closed: CancellationToken::new(),
            fd,
        });
        let (read_half, write_half) = tokio::io::split(self.stream);

        let reader = LineReader {
            frames: FramedRead::new(read_half, LineCodec::new()),
            shared: Arc::clone(&shared),
        };
        let writer = ConnectionWriter {
            half: Arc::new(tokio::sync::Mutex::new(Some(write_half))),
            shared,
        };
        (reader, writer)
    }
}

async fn handshake(
    tcp: TcpStream,
    address: &str,
    config: Arc<ClientConfig>,
) -> Result<tokio_rustls::client::TlsStream<TcpStream>, ConnectionError> {
    let host = address
        .rsplit_once(':')
        .map_or(address, |(host, _port)| host)
        .trim_start_matches('[')
        .trim_end_matches(']');
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| ConnectionError::Tls(format!("invalid server name {host}: {e}")))?;

    TlsConnector::from(config)
        .connect(server_name, tcp)
        .await
        .map_err(|e| ConnectionError::ConnectFailed(format!("TLS handshake with {address}: {e}")))
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

/// State shared by the reader and all writers.
struct Shared {
    deadline: IdleDeadline,
    closed: CancellationToken,
    fd: RawFd,
}

/// Rolling deadline refreshed by every successful read or write.
struct IdleDeadline {
    timeout: Duration,
    at: Mutex<Instant>,
}

impl IdleDeadline {
    fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            at: Mutex::new(Instant::now() + timeout),
        }
    }

    fn get(&self) -> Instant {
        *self.at.lock()
    }

    fn touch(&self) {
        *self.at.lock() = Instant::now() + self.timeout;
    }
}

/// Read side of a connection. Owned by the single read loop.
pub struct LineReader {
    frames: FramedRead<ReadHalf<Stream>, LineCodec>,
    shared: Arc<Shared>,
}

impl LineReader {
    /// Wait for the next complete line, trimmed of surrounding whitespace.
    ///
    /// Returns [`ConnectionError::Closed`] when the peer closes the stream
    /// or [`ConnectionWriter::close`] is called, and
    /// [`ConnectionError::TimedOut`] when the idle deadline passes.
    pub async fn read_line(&mut self) -> Result<String, ConnectionError> {
        loop {
            if self.shared.closed.is_cancelled() {
                return Err(ConnectionError::Closed);
            }

            let deadline = self.shared.deadline.get();
            if Instant::now() >= deadline {
                return Err(ConnectionError::TimedOut(self.shared.deadline.timeout));
            }
            let next = tokio::select! {
                _ = self.shared.closed.cancelled() => return Err(ConnectionError::Closed),
                next = tokio::time::timeout_at(deadline, self.frames.next()) => next,
            };

            match next {
                Ok(Some(Ok(line))) => {
                    self.shared.deadline.touch();
                    return Ok(line);
                }
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(None) => return Err(ConnectionError::Closed),
                // A write may have moved the deadline while we were waiting.
                Err(_) if self.shared.deadline.get() > deadline => continue,
                Err(_) => return Err(ConnectionError::TimedOut(self.shared.deadline.timeout)),
            }
        }
    }
}

/// Write side of a connection.
///
/// Clones share one async mutex over the write half, so each line is
/// written whole and concurrent callers never interleave bytes.
#[derive(Clone)]
pub struct ConnectionWriter {
    half: Arc<tokio::sync::Mutex<Option<WriteHalf<Stream>>>>,
    shared: Arc<Shared>,
}

impl ConnectionWriter {
    /// Write one already framed line in full.
    ///
    /// Fails with [`ConnectionError::TimedOut`] once the idle deadline has
    /// passed, even if the socket would still accept the bytes.
    pub async fn write_line(&self, line: &[u8]) -> Result<(), ConnectionError> {
        let mut guard = self.half.lock().await;
        let half = guard.as_mut().ok_or(ConnectionError::Closed)?;

        let deadline = self.shared.deadline.get();
        if Instant::now() >= deadline {
            return Err(ConnectionError::TimedOut(self.shared.deadline.timeout));
        }
        let write = async {
            half.write_all(line).await?;
            half.flush().await
        };

        match tokio::time::timeout_at(deadline, write).await {
            Ok(Ok(())) => {
                self.shared.deadline.touch();
                Ok(())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ConnectionError::TimedOut(self.shared.deadline.timeout)),
        }
    }

    /// Close the connection.
    ///
    /// Safe to call more than once. Pending and future reads return
    /// [`ConnectionError::Closed`]; the socket is released once the reader
    /// is dropped as well. No shutdown is sent, so a descriptor already
    /// handed to a child process stays usable there.
    pub async fn close(&self) {
        if self.shared.closed.is_cancelled() {
            return;
        }
        self.shared.closed.cancel();
        if self.half.lock().await.take().is_some() {
            debug!(fd = self.shared.fd, "Connection closed");
        }
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.is_cancelled()
    }

    /// Descriptor of the underlying socket, for handoff.
    pub fn raw_fd(&self) -> RawFd {
        self.shared.fd
    }
}
