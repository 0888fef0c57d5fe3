//! Loopback server for driving a bot or connection under test.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

const LINE_TIMEOUT: Duration = Duration::from_secs(5);

/// Listens on an ephemeral loopback port.
pub struct FakeServer {
    listener: TcpListener,
    address: String,
}

impl FakeServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr").to_string();
        Self { listener, address }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Accept the next client.
    pub async fn accept(&self) -> Peer {
        let (stream, _) = tokio::time::timeout(LINE_TIMEOUT, self.listener.accept())
            .await
            .expect("accept timed out")
            .expect("accept");
        let (read, write) = stream.into_split();
        Peer {
            lines: BufReader::new(read).lines(),
            write,
        }
    }
}

/// Server side of one accepted connection.
pub struct Peer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    write: OwnedWriteHalf,
}

#[allow(dead_code)]
impl Peer {
    /// Send one line; CRLF is appended.
    pub async fn send(&mut self, line: &str) {
        self.write
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .expect("send");
    }

    /// Send raw bytes as they are.
    pub async fn send_raw(&mut self, data: &[u8]) {
        self.write.write_all(data).await.expect("send raw");
    }

    /// Next line from the client, without its terminator.
    pub async fn recv(&mut self) -> String {
        tokio::time::timeout(LINE_TIMEOUT, self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read")
            .expect("client closed the connection")
            .trim_end_matches('\r')
            .to_string()
    }

    pub async fn expect(&mut self, expected: &str) {
        assert_eq!(self.recv().await, expected);
    }

    /// Assert that nothing arrives for `window`.
    pub async fn expect_silent(&mut self, window: Duration) {
        if let Ok(next) = tokio::time::timeout(window, self.lines.next_line()).await {
            panic!("expected silence, got {next:?}");
        }
    }

    /// Wait for the client to close its end.
    pub async fn expect_closed(&mut self) {
        let next = tokio::time::timeout(LINE_TIMEOUT, self.lines.next_line())
            .await
            .expect("timed out waiting for close");
        assert!(matches!(next, Ok(None) | Err(_)), "unexpected line: {next:?}");
    }

    /// Close the server side.
    pub fn close(self) {
        drop(self);
    }
}
