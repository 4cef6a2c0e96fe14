//! Connection management.
//!
//! The protocol is strictly half-duplex: every query line is answered by
//! exactly one reply line, in order, with no request ids to correlate them.
//! An [`Exchange`] holds the stream exclusively so that a command and the
//! reply it expects cannot interleave with another caller's.

use crate::error::ClientError;
use rjam_protocol::{flatten, Argument, Encoder, LineDecoder, Opcode, Scalar, FAIL_REPLY};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard};

/// Default read buffer size (4 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4 * 1024;

/// Minimum read buffer size (256 bytes).
pub const MIN_READ_BUFFER_SIZE: usize = 256;

/// Maximum read buffer size (1 MiB).
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// A bidirectional byte stream the connection can run over.
pub trait LineStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> LineStream for T {}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server host name or IP address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// How long to wait for a reply line.
    pub request_timeout: Duration,
    /// Read buffer size for socket reads.
    pub read_buffer_size: usize,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.clamp(MIN_READ_BUFFER_SIZE, MAX_READ_BUFFER_SIZE);
        self
    }

    /// Returns `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(rjam_protocol::DEFAULT_HOST, rjam_protocol::DEFAULT_PORT)
    }
}

struct Io {
    stream: Box<dyn LineStream>,
    decoder: LineDecoder,
    read_buf: Vec<u8>,
    /// Last command line written, reported when the server answers `Fail`.
    last_sent: String,
}

impl Io {
    async fn read_line(&mut self) -> Result<String, ClientError> {
        loop {
            if let Some(line) = self.decoder.decode_line()? {
                return Ok(line);
            }

            let n = self.stream.read(&mut self.read_buf).await?;
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            self.decoder.extend(&self.read_buf[..n]);
        }
    }
}

/// A connection to a game server.
pub struct Connection {
    config: ConnectionConfig,
    io: Mutex<Option<Io>>,
    connected: AtomicBool,
}

impl Connection {
    /// Creates a new connection (not yet connected).
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            io: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Connects to the server over TCP.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let addr = self.config.addr();
        tracing::debug!("Connecting to {}...", addr);

        let stream = tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                tracing::debug!("Connection timeout");
                ClientError::Timeout
            })?
            .map_err(|e| {
                tracing::debug!("Connection failed: {}", e);
                ClientError::Io(e)
            })?;

        // Commands are single short lines; don't let Nagle hold them back.
        stream.set_nodelay(true).ok();

        self.attach(stream).await;
        tracing::info!("Connected to {}", addr);
        Ok(())
    }

    /// Runs the connection over an already established stream.
    pub async fn attach<S: LineStream + 'static>(&self, stream: S) {
        *self.io.lock().await = Some(Io {
            stream: Box::new(stream),
            decoder: LineDecoder::new(),
            read_buf: vec![0u8; self.config.read_buffer_size],
            last_sent: String::new(),
        });
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Takes exclusive use of the stream until the returned exchange is dropped.
    pub async fn lock(&self) -> Result<Exchange<'_>, ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        let io = self.io.lock().await;
        if io.is_none() {
            return Err(ClientError::NotConnected);
        }
        Ok(Exchange { io, conn: self })
    }

    /// Sends a command without waiting for a reply.
    pub async fn send(&self, opcode: Opcode, args: &[Argument]) -> Result<(), ClientError> {
        self.lock().await?.send(opcode, args).await
    }

    /// Sends a command whose arguments are already flattened.
    pub async fn send_flat(&self, opcode: Opcode, args: &[Scalar]) -> Result<(), ClientError> {
        self.lock().await?.send_flat(opcode, args).await
    }

    /// Sends a query and returns its reply line.
    pub async fn send_receive(
        &self,
        opcode: Opcode,
        args: &[Argument],
    ) -> Result<String, ClientError> {
        self.lock().await?.send_receive(opcode, args).await
    }

    /// Sends a query whose arguments are already flattened and returns its reply line.
    pub async fn send_receive_flat(
        &self,
        opcode: Opcode,
        args: &[Scalar],
    ) -> Result<String, ClientError> {
        self.lock().await?.send_receive_flat(opcode, args).await
    }

    /// Reads the next pending reply line.
    pub async fn receive(&self) -> Result<String, ClientError> {
        self.lock().await?.receive().await
    }

    /// Returns whether the connection is established.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Closes the connection.
    pub async fn close(&self) -> Result<(), ClientError> {
        tracing::debug!("Closing connection...");
        self.connected.store(false, Ordering::SeqCst);

        if let Some(mut io) = self.io.lock().await.take() {
            let _ = io.stream.shutdown().await;
        }

        tracing::debug!("Connection closed");
        Ok(())
    }
}

/// Exclusive use of a connection's stream.
pub struct Exchange<'a> {
    io: MutexGuard<'a, Option<Io>>,
    conn: &'a Connection,
}

impl Exchange<'_> {
    fn io(&mut self) -> Result<&mut Io, ClientError> {
        self.io.as_mut().ok_or(ClientError::NotConnected)
    }

    /// Drops the stream when a reply can no longer be matched to its query.
    ///
    /// After a timeout the late reply may still arrive; the next query would
    /// read it as its own, so the connection is given up instead.
    fn check<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if matches!(
            result,
            Err(ClientError::ConnectionClosed) | Err(ClientError::Timeout)
        ) {
            self.conn.connected.store(false, Ordering::SeqCst);
            *self.io = None;
        }
        result
    }

    /// Sends a command without waiting for a reply.
    pub async fn send(&mut self, opcode: Opcode, args: &[Argument]) -> Result<(), ClientError> {
        let flat = flatten(args)?;
        self.send_flat(opcode, &flat).await
    }

    /// Sends a command whose arguments are already flattened.
    pub async fn send_flat(&mut self, opcode: Opcode, args: &[Scalar]) -> Result<(), ClientError> {
        let line = Encoder::encode(opcode, args)?;
        tracing::debug!("-> {}", line);

        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');

        let io = self.io()?;
        io.stream.write_all(&bytes).await?;
        io.stream.flush().await?;
        io.last_sent = line;
        Ok(())
    }

    /// Reads the next reply line.
    ///
    /// A `Fail` line is turned into [`ClientError::RemoteFailure`].
    pub async fn receive(&mut self) -> Result<String, ClientError> {
        let timeout = self.conn.config.request_timeout;
        let io = self.io()?;

        let read = tokio::time::timeout(timeout, io.read_line()).await;
        let line = match read {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!("Reply to {:?} timed out", io.last_sent);
                Err(ClientError::Timeout)
            }
        };
        let line = self.check(line)?;
        tracing::debug!("<- {}", line);

        if line == FAIL_REPLY {
            let command = self.io()?.last_sent.clone();
            return Err(ClientError::RemoteFailure { command });
        }
        Ok(line)
    }

    /// Sends a query and reads its reply line.
    pub async fn send_receive(
        &mut self,
        opcode: Opcode,
        args: &[Argument],
    ) -> Result<String, ClientError> {
        self.send(opcode, args).await?;
        self.receive().await
    }

    /// Sends a query whose arguments are already flattened and reads its reply line.
    pub async fn send_receive_flat(
        &mut self,
        opcode: Opcode,
        args: &[Scalar],
    ) -> Result<String, ClientError> {
        self.send_flat(opcode, args).await?;
        self.receive().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rjam_protocol::args;
    use tokio::io::AsyncBufReadExt;
    use tokio_test::io::Builder;

    fn test_config() -> ConnectionConfig {
        ConnectionConfig::new("127.0.0.1", 4711).with_request_timeout(Duration::from_millis(200))
    }

    #[test]
    fn test_config_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.addr(), "localhost:4711");
        assert_eq!(config.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_buffer_clamping() {
        let config = ConnectionConfig::default().with_read_buffer_size(10); // Below minimum
        assert_eq!(config.read_buffer_size, MIN_READ_BUFFER_SIZE);

        let config = ConnectionConfig::default().with_read_buffer_size(10 * 1024 * 1024); // Above maximum
        assert_eq!(config.read_buffer_size, MAX_READ_BUFFER_SIZE);
    }

    #[tokio::test]
    async fn test_not_connected() {
        let conn = Connection::new(test_config());
        assert!(!conn.is_connected());
        assert!(matches!(
            conn.send(Opcode::CHAT_POST, &args!["hi"]).await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_send_writes_one_line() {
        let mock = Builder::new().write(b"world.setBlock 1,2,3,4,0\n").build();
        let conn = Connection::new(test_config());
        conn.attach(mock).await;

        conn.send(Opcode::WORLD_SET_BLOCK, &args![1, 2, 3, 4, 0])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_receive() {
        let mock = Builder::new()
            .write(b"world.getHeight 10,-5\n")
            .read(b"72\n")
            .build();
        let conn = Connection::new(test_config());
        conn.attach(mock).await;

        let reply = conn
            .send_receive(Opcode::WORLD_GET_HEIGHT, &args![10, -5])
            .await
            .unwrap();
        assert_eq!(reply, "72");
    }

    #[tokio::test]
    async fn test_reply_split_across_reads() {
        let mock = Builder::new()
            .write(b"player.getPos\n")
            .read(b"1.5,6")
            .read(b"4.0,2.5\n")
            .build();
        let conn = Connection::new(test_config());
        conn.attach(mock).await;

        let reply = conn.send_receive(Opcode::PLAYER_GET_POS, &[]).await.unwrap();
        assert_eq!(reply, "1.5,64.0,2.5");
    }

    #[tokio::test]
    async fn test_fail_reply_is_remote_failure() {
        let mock = Builder::new()
            .write(b"world.getBlock 1,2,3\n")
            .read(b"Fail\n")
            .build();
        let conn = Connection::new(test_config());
        conn.attach(mock).await;

        let err = conn
            .send_receive(Opcode::WORLD_GET_BLOCK, &args![1, 2, 3])
            .await
            .unwrap_err();
        match err {
            ClientError::RemoteFailure { command } => assert_eq!(command, "world.getBlock 1,2,3"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(conn.is_connected());
    }

    #[tokio::test]
    async fn test_invalid_argument_sends_nothing() {
        let mock = Builder::new().build();
        let conn = Connection::new(test_config());
        conn.attach(mock).await;

        let err = conn
            .send(Opcode::CHAT_POST, &args!["line\nbreak"])
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_connection_closed() {
        let mock = Builder::new().write(b"world.getPlayerIds\n").build();
        let conn = Connection::new(test_config());
        conn.attach(mock).await;

        let err = conn
            .send_receive(Opcode::WORLD_GET_PLAYER_IDS, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
        assert!(!conn.is_connected());
    }

    #[tokio::test]
    async fn test_reply_timeout() {
        let (client_side, _server_side) = tokio::io::duplex(64);
        let conn = Connection::new(test_config());
        conn.attach(client_side).await;

        let err = conn.receive().await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
        assert!(!conn.is_connected());
    }

    #[tokio::test]
    async fn test_late_reply_is_not_read_by_next_query() {
        let (client_side, server_side) = tokio::io::duplex(256);
        let conn = Connection::new(test_config());
        conn.attach(client_side).await;

        let server = tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(server_side);
            let mut lines = tokio::io::BufReader::new(read).lines();
            let first = lines.next_line().await.unwrap();
            assert_eq!(first.as_deref(), Some("world.getHeight 1,2"));
            tokio::time::sleep(Duration::from_millis(400)).await;
            let _ = write.write_all(b"72\n").await;
        });

        let err = conn
            .send_receive(Opcode::WORLD_GET_HEIGHT, &args![1, 2])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout));

        let err = conn
            .send_receive(Opcode::WORLD_GET_PLAYER_ID, &args!["steve"])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_close() {
        let (client_side, _server_side) = tokio::io::duplex(64);
        let conn = Connection::new(test_config());
        conn.attach(client_side).await;
        assert!(conn.is_connected());

        conn.close().await.unwrap();
        assert!(!conn.is_connected());
        assert!(matches!(conn.receive().await, Err(ClientError::NotConnected)));
    }
}
