//! Scripted in-memory server for client tests.

use crate::connection::{Connection, ConnectionConfig};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;

/// One step of a server script.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    /// Read one command line and check it.
    Expect(&'static str),
    /// Write one reply line.
    Respond(&'static str),
}

pub(crate) use Step::{Expect, Respond};

/// Connection settings with a short reply timeout so a broken script fails fast.
pub(crate) fn test_config() -> ConnectionConfig {
    ConnectionConfig::new("127.0.0.1", 4711).with_request_timeout(Duration::from_secs(2))
}

/// Attaches `conn` to a server that plays `script` and then hangs up.
///
/// Await the returned handle to surface mismatched commands.
pub(crate) async fn serve(conn: &Connection, script: Vec<Step>) -> JoinHandle<()> {
    let (client_side, server_side) = tokio::io::duplex(4096);
    conn.attach(client_side).await;
    tokio::spawn(run(server_side, script))
}

async fn run(stream: DuplexStream, script: Vec<Step>) {
    let mut stream = BufReader::new(stream);

    for step in script {
        match step {
            Step::Expect(expected) => {
                let mut line = String::new();
                let n = stream.read_line(&mut line).await.unwrap();
                assert!(n > 0, "client hung up, expected {:?}", expected);
                assert_eq!(line.trim_end_matches('\n'), expected);
            }
            Step::Respond(reply) => {
                let inner = stream.get_mut();
                inner.write_all(reply.as_bytes()).await.unwrap();
                inner.write_all(b"\n").await.unwrap();
                inner.flush().await.unwrap();
            }
        }
    }
}
