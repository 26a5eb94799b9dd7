//! Integration tests for the TCP and Unix-socket transports.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UnixStream};

use wordwire_transport::{
    Connection, TcpTransport, Transport, UnixTransport,
};

/// A socket path in the temp dir, unique per test to avoid collisions
/// when the suite runs in parallel.
fn socket_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "wordwire-test-{}-{}.sock",
        std::process::id(),
        tag
    ))
}

// =========================================================================
// TCP
// =========================================================================

#[tokio::test]
async fn test_tcp_send_and_recv_round_trip() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let client = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 16];
        let n = stream.read(&mut buf).await.unwrap();
        buf[..n].to_vec()
    });

    let conn = transport.accept().await.unwrap();
    let received = conn.recv().await.unwrap().expect("client wrote data");
    assert_eq!(received, b"hello");

    conn.send(b"world").await.unwrap();
    assert_eq!(client.await.unwrap(), b"world");
}

#[tokio::test]
async fn test_tcp_recv_returns_none_on_clean_close() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let client = tokio::spawn(async move {
        let stream = TcpStream::connect(addr).await.unwrap();
        drop(stream);
    });

    let conn = transport.accept().await.unwrap();
    client.await.unwrap();
    assert!(conn.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_tcp_connections_get_distinct_ids() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let _c1 = TcpStream::connect(addr).await.unwrap();
    let _c2 = TcpStream::connect(addr).await.unwrap();

    let a = transport.accept().await.unwrap();
    let b = transport.accept().await.unwrap();
    assert_ne!(a.id(), b.id());
}

#[tokio::test]
async fn test_tcp_close_signals_eof_to_peer() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let client = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 1];
        // EOF once the server closes its write half.
        stream.read(&mut buf).await.unwrap()
    });

    let conn = transport.accept().await.unwrap();
    conn.close().await.unwrap();
    assert_eq!(client.await.unwrap(), 0);
}

// =========================================================================
// Unix socket
// =========================================================================

#[tokio::test]
async fn test_unix_send_and_recv_round_trip() {
    let path = socket_path("round-trip");
    let mut transport = UnixTransport::bind(&path).await.unwrap();

    let client_path = path.clone();
    let client = tokio::spawn(async move {
        let mut stream = UnixStream::connect(client_path).await.unwrap();
        stream.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 16];
        let n = stream.read(&mut buf).await.unwrap();
        buf[..n].to_vec()
    });

    let conn = transport.accept().await.unwrap();
    let received = conn.recv().await.unwrap().expect("client wrote data");
    assert_eq!(received, b"ping");

    conn.send(b"pong").await.unwrap();
    assert_eq!(client.await.unwrap(), b"pong");

    drop(transport);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_unix_bind_clears_stale_socket_file() {
    let path = socket_path("stale");
    // Simulate a leftover from an unclean shutdown.
    std::fs::write(&path, b"stale").unwrap();

    let transport = UnixTransport::bind(&path).await.unwrap();
    assert_eq!(transport.path(), path.as_path());

    drop(transport);
    let _ = std::fs::remove_file(&path);
}
