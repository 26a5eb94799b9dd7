//! Unix domain socket transport implementation over `tokio::net`.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixListener;
use tokio::sync::Mutex;

use crate::tcp::{NEXT_CONNECTION_ID, RECV_BUFFER_SIZE};
use crate::{Connection, ConnectionId, Transport, TransportError};

/// A local-socket [`Transport`] listening on a filesystem path.
pub struct UnixTransport {
    listener: UnixListener,
    path: PathBuf,
}

impl UnixTransport {
    /// Binds a new Unix transport at the given path.
    ///
    /// A leftover socket file from an unclean shutdown would make the
    /// bind fail, so a pre-existing file at the path is unlinked first.
    pub async fn bind(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref().to_path_buf();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed leftover socket file")
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(TransportError::BindFailed(e)),
        }

        let listener =
            UnixListener::bind(&path).map_err(TransportError::BindFailed)?;
        tracing::info!(path = %path.display(), "Unix transport listening");
        Ok(Self { listener, path })
    }

    /// The filesystem path this transport is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for UnixTransport {
    type Connection = UnixConnection;

    async fn accept(&mut self) -> Result<UnixConnection, TransportError> {
        let (stream, _) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, "accepted Unix-socket connection");

        let (reader, writer) = stream.into_split();
        Ok(UnixConnection {
            id,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        })
    }
}

/// A single Unix-socket connection, split like its TCP counterpart.
pub struct UnixConnection {
    id: ConnectionId,
    reader: Mutex<OwnedReadHalf>,
    writer: Mutex<OwnedWriteHalf>,
}

impl Connection for UnixConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let n = self
            .reader
            .lock()
            .await
            .read(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf[..n].to_vec()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
