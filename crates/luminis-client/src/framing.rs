//! Length-prefixed message framing.
//!
//! Every message is a 4-byte big-endian length followed by that many bytes of UTF-8.

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ClientError;

/// Largest frame accepted from the server.
pub const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

/// Framed message stream over any byte stream.
#[derive(Debug)]
pub struct Channel<S> {
    stream: S,
    max_frame_len: u32,
}

impl<S> Channel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            max_frame_len: MAX_FRAME_LEN,
        }
    }

    pub fn with_max_frame_len(mut self, max_frame_len: u32) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub async fn send(&mut self, message: &str) -> Result<(), ClientError> {
        let bytes = message.as_bytes();
        let len = u32::try_from(bytes.len())
            .map_err(|_| ClientError::MalformedFrame(format!("{} byte message", bytes.len())))?;

        self.stream.write_u32(len).await?;
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads one whole frame, however many reads it takes. The payload is returned untrimmed.
    pub async fn receive(&mut self) -> Result<String, ClientError> {
        let len = self.stream.read_u32().await.map_err(closed_on_eof)?;
        if len > self.max_frame_len {
            return Err(ClientError::MalformedFrame(format!(
                "frame of {len} bytes exceeds the {} byte limit",
                self.max_frame_len
            )));
        }

        let mut payload = vec![0u8; len as usize];
        self.stream
            .read_exact(&mut payload)
            .await
            .map_err(closed_on_eof)?;

        String::from_utf8(payload)
            .map_err(|e| ClientError::MalformedFrame(format!("payload is not UTF-8: {e}")))
    }

    pub async fn shutdown(&mut self) -> Result<(), ClientError> {
        self.stream.shutdown().await?;
        Ok(())
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

fn closed_on_eof(err: std::io::Error) -> ClientError {
    if err.kind() == ErrorKind::UnexpectedEof {
        ClientError::Closed
    } else {
        ClientError::Connection(err)
    }
}
