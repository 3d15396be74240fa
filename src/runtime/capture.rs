//! Tee capture for child process streams.
//!
//! Each reader is drained to completion: every chunk is appended to an
//! in-memory buffer and, when an echo writer is supplied, forwarded to it
//! immediately so interactive observers keep seeing output live. The child's
//! pipes close when it exits, so capture ends structurally on every exit
//! path; there is no global stream state to restore.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const CHUNK_SIZE: usize = 8 * 1024;

/// Drain `reader` until EOF, returning everything read as lossy UTF-8.
pub(crate) async fn tee<R, W>(mut reader: R, mut echo: Option<W>) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }

        captured.extend_from_slice(&chunk[..n]);

        if let Some(writer) = echo.as_mut() {
            writer.write_all(&chunk[..n]).await?;
            writer.flush().await?;
        }
    }

    Ok(String::from_utf8_lossy(&captured).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_without_echo() {
        let input: &[u8] = b"hello\nworld\n";
        let captured = tee(input, None::<Vec<u8>>).await.unwrap();
        assert_eq!(captured, "hello\nworld\n");
    }

    #[tokio::test]
    async fn test_echo_receives_every_byte() {
        let input: &[u8] = b"live output";
        let mut sink = Vec::new();
        let captured = tee(input, Some(&mut sink)).await.unwrap();
        assert_eq!(captured, "live output");
        assert_eq!(sink, b"live output");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_captured_lossily() {
        let input: &[u8] = &[b'o', b'k', 0xff, b'!'];
        let captured = tee(input, None::<Vec<u8>>).await.unwrap();
        assert!(captured.starts_with("ok"));
        assert!(captured.ends_with('!'));
    }

    #[tokio::test]
    async fn test_empty_stream_yields_empty_string() {
        let input: &[u8] = b"";
        let captured = tee(input, None::<Vec<u8>>).await.unwrap();
        assert_eq!(captured, "");
    }
}
