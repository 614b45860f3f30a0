use std::io::ErrorKind;

use streamcodec_core::{CodecError, FrameConfig, Operation};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

fn io_error(op: Operation) -> impl FnOnce(std::io::Error) -> CodecError {
    move |source| CodecError::Io { op, source }
}

/// Writes one length-prefixed frame to the async writer.
pub async fn write_frame<W: AsyncWrite + Unpin + ?Sized>(
    writer: &mut W,
    payload: &[u8],
    config: &FrameConfig,
) -> Result<(), CodecError> {
    let size = config.check_outgoing(payload.len())?;

    writer
        .write_all(&size.to_be_bytes())
        .await
        .map_err(io_error(Operation::Encode))?;
    writer
        .write_all(payload)
        .await
        .map_err(io_error(Operation::Encode))?;
    writer.flush().await.map_err(io_error(Operation::Encode))?;
    Ok(())
}

/// Reads one length-prefixed frame from the async reader.
pub async fn read_frame<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    config: &FrameConfig,
) -> Result<Vec<u8>, CodecError> {
    read_frame_optional(reader, config)
        .await?
        .ok_or_else(|| CodecError::Io {
            op: Operation::Decode,
            source: ErrorKind::UnexpectedEof.into(),
        })
}

/// Reads one frame, or `None` if the peer closed before a new header.
pub async fn read_frame_optional<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    config: &FrameConfig,
) -> Result<Option<Vec<u8>>, CodecError> {
    let mut header = [0_u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader
            .read(&mut header[filled..])
            .await
            .map_err(io_error(Operation::Decode))?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(CodecError::Io {
                op: Operation::Decode,
                source: ErrorKind::UnexpectedEof.into(),
            });
        }
        filled += n;
    }

    let size = config.check_incoming(header)?;
    let mut payload = vec![0_u8; size];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(io_error(Operation::Decode))?;
    Ok(Some(payload))
}
