//! Length-prefixed MessagePack frames.
//!
//! Each frame is a 4-byte big-endian header followed by the payload. The
//! high bit of the header flags a zstd-compressed payload, the low 31 bits
//! hold the payload length.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{self, AsyncReadExt, AsyncWriteExt, ErrorKind};

pub const COMPRESSED_FLAG: u32 = 0x8000_0000;
const LENGTH_MASK: u32 = 0x7FFF_FFFF;
const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

const ADAPTIVE_THRESHOLD: usize = 256;
const ALWAYS_THRESHOLD: usize = 64;

/// How a message's payload is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionStrategy {
    /// Never compress (frequent, small messages)
    Never,
    /// Compress whenever it actually shrinks the payload
    Always,
    /// Compress based on size threshold
    Adaptive,
}

/// A message that can travel in a frame.
pub trait Framed: Serialize {
    fn compression_strategy(&self) -> CompressionStrategy {
        CompressionStrategy::Adaptive
    }
}

fn level_for(len: usize) -> i32 {
    if len < 1024 { 1 } else { 3 }
}

fn compress(strategy: CompressionStrategy, bytes: Vec<u8>) -> io::Result<(Vec<u8>, bool)> {
    match strategy {
        CompressionStrategy::Never => Ok((bytes, false)),
        CompressionStrategy::Always if bytes.len() > ALWAYS_THRESHOLD => {
            let compressed = zstd::encode_all(bytes.as_slice(), level_for(bytes.len()))
                .map_err(|e| io::Error::other(format!("Compression failed: {}", e)))?;
            if compressed.len() < bytes.len() {
                Ok((compressed, true))
            } else {
                Ok((bytes, false))
            }
        }
        CompressionStrategy::Adaptive if bytes.len() >= ADAPTIVE_THRESHOLD => {
            let compressed = zstd::encode_all(bytes.as_slice(), level_for(bytes.len()))
                .map_err(|e| io::Error::other(format!("Compression failed: {}", e)))?;
            Ok((compressed, true))
        }
        _ => Ok((bytes, false)),
    }
}

/// Serializes `message` into a complete frame, header included.
pub fn encode<T: Framed>(message: &T) -> io::Result<Vec<u8>> {
    let msgpack = rmp_serde::to_vec_named(message).map_err(|e| {
        io::Error::new(
            ErrorKind::InvalidData,
            format!("Failed to serialize message to MessagePack: {}", e),
        )
    })?;
    let (payload, compressed) = compress(message.compression_strategy(), msgpack)?;
    if payload.len() > MAX_FRAME_LEN as usize {
        return Err(io::Error::new(ErrorKind::InvalidData, "message too large for one frame"));
    }
    let mut header = payload.len() as u32;
    if compressed {
        header |= COMPRESSED_FLAG;
    }
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&header.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Deserializes a frame payload.
pub fn decode<T: DeserializeOwned>(payload: &[u8], compressed: bool) -> io::Result<T> {
    let bytes = if compressed {
        zstd::decode_all(payload).map_err(|e| {
            io::Error::new(ErrorKind::InvalidData, format!("Zstd decompression error: {}", e))
        })?
    } else {
        payload.to_vec()
    };
    rmp_serde::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            ErrorKind::InvalidData,
            format!("MessagePack deserialization error: {}", e),
        )
    })
}

pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> io::Result<()>
where
    W: AsyncWriteExt + Unpin,
    T: Framed,
{
    let frame = encode(message)?;
    writer.write_all(&frame).await?;
    writer.flush().await
}

/// Reads one frame. `Ok(None)` means the peer closed the connection
/// cleanly between frames.
pub async fn read_frame<R, T>(reader: &mut R) -> io::Result<Option<T>>
where
    R: AsyncReadExt + Unpin,
    T: DeserializeOwned,
{
    let mut header = [0u8; 4];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let header = u32::from_be_bytes(header);
    let compressed = header & COMPRESSED_FLAG != 0;
    let length = header & LENGTH_MASK;
    if length == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "Received zero-length message header"));
    }
    if length > MAX_FRAME_LEN {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit", length),
        ));
    }
    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload).await?;
    decode(&payload, compressed).map(Some)
}
