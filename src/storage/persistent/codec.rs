//! Framing codec for blob files.
//!
//! Every blob file is:
//! ```text
//! [magic: 4 bytes "CGRF"][version: 1 byte][length: 4 bytes LE][payload: N bytes][crc32: 4 bytes LE]
//! ```
//! The payload is the blob's serialized JSON, stored untouched.

use std::io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write};

use crc32fast::Hasher;

/// Current codec version.
const CODEC_VERSION: u8 = 1;

/// Magic bytes identifying careergraph blob files.
pub const MAGIC: [u8; 4] = *b"CGRF";

/// Reject payloads claiming more than this many bytes (100 MB).
const MAX_PAYLOAD_SIZE: usize = 100 * 1024 * 1024;

fn checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Writes a framed payload (header included).
pub fn encode(writer: &mut impl Write, payload: &[u8]) -> IoResult<()> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        IoError::new(
            ErrorKind::InvalidInput,
            format!("payload of {} bytes does not fit a frame", payload.len()),
        )
    })?;

    writer.write_all(&MAGIC)?;
    writer.write_all(&[CODEC_VERSION])?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.write_all(&checksum(payload).to_le_bytes())?;
    Ok(())
}

/// Reads a framed payload, verifying header and checksum.
///
/// # Errors
/// - `InvalidData` if the magic, version, size or checksum is wrong
/// - `UnexpectedEof` if the frame is truncated
pub fn decode(reader: &mut impl Read) -> IoResult<Vec<u8>> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(IoError::new(
            ErrorKind::InvalidData,
            format!("invalid magic bytes: expected {MAGIC:?}, got {magic:?}"),
        ));
    }

    let mut version = [0u8; 1];
    reader.read_exact(&mut version)?;
    if version[0] != CODEC_VERSION {
        return Err(IoError::new(
            ErrorKind::InvalidData,
            format!(
                "unsupported codec version: {} (expected {CODEC_VERSION})",
                version[0]
            ),
        ));
    }

    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_PAYLOAD_SIZE {
        return Err(IoError::new(
            ErrorKind::InvalidData,
            format!("payload size {len} exceeds maximum {MAX_PAYLOAD_SIZE}"),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;

    let mut crc_bytes = [0u8; 4];
    reader.read_exact(&mut crc_bytes)?;
    let stored_crc = u32::from_le_bytes(crc_bytes);
    let computed_crc = checksum(&payload);
    if stored_crc != computed_crc {
        return Err(IoError::new(
            ErrorKind::InvalidData,
            format!("CRC mismatch: stored={stored_crc:08x}, computed={computed_crc:08x} (data corrupted)"),
        ));
    }

    Ok(payload)
}
