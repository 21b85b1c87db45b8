//! Binary framing and text encoding of serialized histories.
//!
//! The pipeline is MessagePack, then a CRC32 trailer, then optionally gzip,
//! then URL-safe base64 without padding:
//!
//! ```text
//! frame   = msgpack(value) || crc32(msgpack(value)) as u32 LE
//! payload = frame | gzip(frame)
//! text    = base64url_nopad(payload)
//! ```
//!
//! Decoding recognises a compressed payload by the gzip magic number. A
//! frame always starts with a MessagePack array or map marker, so it can
//! never be mistaken for gzip.

use crate::error::{HistoryError, Result};
use crate::types::EncodeOptions;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};

/// First two bytes of every gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Size of the checksum trailer.
const CHECKSUM_LEN: usize = 4;

/// Upper bound for an inflated frame (256MB sanity check).
const MAX_FRAME_LEN: u64 = 256 * 1024 * 1024;

/// Serialize `value` into transport text.
pub fn encode<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<String> {
    let frame = write_frame(value)?;
    let payload = if options.compress {
        compress(&frame, options.level)?
    } else {
        frame
    };
    Ok(URL_SAFE_NO_PAD.encode(payload))
}

/// Reverse of [`encode`]. Compressed and raw payloads are both accepted.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    let payload = URL_SAFE_NO_PAD.decode(text.trim())?;
    let frame = if is_compressed(&payload) {
        decompress(&payload)?
    } else {
        payload
    };
    read_frame(&frame)
}

/// Whether a decoded payload is a gzip stream.
pub fn is_compressed(payload: &[u8]) -> bool {
    payload.starts_with(&GZIP_MAGIC)
}

fn write_frame<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut frame = rmp_serde::to_vec(value)?;
    let checksum = crc32fast::hash(&frame);
    frame.extend_from_slice(&checksum.to_le_bytes());
    Ok(frame)
}

fn read_frame<T: DeserializeOwned>(frame: &[u8]) -> Result<T> {
    if frame.len() <= CHECKSUM_LEN {
        return Err(HistoryError::Corruption(format!(
            "payload too short ({} bytes)",
            frame.len()
        )));
    }

    let (encoded, trailer) = frame.split_at(frame.len() - CHECKSUM_LEN);
    let trailer: [u8; CHECKSUM_LEN] = trailer
        .try_into()
        .map_err(|_| HistoryError::Corruption("truncated checksum".into()))?;
    let stored_checksum = u32::from_le_bytes(trailer);

    let computed_checksum = crc32fast::hash(encoded);
    if stored_checksum != computed_checksum {
        return Err(HistoryError::ChecksumMismatch {
            expected: stored_checksum,
            got: computed_checksum,
        });
    }

    Ok(rmp_serde::from_slice(encoded)?)
}

fn compress(frame: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder.write_all(frame)?;
    Ok(encoder.finish()?)
}

fn decompress(payload: &[u8]) -> Result<Vec<u8>> {
    let mut frame = Vec::new();
    GzDecoder::new(payload)
        .take(MAX_FRAME_LEN + 1)
        .read_to_end(&mut frame)?;

    if frame.len() as u64 > MAX_FRAME_LEN {
        return Err(HistoryError::Corruption("inflated payload too large".into()));
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        values: Vec<i64>,
    }

    fn sample() -> Sample {
        Sample {
            name: "sample".to_string(),
            values: (0..64).collect(),
        }
    }

    #[test]
    fn test_raw_roundtrip_is_not_gzip() {
        let text = encode(&sample(), &EncodeOptions::raw()).unwrap();
        let payload = URL_SAFE_NO_PAD.decode(&text).unwrap();
        assert!(!is_compressed(&payload));

        let back: Sample = decode(&text).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_compressed_payload_has_magic() {
        let text = encode(&sample(), &EncodeOptions::compressed()).unwrap();
        let payload = URL_SAFE_NO_PAD.decode(&text).unwrap();
        assert_eq!(&payload[..2], &GZIP_MAGIC);

        let back: Sample = decode(&text).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_text_is_url_safe() {
        let text = encode(&sample(), &EncodeOptions::compressed()).unwrap();
        assert!(text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_checksum_detects_tampering() {
        let text = encode(&sample(), &EncodeOptions::raw()).unwrap();
        let mut payload = URL_SAFE_NO_PAD.decode(&text).unwrap();
        let last_data_byte = payload.len() - CHECKSUM_LEN - 1;
        payload[last_data_byte] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(&payload);

        let result: Result<Sample> = decode(&tampered);
        assert!(matches!(result, Err(HistoryError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_short_payload_is_corruption() {
        let text = URL_SAFE_NO_PAD.encode([0x92u8, 0x01]);
        let result: Result<Sample> = decode(&text);
        assert!(matches!(result, Err(HistoryError::Corruption(_))));

        let result: Result<Sample> = decode("");
        assert!(matches!(result, Err(HistoryError::Corruption(_))));
    }

    #[test]
    fn test_invalid_text_is_encoding_error() {
        let result: Result<Sample> = decode("not*base64!");
        assert!(matches!(result, Err(HistoryError::Encoding(_))));
    }

    #[test]
    fn test_broken_gzip_is_io_error() {
        let mut payload = GZIP_MAGIC.to_vec();
        payload.extend_from_slice(&[0u8; 8]);
        let result: Result<Sample> = decode(&URL_SAFE_NO_PAD.encode(&payload));
        assert!(matches!(result, Err(HistoryError::Io(_))));
    }
}
