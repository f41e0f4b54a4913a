//! Log record decoding
//!
//! Each stream record is a gzip-compressed JSON [`LogBatch`] written by the
//! log subscription.

use flate2::read::GzDecoder;
use skiff_core::domain::log::LogBatch;
use std::io::Read;
use thiserror::Error;

/// Why a record could not be decoded
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("record is not valid gzip: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("record is not a log batch: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Decompresses and parses one stream record
pub fn decode_record(data: &[u8]) -> Result<LogBatch, DecodeError> {
    let mut json = Vec::new();
    GzDecoder::new(data).read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
pub(crate) fn encode_batch(batch: &serde_json::Value) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(batch.to_string().as_bytes())
        .expect("write to memory");
    encoder.finish().expect("finish gzip")
}
