//! Content proofs for the rapid-upload protocol.
//!
//! The server detects duplicate content from two values computed over the
//! file before any bytes are transferred: a whole-content SHA-1 and a short
//! "proof code" sampled at an offset derived from the caller's access token
//! and the file size. Both passes rewind the source back to its start so
//! the subsequent part transfer reads from the beginning.

use std::io::SeekFrom;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use crate::error::Result;

/// Derives the proof-sample byte offset from (access token, file size).
///
/// The exact derivation is specified by the service and is not part of
/// this crate; supply it via [`Config::with_proof_offset`]. When absent
/// the sample is taken at offset 0, which keeps uploads correct but never
/// produces a matching proof, so server-side dedup will not trigger.
///
/// [`Config::with_proof_offset`]: crate::Config::with_proof_offset
pub type ProofOffsetFn = Arc<dyn Fn(&str, u64) -> u64 + Send + Sync>;

/// Number of bytes sampled for the proof code
pub const PROOF_SAMPLE_LEN: usize = 8;

const HASH_BUF_LEN: usize = 64 * 1024;

/// Compute the uppercase hex SHA-1 of the whole source, then rewind it
pub async fn calc_sha1<R>(source: &mut R) -> Result<String>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; HASH_BUF_LEN];
    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    source.rewind().await?;
    Ok(hex::encode_upper(hasher.finalize()))
}

/// Sample the proof code at the derived offset, then rewind the source.
///
/// Sources shorter than the sample window yield a proof over the bytes
/// that were available.
pub async fn calc_proof<R>(
    source: &mut R,
    access_token: &str,
    size: u64,
    offset_fn: Option<&ProofOffsetFn>,
) -> Result<String>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let start = match offset_fn {
        Some(f) => f(access_token, size),
        None => 0,
    };
    source.seek(SeekFrom::Start(start)).await?;

    let mut sample = [0u8; PROOF_SAMPLE_LEN];
    let mut filled = 0;
    while filled < sample.len() {
        let n = source.read(&mut sample[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    source.rewind().await?;
    Ok(BASE64.encode(&sample[..filled]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_sha1_known_value() {
        let mut source = Cursor::new(b"hello world".to_vec());
        let hash = calc_sha1(&mut source).await.unwrap();
        assert_eq!(hash, "2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED");
        // source rewound for the next pass
        assert_eq!(source.position(), 0);
    }

    #[tokio::test]
    async fn test_proof_samples_at_offset() {
        let data: Vec<u8> = (0u8..32).collect();
        let mut source = Cursor::new(data);

        let offset_fn: ProofOffsetFn = Arc::new(|_token, _size| 4);
        let proof = calc_proof(&mut source, "token", 32, Some(&offset_fn))
            .await
            .unwrap();
        assert_eq!(proof, BASE64.encode([4u8, 5, 6, 7, 8, 9, 10, 11]));
        assert_eq!(source.position(), 0);
    }

    #[tokio::test]
    async fn test_proof_short_source() {
        let mut source = Cursor::new(vec![1u8, 2, 3]);
        let proof = calc_proof(&mut source, "token", 3, None).await.unwrap();
        assert_eq!(proof, BASE64.encode([1u8, 2, 3]));
    }

    #[tokio::test]
    async fn test_proof_empty_source() {
        let mut source = Cursor::new(Vec::new());
        let proof = calc_proof(&mut source, "token", 0, None).await.unwrap();
        assert!(proof.is_empty());
    }
}
