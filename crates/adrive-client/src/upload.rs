//! Proof-based upload orchestration.
//!
//! An upload negotiates a proof session first: the server is handed the
//! declared size, a whole-content hash, and a sampled proof code, and may
//! answer that the content is already stored (rapid upload), in which case
//! no bytes are transferred at all. Otherwise it assigns one transfer
//! destination per part and the content is streamed sequentially, followed
//! by a completion call. Failures mid-sequence abort the whole operation;
//! already-transferred parts are not cleaned up.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use reqwest::Method;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::client::{find_node_error, normalize_path, split_path, status_error, DriveFs};
use crate::endpoints;
use crate::error::{DriveError, Result};
use crate::proof;
use crate::types::{
    CheckNameMode, CompleteUploadRequest, CreateFileRequest, LookupKind, Node, NodeKind, PartInfo,
    ProofResponse,
};

/// Maximum bytes per uploaded part
pub const MAX_PART_SIZE: u64 = 1024 * 1024 * 1024; // 1G

/// Bundled live-photo container, unsupported for direct upload
const LIVP_EXT: &str = ".livp";

const PART_READ_BUF: usize = 64 * 1024;

/// Partition a declared size into 1-based part numbers of at most
/// [`MAX_PART_SIZE`] bytes each. Every upload has at least one part.
pub(crate) fn make_part_info_list(size: u64) -> Vec<PartInfo> {
    let mut count = size / MAX_PART_SIZE;
    if size % MAX_PART_SIZE > 0 {
        count += 1;
    }
    let count = count.max(1);

    (1..=count)
        .map(|part_number| PartInfo {
            part_number,
            upload_url: None,
        })
        .collect()
}

impl DriveFs {
    /// Sample the proof code for a seekable source using the current
    /// access token. The source is rewound to its start afterwards.
    pub async fn calc_proof<R>(&self, size: u64, source: &mut R) -> Result<String>
    where
        R: AsyncRead + AsyncSeek + Unpin,
    {
        let token = self.gate.access_token(&self.http).await?;
        proof::calc_proof(source, &token, size, self.config.proof_offset.as_ref()).await
    }

    /// Upload from a seekable source, computing the content hash and
    /// proof code first so the server can skip redundant transfers
    #[instrument(skip(self, source))]
    pub async fn create_file<R>(
        &self,
        full_path: &str,
        size: u64,
        mut source: R,
        overwrite: bool,
    ) -> Result<Node>
    where
        R: AsyncRead + AsyncSeek + Send + Unpin + 'static,
    {
        let content_hash = proof::calc_sha1(&mut source).await?;
        let proof_code = self.calc_proof(size, &mut source).await?;
        self.create_file_with_proof(full_path, size, source, &content_hash, &proof_code, overwrite)
            .await
    }

    /// Upload with caller-supplied proof values. Non-seekable sources
    /// pass empty hash and proof strings, which disables dedup
    /// eligibility but is otherwise accepted.
    #[instrument(skip(self, source, content_hash, proof_code))]
    pub async fn create_file_with_proof<R>(
        &self,
        full_path: &str,
        size: u64,
        source: R,
        content_hash: &str,
        proof_code: &str,
        overwrite: bool,
    ) -> Result<Node>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let full_path = normalize_path(full_path);
        if full_path.to_lowercase().ends_with(LIVP_EXT) {
            return Err(DriveError::Validation(
                "uploading .livp to album is not supported".to_string(),
            ));
        }

        if overwrite {
            if let Ok(existing) = self.get(&full_path, LookupKind::File).await {
                self.remove(&existing).await.map_err(|e| {
                    e.context(format!(
                        "failed to overwrite \"{}\", can't remove file",
                        full_path
                    ))
                })?;
            }
        }

        let (parent, name) = split_path(&full_path);
        self.create_folder(parent)
            .await
            .map_err(|e| e.context(format!("failed to create folder \"{}\"", parent)))?;
        let parent_node = self
            .get(parent, LookupKind::Folder)
            .await
            .map_err(|e| find_node_error(e, parent))?;

        let request = CreateFileRequest {
            drive_id: self.drive_id.clone(),
            part_info_list: make_part_info_list(size),
            parent_file_id: parent_node.file_id,
            name: name.to_string(),
            kind: NodeKind::File,
            check_name_mode: CheckNameMode::AutoRename,
            size,
            content_hash: content_hash.to_string(),
            content_hash_name: "sha1".to_string(),
            proof_code: proof_code.to_string(),
            proof_version: "v1".to_string(),
        };
        let session: ProofResponse = self
            .json_request(
                Method::POST,
                &self.api_url(endpoints::CREATE_WITH_PROOF),
                &request,
            )
            .await
            .map_err(|e| e.context("failed to post create file request"))?;

        if session.rapid_upload {
            debug!("rapid upload hit for \"{}\"", full_path);
            return self.get(&full_path, LookupKind::File).await;
        }

        if session.part_info_list.is_empty() {
            return Err(DriveError::InvalidResponse(
                "failed to extract uploadUrl".to_string(),
            ));
        }

        let source = Arc::new(Mutex::new(source));
        let total = session.part_info_list.len();
        for part in &session.part_info_list {
            let upload_url = part.upload_url.as_deref().ok_or_else(|| {
                DriveError::InvalidResponse(format!(
                    "missing upload url for part {}",
                    part.part_number
                ))
            })?;

            debug!("uploading part {}/{}", part.part_number, total);
            self.upload_part(upload_url, Arc::clone(&source)).await?;
        }

        let complete = CompleteUploadRequest {
            drive_id: self.drive_id.clone(),
            file_id: session.file_id,
            upload_id: session.upload_id,
        };
        self.json_request(
            Method::POST,
            &self.api_url(endpoints::COMPLETE_UPLOAD),
            &complete,
        )
        .await
        .map_err(|e| e.context("failed to post upload complete request"))
    }

    /// Stream up to one part's worth of bytes from the shared source to
    /// the server-assigned destination. Transfer destinations are
    /// pre-signed: the PUT carries no auth and no framing.
    async fn upload_part<R>(&self, upload_url: &str, source: Arc<Mutex<R>>) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let part_stream = stream::unfold(
            (source, MAX_PART_SIZE),
            |(source, remaining)| async move {
                if remaining == 0 {
                    return None;
                }

                let mut buf = vec![0u8; PART_READ_BUF.min(remaining as usize)];
                let read = {
                    let mut guard = source.lock().await;
                    guard.read(&mut buf).await
                };
                match read {
                    Ok(0) => None,
                    Ok(n) => {
                        buf.truncate(n);
                        Some((Ok(Bytes::from(buf)), (source, remaining - n as u64)))
                    }
                    Err(e) => Some((Err(e), (source, 0))),
                }
            },
        );

        let res = self
            .http
            .put(upload_url)
            .body(reqwest::Body::wrap_stream(part_stream))
            .send()
            .await
            .map_err(|e| DriveError::Http(e).context("failed to upload file"))?;

        if let Some(err) = status_error(upload_url, res.status()) {
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_count_boundaries() {
        assert_eq!(make_part_info_list(0).len(), 1);
        assert_eq!(make_part_info_list(1).len(), 1);
        assert_eq!(make_part_info_list(MAX_PART_SIZE).len(), 1);
        assert_eq!(make_part_info_list(MAX_PART_SIZE + 1).len(), 2);
        assert_eq!(make_part_info_list(2 * MAX_PART_SIZE + 100).len(), 3);
    }

    #[test]
    fn test_part_numbers_are_one_based_and_bare() {
        let parts = make_part_info_list(3 * MAX_PART_SIZE);
        let numbers: Vec<u64> = parts.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(parts.iter().all(|p| p.upload_url.is_none()));
    }
}
