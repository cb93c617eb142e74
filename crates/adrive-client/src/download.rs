//! Download-target resolution and streaming open

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Write};

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Method;
use tracing::instrument;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::client::DriveFs;
use crate::endpoints;
use crate::error::{DriveError, Result};
use crate::types::{DownloadUrl, DownloadUrlRequest, Node};

/// Byte stream returned by [`DriveFs::open`]
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

impl DriveFs {
    /// Resolve the transient download target for a node
    pub async fn get_download_url(&self, node: &Node) -> Result<DownloadUrl> {
        let request = DownloadUrlRequest {
            drive_id: self.drive_id.clone(),
            file_id: node.file_id.clone(),
        };
        self.json_request(
            Method::POST,
            &self.api_url(endpoints::GET_DOWNLOAD_URL),
            &request,
        )
        .await
        .map_err(|e| e.context(format!("failed to get node detail of \"{}\"", node.name)))
    }

    /// Open a node's content for reading.
    ///
    /// A single-URL target streams through unmodified. A multi-stream
    /// live photo target is synthesized into a zip archive with one
    /// entry per component, named `<node-name>.<component-type>`.
    /// Caller headers (e.g. a range) are forwarded to the transfer.
    #[instrument(skip(self, node, headers), fields(node_id = %node.file_id))]
    pub async fn open(&self, node: &Node, headers: &HashMap<String, String>) -> Result<ByteStream> {
        self.check_root(node)?;

        let target = self.get_download_url(node).await?;

        if !target.url.is_empty() {
            let res = self
                .request(Method::GET, &target.url, headers, None)
                .await
                .map_err(|e| e.context(format!("failed to download \"{}\"", target.url)))?;
            return Ok(res
                .bytes_stream()
                .map(|chunk| chunk.map_err(DriveError::Http))
                .boxed());
        }

        if let Some(streams) = &target.streams_url {
            let archive = self.build_streams_archive(node, streams, headers).await?;
            return Ok(stream::once(async move { Ok(archive) }).boxed());
        }

        Err(DriveError::InvalidResponse(format!(
            "failed to open \"{}\"",
            node.name
        )))
    }

    async fn build_streams_archive(
        &self,
        node: &Node,
        streams: &BTreeMap<String, String>,
        headers: &HashMap<String, String>,
    ) -> Result<Bytes> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for (stream_type, url) in streams {
            let entry_name = format!("{}.{}", node.name, stream_type);
            zip.start_file(&*entry_name, SimpleFileOptions::default())
                .map_err(|e| {
                    DriveError::Zip(e)
                        .context(format!("failed to create entry \"{}\" in zip file", entry_name))
                })?;

            let res = self
                .request(Method::GET, url, headers, None)
                .await
                .map_err(|e| e.context(format!("failed to download \"{}\"", url)))?;
            let body = res.bytes().await?;

            zip.write_all(&body).map_err(|e| {
                DriveError::Io(e).context(format!("failed to write \"{}\" to zip", entry_name))
            })?;
        }

        let cursor = zip.finish()?;
        Ok(Bytes::from(cursor.into_inner()))
    }
}
