//! Path-addressed filesystem operations over the id-addressed remote API

use std::collections::HashMap;

use futures::future::BoxFuture;
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::auth::CredentialGate;
use crate::config::Config;
use crate::endpoints;
use crate::error::{DriveError, Result};
use crate::types::{
    AlbumsInfoResponse, CheckNameMode, CopyRequest, CreateFolderRequest, GetByPathRequest,
    ListRequest, ListResponse, LookupKind, MoveRequest, Node, NodeKind, RenameRequest,
    TrashRequest, UserGetResponse,
};

/// Referer sent on every request
pub(crate) const REFERER: &str = "https://www.aliyundrive.com/";

/// Page size for child listings
const LIST_PAGE_SIZE: u32 = 200;

/// Classify a non-success HTTP status into a domain error. `404` is kept
/// distinguishable so path resolution can use it as a fallback signal.
pub(crate) fn status_error(url: &str, status: StatusCode) -> Option<DriveError> {
    if status == StatusCode::NOT_FOUND {
        return Some(DriveError::NotFound {
            url: url.to_string(),
        });
    }
    if status.as_u16() >= 400 {
        return Some(DriveError::RequestFailed {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    None
}

/// Path-addressed view of a remote drive.
///
/// All operations execute on the caller's task and resolve paths on
/// demand; nothing is cached between calls.
pub struct DriveFs {
    pub(crate) config: Config,
    pub(crate) http: reqwest::Client,
    pub(crate) gate: CredentialGate,
    pub(crate) drive_id: String,
    pub(crate) root: Node,
    /// Serializes folder creation across the whole instance so concurrent
    /// calls cannot materialize duplicate siblings. Not scoped to a path:
    /// unrelated folder creations also serialize.
    folder_lock: Mutex<()>,
}

impl std::fmt::Debug for DriveFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveFs")
            .field("drive_id", &self.drive_id)
            .finish_non_exhaustive()
    }
}

impl DriveFs {
    /// Connect and resolve the drive identity for the configured scope
    pub async fn new(config: Config) -> Result<Self> {
        let http = match &config.http_client {
            Some(client) => client.clone(),
            None => reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(DriveError::Http)?,
        };
        let gate = CredentialGate::new(&config);

        let mut fs = Self {
            config,
            http,
            gate,
            drive_id: String::new(),
            root: Node::root(),
            folder_lock: Mutex::new(()),
        };

        fs.drive_id = if fs.config.is_album {
            let info: AlbumsInfoResponse = fs
                .json_request(
                    Method::POST,
                    &fs.api_url(endpoints::ALBUMS_INFO),
                    &serde_json::json!({}),
                )
                .await
                .map_err(|e| e.context("failed to get driveId"))?;
            info.data.drive_id
        } else {
            let user: UserGetResponse = fs
                .json_request(
                    Method::POST,
                    &fs.api_url(endpoints::USER_GET),
                    &serde_json::json!({}),
                )
                .await
                .map_err(|e| e.context("failed to get driveId"))?;
            user.drive_id
        };

        Ok(fs)
    }

    /// Identifier of the drive scope this client operates on
    pub fn drive_id(&self) -> &str {
        &self.drive_id
    }

    /// The root sentinel
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base, path)
    }

    // ==================== Request gateway ====================

    /// Issue a request with the fixed identification headers applied.
    /// Status is not classified here; download and part-transfer calls
    /// consume the raw response.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &HashMap<String, String>,
        body: Option<reqwest::Body>,
    ) -> Result<reqwest::Response> {
        let mut req = self
            .http
            .request(method, url)
            .header(header::REFERER, REFERER)
            .header(header::USER_AGENT, &self.config.user_agent);
        for (k, v) in headers {
            req = req.header(k.as_str(), v.as_str());
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        Ok(req.send().await?)
    }

    /// Authenticated JSON round-trip: refresh the token if needed, attach
    /// bearer auth, classify error statuses, decode the typed response
    pub(crate) async fn json_request<Req, Res>(
        &self,
        method: Method,
        url: &str,
        request: &Req,
    ) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let body = self.json_request_raw(method, url, request).await?;
        serde_json::from_slice(&body).map_err(|e| DriveError::ParseResponse {
            message: e.to_string(),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Same round-trip for calls whose response body is irrelevant
    pub(crate) async fn json_request_discard<Req>(
        &self,
        method: Method,
        url: &str,
        request: &Req,
    ) -> Result<()>
    where
        Req: Serialize + ?Sized,
    {
        self.json_request_raw(method, url, request).await.map(|_| ())
    }

    async fn json_request_raw<Req>(
        &self,
        method: Method,
        url: &str,
        request: &Req,
    ) -> Result<bytes::Bytes>
    where
        Req: Serialize + ?Sized,
    {
        let token = self.gate.access_token(&self.http).await?;

        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/json;charset=UTF-8".to_string(),
        );
        headers.insert("authorization".to_string(), format!("Bearer {}", token));

        let body = serde_json::to_vec(request)?;
        debug!("sending {} request to {}", method, url);
        let res = self.request(method, url, &headers, Some(body.into())).await?;

        if let Some(err) = status_error(url, res.status()) {
            return Err(err);
        }

        Ok(res.bytes().await?)
    }

    // ==================== Listing & resolution ====================

    /// Enumerate all children of a folder, following cursor pagination
    /// until the returned marker is exhausted. Pages are concatenated in
    /// server order; no stability guarantee if the server mutates
    /// concurrently.
    #[instrument(skip(self, node), fields(node_id = %node.file_id))]
    pub async fn list_nodes(&self, node: &Node) -> Result<Vec<Node>> {
        let url = self.api_url(endpoints::FILE_LIST);
        let mut nodes = Vec::new();
        let mut marker = String::new();

        loop {
            let request = ListRequest {
                drive_id: self.drive_id.clone(),
                parent_file_id: node.file_id.clone(),
                limit: LIST_PAGE_SIZE,
                marker: marker.clone(),
            };
            let page: ListResponse = self.json_request(Method::POST, &url, &request).await?;
            nodes.extend(page.items);

            if page.next_marker.is_empty() {
                break;
            }
            marker = page.next_marker;
        }

        Ok(nodes)
    }

    async fn find_name_node(&self, node: &Node, name: &str, kind: LookupKind) -> Result<Node> {
        let nodes = self.list_nodes(node).await?;
        for candidate in nodes {
            if candidate.name == name && kind.matches(candidate.kind) {
                return Ok(candidate);
            }
        }

        Err(DriveError::NodeNotFound {
            name: name.to_string(),
            kind: kind.to_string(),
            parent: node.name.clone(),
        })
    }

    /// Resolve a path to a node.
    ///
    /// The direct path lookup is tried first. Paths it mishandles (those
    /// with space-padded components) and kind mismatches fall back to
    /// resolving the parent and scanning its children, so resolution
    /// works for any structurally valid path at the cost of extra round
    /// trips.
    #[instrument(skip(self))]
    pub async fn get(&self, full_path: &str, kind: LookupKind) -> Result<Node> {
        self.get_node(normalize_path(full_path), kind).await
    }

    fn get_node(&self, full_path: String, kind: LookupKind) -> BoxFuture<'_, Result<Node>> {
        Box::pin(async move {
            if full_path == "/" {
                return Ok(self.root.clone());
            }

            let url = self.api_url(endpoints::FILE_GET_BY_PATH);
            let request = GetByPathRequest {
                drive_id: self.drive_id.clone(),
                file_path: full_path.clone(),
            };
            match self.json_request::<_, Node>(Method::POST, &url, &request).await {
                Ok(node) if kind.matches(node.kind) => return Ok(node),
                Ok(_) => {}
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }

            let (parent, name) = split_path(&full_path);
            let parent_node = self
                .get_node(normalize_path(parent), LookupKind::Folder)
                .await
                .map_err(|e| find_node_error(e, parent))?;

            self.find_name_node(&parent_node, name, kind).await
        })
    }

    /// List the children of the folder at `full_path`
    #[instrument(skip(self))]
    pub async fn list(&self, full_path: &str) -> Result<Vec<Node>> {
        let full_path = normalize_path(full_path);
        let node = self
            .get(&full_path, LookupKind::Folder)
            .await
            .map_err(|e| find_node_error(e, &full_path))?;

        self.list_nodes(&node)
            .await
            .map_err(|e| e.context(format!("failed to list nodes of \"{}\"", node.name)))
    }

    // ==================== Folder materialization ====================

    async fn create_folder_internal(&self, parent: &str, name: &str) -> Result<Node> {
        let _guard = self.folder_lock.lock().await;

        // A same-named sibling created by a concurrent call resolves here
        // and is returned as-is.
        if let Ok(node) = self
            .get(&format!("{}/{}", parent, name), LookupKind::Folder)
            .await
        {
            return Ok(node);
        }

        let parent_node = self
            .get(parent, LookupKind::Folder)
            .await
            .map_err(|e| find_node_error(e, parent))?;

        let request = CreateFolderRequest {
            drive_id: self.drive_id.clone(),
            parent_file_id: parent_node.file_id,
            name: name.to_string(),
            kind: NodeKind::Folder,
            check_name_mode: CheckNameMode::Refuse,
        };
        let mut created: Node = self
            .json_request(
                Method::POST,
                &self.api_url(endpoints::CREATE_WITH_PROOF),
                &request,
            )
            .await
            .map_err(|e| e.context("failed to post create folder request"))?;

        // the create response carries no name
        created.name = name.to_string();
        Ok(created)
    }

    /// Materialize every missing folder along `full_path` and return the
    /// deepest node. Components that already exist are left untouched.
    #[instrument(skip(self))]
    pub async fn create_folder(&self, full_path: &str) -> Result<Node> {
        let full_path = normalize_path(full_path);
        if full_path == "/" {
            return Ok(self.root.clone());
        }

        let mut parent = String::new();
        let mut current = self.root.clone();
        for component in full_path[1..].split('/') {
            current = self.create_folder_internal(&parent, component).await?;
            parent.push('/');
            parent.push_str(component);
        }

        Ok(current)
    }

    // ==================== Node mutation ====================

    pub(crate) fn check_root(&self, node: &Node) -> Result<()> {
        if node.file_id == self.root.file_id {
            return Err(DriveError::Validation(
                "can't operate on root".to_string(),
            ));
        }
        Ok(())
    }

    /// Rename a node in place
    #[instrument(skip(self, node), fields(node_id = %node.file_id))]
    pub async fn rename(&self, node: &Node, new_name: &str) -> Result<()> {
        self.check_root(node)?;

        let request = RenameRequest {
            drive_id: self.drive_id.clone(),
            file_id: node.file_id.clone(),
            name: new_name.to_string(),
            check_name_mode: CheckNameMode::Refuse,
        };
        self.json_request_discard(Method::POST, &self.api_url(endpoints::FILE_UPDATE), &request)
            .await
            .map_err(|e| e.context("failed to post rename request"))
    }

    /// Move a node into another folder under a new name
    #[instrument(skip(self, node, dst_parent), fields(node_id = %node.file_id))]
    pub async fn move_to(&self, node: &Node, dst_parent: &Node, dst_name: &str) -> Result<()> {
        self.check_root(node)?;

        let request = MoveRequest {
            drive_id: self.drive_id.clone(),
            file_id: node.file_id.clone(),
            to_parent_file_id: dst_parent.file_id.clone(),
            new_name: dst_name.to_string(),
        };
        self.json_request_discard(Method::POST, &self.api_url(endpoints::FILE_MOVE), &request)
            .await
            .map_err(|e| e.context("failed to post move request"))
    }

    /// Move a node to the recycle bin
    #[instrument(skip(self, node), fields(node_id = %node.file_id))]
    pub async fn remove(&self, node: &Node) -> Result<()> {
        self.check_root(node)?;

        let request = TrashRequest {
            drive_id: self.drive_id.clone(),
            file_id: node.file_id.clone(),
        };
        self.json_request_discard(
            Method::POST,
            &self.api_url(endpoints::RECYCLEBIN_TRASH),
            &request,
        )
        .await
        .map_err(|e| e.context("failed to post remove request"))
    }

    /// Copy a node into another folder under a new name. The root guard
    /// applies here exactly as it does to rename, move, and remove.
    #[instrument(skip(self, node, dst_parent), fields(node_id = %node.file_id))]
    pub async fn copy(&self, node: &Node, dst_parent: &Node, dst_name: &str) -> Result<()> {
        self.check_root(node)?;

        let request = CopyRequest {
            drive_id: self.drive_id.clone(),
            file_id: node.file_id.clone(),
            to_parent_file_id: dst_parent.file_id.clone(),
            new_name: dst_name.to_string(),
        };
        self.json_request_discard(Method::POST, &self.api_url(endpoints::FILE_COPY), &request)
            .await
            .map_err(|e| e.context("failed to post copy request"))
    }
}

// ==================== Path helpers ====================

/// Normalize to the canonical form: starts with `/`, never ends with `/`
/// unless it denotes the root itself
pub(crate) fn normalize_path(s: &str) -> String {
    let mut path = if s.starts_with('/') {
        s.to_string()
    } else {
        format!("/{}", s)
    };

    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

/// Split a normalized path into parent path and final component
pub(crate) fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    }
}

pub(crate) fn find_node_error(err: DriveError, path: &str) -> DriveError {
    err.context(format!("failed to find node of \"{}\"", path))
}
