//! Typed request/response records for the remote API.
//!
//! Every endpoint the client consumes gets an explicit record documenting
//! required vs. optional fields; the wire format is JSON with snake_case
//! keys unless renamed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved identifier of the top-level folder. The root is never created,
/// renamed, moved, or removed.
pub const ROOT_FILE_ID: &str = "root";

/// Kind of a node as stored by the service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::File => write!(f, "file"),
            NodeKind::Folder => write!(f, "folder"),
        }
    }
}

/// Kind filter for path lookups. `Any` matches both files and folders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupKind {
    File,
    Folder,
    Any,
}

impl LookupKind {
    /// Whether a node of `kind` satisfies this filter
    pub fn matches(self, kind: NodeKind) -> bool {
        match self {
            LookupKind::File => kind == NodeKind::File,
            LookupKind::Folder => kind == NodeKind::Folder,
            LookupKind::Any => true,
        }
    }
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKind::File => write!(f, "file"),
            LookupKind::Folder => write!(f, "folder"),
            LookupKind::Any => write!(f, "any"),
        }
    }
}

/// A filesystem entry identified by a server-assigned opaque id.
///
/// Identifiers may become stale after mutations elsewhere; nodes are
/// resolved on demand and never cached by the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Server-assigned opaque identifier
    pub file_id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Entry kind
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Identifier of the containing folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_file_id: Option<String>,
    /// Declared size in bytes, present for files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Whole-content hash as stored by the service, present for files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Last modification instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Node {
    /// The root sentinel
    pub fn root() -> Self {
        Self {
            file_id: ROOT_FILE_ID.to_string(),
            name: "root".to_string(),
            kind: NodeKind::Folder,
            parent_file_id: None,
            size: None,
            content_hash: None,
            updated_at: None,
        }
    }

    /// Whether this node is the root sentinel
    pub fn is_root(&self) -> bool {
        self.file_id == ROOT_FILE_ID
    }
}

/// Collision policy the server applies to a create request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckNameMode {
    /// Reject the creation if a sibling of the same name exists
    Refuse,
    /// Let the server rename the new entry on collision
    AutoRename,
}

// ==================== Auth ====================

/// Token refresh request body
#[derive(Debug, Serialize)]
pub struct TokenRequest {
    pub refresh_token: String,
    pub grant_type: String,
}

/// Token refresh response. `expires_in` is a lifetime in seconds relative
/// to the response instant.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Identity of the default drive scope
#[derive(Debug, Deserialize)]
pub struct UserGetResponse {
    #[serde(rename = "default_drive_id")]
    pub drive_id: String,
}

/// Identity of the album drive scope
#[derive(Debug, Deserialize)]
pub struct AlbumsInfoResponse {
    pub data: AlbumsInfoData,
}

#[derive(Debug, Deserialize)]
pub struct AlbumsInfoData {
    #[serde(rename = "driveId")]
    pub drive_id: String,
}

// ==================== Listing & lookup ====================

/// One page of a child listing
#[derive(Debug, Serialize)]
pub struct ListRequest {
    pub drive_id: String,
    pub parent_file_id: String,
    pub limit: u32,
    pub marker: String,
}

/// Page response. An empty `next_marker` signals the final page.
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub items: Vec<Node>,
    #[serde(default)]
    pub next_marker: String,
}

/// Direct path lookup
#[derive(Debug, Serialize)]
pub struct GetByPathRequest {
    pub drive_id: String,
    pub file_path: String,
}

// ==================== Folder creation ====================

#[derive(Debug, Serialize)]
pub struct CreateFolderRequest {
    pub drive_id: String,
    pub parent_file_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub check_name_mode: CheckNameMode,
}

// ==================== Upload ====================

/// A bounded slice of an uploaded file. The server assigns `upload_url`
/// when it opens a proof session; requests carry only the number.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartInfo {
    pub part_number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
}

/// Proof-based file creation request
#[derive(Debug, Serialize)]
pub struct CreateFileRequest {
    pub drive_id: String,
    pub part_info_list: Vec<PartInfo>,
    pub parent_file_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub check_name_mode: CheckNameMode,
    pub size: u64,
    pub content_hash: String,
    pub content_hash_name: String,
    pub proof_code: String,
    pub proof_version: String,
}

/// Proof session opened by the create request. When `rapid_upload` is set
/// the content was already present server-side and no parts are
/// transferred; otherwise each part carries its transfer destination.
#[derive(Debug, Deserialize)]
pub struct ProofResponse {
    pub file_id: String,
    #[serde(default)]
    pub upload_id: String,
    #[serde(default)]
    pub rapid_upload: bool,
    #[serde(default)]
    pub part_info_list: Vec<PartInfo>,
}

/// Upload completion request, keyed by the session's identifiers
#[derive(Debug, Serialize)]
pub struct CompleteUploadRequest {
    pub drive_id: String,
    pub file_id: String,
    pub upload_id: String,
}

// ==================== Node mutation ====================

#[derive(Debug, Serialize)]
pub struct RenameRequest {
    pub drive_id: String,
    pub file_id: String,
    pub name: String,
    pub check_name_mode: CheckNameMode,
}

#[derive(Debug, Serialize)]
pub struct MoveRequest {
    pub drive_id: String,
    pub file_id: String,
    pub to_parent_file_id: String,
    pub new_name: String,
}

#[derive(Debug, Serialize)]
pub struct CopyRequest {
    pub drive_id: String,
    pub file_id: String,
    pub to_parent_file_id: String,
    pub new_name: String,
}

#[derive(Debug, Serialize)]
pub struct TrashRequest {
    pub drive_id: String,
    pub file_id: String,
}

// ==================== Download ====================

#[derive(Debug, Serialize)]
pub struct DownloadUrlRequest {
    pub drive_id: String,
    pub file_id: String,
}

/// Transient download target for a node: either a single direct URL, or a
/// mapping of component type to URL for multi-stream live photo assets.
#[derive(Debug, Deserialize)]
pub struct DownloadUrl {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub streams_url: Option<BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_wire_format() {
        let json = r#"{
            "file_id": "61b2c3d4",
            "name": "report.txt",
            "type": "file",
            "parent_file_id": "root",
            "size": 1024,
            "content_hash": "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709"
        }"#;

        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.file_id, "61b2c3d4");
        assert_eq!(node.kind, NodeKind::File);
        assert_eq!(node.size, Some(1024));
        assert!(!node.is_root());
    }

    #[test]
    fn test_root_sentinel() {
        let root = Node::root();
        assert!(root.is_root());
        assert_eq!(root.kind, NodeKind::Folder);
        assert_eq!(root.file_id, ROOT_FILE_ID);
    }

    #[test]
    fn test_lookup_kind_matching() {
        assert!(LookupKind::Any.matches(NodeKind::File));
        assert!(LookupKind::Any.matches(NodeKind::Folder));
        assert!(LookupKind::File.matches(NodeKind::File));
        assert!(!LookupKind::File.matches(NodeKind::Folder));
        assert!(!LookupKind::Folder.matches(NodeKind::File));
    }

    #[test]
    fn test_check_name_mode_wire_format() {
        assert_eq!(
            serde_json::to_string(&CheckNameMode::Refuse).unwrap(),
            "\"refuse\""
        );
        assert_eq!(
            serde_json::to_string(&CheckNameMode::AutoRename).unwrap(),
            "\"auto_rename\""
        );
    }

    #[test]
    fn test_proof_response_defaults() {
        // A rapid-upload response has no upload session and no parts
        let json = r#"{"file_id": "61b2c3d4", "rapid_upload": true}"#;
        let res: ProofResponse = serde_json::from_str(json).unwrap();
        assert!(res.rapid_upload);
        assert!(res.upload_id.is_empty());
        assert!(res.part_info_list.is_empty());
    }
}
