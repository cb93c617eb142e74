//! Remote endpoint paths, relative to the configured API and auth base URLs.
//!
//! The full catalog is enumerated here even though a few entries
//! ([`FILE_GET`], [`CREATE_WITH_FOLDERS`], [`FILE_DELETE`], [`BATCH`]) are
//! consumed by no operation: only the endpoints needed for filesystem
//! semantics are modeled by the client.

/// Token refresh, on the auth base URL. Everything else is on the API base.
pub const TOKEN: &str = "/v2/account/token";

pub const USER_GET: &str = "/v2/user/get";
pub const ALBUMS_INFO: &str = "/adrive/v1/user/albums_info";

pub const FILE_LIST: &str = "/v2/file/list";
pub const FILE_GET: &str = "/v2/file/get";
pub const FILE_GET_BY_PATH: &str = "/v2/file/get_by_path";

pub const CREATE_WITH_PROOF: &str = "/v2/file/create_with_proof";
pub const CREATE_WITH_FOLDERS: &str = "/adrive/v2/file/createWithFolders";
pub const COMPLETE_UPLOAD: &str = "/v2/file/complete";

pub const FILE_UPDATE: &str = "/v2/file/update";
pub const FILE_MOVE: &str = "/v2/file/move";
pub const FILE_COPY: &str = "/v2/file/copy";
pub const RECYCLEBIN_TRASH: &str = "/v2/recyclebin/trash";
pub const FILE_DELETE: &str = "/v3/file/delete";
pub const BATCH: &str = "/v2/batch";

pub const GET_DOWNLOAD_URL: &str = "/v2/file/get_download_url";
