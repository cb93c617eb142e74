//! # adrive-client
//!
//! A client SDK that exposes Aliyun Drive as a path-addressed filesystem.
//!
//! The remote service only understands opaque node identifiers,
//! cursor-paginated child listings, and multi-step proof-based uploads;
//! this crate adapts it so callers can work with slash-delimited paths and
//! filesystem-like semantics.
//!
//! ## Features
//!
//! - **Path resolution**: direct path lookup with a name-scan fallback, so
//!   any structurally valid path resolves
//! - **Filesystem operations**: list, create folders (with race-safe lazy
//!   materialization), rename, move, remove, copy
//! - **Rapid upload**: content-addressed dedup via SHA-1 plus a sampled
//!   proof code, falling back to chunked multi-part transfer
//! - **Downloads**: direct streaming, with on-the-fly zip synthesis for
//!   multi-stream live photo assets
//!
//! ## Example
//!
//! ```rust,ignore
//! use adrive_client::{Config, DriveFs, LookupKind};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fs = DriveFs::new(Config::new("your-refresh-token")).await?;
//!
//!     // List the drive root
//!     for node in fs.list("/").await? {
//!         println!("{}\t{}", node.kind, node.name);
//!     }
//!
//!     // Upload a file; the server skips the transfer if it already
//!     // stores identical content
//!     let file = tokio::fs::File::open("report.txt").await?;
//!     let size = file.metadata().await?.len();
//!     fs.create_file("/docs/report.txt", size, file, false).await?;
//!
//!     // Resolve and rename
//!     let node = fs.get("/docs/report.txt", LookupKind::File).await?;
//!     fs.rename(&node, "report-final.txt").await?;
//!
//!     Ok(())
//! }
//! ```

pub mod endpoints;

mod auth;
mod client;
mod config;
mod download;
mod error;
mod proof;
mod types;
mod upload;

pub use client::DriveFs;
pub use config::{Config, DEFAULT_API_BASE, DEFAULT_AUTH_BASE, DEFAULT_USER_AGENT};
pub use download::ByteStream;
pub use error::{DriveError, Result};
pub use proof::{calc_proof, calc_sha1, ProofOffsetFn, PROOF_SAMPLE_LEN};
pub use types::*;
pub use upload::MAX_PART_SIZE;
