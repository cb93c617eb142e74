//! Download a remote file: `cargo run --example download -- /docs/report.txt report.txt`

use std::collections::HashMap;

use adrive_client::{Config, DriveFs, LookupKind};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let refresh_token = std::env::var("ADRIVE_REFRESH_TOKEN")?;
    let mut args = std::env::args().skip(1);
    let remote = args.next().expect("usage: download <remote> <local>");
    let local = args.next().expect("usage: download <remote> <local>");

    let fs = DriveFs::new(Config::new(refresh_token)).await?;

    let node = fs.get(&remote, LookupKind::File).await?;
    let mut stream = fs.open(&node, &HashMap::new()).await?;

    let mut out = tokio::fs::File::create(&local).await?;
    while let Some(chunk) = stream.next().await {
        out.write_all(&chunk?).await?;
    }
    out.flush().await?;

    println!("downloaded {} -> {}", remote, local);
    Ok(())
}
