//! Upload a local file: `cargo run --example upload -- report.txt /docs/report.txt`

use adrive_client::{Config, DriveFs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let refresh_token = std::env::var("ADRIVE_REFRESH_TOKEN")?;
    let mut args = std::env::args().skip(1);
    let local = args.next().expect("usage: upload <local> <remote>");
    let remote = args.next().expect("usage: upload <local> <remote>");

    let fs = DriveFs::new(Config::new(refresh_token)).await?;

    let file = tokio::fs::File::open(&local).await?;
    let size = file.metadata().await?.len();
    let node = fs.create_file(&remote, size, file, false).await?;

    println!("uploaded {} -> {} ({})", local, remote, node.file_id);
    Ok(())
}
