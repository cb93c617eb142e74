//! List a drive folder: `cargo run --example ls -- /photos`

use adrive_client::{Config, DriveFs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let refresh_token = std::env::var("ADRIVE_REFRESH_TOKEN")?;
    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());

    let fs = DriveFs::new(Config::new(refresh_token)).await?;
    for node in fs.list(&path).await? {
        println!("{}\t{}\t{}", node.kind, node.size.unwrap_or(0), node.name);
    }

    Ok(())
}
