use anyhow::Result;
use leadbook::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
