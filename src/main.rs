use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gema::run().await
}
