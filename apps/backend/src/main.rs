#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lumi_backend::run().await
}
