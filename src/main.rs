#[tokio::main]
async fn main() -> anyhow::Result<()> {
    frame_recorder::run().await
}
