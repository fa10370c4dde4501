#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    voxpad::app::run().await
}
