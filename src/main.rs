/// The entry point of the application.
/// Loads settings, initializes logging, and serves the proxy.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ollabridge::run().await?;
    Ok(())
}
