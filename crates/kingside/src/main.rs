//! Kingside server executable.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lib_kingside::init().await
}
