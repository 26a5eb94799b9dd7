//! Wordwire server binary.

use tracing_subscriber::EnvFilter;
use wordwire::{WordwireServer, DEFAULT_PASSWORD};
use wordwire_session::SharedPassword;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let server = WordwireServer::<SharedPassword>::builder()
        .tcp_addr("0.0.0.0:55555")
        .unix_path("/tmp/wordwire.sock")
        .status_addr("127.0.0.1:8000")
        .build(SharedPassword::new(DEFAULT_PASSWORD))
        .await?;
    let handle = server.handle();

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            handle.shutdown().await;
        }
    }
    Ok(())
}
