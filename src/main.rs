mod db;
mod pdf;
mod server;
mod service;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> () {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    server::run().await;
}
