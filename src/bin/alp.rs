//! alp - browse the mountaineering catalog and download route descriptions.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

#[tokio::main]
async fn main() -> alp_dl::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    alp_dl::cli::run().await
}
