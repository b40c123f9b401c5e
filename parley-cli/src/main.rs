use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use parley_relay::{PeerRegistry, WS_PATH, serve};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Signaling relay for one-to-one WebRTC calls")]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!("{}", "📡 Parley relay is up".green().bold());
    println!("   🔌 ws://{}{}", listener.local_addr()?, WS_PATH);

    serve(listener, PeerRegistry::new()).await
}
