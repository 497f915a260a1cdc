use api_bridge::config::ServerConfig;
use api_bridge::constants::{env, network, server};
use api_bridge::mcp::http;
use api_bridge::mcp::server::{run_stdio, McpServer};
use api_bridge::services::logger::LogLevel;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

/// MCP server exposing a configured HTTP API as tools.
#[derive(Debug, Parser)]
#[command(name = "api-bridge", version)]
struct Cli {
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Listen port for the http transport. Overrides PORT.
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::from_env().as_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = ServerConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if !config.base_url_configured {
        tracing::warn!(
            placeholder = network::PLACEHOLDER_BASE_URL,
            "{} is not set; requests go to the placeholder base URL",
            env::API_BASE_URL
        );
    }

    match cli.transport {
        Transport::Stdio => run_stdio(config).await.map_err(|err| err.to_string()),
        Transport::Http => {
            let port = config.port;
            let server = McpServer::from_config(config).map_err(|err| err.to_string())?;
            http::serve(server, port).await.map_err(|err| err.to_string())
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{}: {}", server::NAME, err);
        std::process::exit(1);
    }
}
