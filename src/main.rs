use clap::Parser;
use n8n_mcp::config::{Config, ConfigOverrides};

/// MCP server for the n8n public REST API (stdio transport).
#[derive(Debug, Parser)]
#[command(name = "n8n-mcp", version, about)]
struct Args {
    /// n8n API root; `/api/v1` is appended when missing [env: N8N_API_URL]
    #[arg(long)]
    api_url: Option<String>,

    /// Default API key used when a call carries none [env: N8N_API_KEY]
    #[arg(long)]
    api_key: Option<String>,

    /// Per-request timeout in milliseconds [env: N8N_TIMEOUT_MS]
    #[arg(long)]
    timeout_ms: Option<String>,

    /// error, warn, info or debug [env: LOG_LEVEL]
    #[arg(long)]
    log_level: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            api_url: args.api_url,
            api_key: args.api_key,
            timeout_ms: args.timeout_ms,
            log_level: args.log_level,
        }
    }
}

#[tokio::main]
async fn main() {
    let overrides = ConfigOverrides::from(Args::parse());
    let config = match Config::from_env_with(&overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("n8n-mcp: {}\n{}", err, err.details);
            std::process::exit(1);
        }
    };
    if let Err(err) = n8n_mcp::mcp::server::run_stdio(config).await {
        eprintln!("n8n-mcp: {}", err);
        std::process::exit(1);
    }
}
