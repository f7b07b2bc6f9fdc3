use clap::{Parser, Subcommand};
use mcp_injection_scan::{config::Config, logging, scan_and_analyze};
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "mcp-injection-scan", version, about)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan an MCP server for prompt injections in tool, prompt and resource descriptions
    #[command(name = "mcp-scan")]
    McpScan {
        /// URL of the MCP server exposed via HTTP
        #[arg(long = "http-url", env = "MCP_SCAN_HTTP_URL")]
        http_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = Config::from_env()?;

    match cli.command {
        Command::McpScan { http_url } => {
            let report = scan_and_analyze(&config, &http_url).await.map_err(|err| {
                error!(error = %err, "error scanning MCP server");
                err
            })?;
            print!("{report}");
        }
    }

    Ok(())
}
