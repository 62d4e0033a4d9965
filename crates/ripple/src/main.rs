//! Ripple: timed share-job service
//!
//! Main binary with subcommands:
//! - `serve`: HTTP API and job scheduler

use clap::{Parser, Subcommand};
use miette::Result;
use ripple_graph::{DEFAULT_GRAPH_URL, DEFAULT_RESOLVER_URL};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod serve;

#[derive(Parser)]
#[command(name = "ripple")]
#[command(about = "Timed share-job service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and scheduler
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value = "5000")]
        port: u16,

        /// Address to bind
        #[arg(long, env = "RIPPLE_BIND", default_value = "0.0.0.0")]
        bind: String,

        /// Post-id resolver endpoint
        #[arg(long, env = "RIPPLE_RESOLVER_URL", default_value = DEFAULT_RESOLVER_URL)]
        resolver_url: String,

        /// Graph API base URL used for sharing
        #[arg(long, env = "RIPPLE_GRAPH_URL", default_value = DEFAULT_GRAPH_URL)]
        graph_url: String,

        /// Static files directory, served under /static
        #[arg(long)]
        static_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "ripple=info,ripple_scheduler=info,ripple_web=info,tower_http=info".to_string()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            resolver_url,
            graph_url,
            static_dir,
        } => {
            serve::run(serve::ServeConfig {
                bind,
                port,
                resolver_url,
                graph_url,
                static_dir,
            })
            .await
        }
    }
}
