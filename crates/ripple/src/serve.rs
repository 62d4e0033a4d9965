//! Serve mode: scheduler plus HTTP API.

use std::sync::Arc;

use miette::Result;
use ripple_graph::GraphClient;
use ripple_scheduler::Scheduler;
use tracing::info;

/// Settings for `ripple serve`.
pub struct ServeConfig {
    pub bind: String,
    pub port: u16,
    pub resolver_url: String,
    pub graph_url: String,
    pub static_dir: Option<String>,
}

/// Run the HTTP server until Ctrl-C.
pub async fn run(config: ServeConfig) -> Result<()> {
    let poster = GraphClient::with_endpoints(&config.resolver_url, &config.graph_url);
    info!(
        resolver_url = poster.resolver_url(),
        graph_url = poster.graph_url(),
        "share client configured"
    );

    let scheduler = Arc::new(Scheduler::new(Arc::new(poster)));
    let router = ripple_web::create_router(Arc::clone(&scheduler), config.static_dir.as_deref());

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| miette::miette!("failed to bind {}: {}", addr, e))?;

    info!("Server is running on http://{}", addr);

    let shutdown_scheduler = Arc::clone(&scheduler);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("received shutdown signal");
            shutdown_scheduler.shutdown();
        })
        .await
        .map_err(|e| miette::miette!("server error: {}", e))?;

    info!("server shut down gracefully");
    Ok(())
}
