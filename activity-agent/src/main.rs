use tracing::info;
use warp::Filter;

mod agents;
mod api;
mod config;
mod error;
mod llm;
mod metrics;
mod middleware;
mod models;
mod state;
#[cfg(test)]
mod testing;
mod tools;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting up activity planner agent");

    // Build the planner; a missing model key leaves the service up but not ready
    let state = state::AppState::from_config(&config)?;
    if state.is_ready() {
        info!("App initialized successfully");
    }

    let routes = api::routes(state)
        .recover(error::handle_rejection)
        .with(warp::log("api"))
        .with(middleware::cors());

    let addr = ([0, 0, 0, 0], config.port);
    let (bound, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        let _ = tokio::signal::ctrl_c().await;
    });
    info!("Server listening on {}", bound);

    server.await;
    info!("Shutting down activity planner agent");

    Ok(())
}
