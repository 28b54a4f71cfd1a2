mod config;
mod error;
mod pipeline;
mod routes;

use std::net::SocketAddr;

use config::{Args, ServeConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();
    let port = std::env::var("PORT").ok();
    let config = ServeConfig::from_args(args, port.as_deref())?;

    if (config.kernel.sum() - 1.0).abs() > 1e-3 {
        log::warn!(
            "blur kernel weights sum to {}, output brightness will be scaled",
            config.kernel.sum()
        );
    }

    log::info!("🚀 Starting the server");
    log::info!("🔥 Listening on: http://0.0.0.0:{}", config.port);
    log::info!(
        "🔧 Blurring with a {}x{} kernel, edge policy {}",
        config.kernel.width,
        config.kernel.height,
        config.edge_policy
    );
    log::info!("🔧 Press Ctrl+C to stop the server");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = routes::router(routes::AppState::new(config));

    // run our app with hyper, listening globally on the configured port
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for ctrl-c: {e}");
            }
            log::info!("👋 Shutting down");
        })
        .await?;

    Ok(())
}
