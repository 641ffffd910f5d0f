// Café Site Server - serves the CRUD API over the JSON data directory

use std::net::SocketAddr;
use tokio::net::TcpListener;

use cafe_site::{api, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state (seeds missing data files)
    let app_state = AppState::new(config.clone()).await?;

    // Build application router
    let app = api::app(app_state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    println!("☕ Café site server starting on http://{}", addr);
    println!("📋 API:");
    println!("  GET    /api/health               - liveness");
    println!("  GET    /api/data                 - all documents");
    println!("  GET    /api/data/{{filename}}      - one document");
    println!("  POST   /api/data/{{filename}}      - replace document");
    println!("  PUT    /api/data/{{filename}}/{{id}} - patch one item");
    println!("  DELETE /api/data/{{filename}}/{{id}} - remove one item");
    println!("  POST   /api/backup               - snapshot data directory");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
