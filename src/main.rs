use portfolio_api::{api, builtin_stock_splits, config::Config, db::init_db, Repository, StockSplit};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize database
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));

    // Seed the split reference table: builtin rows plus any operator file.
    let mut splits = builtin_stock_splits();
    if let Some(path) = &config.stock_splits_file {
        match load_splits_file(path) {
            Ok(extra) => splits.extend(extra),
            Err(e) => {
                eprintln!("Failed to read stock splits file {}: {}", path, e);
                std::process::exit(1);
            }
        }
    }
    if let Err(e) = repo.seed_stock_splits(&splits).await {
        eprintln!("Failed to seed stock splits: {}", e);
        std::process::exit(1);
    }

    // Create router
    let app = api::create_router(api::AppState::new(repo, config));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn load_splits_file(path: &str) -> anyhow::Result<Vec<StockSplit>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
