use std::sync::Arc;

use statusdeck::db::DashboardDb;
use statusdeck::server;
use statusdeck::state::AppState;

#[tokio::main]
async fn main() {
    env_logger::init();

    let db = match DashboardDb::open() {
        Ok(db) => db,
        Err(e) => {
            log::error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let addr = std::env::var("STATUSDECK_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());
    let state = Arc::new(AppState::new(db));

    if let Err(e) = server::serve(&addr, state).await {
        log::error!("Server error: {e}");
        std::process::exit(1);
    }
}
