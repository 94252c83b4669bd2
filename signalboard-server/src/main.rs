use actix_web::{web, App, HttpServer};
use signalboard::Store;
use std::path::PathBuf;

mod handlers;
mod pages;

/// Shared application state
pub struct AppState {
    pub store: Store,
    pub assets_dir: PathBuf,
    /// Shared secret for the /admin routes. When unset the routes are
    /// disabled rather than left open.
    pub admin_token: Option<String>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    log::info!("Starting Signalboard server");

    let data_dir = std::env::var("SIGNALBOARD_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let assets_dir =
        std::env::var("SIGNALBOARD_ASSETS_DIR").unwrap_or_else(|_| "assets".to_string());
    let host = std::env::var("SIGNALBOARD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("SIGNALBOARD_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let admin_token = std::env::var("SIGNALBOARD_ADMIN_TOKEN").ok();

    if admin_token.is_none() {
        log::warn!("SIGNALBOARD_ADMIN_TOKEN not set; /admin routes are disabled");
    }

    log::info!("Opening store at: {data_dir}");
    let store = Store::open(&data_dir).expect("Failed to open Signalboard store");

    let state = web::Data::new(AppState {
        store,
        assets_dir: PathBuf::from(assets_dir),
        admin_token,
    });

    log::info!("Listening on {host}:{port}");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
