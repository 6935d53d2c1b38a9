// --- File: crates/services/bookify_backend/src/main.rs ---
use axum::{routing::get, Router};
use bookify_catalog::routes as catalog_routes;
use bookify_config::load_config;
use bookify_db::build_repositories;
use bookify_scheduling::routes as scheduling_routes;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod seed;

#[tokio::main]
async fn main() {
    bookify_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));

    let repos = build_repositories(&config)
        .await
        .expect("Failed to initialize storage");

    if config.booking.demo_seed {
        seed::seed_demo_data(&repos)
            .await
            .expect("Failed to seed demo data");
    }

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Bookify API!" }))
        .merge(scheduling_routes::routes(config.clone(), repos.clone()))
        .merge(catalog_routes::routes(repos.clone()));

    let app = Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    info!("starting server at http://{addr}");
    info!("API endpoints available at http://{addr}/api");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
