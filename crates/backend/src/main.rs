pub mod api;
pub mod dashboards;
pub mod domain;
pub mod routes;
pub mod shared;
pub mod system;

use std::net::SocketAddr;

use axum::http::{header, Method};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging comes up before the config is read
    system::tracing::initialize()?;

    let config = shared::config::install(shared::config::load_config()?);

    shared::data::db::initialize_database(config).await?;

    let db = shared::data::db::get_connection()?;
    system::initialization::ensure_admin_user_exists(db).await?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = routes::configure_routes()
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(cors)
        .layer(axum::middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            tracing::error!(
                "Port {} is already in use. Stop the other server instance or change [server] port in config.toml",
                config.server.port
            );
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Server listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
