use std::net::SocketAddr;
use tracing::info;
use bookshelf::books::factory::create_library;
use bookshelf::books::repository::into_handle;
use bookshelf::catalog::controller::routes;
use bookshelf::core::controller::AppState;
use bookshelf::core::domain::Configuration;
use bookshelf::utils::trace::setup_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = Configuration::from_env();
    let addr: SocketAddr = config.bind_addr.parse()?;
    let library = into_handle(create_library(&config).await?);
    info!("serving {} on {}", config.library_file.display(), addr);

    let app = routes(AppState::new(library));
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
