use accountserver::{security, AppState, ServiceConfig};
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::parse();
    config.init_tracing();

    info!("🚀 Starting Account Service");

    let store = accountcore::connect(&config.database_uri)
        .await
        .with_context(|| {
            format!(
                "Failed to open account store at {}",
                accountcore::store::redact(&config.database_uri)
            )
        })?;

    info!("✅ Store initialized ({})", store.backend());

    let app_state = web::Data::new(AppState::new(store));
    let force_https = config.force_https;

    info!("🌐 Server starting on http://{}", config.bind);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(security::cors())
            .wrap(security::RedirectHttps::new(force_https))
            .wrap(security::headers())
            .wrap(middleware::Logger::default())
            .configure(accountserver::configure)
    });

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind(&config.bind)?.run().await?;

    info!("Account Service stopped");
    Ok(())
}
