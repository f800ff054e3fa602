use actix_web::{middleware::Compress, web, App, HttpServer};
use actix_cors::Cors;
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use tracing_actix_web::TracingLogger;

use convo::auth::TokenService;
use convo::repo::Repo;
use convo::seed::seed_tabs;
use convo::{config, AppState, Settings};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds to reduce manual setup overhead.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    let settings = Settings::load().context("loading configuration")?;

    // Structured logging initialisation
    let level = if settings.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Bootstrapping convo server");

    let repo = build_repo(&settings).await?;
    let tabs = settings.tabs();
    seed_tabs(repo.as_ref(), &tabs).await.context("seeding tabs")?;
    info!("Seeded {} tabs", tabs.len());

    let state = web::Data::new(AppState::new(
        repo,
        TokenService::new(settings.secret_key.as_bytes()),
        tabs,
    ));
    let origins = settings.cors_origins.clone();

    let server = HttpServer::new(move || {
        let cors = origins.iter().fold(
            Cors::default()
                .allowed_methods(["GET", "POST", "OPTIONS"])
                .allow_any_header()
                .max_age(3600),
            |c, origin| c.allowed_origin(origin),
        );

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(config)
    })
    .bind(&settings.bind)
    .with_context(|| format!("binding {}", settings.bind))?;

    info!("Listening on http://{}", settings.bind);

    server.run().await?;
    Ok(())
}

/// Postgres when `database.url` is configured, otherwise the in-memory store.
async fn build_repo(settings: &Settings) -> anyhow::Result<Arc<dyn Repo>> {
    match settings.database.url.as_deref() {
        #[cfg(feature = "postgres-store")]
        Some(url) => {
            use convo::repo::pg::PgRepo;
            use sqlx::postgres::PgPoolOptions;
            let pool = PgPoolOptions::new()
                .max_connections(settings.database.max_connections)
                .connect(url)
                .await
                .context("connecting to Postgres")?;
            let repo = PgRepo::new(pool);
            repo.migrate().await.context("running migrations")?;
            info!("Using Postgres repository backend");
            Ok(Arc::new(repo))
        }
        #[cfg(not(feature = "postgres-store"))]
        Some(_) => anyhow::bail!("database.url is set but the postgres-store feature is disabled"),
        None => in_memory(),
    }
}

#[cfg(feature = "inmem-store")]
fn in_memory() -> anyhow::Result<Arc<dyn Repo>> {
    info!("Using in-memory repository backend");
    Ok(Arc::new(convo::repo::inmem::InMemRepo::new()))
}

#[cfg(not(feature = "inmem-store"))]
fn in_memory() -> anyhow::Result<Arc<dyn Repo>> {
    anyhow::bail!("no database.url configured and the inmem-store feature is disabled")
}
