use axum::{Router, middleware};
use database::db::create_connection;
use log::{error, info};
use mailer::{LogMailer, Notifier};
use migration::{Migrator, MigratorTrait};
use server::{AppState, Config, auth::subject_from_claims, doc::ApiDoc, router};
use std::sync::Arc;
use storage::LocalStorage;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, services::ServeDir};
use tower_oauth2_resource_server::server::OAuth2ResourceServer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let db = create_connection(&config.database_url).await?;
    if config.run_migrations {
        Migrator::up(&db, None).await?;
        info!("Database migrations applied");
    }

    let storage = LocalStorage::open(&config.storage_root, &config.public_url).await?;
    let public_root = storage.public_root();
    let notifier = Notifier::new(
        Arc::new(LogMailer),
        &config.mail_from,
        &config.admin_email,
    );

    let oauth2_resource_server = <OAuth2ResourceServer>::builder()
        .issuer_url(&config.oidc_issuer_url)
        .build()
        .await
        .map_err(|e| format!("Failed to build OAuth2ResourceServer: {e:?}"))?;

    let bind_addr = config.bind_addr;
    let state = AppState {
        db,
        storage: Arc::new(storage),
        notifier,
        config: Arc::new(config),
    };

    let api = router(state, |protected| {
        protected
            .route_layer(middleware::from_fn(subject_from_claims))
            .route_layer(ServiceBuilder::new().layer(oauth2_resource_server.into_layer()))
    });

    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/storage", ServeDir::new(public_root))
        .merge(api)
        .layer(CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Running axum on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(server::utils::shutdown::shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
