use crate::config::ServerConfig;
use crate::error::{Result, StartupError};
use axum::http::StatusCode;
use axum::{response::IntoResponse, Router};
use futures::FutureExt;
use langs_app::service::LanguageService;
use langs_app::state::{AppConfig, AppState};
use langs_dal::repository::Collection;
use tracing::{debug, info};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if !args.no_cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(feature = "openapi")]
fn api_docs() -> utoipa::openapi::OpenApi {
    #[derive(utoipa::OpenApi)]
    #[openapi(info(title = "Languages API"))]
    struct OpenApi;

    use utoipa::OpenApi as _;
    OpenApi::openapi()
        .merge_from(langs_app::health::api_docs())
        .merge_from(langs_app::rest_api::api_docs())
}

pub fn main_router(state: AppState) -> Router<()> {
    #[allow(unused_mut)]
    let mut router = Router::new()
        .merge(langs_app::health::router())
        .merge(langs_app::rest_api::router())
        .fallback(invalid_url)
        .with_state(state);

    #[cfg(feature = "openapi")]
    {
        let docs = api_docs();
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs),
        );
    }
    router
}

async fn invalid_url(uri: axum::http::Uri) -> impl IntoResponse {
    debug!("No route for {uri}");
    (StatusCode::NOT_FOUND, "You have accessed an invalid URL")
}

/// Connects to the store and makes sure it answers before anything is served.
pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let database_url = config.database_url();
    let pool = langs_dal::new_pool(&database_url)?;
    let collection = Collection::new(pool, &config.store.collection_name)?;

    if !LanguageService::new(collection.clone()).ping().await {
        return Err(StartupError::StoreUnavailable(database_url).into());
    }
    collection.ensure_created().await?;
    info!(
        "Connected to {database_url}, using collection {}",
        collection.name()
    );

    Ok(AppState::new(AppConfig::default(), collection))
}
