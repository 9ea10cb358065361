// LinkedIn Insights Server

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use linkedin_insights::{app_state::AppState, config::Config, routes::create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linkedin_insights=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    if config.uses_dev_secret() {
        warn!("SECRET_KEY is not set, using the development key");
    }
    if config.openai.api_key.is_none() {
        info!("OPENAI_API_KEY is not set, summaries use the basic template");
    }

    // Initialize application state
    let addr = config.server_address();
    let app_state = AppState::new(config).await?;

    let app = create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    );

    info!("🚀 LinkedIn Insights API starting on http://{}", addr);
    info!("  GET    /api/pages/                      - List pages");
    info!("  GET    /api/pages/{{page_id}}             - Get or scrape a page");
    info!("  GET    /api/pages/{{page_id}}/posts       - Page posts");
    info!("  GET    /api/pages/{{page_id}}/employees   - Page employees");
    info!("  GET    /api/pages/{{page_id}}/followers   - Page followers");
    info!("  GET    /api/pages/{{page_id}}/summary     - Page summary");
    info!("  POST   /api/pages/{{page_id}}/scrape      - Force a scrape");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
