use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::get,
    Router,
};
use dotenvy::dotenv;
use formdoc_core::{http::not_found, views::health::health, ContactCfg, CoreState};
use formdoc_docs::{DocsCfg, DocsState};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct GatewayCfg {
    port: u16,
    body_limit: usize,
    cors_enabled: bool,
}

impl GatewayCfg {
    fn from_env() -> Self {
        let port = std::env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8000);
        let body_limit = std::env::var("BODY_LIMIT_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(25 * 1024 * 1024);
        let cors_enabled = std::env::var("CORS_ENABLED")
            .map(|v| !matches!(v.as_str(), "0" | "false" | "FALSE"))
            .unwrap_or(true);
        Self { port, body_limit, cors_enabled }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let cfg = GatewayCfg::from_env();
    let docs_cfg = DocsCfg::from_env();
    let contact_cfg = ContactCfg::from_env();

    if !docs_cfg.items_template.exists() {
        warn!(path = %docs_cfg.items_template.display(), "docx template not found; document endpoints will answer 400");
    }
    info!(
        items_template = %docs_cfg.items_template.display(),
        responses_template = %docs_cfg.responses_template.display(),
        contact_csv = %contact_cfg.csv_path.display(),
        "configuration loaded"
    );

    let app = app(&cfg, &docs_cfg, &contact_cfg);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!("listening on http://{}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

fn app(cfg: &GatewayCfg, docs_cfg: &DocsCfg, contact_cfg: &ContactCfg) -> Router {
    let api = formdoc_core::urls::router(CoreState::new(contact_cfg))
        .merge(formdoc_docs::urls::router(DocsState::new(docs_cfg)));

    let mut app = Router::new()
        .route("/healthz", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(cfg.body_limit));

    // the frontend is served from another origin
    if cfg.cors_enabled {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .allow_origin(Any);
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}
