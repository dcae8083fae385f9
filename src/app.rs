/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → PluginConfig 生成 → Router 組み立て
 * - Middleware の適用 (request id / logger / bearer / basic)
 * - axum::serve() で起動
 */
use std::net::SocketAddr;
use std::panic;

use anyhow::Result;
use axum::{Extension, Router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{AppEnv, Config};
use crate::middleware::{basic_auth, bearer_auth, http, req_logger};
use crate::state::PluginConfig;

fn init_tracing(app_env: AppEnv) {
    // RUST_LOG wins; DEBUG is what turns on body capture in the request logger.
    // Ex:
    // RUST_LOG=info,ez_plugin=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(app_env.default_log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    let default_hook = panic::take_hook();

    // Handler panics are recovered into a 500 envelope, so the process keeps
    // running in every environment. The hook only makes sure they are logged.
    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.app_env);
    init_panic_hook();

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let plugin = config.plugin_config();
    tracing::debug!(settings = ?plugin.snapshot(), "plugin config");

    let app = build_router(&config, plugin);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Full application router: api routes, credential middlewares, request
/// logger and transport layers, outermost last.
pub fn build_router(config: &Config, plugin: PluginConfig) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes())
        .layer(Extension(plugin.clone()));

    let router = bearer_auth::apply(router, plugin.clone());
    let router = basic_auth::apply(router);
    let router = req_logger::apply(router, plugin);

    http::apply(router, config)
}
