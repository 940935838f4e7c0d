use std::sync::Arc;
use axum::http::{HeaderValue, Method};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing::{error, info, warn};
use tokio::time::{interval, Duration, MissedTickBehavior};

mod routes;
mod models;
mod services;
mod config;
mod error;
mod utils;
mod state;

use crate::{
    config::Config,
    services::Database,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化日志
    let filter = tracing_subscriber::EnvFilter::new(&config.log_level);
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting shop-admin service in {} mode...", config.environment);

    // 初始化存储
    let db = Arc::new(match Database::from_config(&config).await {
        Ok(db) => {
            db.verify_connection().await?;
            db
        }
        Err(e) => {
            error!("Failed to open document store: {}", e);
            return Err(anyhow::anyhow!("Storage initialization failed"));
        }
    });

    // 初始化所有服务并创建应用状态
    let app_state = Arc::new(AppState::build(config.clone(), db).await?);

    // 启动后台任务
    start_background_tasks(app_state.clone()).await;

    // 配置 CORS
    let origins = config
        .cors_allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(origins);

    // 构建应用路由
    let app = routes::app(app_state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // 启动主服务器
    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn start_background_tasks(app_state: Arc<AppState>) {
    let period = app_state.config.alert_scan_interval;
    if period == 0 {
        info!("Background stock scan disabled");
        return;
    }

    info!("Starting background stock scan every {}s", period);

    // 库存告警扫描任务
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(period));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match app_state.alert_service.check_and_generate_alerts().await {
                Ok(created) if !created.is_empty() => {
                    info!("Background scan generated {} alert(s)", created.len());
                }
                Ok(_) => {}
                Err(e) => error!("Failed to run stock alert scan: {}", e),
            }
        }
    });
}
