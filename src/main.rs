use storefront_backend::startup::run_startup_checks;
use storefront_backend::{AppConfig, AppState, ShutdownManager, create_app};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_backend=info,tower_http=info".into()),
        )
        .init();

    let shutdown_manager = ShutdownManager::new();

    // Load config
    if let Err(e) = AppConfig::init_global() {
        tracing::error!("Config init failed: {}", e);
        std::process::exit(1);
    }
    let config = AppConfig::global();

    if let Err(e) = shutdown_manager.start_signal_handler() {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run_startup_checks(config).await {
        tracing::error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }

    let app_state = match AppState::build(config).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("应用状态初始化失败: {}", e);
            std::process::exit(1);
        }
    };
    let widget_pool = app_state.widget_storage.pool.clone();

    let app = create_app(app_state, &config.api.prefix);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Admin API: http://{}{}/admin", addr, config.api.prefix);
    tracing::info!("Media root: {:?}", config.media_root());

    let shutdown_timeout = config.shutdown.timeout_duration();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = shutdown_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
    });

    if let Err(e) = graceful.await {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }

    tracing::info!("优雅退出超时时间: {}秒", config.shutdown.timeout_secs);
    match ShutdownManager::cleanup_with_timeout(widget_pool.close(), shutdown_timeout).await {
        Ok(()) => tracing::info!("服务器已优雅关闭"),
        Err(e) => tracing::warn!("资源清理未完成: {}", e),
    }
}
