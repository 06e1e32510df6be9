/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// 启动检查模块
pub mod startup;

/// 功能聚合模块
pub mod features;

/// 国际化：文案、翻译字典与行内翻译
pub mod i18n;

/// 应用状态聚合模块
pub mod state;

/// 管理端令牌校验
pub mod admin;

/// request_id 中间件
pub mod request_id;

/// OpenAPI 文档
pub mod openapi;

/// 路由组装
pub mod app;

/// 优雅退出管理模块
pub mod shutdown;

// 导出常用类型供外部使用
pub use app::create_app;
pub use config::AppConfig;
pub use error::AppError;
pub use shutdown::{ShutdownManager, ShutdownReason};
pub use state::AppState;
