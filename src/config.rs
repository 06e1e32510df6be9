use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 全局配置单例
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

/// 资源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// 资源基础路径
    pub base_path: String,
    /// 前台展示配置文件（相对 base_path），包含商品图片视图定义
    #[serde(default = "ResourcesConfig::default_view_file")]
    pub view_file: String,
    /// 组件定义文件（相对 base_path）
    #[serde(default = "ResourcesConfig::default_widgets_file")]
    pub widgets_file: String,
    /// 翻译字典目录（相对 base_path），文件名为 `<locale>.csv`
    #[serde(default = "ResourcesConfig::default_i18n_dir")]
    pub i18n_dir: String,
}

impl ResourcesConfig {
    fn default_view_file() -> String {
        "view.yaml".to_string()
    }
    fn default_widgets_file() -> String {
        "widgets.yaml".to_string()
    }
    fn default_i18n_dir() -> String {
        "i18n".to_string()
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 日志格式
    pub format: String,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API 路由前缀
    pub prefix: String,
}

/// 单个图片类型的水印配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatermarkConfig {
    /// 水印文件（相对媒体根目录下的 watermark 目录）；为空表示不启用
    #[serde(default)]
    pub file: Option<String>,
    /// 不透明度（0-100）
    #[serde(default)]
    pub opacity: Option<u8>,
    /// 位置：stretch|tile|top-left|top-right|bottom-left|bottom-right|center
    #[serde(default)]
    pub position: Option<String>,
    /// 尺寸，格式 `WxH`（例如 "100x50"）
    #[serde(default)]
    pub size: Option<String>,
}

/// 媒体目录与商品图片缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// 媒体根目录（本地文件系统）
    #[serde(default = "MediaConfig::default_root")]
    pub root: String,
    /// 商品图片相对媒体根目录的基础路径
    #[serde(default = "MediaConfig::default_base_media_path")]
    pub base_media_path: String,
    /// JPEG 输出质量（1-100）
    #[serde(default = "MediaConfig::default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// 按图片类型（thumbnail/small_image/image/...）配置的水印
    #[serde(default)]
    pub watermarks: HashMap<String, WatermarkConfig>,
}

impl MediaConfig {
    fn default_root() -> String {
        "./pub/media".to_string()
    }
    fn default_base_media_path() -> String {
        "catalog/product".to_string()
    }
    fn default_jpeg_quality() -> u8 {
        80
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
            base_media_path: Self::default_base_media_path(),
            jpeg_quality: Self::default_jpeg_quality(),
            watermarks: HashMap::new(),
        }
    }
}

/// 组件实例存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// SQLite 文件路径
    #[serde(default = "WidgetConfig::default_sqlite_path")]
    pub sqlite_path: String,
    /// 是否启用 WAL
    #[serde(default = "WidgetConfig::default_sqlite_wal")]
    pub sqlite_wal: bool,
}

impl WidgetConfig {
    fn default_sqlite_path() -> String {
        "./resources/widget_instances.db".to_string()
    }
    fn default_sqlite_wal() -> bool {
        true
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            sqlite_path: Self::default_sqlite_path(),
            sqlite_wal: Self::default_sqlite_wal(),
        }
    }
}

/// 管理端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// 管理员令牌列表（Header: X-Admin-Token）
    #[serde(
        default = "AdminConfig::default_tokens",
        alias = "admin-tokens",
        alias = "adminTokens"
    )]
    pub tokens: Vec<String>,
}

impl AdminConfig {
    fn default_tokens() -> Vec<String> {
        if let Ok(raw) = std::env::var("APP_ADMIN_TOKENS") {
            return raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Vec::new()
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            tokens: Self::default_tokens(),
        }
    }
}

/// 国际化配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    /// 当前语言（对应 `<i18n_dir>/<locale>.csv`）
    #[serde(default = "I18nConfig::default_locale")]
    pub locale: String,
    /// 是否启用行内翻译（响应体中的文案带翻译标记）
    #[serde(default)]
    pub inline_translation: bool,
}

impl I18nConfig {
    fn default_locale() -> String {
        "en_US".to_string()
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            inline_translation: false,
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        30
    }

    /// 获取优雅退出超时时间
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub resources: ResourcesConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    /// 媒体/图片缓存配置
    #[serde(default)]
    pub media: MediaConfig,
    /// 组件实例存储配置
    #[serde(default)]
    pub widget: WidgetConfig,
    /// 管理端配置
    #[serde(default)]
    pub admin: AdminConfig,
    /// 国际化配置
    #[serde(default)]
    pub i18n: I18nConfig,
    /// 优雅退出配置
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从配置文件加载配置，支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path())
    }

    /// 从指定路径加载配置（环境变量 `APP_*` 仍然生效）
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("正在从 {:?} 加载配置文件", config_path);

        let path_str = config_path
            .to_str()
            .ok_or_else(|| ConfigError::Message(format!("配置路径非 UTF-8: {config_path:?}")))?;

        let builder = ConfigBuilder::builder()
            // 加载配置文件
            .add_source(File::with_name(path_str))
            // 支持环境变量覆盖，例如：APP_API_PREFIX
            .add_source(
                Environment::with_prefix("APP")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = builder.try_deserialize()?;

        tracing::debug!(
            "配置加载完成: media.root = {}, admin tokens = {}",
            config.media.root,
            config.admin.tokens.len()
        );

        Ok(config)
    }

    /// 获取全局配置单例
    pub fn global() -> &'static AppConfig {
        CONFIG.get().expect("配置未初始化，请先调用 init_global()")
    }

    /// 初始化全局配置
    pub fn init_global() -> Result<(), ConfigError> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("配置已经被初始化".to_string()))?;
        Ok(())
    }

    /// 获取配置文件路径
    fn get_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取资源文件夹路径
    pub fn resources_path(&self) -> PathBuf {
        PathBuf::from(&self.resources.base_path)
    }

    /// 前台展示配置文件路径
    pub fn view_file_path(&self) -> PathBuf {
        self.resources_path().join(&self.resources.view_file)
    }

    /// 组件定义文件路径
    pub fn widgets_file_path(&self) -> PathBuf {
        self.resources_path().join(&self.resources.widgets_file)
    }

    /// 当前语言的翻译字典路径
    pub fn i18n_file_path(&self) -> PathBuf {
        self.resources_path()
            .join(&self.resources.i18n_dir)
            .join(format!("{}.csv", self.i18n.locale))
    }

    /// 媒体根目录
    pub fn media_root(&self) -> PathBuf {
        PathBuf::from(&self.media.root)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3939,
            },
            resources: ResourcesConfig {
                base_path: "./resources".to_string(),
                view_file: ResourcesConfig::default_view_file(),
                widgets_file: ResourcesConfig::default_widgets_file(),
                i18n_dir: ResourcesConfig::default_i18n_dir(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "full".to_string(),
            },
            api: ApiConfig {
                prefix: "/api/v1".to_string(),
            },
            media: MediaConfig::default(),
            widget: WidgetConfig::default(),
            admin: AdminConfig::default(),
            i18n: I18nConfig::default(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use std::io::Write;

    #[test]
    fn load_from_fills_defaults_for_optional_sections() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp config");
        write!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[resources]
base_path = "./res"

[logging]
level = "debug"
format = "compact"

[api]
prefix = "/api/test"

[media]
jpeg_quality = 90

[media.watermarks.thumbnail]
file = "stores/1/mark.png"
opacity = 40
"#
        )
        .expect("write config");

        let cfg = AppConfig::load_from(file.path()).expect("load config");
        assert_eq!(cfg.server_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.media.jpeg_quality, 90);
        assert_eq!(cfg.media.base_media_path, "catalog/product");
        assert_eq!(cfg.resources.view_file, "view.yaml");
        assert_eq!(cfg.i18n.locale, "en_US");
        let wm = cfg.media.watermarks.get("thumbnail").expect("thumbnail");
        assert_eq!(wm.file.as_deref(), Some("stores/1/mark.png"));
        assert_eq!(wm.opacity, Some(40));
        assert!(cfg.view_file_path().ends_with("view.yaml"));
    }
}
