//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 后端 API 配置
///
/// 用于拉取项目动态（Update）全文资源。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// 访问令牌，配置后以 Bearer 方式附加到请求头
    pub access_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.kickstarter.com".to_string(),
            timeout_ms: 10_000,
            access_token: None,
        }
    }
}

/// 缩略图下载配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub timeout_ms: u64,
    /// 单张图片的最大字节数，超出视为加载失败
    pub max_bytes: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_bytes: 4 * 1024 * 1024,
        }
    }
}

/// 通道溢出策略
///
/// 仅在配置了有界缓冲时生效。submit 永远不能阻塞生产者，因此不提供阻塞策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// 通道已满时丢弃新到达的信封（仅影响该通道）
    #[default]
    DropNewest,
}

/// 分发总线配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DispatcherConfig {
    /// 每个通道的缓冲容量；为空时使用无界缓冲，保证突发流量下不丢消息
    pub lane_capacity: Option<usize>,
    pub overflow_policy: OverflowPolicy,
}

/// 通知展示样式配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub small_icon: String,
    /// 强调色，ARGB 十六进制字符串
    pub accent_color: String,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            small_icon: "ic_kickstarter_k".to_string(),
            accent_color: "#FF2BDE73".to_string(),
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_port: 9090,
        }
    }
}

impl ObservabilityConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub api: ApiConfig,
    pub images: ImageConfig,
    pub dispatcher: DispatcherConfig,
    pub presentation: PresentationConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（PUSH_ 前缀，双下划线分隔层级，如 PUSH_API__BASE_URL -> api.base_url）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("PUSH_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("PUSH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
