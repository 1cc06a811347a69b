use serde::{Deserialize, Serialize};

use crate::errors::{Result, TinylinkError};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: HTTP 服务地址、端口、短链前缀
/// - database: 持久存储连接配置（links / tickets 表）
/// - redis: 共享 Redis 连接
/// - cache / filter: 读路径的两层保护
/// - minter: 发号方式（本地 tickets 表或远程 minter 服务）
/// - analytics: 点击事件发布
/// - timeouts: 每类外部调用的独立超时
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub minter: MinterConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// ENV 前缀：TL，分隔符：__
    /// 示例：TL__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("TL")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder
            .build()
            .and_then(|settings| settings.try_deserialize::<StaticConfig>())
            .map_err(|e| TinylinkError::config(format!("Failed to load {}: {}", path, e)))?;

        super::validators::validate(&config)?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("# Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 是否有任何组件需要 Redis 连接
    pub fn needs_redis(&self) -> bool {
        self.cache.backend == CacheBackend::Redis
            || self.filter.backend == FilterBackend::Redis
            || (self.analytics.enabled && self.analytics.queue == QueueBackend::Redis)
    }
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// 返回给调用方的短链前缀，如 `http://localhost:8080/`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 可信反向代理（单 IP 或 CIDR），为空时对私有地址自动信任 X-Forwarded-For
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// Redis 配置（cache / filter / analytics 共用同一个连接管理器）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
    Null,
}

/// 对象缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type", default = "default_cache_backend")]
    pub backend: CacheBackend,
    /// 写回时的 TTL（秒），0 表示永不过期
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    #[serde(default = "default_cache_key_prefix")]
    pub key_prefix: String,
    /// 仅 memory 后端使用
    #[serde(default = "default_memory_capacity")]
    pub max_capacity: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<std::time::Duration> {
        (self.default_ttl > 0).then(|| std::time::Duration::from_secs(self.default_ttl))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterBackend {
    Redis,
    Memory,
    Null,
}

/// 存在性过滤器（Bloom Filter）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(rename = "type", default = "default_filter_backend")]
    pub backend: FilterBackend,
    /// 位数组在 Redis 中的 key
    #[serde(default = "default_filter_key")]
    pub key: String,
    #[serde(default = "default_expected_items")]
    pub expected_items: u64,
    #[serde(default = "default_fp_rate")]
    pub false_positive_rate: f64,
    /// 启动时从存储加载全部短码写入过滤器
    #[serde(default)]
    pub warm_up: bool,
    #[serde(default = "default_warm_up_batch")]
    pub warm_up_batch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinterMode {
    /// 直接对本进程连接的 tickets 表发号
    Local,
    /// 通过 HTTP 调用独立的 minter 服务
    Remote,
}

/// 发号配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinterConfig {
    #[serde(default = "default_minter_mode")]
    pub mode: MinterMode,
    /// remote 模式下 minter 服务地址
    #[serde(default = "default_minter_endpoint")]
    pub endpoint: String,
    /// minter 服务模式的监听地址
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_minter_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    Redis,
    Null,
}

/// 点击事件发布配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_queue_backend")]
    pub queue: QueueBackend,
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Redis Stream 近似最大长度（XADD MAXLEN ~）
    #[serde(default = "default_stream_max_len")]
    pub stream_max_len: u64,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

/// 外部调用超时（毫秒）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_minter_timeout")]
    pub minter_ms: u64,
    #[serde(default = "default_store_timeout")]
    pub store_ms: u64,
    #[serde(default = "default_cache_timeout")]
    pub cache_ms: u64,
    #[serde(default = "default_filter_timeout")]
    pub filter_ms: u64,
    #[serde(default = "default_queue_timeout")]
    pub queue_ms: u64,
}

impl TimeoutConfig {
    pub fn minter(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.minter_ms)
    }

    pub fn store(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.store_ms)
    }

    pub fn cache(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cache_ms)
    }

    pub fn filter(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.filter_ms)
    }

    pub fn queue(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.queue_ms)
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://tinylink.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Memory
}

fn default_cache_ttl() -> u64 {
    86400
}

fn default_cache_key_prefix() -> String {
    "tinylink:link:".to_string()
}

fn default_memory_capacity() -> u64 {
    100_000
}

fn default_filter_backend() -> FilterBackend {
    FilterBackend::Memory
}

fn default_filter_key() -> String {
    "tinylink:bloom_filter".to_string()
}

fn default_expected_items() -> u64 {
    1_000_000
}

fn default_fp_rate() -> f64 {
    0.01
}

fn default_warm_up_batch() -> u64 {
    5000
}

fn default_minter_mode() -> MinterMode {
    MinterMode::Local
}

fn default_minter_endpoint() -> String {
    "http://127.0.0.1:50051".to_string()
}

fn default_minter_port() -> u16 {
    50051
}

fn default_queue_backend() -> QueueBackend {
    QueueBackend::Null
}

fn default_topic() -> String {
    "link_clicks".to_string()
}

fn default_stream_max_len() -> u64 {
    1_000_000
}

fn default_channel_capacity() -> usize {
    10_000
}

fn default_workers() -> usize {
    4
}

fn default_shutdown_grace_secs() -> u64 {
    5
}

fn default_minter_timeout() -> u64 {
    1000
}

fn default_store_timeout() -> u64 {
    2000
}

fn default_cache_timeout() -> u64 {
    200
}

fn default_filter_timeout() -> u64 {
    200
}

fn default_queue_timeout() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            base_url: default_base_url(),
            cpu_count: default_cpu_count(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            default_ttl: default_cache_ttl(),
            key_prefix: default_cache_key_prefix(),
            max_capacity: default_memory_capacity(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            backend: default_filter_backend(),
            key: default_filter_key(),
            expected_items: default_expected_items(),
            false_positive_rate: default_fp_rate(),
            warm_up: false,
            warm_up_batch: default_warm_up_batch(),
        }
    }
}

impl Default for MinterConfig {
    fn default() -> Self {
        Self {
            mode: default_minter_mode(),
            endpoint: default_minter_endpoint(),
            host: default_server_host(),
            port: default_minter_port(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue: default_queue_backend(),
            topic: default_topic(),
            stream_max_len: default_stream_max_len(),
            channel_capacity: default_channel_capacity(),
            workers: default_workers(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            minter_ms: default_minter_timeout(),
            store_ms: default_store_timeout(),
            cache_ms: default_cache_timeout(),
            filter_ms: default_filter_timeout(),
            queue_ms: default_queue_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.filter.key, "tinylink:bloom_filter");
        assert_eq!(parsed.analytics.topic, "link_clicks");
        assert_eq!(parsed.cache.backend, CacheBackend::Memory);
    }

    #[test]
    fn test_backend_names_are_lowercase() {
        let parsed: CacheConfig = toml::from_str("type = \"redis\"").unwrap();
        assert_eq!(parsed.backend, CacheBackend::Redis);
        assert!(toml::from_str::<CacheConfig>("type = \"Redis\"").is_err());
    }

    #[test]
    fn test_zero_ttl_means_never_expire() {
        let cache = CacheConfig {
            default_ttl: 0,
            ..CacheConfig::default()
        };
        assert!(cache.ttl().is_none());
        assert_eq!(
            CacheConfig::default().ttl(),
            Some(std::time::Duration::from_secs(86400))
        );
    }

    #[test]
    fn test_needs_redis() {
        let mut config = StaticConfig::default();
        assert!(!config.needs_redis());
        config.analytics.queue = QueueBackend::Redis;
        assert!(config.needs_redis());
        config.analytics.enabled = false;
        assert!(!config.needs_redis());
        config.filter.backend = FilterBackend::Redis;
        assert!(config.needs_redis());
    }
}
