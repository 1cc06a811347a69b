//! 配置值验证模块
//!
//! 启动前一次性检查静态配置，避免带着不可用的参数进入服务循环。

use super::StaticConfig;
use crate::cache::existence_filter::BloomParams;
use crate::errors::{Result, TinylinkError};

/// 验证静态配置是否合法
pub fn validate(config: &StaticConfig) -> Result<()> {
    BloomParams::new(
        config.filter.expected_items,
        config.filter.false_positive_rate,
    )?;

    if config.filter.warm_up_batch == 0 {
        return Err(TinylinkError::config("filter.warm_up_batch must be > 0"));
    }

    if config.analytics.workers == 0 {
        return Err(TinylinkError::config("analytics.workers must be > 0"));
    }

    if config.analytics.channel_capacity == 0 {
        return Err(TinylinkError::config(
            "analytics.channel_capacity must be > 0",
        ));
    }

    if config.analytics.topic.is_empty() {
        return Err(TinylinkError::config("analytics.topic must not be empty"));
    }

    if !matches!(config.logging.format.as_str(), "text" | "json") {
        return Err(TinylinkError::config(format!(
            "Invalid logging.format: '{}'. Valid: text, json",
            config.logging.format
        )));
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("minter_ms", timeouts.minter_ms),
        ("store_ms", timeouts.store_ms),
        ("cache_ms", timeouts.cache_ms),
        ("filter_ms", timeouts.filter_ms),
        ("queue_ms", timeouts.queue_ms),
    ] {
        if value == 0 {
            return Err(TinylinkError::config(format!(
                "timeouts.{} must be > 0",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&StaticConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_fp_rate_rejected() {
        let mut config = StaticConfig::default();
        config.filter.false_positive_rate = 1.5;
        assert!(matches!(validate(&config), Err(TinylinkError::Config(_))));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = StaticConfig::default();
        config.analytics.workers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = StaticConfig::default();
        config.logging.format = "xml".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = StaticConfig::default();
        config.timeouts.filter_ms = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.message().contains("filter_ms"));
    }
}
