use std::fmt;

#[derive(Debug, Clone)]
pub enum TinylinkError {
    StorageUnavailable(String),
    NotFound(String),
    FilterDegraded(String),
    PublishFailed(String),
    MalformedCode(String),
    Config(String),
    Validation(String),
}

impl TinylinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TinylinkError::StorageUnavailable(_) => "E001",
            TinylinkError::NotFound(_) => "E002",
            TinylinkError::FilterDegraded(_) => "E003",
            TinylinkError::PublishFailed(_) => "E004",
            TinylinkError::MalformedCode(_) => "E005",
            TinylinkError::Config(_) => "E006",
            TinylinkError::Validation(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TinylinkError::StorageUnavailable(_) => "Storage Unavailable",
            TinylinkError::NotFound(_) => "Resource Not Found",
            TinylinkError::FilterDegraded(_) => "Existence Filter Degraded",
            TinylinkError::PublishFailed(_) => "Analytics Publish Failed",
            TinylinkError::MalformedCode(_) => "Malformed Short Code",
            TinylinkError::Config(_) => "Configuration Error",
            TinylinkError::Validation(_) => "Validation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TinylinkError::StorageUnavailable(msg)
            | TinylinkError::NotFound(msg)
            | TinylinkError::FilterDegraded(msg)
            | TinylinkError::PublishFailed(msg)
            | TinylinkError::MalformedCode(msg)
            | TinylinkError::Config(msg)
            | TinylinkError::Validation(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端提示）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TinylinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TinylinkError {}

// 便捷的构造函数
impl TinylinkError {
    pub fn storage_unavailable<T: Into<String>>(msg: T) -> Self {
        TinylinkError::StorageUnavailable(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TinylinkError::NotFound(msg.into())
    }

    pub fn filter_degraded<T: Into<String>>(msg: T) -> Self {
        TinylinkError::FilterDegraded(msg.into())
    }

    pub fn publish_failed<T: Into<String>>(msg: T) -> Self {
        TinylinkError::PublishFailed(msg.into())
    }

    pub fn malformed_code<T: Into<String>>(msg: T) -> Self {
        TinylinkError::MalformedCode(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        TinylinkError::Config(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TinylinkError::Validation(msg.into())
    }
}

impl From<sea_orm::DbErr> for TinylinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        TinylinkError::StorageUnavailable(err.to_string())
    }
}

impl From<redis::RedisError> for TinylinkError {
    fn from(err: redis::RedisError) -> Self {
        TinylinkError::StorageUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for TinylinkError {
    fn from(err: std::io::Error) -> Self {
        TinylinkError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for TinylinkError {
    fn from(err: serde_json::Error) -> Self {
        TinylinkError::PublishFailed(err.to_string())
    }
}

impl From<crate::codec::CodecError> for TinylinkError {
    fn from(err: crate::codec::CodecError) -> Self {
        TinylinkError::MalformedCode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TinylinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            TinylinkError::storage_unavailable("a"),
            TinylinkError::not_found("b"),
            TinylinkError::filter_degraded("c"),
            TinylinkError::publish_failed("d"),
            TinylinkError::malformed_code("e"),
            TinylinkError::config("f"),
            TinylinkError::validation("g"),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = TinylinkError::not_found("code abc");
        assert_eq!(err.to_string(), "Resource Not Found: code abc");
    }
}
