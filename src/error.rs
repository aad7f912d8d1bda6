//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，覆盖工作流中所有失败来源：
//! 本地校验（类型 / 体积 / 缺图）、传输失败、非 2xx 状态、响应无法解读、并发重入与取消。
//!
//! 控制器、CLI 与测试统一使用 `Result<T, AppError>`，
//! 需要结构化输出的外壳可通过 `Serialize` 拿到人类可读字符串。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息；面向用户的文案保持英文原样。
//! - 为 `ValidationError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - `code()` 输出稳定的机器可读错误码，便于外壳按分支处理。

use serde::Serialize;

use crate::intake::ValidationError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 本地校验失败（未发出任何网络请求）
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 服务返回非 2xx 状态
    #[error("API error: {0}")]
    Status(u16),

    /// 请求未完成（连接失败、超时、读取中断）
    #[error("网络错误：{0}")]
    Transport(String),

    /// 2xx 响应但内容无法作为结果使用
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// 同一控制器已有请求在途
    #[error("Request already in progress")]
    Busy,

    /// 请求已被取消，迟到的响应被丢弃
    #[error("Request cancelled")]
    Cancelled,

    /// 当前没有可下载的结果
    #[error("No result available")]
    NoResult,

    /// 配置非法
    #[error("配置错误：{0}")]
    Config(String),

    /// 内部状态锁异常
    #[error("状态异常：{0}")]
    State(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::InvalidType { .. }) => "invalid_type",
            Self::Validation(ValidationError::TooLarge { .. }) => "too_large",
            Self::Validation(ValidationError::Missing { .. }) => "missing_images",
            Self::Status(_) => "http_status",
            Self::Transport(_) => "transport",
            Self::UnexpectedResponse(_) => "unexpected_response",
            Self::Busy => "busy",
            Self::Cancelled => "cancelled",
            Self::NoResult => "no_result",
            Self::Config(_) => "config",
            Self::State(_) => "state",
            Self::Io(_) => "io",
        }
    }

    /// 是否属于发出请求之前的本地拒绝。
    pub fn is_local_refusal(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Busy)
    }
}

/// 部分外壳要求错误可序列化，这里序列化为人类可读字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code() {
        let err = AppError::Status(500);
        assert_eq!(err.to_string(), "API error: 500");
        assert_eq!(err.code(), "http_status");
    }

    #[test]
    fn validation_error_is_transparent() {
        let err = AppError::from(ValidationError::InvalidType {
            media_type: "text/plain".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Invalid file type: please upload a PNG or JPG image"
        );
        assert!(err.is_local_refusal());
    }

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&AppError::Busy).expect("serialize");
        assert_eq!(json, "\"Request already in progress\"");
    }
}
