//! # 配置模块
//!
//! ## 设计思路
//!
//! 所有可调参数集中在 `ClientConfig`，按阶段拆为两组：
//! - `ServiceConfig`：服务地址、连接/总超时、响应体上限
//! - `IntakeConfig`：上传入口体积上限
//!
//! ## 实现思路
//!
//! - `Default` 即生产可用配置；服务地址在编译期由 `STEGAMIND_API_BASE` 决定，缺省为本机 8000 端口。
//! - 配置文件为 JSON，字段全部 `#[serde(default)]`，只写需要覆盖的项即可。
//! - 文件不存在或解析失败时回退默认值并记录日志，不阻断启动。
//! - `validate` 做范围检查，非法值在构建客户端之前被拒绝。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 编译期固定的默认服务地址。
pub const DEFAULT_BASE_URL: &str = match option_env!("STEGAMIND_API_BASE") {
    Some(url) => url,
    None => "http://localhost:8000",
};

const MIB: u64 = 1024 * 1024;

/// 客户端整体配置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub service: ServiceConfig,
    pub intake: IntakeConfig,
    /// 下载目录，未设置时由调用方决定（CLI 使用当前目录）。
    pub download_dir: Option<PathBuf>,
}

/// 远端服务相关配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// 服务根地址，不含尾部 `/`。
    pub base_url: String,
    /// 建立连接超时时间（秒）。
    pub connect_timeout: u64,
    /// 单次请求总超时（秒），`None` 表示不限制。
    pub request_timeout: Option<u64>,
    /// 允许缓冲的最大响应体（字节）。
    pub max_response_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: 8,
            request_timeout: None,
            max_response_size: 32 * MIB,
        }
    }
}

/// 上传入口配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// 单个文件允许的最大体积（字节）。
    pub max_file_size: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * MIB,
        }
    }
}

impl ClientConfig {
    /// 从 JSON 文件加载配置；缺失或损坏时回退默认值。
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            log::info!("⚙️ 配置文件不存在，使用默认配置：{}", path.display());
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("⚠️ 读取配置文件失败，使用默认配置：{}", err);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("⚠️ 解析配置文件失败，使用默认配置：{}", err);
                Self::default()
            }
        }
    }

    /// 将配置写回 JSON 文件。
    pub fn save_to_path(&self, path: &Path) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("序列化配置失败: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 范围检查。
    pub fn validate(&self) -> Result<(), AppError> {
        let url = reqwest::Url::parse(&self.service.base_url)
            .map_err(|e| AppError::Config(format!("base_url 格式错误：{}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "base_url 仅支持 http/https：{}",
                self.service.base_url
            )));
        }
        if !(1..=120).contains(&self.service.connect_timeout) {
            return Err(AppError::Config("connect_timeout 必须在 1~120 秒之间".to_string()));
        }
        if let Some(timeout) = self.service.request_timeout {
            if !(1..=3600).contains(&timeout) {
                return Err(AppError::Config("request_timeout 必须在 1~3600 秒之间".to_string()));
            }
        }
        if self.service.max_response_size < MIB {
            return Err(AppError::Config("max_response_size 不能小于 1MB".to_string()));
        }
        if !(1..=512 * MIB).contains(&self.intake.max_file_size) {
            return Err(AppError::Config("max_file_size 必须在 1B~512MB 之间".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_unbounded() {
        let config = ClientConfig::default();
        assert_eq!(config.intake.max_file_size, 10 * 1024 * 1024);
        assert!(config.service.request_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"intake": {"max_file_size": 2048}}"#).expect("write");

        let config = ClientConfig::load_from_path(&path);

        assert_eq!(config.intake.max_file_size, 2048);
        assert_eq!(config.service.connect_timeout, 8);
    }

    #[test]
    fn bad_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not-json").expect("write");

        let config = ClientConfig::load_from_path(&path);
        assert_eq!(config.intake.max_file_size, IntakeConfig::default().max_file_size);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let mut config = ClientConfig::default();
        config.service.base_url = "http://127.0.0.1:9000".to_string();
        config.download_dir = Some(PathBuf::from("/tmp/out"));

        config.save_to_path(&path).expect("save");
        let loaded = ClientConfig::load_from_path(&path);

        assert_eq!(loaded.service.base_url, "http://127.0.0.1:9000");
        assert_eq!(loaded.download_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = ClientConfig::default();
        config.service.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = ClientConfig::default();
        config.service.connect_timeout = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = ClientConfig::default();
        config.intake.max_file_size = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
