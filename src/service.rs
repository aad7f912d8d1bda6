//! # 远端服务客户端
//!
//! ## 设计思路
//!
//! 三个工作流共用一个 `StegoServiceClient`：构建一次 `reqwest::Client`，
//! 每次触发发出一个 multipart POST，按块读取响应并执行体积上限。
//!
//! ## 实现思路
//!
//! - 非 2xx 统一映射为 `AppError::Status(code)`，文案中带状态码。
//! - 连接失败、超时、读取中断映射为 `AppError::Transport`，由控制器换成通用兜底文案。
//! - 不做自动重试：失败后由用户重新触发。
//! - `sniff_image_type` 通过魔数识别结果图片，工作流用它判断响应是否真的是图片。

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use reqwest::multipart::{Form, Part};

use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::intake::{Payload, ValidationError};

const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;

/// 服务成功响应（2xx）。
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// 隐写服务 HTTP 客户端。
#[derive(Debug, Clone)]
pub struct StegoServiceClient {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl StegoServiceClient {
    pub fn new(config: ServiceConfig) -> Result<Self, AppError> {
        let mut builder =
            reqwest::Client::builder().connect_timeout(Duration::from_secs(config.connect_timeout));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("HTTP 客户端初始化失败：{}", e)))?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// 拼接完整地址，`path` 形如 `/hide/`。
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// 以 multipart 表单发送载荷，每个字段一个文件。
    pub async fn submit(
        &self,
        path: &str,
        fields: &[(&'static str, Payload)],
    ) -> Result<ServiceResponse, AppError> {
        let url = self.endpoint(path);
        let started = Instant::now();

        let mut form = Form::new();
        for (field, payload) in fields {
            form = form.part(*field, Self::build_part(payload)?);
        }

        log::info!("🌐 发送请求 POST {}（{} 个字段）", url, fields.len());

        let mut response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("请求发送失败：{}", e)))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("⚠️ 服务返回 HTTP {} - {}", status.as_u16(), url);
            return Err(AppError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_string);

        if let Some(len) = response.content_length() {
            if len > self.config.max_response_size {
                return Err(Self::oversized(len, self.config.max_response_size));
            }
        }

        let mut buffer = BytesMut::with_capacity(BUFFER_INITIAL_CAPACITY);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AppError::Transport(format!("读取响应失败：{}", e)))?
        {
            let total = (buffer.len() + chunk.len()) as u64;
            if total > self.config.max_response_size {
                return Err(Self::oversized(total, self.config.max_response_size));
            }
            buffer.extend_from_slice(&chunk);
        }

        log::info!(
            "✅ 请求完成 POST {} - HTTP {} {} bytes {}ms",
            url,
            status.as_u16(),
            buffer.len(),
            started.elapsed().as_millis()
        );

        Ok(ServiceResponse {
            status: status.as_u16(),
            content_type,
            body: buffer.freeze(),
        })
    }

    fn build_part(payload: &Payload) -> Result<Part, AppError> {
        let part = Part::bytes(payload.bytes().to_vec()).file_name(payload.name().to_string());
        if payload.media_type().is_empty() {
            return Ok(part);
        }
        part.mime_str(payload.media_type()).map_err(|e| {
            log::warn!("🚫 载荷 {} 的媒体类型无法附加：{}", payload.name(), e);
            AppError::Validation(ValidationError::InvalidType {
                media_type: payload.media_type().to_string(),
            })
        })
    }

    fn oversized(size: u64, limit: u64) -> AppError {
        AppError::UnexpectedResponse(format!(
            "response too large ({:.2} MB, limit {:.2} MB)",
            size as f64 / 1024.0 / 1024.0,
            limit as f64 / 1024.0 / 1024.0
        ))
    }
}

/// 按魔数识别 PNG / JPEG，返回媒体类型。
pub fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    let kind = infer::get(bytes)?;
    match kind.mime_type() {
        "image/png" | "image/jpeg" => Some(kind.mime_type()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let mut config = ServiceConfig::default();
        config.base_url = "http://localhost:8000/".to_string();
        let client = StegoServiceClient::new(config).expect("client");

        assert_eq!(client.endpoint("/detect/"), "http://localhost:8000/detect/");
    }

    #[test]
    fn sniff_recognizes_png_and_rejects_text() {
        let png_signature = [137_u8, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13];
        assert_eq!(sniff_image_type(&png_signature), Some("image/png"));
        assert_eq!(sniff_image_type(b"{\"msg\":\"hide success\"}"), None);
        assert_eq!(sniff_image_type(&[]), None);
    }

    #[tokio::test]
    async fn unparseable_media_type_is_a_local_validation_error() {
        let mut config = ServiceConfig::default();
        config.base_url = "http://127.0.0.1:9".to_string();
        let client = StegoServiceClient::new(config).expect("client");

        let payload = Payload::new("a.png", "image png", vec![1u8; 4]);
        let result = client.submit("/detect/", &[("file", payload)]).await;

        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::InvalidType { ref media_type })) if media_type == "image png"
        ));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let mut config = ServiceConfig::default();
        config.base_url = format!("http://127.0.0.1:{}", port);
        let client = StegoServiceClient::new(config).expect("client");

        let payload = Payload::new("a.png", "image/png", vec![1u8; 4]);
        let result = client.submit("/detect/", &[("file", payload)]).await;

        assert!(matches!(result, Err(AppError::Transport(_))));
    }
}
