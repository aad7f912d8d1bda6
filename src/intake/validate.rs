//! # 载荷校验
//!
//! 顺序固定：先类型、后体积，第一个失败项决定诊断，不累积多条。

use once_cell::sync::Lazy;
use regex::Regex;

use super::{IntakeConfig, Payload, ValidationError};

static ACCEPTED_MEDIA_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^image/(png|jpeg|jpg)$").expect("内置正则非法"));

/// 去掉 MIME 参数并统一小写。
fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// 声明类型是否为 PNG / JPEG。
pub fn is_accepted_media_type(media_type: &str) -> bool {
    ACCEPTED_MEDIA_TYPE.is_match(&normalize_media_type(media_type))
}

/// 校验载荷是否可被上传入口接收。
pub fn validate(payload: &Payload, config: &IntakeConfig) -> Result<(), ValidationError> {
    if !is_accepted_media_type(payload.media_type()) {
        return Err(ValidationError::InvalidType {
            media_type: payload.media_type().to_string(),
        });
    }

    if payload.size() > config.max_file_size {
        return Err(ValidationError::TooLarge {
            size: payload.size(),
            max_bytes: config.max_file_size,
        });
    }

    Ok(())
}
