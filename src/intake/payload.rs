//! # 用户载荷
//!
//! 用户选中、尚未发出的图片字节，带声明类型与显示文件名。
//! 声明类型的来源与浏览器一致：优先按扩展名推断，扩展名未知时才嗅探魔数。

use std::path::Path;

use bytes::Bytes;

use crate::error::AppError;

/// 用户提供的二进制图片载荷。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    name: String,
    media_type: String,
    bytes: Bytes,
}

impl Payload {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// 从本地文件构建载荷。
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        log::info!("📁 读取本地图片 - 路径: {}", path.display());

        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let media_type = mime_guess::from_path(path)
            .first_raw()
            .map(str::to_string)
            .or_else(|| infer::get(&bytes).map(|kind| kind.mime_type().to_string()))
            .unwrap_or_default();

        Ok(Self::new(name, media_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 声明的媒体类型，未知时为空串。
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
