//! # 本地资源生命周期（resource）
//!
//! ## 设计思路
//!
//! 预览图与结果图都需要一个“本地可解析的引用”（浏览器里的 object URL）。
//! 这里由 `ResourceStore` 统一签发 `blob:stegamind/<uuid>` 形式的地址，并保存对应字节。
//!
//! 地址若不撤销会一直占用字节，替换、清除都会留下孤儿引用。
//! 现在 `PreviewHandle` 采用 RAII：最后一个克隆被 drop 时自动从 store 中撤销地址，
//! 替换、清除、重新触发、控制器销毁等所有退出路径都无需手动释放。
//!
//! ## 实现思路
//!
//! - store 内部为 `Arc<Mutex<HashMap<url, bytes>>>`，句柄只持有 `Weak`，store 先销毁也不会泄漏。
//! - 句柄自身也持有 `Bytes`（引用计数，克隆廉价），读取无需加锁。
//! - `download` 负责把句柄内容保存为文件。

mod download;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;

use crate::error::AppError;

pub use download::download;

const URL_PREFIX: &str = "blob:stegamind/";

type BlobMap = HashMap<String, Bytes>;

/// 本地资源仓库，签发与解析预览地址。
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    blobs: Arc<Mutex<BlobMap>>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为一段字节签发本地地址，不经过网络。
    pub fn materialize(
        &self,
        bytes: Bytes,
        media_type: impl Into<String>,
    ) -> Result<PreviewHandle, AppError> {
        let url = format!("{}{}", URL_PREFIX, uuid::Uuid::new_v4());
        {
            let mut guard = self
                .blobs
                .lock()
                .map_err(|_| AppError::State("资源表锁已中毒".to_string()))?;
            guard.insert(url.clone(), bytes.clone());
        }
        log::debug!("🧷 签发预览地址 {} ({} bytes)", url, bytes.len());

        Ok(PreviewHandle {
            inner: Arc::new(HandleInner {
                url,
                media_type: media_type.into(),
                bytes,
                store: Arc::downgrade(&self.blobs),
            }),
        })
    }

    /// 解析地址；已撤销或未知地址返回 `None`。
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.blobs.lock().ok()?.get(url).cloned()
    }

    /// 尚未撤销的地址数量。
    pub fn live_count(&self) -> usize {
        self.blobs.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

/// 本地预览句柄，克隆共享同一地址。
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    url: String,
    media_type: String,
    bytes: Bytes,
    store: Weak<Mutex<BlobMap>>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn media_type(&self) -> &str {
        &self.inner.media_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.inner.bytes
    }

    pub fn len(&self) -> usize {
        self.inner.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.bytes.is_empty()
    }

    /// 以 Data URL 形式输出，供无法访问 store 的外壳直接渲染。
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.inner.media_type,
            general_purpose::STANDARD.encode(&self.inner.bytes)
        )
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        let Some(blobs) = self.store.upgrade() else {
            return;
        };
        // Drop 中不能传播错误，锁中毒时仍尽量清理
        let mut guard = match blobs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.remove(&self.url).is_some() {
            log::debug!("🧹 撤销预览地址 {}", self.url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materialize_then_resolve() {
        let store = ResourceStore::new();
        let handle = store
            .materialize(Bytes::from_static(b"abc"), "image/png")
            .expect("materialize");

        assert!(handle.url().starts_with(URL_PREFIX));
        assert_eq!(store.resolve(handle.url()).as_deref(), Some(&b"abc"[..]));
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn last_clone_drop_revokes_url() {
        let store = ResourceStore::new();
        let handle = store
            .materialize(Bytes::from_static(b"abc"), "image/png")
            .expect("materialize");
        let url = handle.url().to_string();
        let clone = handle.clone();

        drop(handle);
        assert!(store.resolve(&url).is_some());

        drop(clone);
        assert!(store.resolve(&url).is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn handle_outlives_store_without_panic() {
        let store = ResourceStore::new();
        let handle = store
            .materialize(Bytes::from_static(b"x"), "image/jpeg")
            .expect("materialize");
        drop(store);
        assert_eq!(handle.bytes().as_ref(), b"x");
    }

    #[test]
    fn data_url_embeds_media_type() {
        let store = ResourceStore::new();
        let handle = store
            .materialize(Bytes::from_static(b"hi"), "image/png")
            .expect("materialize");
        assert_eq!(handle.data_url(), "data:image/png;base64,aGk=");
    }
}
