use std::sync::Arc;

use super::error::format_mib;
use super::{IntakeConfig, Payload, ValidationError, validate};
use crate::error::AppError;
use crate::notify::{Notification, Notifier};
use crate::resource::{PreviewHandle, ResourceStore};

/// 上传控件当前应展示的形态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    /// 空状态：拖放区域。
    DropTarget { hint: String, highlighted: bool },
    /// 已接收：预览卡片，唯一动作是“移除”。
    PreviewCard { preview_url: String, caption: &'static str },
}

struct Accepted {
    payload: Payload,
    preview: PreviewHandle,
}

/// 单个文件上传入口。
///
/// 同一时刻最多持有一个载荷与一个预览句柄；替换或清除时旧句柄随之释放。
pub struct FileIntake {
    label: String,
    config: IntakeConfig,
    store: ResourceStore,
    notifier: Arc<dyn Notifier>,
    current: Option<Accepted>,
    dragging: bool,
}

impl FileIntake {
    pub fn new(
        label: impl Into<String>,
        config: IntakeConfig,
        store: ResourceStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            label: label.into(),
            config,
            store,
            notifier,
            current: None,
            dragging: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// 选择文件：校验通过则替换当前载荷并签发新预览，否则发出诊断且状态不变。
    pub fn select(&mut self, payload: Payload) -> Result<&Payload, AppError> {
        if let Err(AppError::Validation(err)) = self.check(&payload) {
            self.notify_rejection(&err);
            return Err(err.into());
        }
        self.accept(payload)
    }

    /// 拖放入口，与 `select` 等价，并复位拖拽高亮。
    pub fn drop_file(&mut self, payload: Payload) -> Result<&Payload, AppError> {
        self.dragging = false;
        self.select(payload)
    }

    /// 与 `select` 相同但不发通知，由持有者在释放自身锁之后自行通知。
    pub(crate) fn accept(&mut self, payload: Payload) -> Result<&Payload, AppError> {
        self.check(&payload)?;

        let preview = self
            .store
            .materialize(payload.bytes().clone(), payload.media_type())?;
        log::info!(
            "📥 {} 接收文件 {}（{} bytes）",
            self.label,
            payload.name(),
            payload.size()
        );

        // 新句柄签发后再替换，旧句柄在此处被 drop 并撤销
        let accepted = self.current.insert(Accepted { payload, preview });
        Ok(&accepted.payload)
    }

    /// 拖放版本的 `accept`。
    pub(crate) fn accept_drop(&mut self, payload: Payload) -> Result<&Payload, AppError> {
        self.dragging = false;
        self.accept(payload)
    }

    fn check(&self, payload: &Payload) -> Result<(), AppError> {
        validate(payload, &self.config).map_err(|err| {
            log::warn!(
                "🚫 {} 拒绝文件 {}（{}，{} bytes）：{}",
                self.label,
                payload.name(),
                payload.media_type(),
                payload.size(),
                err
            );
            AppError::from(err)
        })
    }

    /// 清除当前载荷与预览，回到空状态。
    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            log::info!("🗑️ {} 移除文件 {}", self.label, previous.payload.name());
        }
    }

    pub fn drag_enter(&mut self) {
        self.dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.current.as_ref().map(|accepted| &accepted.payload)
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.current.as_ref().map(|accepted| &accepted.preview)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn affordance(&self) -> Affordance {
        match &self.current {
            Some(accepted) => Affordance::PreviewCard {
                preview_url: accepted.preview.url().to_string(),
                caption: "Image uploaded",
            },
            None => Affordance::DropTarget {
                hint: format!("PNG or JPG (max {}MB)", format_mib(self.config.max_file_size)),
                highlighted: self.dragging,
            },
        }
    }

    fn notify_rejection(&self, err: &ValidationError) {
        self.notifier
            .notify(Notification::destructive(err.title(), err.description()));
    }
}
