//! 通知模块
//!
//! # 设计思路
//!
//! 核心层不关心提示如何展示（toast、终端、日志），只输出 `{title, description, severity}` 三元组。
//! 通过 `Notifier` trait 注入，外壳自行决定渲染方式。
//!
//! - `LogNotifier`：写入 `log`，CLI 默认使用
//! - `MemoryNotifier`：按顺序记录，供测试与嵌入方轮询

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 通知级别，对应前端 toast 的 `default` / `destructive` 变体。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Default,
    Destructive,
}

/// 一条面向用户的通知。
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub issued_at: DateTime<Utc>,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Default)
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Destructive)
    }

    fn new(title: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
            issued_at: Utc::now(),
        }
    }
}

/// 通知接收端。
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// 将通知写入日志。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Default => {
                log::info!("🔔 {} - {}", notification.title, notification.description)
            }
            Severity::Destructive => {
                log::warn!("⚠️ {} - {}", notification.title, notification.description)
            }
        }
    }
}

/// 在内存中按顺序保存通知。
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前全部通知的快照。
    pub fn snapshot(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 最近一条通知。
    pub fn last(&self) -> Option<Notification> {
        self.snapshot().pop()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        match self.entries.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
