//! # StegaMind 客户端 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │             外壳（CLI / 页面，负责展示与导航）             │
//! │        Notifier ←── 通知 {title, description, severity}  │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ select / trigger / cancel / download_result
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust)                           │
//! │                                                          │
//! │  ┌─ workflow ─── WorkflowController × 3                  │
//! │  │   (Hide / Detect / Extract，状态机 + 取消)             │
//! │  │                                                       │
//! │  ├─ intake ───── FileIntake 校验 + 预览 + 拖拽状态        │
//! │  │                                                       │
//! │  ├─ resource ─── PreviewHandle (RAII) + 下载              │
//! │  │                                                       │
//! │  ├─ service ──── reqwest multipart 客户端                 │
//! │  ├─ config ───── 默认值 / JSON 配置 / 范围校验            │
//! │  ├─ notify ───── Notifier trait                          │
//! │  └─ error ────── AppError (统一错误类型)                  │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ HTTP POST /hide/ /detect/ /extract/
//!   远端隐写服务（嵌入 / 检测 / 提取）
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`config`] | 服务地址、超时、体积上限与配置文件 |
//! | [`notify`] | 通知模型与 `Notifier` 实现 |
//! | [`intake`] | 文件选择 / 拖放、类型与体积校验、预览 |
//! | [`resource`] | 本地预览地址的签发、解析、释放与下载 |
//! | [`service`] | 与远端服务的 HTTP 交互 |
//! | [`workflow`] | 三个工作流的控制器与结果解读 |

pub mod config;
pub mod error;
pub mod intake;
pub mod notify;
pub mod resource;
pub mod service;
pub mod workflow;

pub use config::ClientConfig;
pub use error::AppError;
pub use intake::Payload;
pub use notify::{LogNotifier, MemoryNotifier, Notification, Notifier, Severity};
pub use workflow::{Operation, Phase, ResultArtifact, Role, WorkflowController};
