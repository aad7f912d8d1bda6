//! # 工作流模块（workflow）
//!
//! ## 设计思路
//!
//! 把“用户意图 → 一次 HTTP 请求 → 结果解读”收敛为一个通用控制器：
//!
//! - `operation`：三个工作流的差异表（路径、角色、响应类型、文案）
//! - `controller`：状态机、重入保护、取消、通知
//! - `interpret`：标签 / 图片两种响应的解读
//! - `state`：阶段、结果与快照模型
//!
//! ## 调用链
//!
//! ```text
//! select / drop_file（FileIntake 校验 + 预览）
//!    ↓
//! trigger（缺图检查 → Loading → multipart POST）
//!    ↓
//! interpret（prediction 标签 / 图片预览句柄）
//!    ↓
//! Succeeded / Failed + 通知
//!    ↓
//! download_result（保存为建议文件名）
//! ```

mod controller;
mod interpret;
mod operation;
mod state;

pub use controller::WorkflowController;
pub use interpret::interpret_prediction;
pub use operation::{ImageOutput, Operation, ResponseKind, Role};
pub use state::{
    DetectionClass, ImageArtifact, Phase, Prediction, ResultArtifact, SlotView, WorkflowSnapshot,
};
