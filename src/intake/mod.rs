//! # 上传入口模块（intake）
//!
//! ## 设计思路
//!
//! Hide / Detect / Extract 三个工作流复用同一个上传组件：
//! 接收文件（选择或拖放）→ 校验类型与体积 → 维护唯一的预览句柄。
//!
//! - `payload`：用户载荷（字节 + 声明类型 + 文件名）
//! - `validate`：类型优先、体积其次的单一诊断校验
//! - `file_intake`：组件状态（当前载荷、预览、拖拽高亮）
//! - `error`：校验错误与诊断文案
//!
//! ## 实现思路
//!
//! 组件本身不知道属于哪个工作流；控制器直接持有各角色的 `FileIntake`，
//! 因此“通知所有者”不需要回调，控制器读取到的就是组件当前载荷。

mod error;
mod file_intake;
mod payload;
mod validate;

pub use crate::config::IntakeConfig;
pub use error::{ValidationError, format_mib};
pub use file_intake::{Affordance, FileIntake};
pub use payload::Payload;
pub use validate::{is_accepted_media_type, validate};
