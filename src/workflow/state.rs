//! # 工作流状态与结果模型

use serde::Serialize;

use super::{ImageOutput, Operation, Role};
use crate::intake::{Affordance, Payload};
use crate::resource::PreviewHandle;

/// 控制器阶段：`Idle → Loading → {Succeeded, Failed}`，再次触发直接回到 `Loading`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// 检测结果分类；`stego` / `clean` 之外的一切标签都归为未定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionClass {
    Stego,
    Clean,
    Undetermined,
}

impl DetectionClass {
    pub fn from_label(label: &str) -> Self {
        match label {
            "stego" => Self::Stego,
            "clean" => Self::Clean,
            _ => Self::Undetermined,
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            Self::Stego => "STEGO DETECTED",
            Self::Clean => "CLEAN",
            Self::Undetermined => "UNKNOWN",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::Stego => "This image likely contains hidden data",
            Self::Clean => "No hidden data detected",
            Self::Undetermined => "Unable to determine status",
        }
    }
}

/// 检测标签，`label` 保留服务原文（缺失时为 `unknown`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub class: DetectionClass,
}

impl Prediction {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let class = DetectionClass::from_label(&label);
        Self { label, class }
    }
}

/// 图片类结果。
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    pub preview: PreviewHandle,
    /// 建议文件名与提示文案。
    pub output: ImageOutput,
    /// 从图片头读取的宽高，读取失败时为 `None`。
    pub dimensions: Option<(u32, u32)>,
}

impl ImageArtifact {
    pub fn suggested_name(&self) -> &'static str {
        self.output.suggested_name
    }

    pub fn media_type(&self) -> &str {
        self.preview.media_type()
    }

    /// 转回载荷，可直接交给另一个工作流（如 Hide 结果送入 Extract）。
    pub fn to_payload(&self) -> Payload {
        Payload::new(
            self.output.suggested_name,
            self.preview.media_type(),
            self.preview.bytes().clone(),
        )
    }
}

/// 一次成功触发的产物。
#[derive(Debug, Clone)]
pub enum ResultArtifact {
    Classification(Prediction),
    Image(ImageArtifact),
}

impl ResultArtifact {
    pub fn as_prediction(&self) -> Option<&Prediction> {
        match self {
            Self::Classification(prediction) => Some(prediction),
            Self::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageArtifact> {
        match self {
            Self::Image(artifact) => Some(artifact),
            Self::Classification(_) => None,
        }
    }
}

/// 单个上传槽位的展示信息。
#[derive(Debug, Clone)]
pub struct SlotView {
    pub role: Role,
    pub label: &'static str,
    pub file_name: Option<String>,
    pub affordance: Affordance,
}

/// 供外壳渲染的整体快照。
#[derive(Debug, Clone)]
pub struct WorkflowSnapshot {
    pub operation: Operation,
    pub phase: Phase,
    pub can_trigger: bool,
    pub slots: Vec<SlotView>,
    pub result: Option<ResultArtifact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stego_and_clean_are_determined() {
        assert_eq!(Prediction::new("stego").class, DetectionClass::Stego);
        assert_eq!(Prediction::new("clean").class, DetectionClass::Clean);
        assert_eq!(Prediction::new("unknown").class, DetectionClass::Undetermined);
        assert_eq!(Prediction::new("Stego").class, DetectionClass::Undetermined);
    }

    #[test]
    fn badges_follow_class() {
        assert_eq!(DetectionClass::Stego.badge(), "STEGO DETECTED");
        assert_eq!(DetectionClass::Undetermined.summary(), "Unable to determine status");
    }
}
