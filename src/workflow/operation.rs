//! # 操作描述
//!
//! 三个工作流的差异全部收敛为数据：路径、角色、响应类型与提示文案。
//! 控制器只有一份实现，按 `Operation` 查表。

use std::fmt;

/// 载荷在请求中的角色，决定 multipart 字段名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Cover,
    Secret,
    File,
    Stego,
}

impl Role {
    /// multipart 字段名。
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Secret => "secret",
            Self::File => "file",
            Self::Stego => "stego",
        }
    }

    /// 缺图诊断里的称呼。
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Secret => "secret",
            Self::File => "input",
            Self::Stego => "stego",
        }
    }

    /// 上传控件标题。
    pub fn label(self) -> &'static str {
        match self {
            Self::Cover => "Cover Image",
            Self::Secret => "Secret Image",
            Self::File => "Input Image",
            Self::Stego => "Stego Image",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// 图片类结果的输出描述：建议文件名与成功、保存两条提示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOutput {
    pub suggested_name: &'static str,
    pub success_description: &'static str,
    pub saved_description: &'static str,
}

/// 成功响应的解读方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// JSON 记录，读取 `prediction` 字段。
    Label,
    /// 原始图片字节，以建议文件名提供下载。
    Image(ImageOutput),
}

/// 工作流种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Hide,
    Detect,
    Extract,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Self::Hide => "/hide/",
            Self::Detect => "/detect/",
            Self::Extract => "/extract/",
        }
    }

    /// 必填角色，顺序即表单字段顺序。
    pub fn roles(self) -> &'static [Role] {
        match self {
            Self::Hide => &[Role::Cover, Role::Secret],
            Self::Detect => &[Role::File],
            Self::Extract => &[Role::Stego],
        }
    }

    pub fn response_kind(self) -> ResponseKind {
        match self {
            Self::Hide => ResponseKind::Image(ImageOutput {
                suggested_name: "stego-image.png",
                success_description: "Stego image generated successfully",
                saved_description: "Stego image saved to your device",
            }),
            Self::Detect => ResponseKind::Label,
            Self::Extract => ResponseKind::Image(ImageOutput {
                suggested_name: "extracted-secret.png",
                success_description: "Secret image extracted successfully",
                saved_description: "Secret image saved to your device",
            }),
        }
    }

    /// 传输失败等没有具体描述时的兜底文案。
    pub(crate) fn failure_fallback(self) -> &'static str {
        match self {
            Self::Hide => "Failed to generate stego image",
            Self::Detect => "Failed to analyze image",
            Self::Extract => "Failed to extract secret image",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hide => "hide",
            Self::Detect => "detect",
            Self::Extract => "extract",
        })
    }
}
