//! # 校验错误模型
//!
//! 上传入口的所有拒绝原因集中在一个枚举中。
//! `Display` 即完整诊断文案；通知外壳使用拆开的 `title()` / `description()`。

/// 本地校验错误（发请求之前）。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid file type: please upload a PNG or JPG image")]
    InvalidType { media_type: String },

    #[error("File too large: maximum file size is {}MB", mib_of(.max_bytes))]
    TooLarge { size: u64, max_bytes: u64 },

    #[error("Missing image(s): please upload {}", describe_missing(.roles))]
    Missing { roles: Vec<&'static str> },
}

impl ValidationError {
    /// 通知标题。
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidType { .. } => "Invalid file type",
            Self::TooLarge { .. } => "File too large",
            Self::Missing { .. } => "Missing image(s)",
        }
    }

    /// 通知正文（首字母大写）。
    pub fn description(&self) -> String {
        match self {
            Self::InvalidType { .. } => "Please upload a PNG or JPG image".to_string(),
            Self::TooLarge { max_bytes, .. } => {
                format!("Maximum file size is {}MB", format_mib(*max_bytes))
            }
            Self::Missing { roles } => format!("Please upload {}", describe_missing(roles)),
        }
    }
}

/// 按 JS 数字的打印方式输出 MiB：`10`、`1.5`。
pub fn format_mib(bytes: u64) -> String {
    let mib = bytes as f64 / (1024.0 * 1024.0);
    format!("{}", mib)
}

fn mib_of(bytes: &u64) -> String {
    format_mib(*bytes)
}

fn describe_missing(roles: &[&'static str]) -> String {
    let noun = if roles.len() > 1 { "images" } else { "image" };
    match roles {
        [] => noun.to_string(),
        [single] => format!("{} {}", single, noun),
        [init @ .., last] => format!("{} and {} {}", init.join(", "), last, noun),
    }
}
