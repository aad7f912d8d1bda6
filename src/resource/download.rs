use std::fs;
use std::path::{Path, PathBuf};

use super::PreviewHandle;
use crate::error::AppError;

/// 将句柄内容以建议文件名保存到目录。
///
/// 目录不存在时自动创建；同名文件直接覆盖（与浏览器下载到默认目录的行为一致）。
pub fn download(
    handle: &PreviewHandle,
    suggested_name: &str,
    dir: &Path,
) -> Result<PathBuf, AppError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let target = dir.join(suggested_name);
    fs::write(&target, handle.bytes())?;

    log::info!(
        "💾 已保存 {} ({} bytes) -> {}",
        handle.url(),
        handle.len(),
        target.display()
    );
    Ok(target)
}
