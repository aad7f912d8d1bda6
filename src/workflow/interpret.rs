//! # 响应解读
//!
//! - Label：JSON 记录中读取 `prediction`；缺失、非字符串或空串都降级为 `unknown`，不算错误。
//! - Image：响应体即图片。魔数不是 PNG/JPEG 时判为失败，
//!   若响应体是带 `error` 字段的 JSON（服务在模型未加载时会以 200 返回），使用该文案。

use std::io::Cursor;

use serde_json::Value;

use super::{ImageArtifact, ImageOutput, Prediction, ResponseKind, ResultArtifact};
use crate::error::AppError;
use crate::resource::ResourceStore;
use crate::service::{ServiceResponse, sniff_image_type};

const UNKNOWN_LABEL: &str = "unknown";

pub(crate) fn interpret(
    kind: ResponseKind,
    response: &ServiceResponse,
    store: &ResourceStore,
) -> Result<ResultArtifact, AppError> {
    match kind {
        ResponseKind::Label => interpret_prediction(&response.body).map(ResultArtifact::Classification),
        ResponseKind::Image(output) => {
            interpret_image(response, output, store).map(ResultArtifact::Image)
        }
    }
}

/// 解析检测结果。响应体不是 JSON 时报错，其余情况一律给出标签。
pub fn interpret_prediction(body: &[u8]) -> Result<Prediction, AppError> {
    let record: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::UnexpectedResponse(format!("invalid JSON body ({})", e)))?;

    if let Some(server_error) = record.get("error").and_then(Value::as_str) {
        log::warn!("⚠️ 检测服务返回 error 字段：{}", server_error);
    }

    let label = record
        .get("prediction")
        .and_then(Value::as_str)
        .filter(|label| !label.is_empty())
        .unwrap_or(UNKNOWN_LABEL);

    Ok(Prediction::new(label))
}

fn interpret_image(
    response: &ServiceResponse,
    output: ImageOutput,
    store: &ResourceStore,
) -> Result<ImageArtifact, AppError> {
    let Some(media_type) = sniff_image_type(&response.body) else {
        return Err(AppError::UnexpectedResponse(describe_non_image(response)));
    };

    let dimensions = read_dimensions(&response.body);
    let preview = store.materialize(response.body.clone(), media_type)?;

    match dimensions {
        Some((w, h)) => log::info!("🖼️ 结果图片 {} {}x{}（{}）", output.suggested_name, w, h, media_type),
        None => log::info!("🖼️ 结果图片 {}（{}，尺寸未知）", output.suggested_name, media_type),
    }

    Ok(ImageArtifact {
        preview,
        output,
        dimensions,
    })
}

fn describe_non_image(response: &ServiceResponse) -> String {
    let server_error = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|record| record.get("error").and_then(Value::as_str).map(str::to_string));

    match server_error {
        Some(message) => message,
        None => format!(
            "service did not return a PNG or JPEG image (content-type: {})",
            response.content_type.as_deref().unwrap_or("none")
        ),
    }
}

/// 仅读取图片头中的宽高，不做完整解码。
fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
