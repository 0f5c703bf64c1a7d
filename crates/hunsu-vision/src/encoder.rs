//! WebP 인코더.
//!
//! 샘플링한 프레임을 서버 업로드용 페이로드로 변환한다.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use chrono::Utc;
use image::RgbaImage;
use tracing::debug;
use uuid::Uuid;

use hunsu_core::error::CoreError;
use hunsu_core::models::frame::FrameUpload;

/// WebP 품질 프리셋
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebPQuality {
    /// 낮은 품질 (60%) — 대역폭 절약 모드
    Low = 60,
    /// 중간 품질 (75%) — 기본값
    Medium = 75,
    /// 높은 품질 (85%) — 카드 글리프 판독이 필요한 경우
    High = 85,
}

/// WebP 인코딩
pub fn encode_webp(frame: &RgbaImage, quality: WebPQuality) -> Result<Vec<u8>, CoreError> {
    let (w, h) = frame.dimensions();
    if w == 0 || h == 0 {
        return Err(CoreError::Encoding("빈 프레임은 인코딩할 수 없음".to_string()));
    }

    let encoder = webp::Encoder::from_rgba(frame.as_raw(), w, h);
    let encoded = encoder.encode(quality as u8 as f32).to_vec();

    debug!(
        "WebP 인코딩: {}x{} → {} bytes (품질 {})",
        w,
        h,
        encoded.len(),
        quality as u8
    );
    Ok(encoded)
}

/// WebP 인코딩 후 Base64 반환
pub fn encode_webp_base64(frame: &RgbaImage, quality: WebPQuality) -> Result<String, CoreError> {
    let bytes = encode_webp(frame, quality)?;
    Ok(B64.encode(&bytes))
}

/// 프레임 → 서버 업로드 페이로드
pub fn build_frame_upload(
    session_id: &str,
    frame: &RgbaImage,
    quality: WebPQuality,
) -> Result<FrameUpload, CoreError> {
    let (width, height) = frame.dimensions();
    Ok(FrameUpload {
        session_id: session_id.to_string(),
        frame_id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        width,
        height,
        image: encode_webp_base64(frame, quality)?,
        format: "webp".to_string(),
    })
}
