//! 프레임 업로드 모델.
//!
//! 샘플링한 프레임을 모델 서버로 보낼 때 쓰는 경계 페이로드.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 서버 전송용 프레임 페이로드
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameUpload {
    /// 세션 ID
    pub session_id: String,
    /// 프레임 고유 ID
    pub frame_id: String,
    /// 캡처 시각
    pub timestamp: DateTime<Utc>,
    /// 원본 너비 (픽셀)
    pub width: u32,
    /// 원본 높이 (픽셀)
    pub height: u32,
    /// Base64 인코딩된 이미지 데이터
    pub image: String,
    /// 이미지 포맷 (예: "webp")
    pub format: String,
}
