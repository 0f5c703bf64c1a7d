//! HUNSU 핵심 에러 타입.
//!
//! 어댑터 crate(비전, 네트워크)는 외부 에러를 `CoreError`로 매핑한다.
//! 판단 코어(파서/엔진)는 전역(total) — 에러를 반환하지 않는다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 캡처, 인코딩, 전송, 설정 등 경계 어댑터 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 스크린 캡처 실패
    #[error("캡처 에러: {0}")]
    Capture(String),

    /// 프레임 인코딩 실패
    #[error("인코딩 에러: {0}")]
    Encoding(String),

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}
