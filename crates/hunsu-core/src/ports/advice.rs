//! 조언 전송 포트.
//!
//! 구현: `hunsu-network` crate (reqwest + eventsource-stream, tokio-tungstenite)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::frame::FrameUpload;

/// 모델 서버에서 수신한 스트림 이벤트
#[derive(Debug, Clone)]
pub enum AdviceEvent {
    /// 연결 수립
    Connected {
        /// 서버가 확인한 세션 ID
        session_id: String,
    },
    /// 응답 텍스트 조각 (수신한 그대로, 전처리 없음)
    Delta {
        /// 텍스트 조각
        text: String,
    },
    /// 응답 완결 (전문 포함)
    Completed {
        /// 응답 전문
        text: String,
    },
    /// 서버 에러
    Error(String),
    /// 연결 종료
    Closed,
}

/// 조언 전송 클라이언트 — 프레임 송신 + 응답 스트림 수신
///
/// 연결이 끊기면 구현체가 자동 재연결(backoff)을 시도한다.
/// 재시도는 전송 계층의 책임이며 판단 코어에는 재시도 로직이 없다.
#[async_trait]
pub trait AdviceTransport: Send + Sync {
    /// 응답 스트림 연결 및 이벤트 수신
    ///
    /// 수신된 이벤트를 `tx` 채널로 전송한다. 채널이 닫히면 반환한다.
    async fn connect(
        &self,
        session_id: &str,
        tx: tokio::sync::mpsc::Sender<AdviceEvent>,
    ) -> Result<(), CoreError>;

    /// 샘플링한 프레임 전송
    async fn send_frame(&self, upload: &FrameUpload) -> Result<(), CoreError>;
}
