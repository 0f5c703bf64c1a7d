//! WebSocket 클라이언트.
//!
//! `AdviceTransport` 포트 구현. 단일 소켓으로 프레임 송신과
//! 응답 수신을 함께 처리한다 (`tokio-tungstenite`).
//! 연결이 끊기면 exponential backoff로 재연결한다.

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use hunsu_core::error::CoreError;
use hunsu_core::models::frame::FrameUpload;
use hunsu_core::ports::advice::{AdviceEvent, AdviceTransport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// 송신 프레임 메시지 래퍼
#[derive(Serialize)]
struct OutboundFrame<'a> {
    #[serde(rename = "type")]
    msg_type: &'static str,
    #[serde(flatten)]
    upload: &'a FrameUpload,
}

/// WebSocket 클라이언트 — 양방향 단일 소켓 모드
pub struct AdviceWsClient {
    base_url: String,
    api_token: String,
    max_retry_secs: u64,
    /// 현재 연결의 송신 절반 (미연결이면 None)
    sender: Arc<Mutex<Option<WsSink>>>,
}

impl AdviceWsClient {
    /// 새 WebSocket 클라이언트 생성
    pub fn new(base_url: &str, api_token: &str, max_retry_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            max_retry_secs: max_retry_secs.max(1),
            sender: Arc::new(Mutex::new(None)),
        }
    }

    /// 세션용 WebSocket URL
    fn ws_url(&self, session_id: &str) -> String {
        let ws_base = self
            .base_url
            .replace("http://", "ws://")
            .replace("https://", "wss://");
        let mut url = format!("{ws_base}/advice/socket?session_id={session_id}");
        if !self.api_token.is_empty() {
            url.push_str(&format!("&token={}", self.api_token));
        }
        url
    }

    /// 수신 메시지(JSON) → AdviceEvent
    fn parse_message(text: &str) -> Option<AdviceEvent> {
        let value: serde_json::Value = serde_json::from_str(text).ok()?;
        let msg_type = value.get("type")?.as_str()?;
        match msg_type {
            "connection" => {
                let session_id = value.get("session_id")?.as_str()?.to_string();
                Some(AdviceEvent::Connected { session_id })
            }
            "delta" => {
                let text = value.get("text")?.as_str()?.to_string();
                Some(AdviceEvent::Delta { text })
            }
            "completed" => {
                let text = value
                    .get("text")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string();
                Some(AdviceEvent::Completed { text })
            }
            "error" => {
                let message = value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                Some(AdviceEvent::Error(message))
            }
            "close" => Some(AdviceEvent::Closed),
            _ => {
                debug!("알 수 없는 WebSocket 메시지 타입: {msg_type}");
                None
            }
        }
    }
}

#[async_trait]
impl AdviceTransport for AdviceWsClient {
    async fn connect(
        &self,
        session_id: &str,
        tx: mpsc::Sender<AdviceEvent>,
    ) -> Result<(), CoreError> {
        let url = self.ws_url(session_id);
        info!("WebSocket 연결: {}", url.split('?').next().unwrap_or(&url));

        let mut retry_delay = 1u64;

        loop {
            match tokio_tungstenite::connect_async(url.as_str()).await {
                Ok((ws_stream, _)) => {
                    // 연결 성공 — 재시도 지연 리셋, 송신 절반 보관
                    retry_delay = 1;
                    let (write, mut read) = ws_stream.split();
                    *self.sender.lock().await = Some(write);

                    while let Some(msg) = read.next().await {
                        match msg {
                            Ok(Message::Text(text)) => {
                                if let Some(event) = Self::parse_message(&text) {
                                    if tx.send(event).await.is_err() {
                                        info!("이벤트 채널 닫힘, WebSocket 종료");
                                        *self.sender.lock().await = None;
                                        return Ok(());
                                    }
                                }
                            }
                            Ok(Message::Close(_)) => {
                                let _ = tx.send(AdviceEvent::Closed).await;
                                break;
                            }
                            Ok(_) => {} // Ping/Pong은 자동 처리
                            Err(e) => {
                                warn!("WebSocket 수신 에러: {e}");
                                break;
                            }
                        }
                    }
                    *self.sender.lock().await = None;
                    debug!("WebSocket 수신 루프 종료");
                }
                Err(e) => {
                    warn!("WebSocket 연결 실패: {e}");
                }
            }

            if tx.is_closed() {
                return Ok(());
            }

            // exponential backoff 재연결
            warn!("WebSocket 재연결 대기: {retry_delay}초");
            tokio::time::sleep(Duration::from_secs(retry_delay)).await;
            retry_delay = (retry_delay * 2).min(self.max_retry_secs);
        }
    }

    async fn send_frame(&self, upload: &FrameUpload) -> Result<(), CoreError> {
        let json = serde_json::to_string(&OutboundFrame {
            msg_type: "frame",
            upload,
        })?;

        let mut guard = self.sender.lock().await;
        let write = guard
            .as_mut()
            .ok_or_else(|| CoreError::Network("WebSocket 미연결".to_string()))?;

        write
            .send(Message::Text(json))
            .await
            .map_err(|e| CoreError::Network(format!("프레임 전송 실패: {e}")))
    }
}
