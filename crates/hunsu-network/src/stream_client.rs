//! SSE 스트림 클라이언트.
//!
//! `AdviceTransport` 포트 구현. 프레임은 HTTP POST로 올리고,
//! 응답 텍스트는 SSE 스트림으로 받는다. 자동 재연결 + exponential backoff.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use hunsu_core::error::CoreError;
use hunsu_core::models::frame::FrameUpload;
use hunsu_core::ports::advice::{AdviceEvent, AdviceTransport};

/// SSE 스트림 클라이언트 — `AdviceTransport` 포트 구현
pub struct AdviceStreamClient {
    base_url: String,
    api_token: String,
    max_retry_secs: u64,
    http_client: reqwest::Client,
}

impl AdviceStreamClient {
    /// 새 SSE 클라이언트 생성
    pub fn new(base_url: &str, api_token: &str, max_retry_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            max_retry_secs: max_retry_secs.max(1),
            http_client: reqwest::Client::new(),
        }
    }

    /// SSE 이벤트 데이터를 AdviceEvent로 파싱
    fn parse_event(event_type: &str, data: &str) -> Option<AdviceEvent> {
        match event_type {
            "connection" => {
                let val: serde_json::Value = serde_json::from_str(data).ok()?;
                let session_id = val.get("session_id")?.as_str()?.to_string();
                Some(AdviceEvent::Connected { session_id })
            }
            "delta" => Some(AdviceEvent::Delta {
                text: Self::payload_text(data),
            }),
            "completed" | "done" => Some(AdviceEvent::Completed {
                text: Self::payload_text(data),
            }),
            "error" => Some(AdviceEvent::Error(data.to_string())),
            "close" => Some(AdviceEvent::Closed),
            _ => {
                debug!("알 수 없는 SSE 이벤트 타입: {event_type}");
                None
            }
        }
    }

    /// 이벤트 데이터에서 텍스트 추출 — JSON `{"text": ...}` 또는 평문
    fn payload_text(data: &str) -> String {
        match serde_json::from_str::<serde_json::Value>(data) {
            Ok(value) => value
                .get("text")
                .and_then(|t| t.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| data.to_string()),
            Err(_) => data.to_string(),
        }
    }
}

#[async_trait]
impl AdviceTransport for AdviceStreamClient {
    async fn connect(
        &self,
        session_id: &str,
        tx: mpsc::Sender<AdviceEvent>,
    ) -> Result<(), CoreError> {
        let url = format!("{}/advice/stream?session_id={}", self.base_url, session_id);
        info!("SSE 연결 시작: {url}");

        let mut retry_delay = 1u64;

        loop {
            let mut request = self.http_client.get(&url);
            if !self.api_token.is_empty() {
                request = request.header("Authorization", format!("Bearer {}", self.api_token));
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    let mut stream = response.bytes_stream().eventsource();
                    let mut healthy = false;

                    while let Some(item) = stream.next().await {
                        match item {
                            Ok(event) => {
                                if !healthy {
                                    // 정상 수신 시작 — 재시도 지연 리셋
                                    healthy = true;
                                    retry_delay = 1;
                                }
                                if let Some(advice) = Self::parse_event(&event.event, &event.data)
                                {
                                    if tx.send(advice).await.is_err() {
                                        info!("이벤트 채널 닫힘, SSE 연결 종료");
                                        return Ok(());
                                    }
                                }
                            }
                            Err(e) => {
                                warn!("SSE 스트림 에러: {e}");
                                break;
                            }
                        }
                    }
                    info!("SSE 스트림 종료");
                }
                Ok(response) => {
                    warn!("SSE 연결 거부: {}", response.status());
                }
                Err(e) => {
                    warn!("SSE 연결 실패: {e}");
                }
            }

            if tx.is_closed() {
                return Ok(());
            }

            // exponential backoff 재연결
            warn!("SSE 재연결 대기: {retry_delay}초");
            tokio::time::sleep(Duration::from_secs(retry_delay)).await;
            retry_delay = (retry_delay * 2).min(self.max_retry_secs);
        }
    }

    async fn send_frame(&self, upload: &FrameUpload) -> Result<(), CoreError> {
        let url = format!("{}/advice/frames", self.base_url);
        let mut request = self.http_client.post(&url).json(upload);
        if !self.api_token.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("프레임 전송 실패: {e}")))?;

        if !response.status().is_success() {
            return Err(CoreError::Network(format!(
                "프레임 전송 거부: {}",
                response.status()
            )));
        }
        debug!("프레임 전송 완료: {}", upload.frame_id);
        Ok(())
    }
}
