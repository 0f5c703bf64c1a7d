//! # hunsu-network
//!
//! 네트워크 어댑터 크레이트.
//! 프레임 업로드와 모델 응답 스트림 수신을 담당한다.
//! 두 가지 전송 방식 모두 `AdviceTransport` 포트를 구현한다:
//!
//! - [`stream_client`] — HTTP POST 업로드 + SSE 스트림 수신
//! - [`ws_client`] — 단일 WebSocket 양방향 소켓
//!
//! 재연결은 exponential backoff로 어댑터 안에서 처리한다.
//! 판단 코어에는 재시도 로직이 없다.

pub mod stream_client;
pub mod ws_client;
