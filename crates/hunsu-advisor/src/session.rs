//! 조언 세션 루프.
//!
//! 엔진 상태의 단일 작성자. 모든 입력(응답 조각, 픽셀 신호,
//! 컨트롤 이벤트)을 하나의 mpsc 큐로 받아 도착 순서대로 끝까지
//! 처리한다 — 주변이 멀티스레드여도 판단은 직렬이다.
//! 순서 역전된 응답은 감지할 방법이 없어 도착 순서대로 적용한다.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info};

use hunsu_core::config::EngineConfig;
use hunsu_core::models::event::SessionEvent;
use hunsu_core::models::signal::PixelSignal;
use hunsu_core::models::ui::UiState;

use crate::engine::{EngineDiagnostics, ReconcileEngine};
use crate::stream::ResponseAccumulator;

/// 조언 세션 — 엔진 + 누적기 + 최신 픽셀 신호의 독점 소유자
pub struct AdvisorSession {
    engine: ReconcileEngine,
    accumulator: ResponseAccumulator,
    latest_pixel: PixelSignal,
    state_tx: mpsc::Sender<UiState>,
}

impl AdvisorSession {
    /// 새 세션 생성
    pub fn new(cfg: EngineConfig, state_tx: mpsc::Sender<UiState>) -> Self {
        Self {
            engine: ReconcileEngine::new(cfg),
            accumulator: ResponseAccumulator::new(),
            latest_pixel: PixelSignal::absent(),
            state_tx,
        }
    }

    /// 이벤트 루프 실행.
    ///
    /// 단일 소비자라 이벤트 처리가 직렬화된다. 수신 채널이 닫히거나
    /// 출력 채널 소비자가 사라지면 종료한다.
    pub async fn run(mut self, mut rx: mpsc::Receiver<SessionEvent>) {
        info!("조언 세션 루프 시작");
        while let Some(event) = rx.recv().await {
            if let Some(state) = self.handle(event, Utc::now()) {
                debug!("표시 상태 전이: {:?} ({})", state.phase, state.display);
                if self.state_tx.send(state).await.is_err() {
                    break;
                }
            }
        }
        info!("조언 세션 루프 종료");
    }

    /// 이벤트 하나 처리. 전이가 일어나면 새 상태 스냅샷을 반환한다.
    pub fn handle(&mut self, event: SessionEvent, now: DateTime<Utc>) -> Option<UiState> {
        match event {
            SessionEvent::ResponseDelta { text } => {
                let response = self.accumulator.on_delta(&text)?;
                self.engine.apply(&response, &self.latest_pixel, now)
            }
            SessionEvent::ResponseCompleted { text } => {
                let response = self.accumulator.on_completed(&text);
                self.engine.apply(&response, &self.latest_pixel, now)
            }
            SessionEvent::PixelUpdate { signal } => {
                // 최신 신호 교체만 — 등장/소멸 엣지는 감지 루프가
                // ControlAppeared/ControlDisappeared로 따로 보낸다
                self.latest_pixel = signal;
                None
            }
            SessionEvent::ControlAppeared => {
                self.engine.control_appeared();
                None
            }
            SessionEvent::ControlDisappeared => self.engine.control_disappeared(),
            SessionEvent::Reset => {
                info!("세션 리셋");
                self.engine.reset();
                self.accumulator.reset();
                self.latest_pixel = PixelSignal::absent();
                None
            }
        }
    }

    /// 현재 표시 상태 스냅샷
    pub fn current(&self) -> UiState {
        self.engine.current().clone()
    }

    /// 엔진 진단 카운터
    pub fn diagnostics(&self) -> EngineDiagnostics {
        self.engine.diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hunsu_core::models::ui::{ActingKind, Phase};

    fn session() -> (AdvisorSession, mpsc::Receiver<UiState>) {
        let (tx, rx) = mpsc::channel(16);
        (AdvisorSession::new(EngineConfig::default(), tx), rx)
    }

    fn pixel_update(primary: bool) -> SessionEvent {
        SessionEvent::PixelUpdate {
            signal: if primary {
                PixelSignal::graded(true, true, 0.3)
            } else {
                PixelSignal::absent()
            },
        }
    }

    #[test]
    fn completed_response_with_pixel_commits() {
        let (mut session, _rx) = session();
        let now = Utc::now();

        session.handle(pixel_update(true), now);
        let out = session.handle(
            SessionEvent::ResponseCompleted {
                text: "ACTION: RAISE 120\nPOT: 80".to_string(),
            },
            now,
        );

        let state = out.expect("High 신뢰도 1회 확인");
        assert_eq!(state.phase, Phase::Acting(ActingKind::Raise));
        assert_eq!(state.display, "Raise 120");
    }

    #[test]
    fn delta_withheld_until_rationale() {
        let (mut session, _rx) = session();
        let now = Utc::now();
        session.handle(pixel_update(true), now);

        // 근거 없는 acting 프리픽스는 보류
        let early = session.handle(
            SessionEvent::ResponseDelta {
                text: "ACTION: RAISE 120\n".to_string(),
            },
            now,
        );
        assert!(early.is_none());
        assert_eq!(session.current().phase, Phase::Waiting);

        // 근거 도착 후 같은 가드를 거쳐 커밋
        let late = session.handle(
            SessionEvent::ResponseDelta {
                text: "RATIONALE: strong hand".to_string(),
            },
            now,
        );
        assert_eq!(
            late.expect("근거 시작 후 표면화").phase,
            Phase::Acting(ActingKind::Raise)
        );
    }

    #[test]
    fn control_disappearance_resets_to_waiting() {
        let (mut session, _rx) = session();
        let now = Utc::now();

        session.handle(pixel_update(true), now);
        session.handle(
            SessionEvent::ResponseCompleted {
                text: "ACTION: RAISE 120\nHAND: Ah Kd".to_string(),
            },
            now,
        );
        assert!(session.current().phase.is_acting());

        // 감지 루프의 소멸 이벤트 → 묵은 조언 무효화
        session.handle(pixel_update(false), now);
        let out = session.handle(SessionEvent::ControlDisappeared, now);
        let state = out.expect("강제 Waiting 복귀");
        assert_eq!(state.phase, Phase::Waiting);
        assert_eq!(state.pinned_fields.hand, "Ah Kd");
    }

    #[test]
    fn control_appearance_shortens_confirmation() {
        let (mut session, _rx) = session();
        let now = Utc::now();

        // 픽셀 신뢰도 Low(부재)면 본래 확인 2회 — 등장 이벤트가 1회를 선점
        session.handle(SessionEvent::ControlAppeared, now);
        let out = session.handle(
            SessionEvent::ResponseCompleted {
                text: "ACTION: CHECK\nRATIONALE: nothing to gain".to_string(),
            },
            now,
        );
        assert!(out.expect("선점 후 즉시 진입").phase.is_acting());
    }

    #[test]
    fn reset_clears_session_state() {
        let (mut session, _rx) = session();
        let now = Utc::now();

        session.handle(pixel_update(true), now);
        session.handle(
            SessionEvent::ResponseCompleted {
                text: "ACTION: RAISE 120".to_string(),
            },
            now,
        );

        session.handle(SessionEvent::Reset, now);
        assert_eq!(session.current(), UiState::initial());
        assert_eq!(session.diagnostics().acting_streak, 0);
    }

    #[tokio::test]
    async fn run_loop_emits_state_snapshots() {
        let (tx, mut state_rx) = mpsc::channel(16);
        let session = AdvisorSession::new(EngineConfig::default(), tx);
        let (event_tx, event_rx) = mpsc::channel(16);

        let handle = tokio::spawn(session.run(event_rx));

        event_tx.send(pixel_update(true)).await.unwrap();
        event_tx
            .send(SessionEvent::ResponseCompleted {
                text: "ACTION: RAISE 120\nPOT: 80".to_string(),
            })
            .await
            .unwrap();

        let state = state_rx.recv().await.expect("전이 방출");
        assert_eq!(state.phase, Phase::Acting(ActingKind::Raise));
        assert_eq!(state.display, "Raise 120");

        drop(event_tx);
        handle.await.unwrap();
    }
}
