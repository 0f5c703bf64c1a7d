//! 파이프라인 통합 테스트.
//!
//! 분류기 → 누적기 → 엔진 → 세션의 크레이트 경계를 가로지르는
//! 시나리오 검증. 네트워크/캡처 어댑터 없이 세션 이벤트를 직접 주입한다.

use chrono::Utc;
use tokio::sync::mpsc;

use hunsu_advisor::session::AdvisorSession;
use hunsu_core::config::EngineConfig;
use hunsu_core::models::event::SessionEvent;
use hunsu_core::models::signal::PixelSignal;
use hunsu_core::models::ui::{ActingKind, Phase};

fn make_session() -> AdvisorSession {
    let (state_tx, _state_rx) = mpsc::channel(16);
    AdvisorSession::new(EngineConfig::default(), state_tx)
}

fn pixel(primary: bool) -> SessionEvent {
    SessionEvent::PixelUpdate {
        signal: if primary {
            PixelSignal::graded(true, true, 0.3)
        } else {
            PixelSignal::absent()
        },
    }
}

fn completed(text: &str) -> SessionEvent {
    SessionEvent::ResponseCompleted {
        text: text.to_string(),
    }
}

fn delta(text: &str) -> SessionEvent {
    SessionEvent::ResponseDelta {
        text: text.to_string(),
    }
}

#[test]
fn raise_round_trip_from_raw_text() {
    let mut session = make_session();
    let now = Utc::now();

    session.handle(pixel(true), now);
    let out = session.handle(
        completed("ACTION: RAISE 120\nPOT: 80\nHAND: Ah Kd\nRATIONALE: top kicker pressure"),
        now,
    );

    let state = out.expect("High 신뢰도 + 컨트롤 선점 → 1회 전이");
    assert_eq!(state.phase, Phase::Acting(ActingKind::Raise));
    assert_eq!(state.display, "Raise 120");
    assert_eq!(state.pinned_fields.pot, "80");
    assert_eq!(state.pinned_fields.hand, "Ah Kd");
}

#[test]
fn duplicate_response_refreshes_fields_only() {
    let mut session = make_session();
    let now = Utc::now();

    session.handle(pixel(true), now);
    assert!(session
        .handle(completed("ACTION: RAISE 120\nPOT: 80"), now)
        .is_some());

    // 같은 (종류, 라벨)의 새 응답 — 전이 없이 필드만 갱신
    let second = session.handle(completed("ACTION: RAISE 120\nPOT: 80\nHAND: Ah Kd"), now);
    assert!(second.is_none());
    assert_eq!(session.current().pinned_fields.hand, "Ah Kd");
    assert!(session.current().phase.is_acting());
}

#[test]
fn fold_latch_survives_streaming_contradiction() {
    let mut session = make_session();
    let now = Utc::now();

    session.handle(pixel(true), now);

    // 라벨 없는 조각 → 전문이 근거가 되어 즉시 표면화, Fold 확정
    let first = session.handle(delta("fold this hand, the board is dangerous"), now);
    assert_eq!(first.expect("Fold 전이").phase, Phase::Acting(ActingKind::Fold));

    // 같은 응답의 후속 조각이 레이즈를 언급해도 Fold 유지
    let second = session.handle(delta("\non second thought a raise could bluff"), now);
    assert!(second.is_none(), "Fold 래치로 중복 처리");
    assert_eq!(session.current().phase, Phase::Acting(ActingKind::Fold));
    assert_eq!(session.current().display, "Fold");

    // 완결 전문에도 래치 적용
    let completed_out = session.handle(
        completed("fold this hand, the board is dangerous\non second thought a raise could bluff"),
        now,
    );
    assert!(completed_out.is_none());
    assert_eq!(session.current().phase, Phase::Acting(ActingKind::Fold));
}

#[test]
fn skip_scene_never_disturbs_display() {
    let mut session = make_session();
    let now = Utc::now();

    session.handle(pixel(true), now);
    session.handle(completed("ACTION: RAISE 120\nPOT: 80"), now);
    let before = session.current();

    // 게임 화면이 아니라는 응답은 상태를 건드리지 않는다
    let out = session.handle(completed("lobby screen visible, no game in progress"), now);
    assert!(out.is_none());
    assert_eq!(session.current(), before);
}

#[test]
fn control_disappearance_voids_stale_advice() {
    let mut session = make_session();
    let now = Utc::now();

    session.handle(pixel(true), now);
    session.handle(completed("ACTION: RAISE 120\nHAND: Ah Kd"), now);
    assert!(session.current().phase.is_acting());

    // 감지 루프가 보낸 소멸 이벤트 → 묵은 조언 무효화, 고정 필드는 유지
    session.handle(pixel(false), now);
    let out = session.handle(SessionEvent::ControlDisappeared, now);
    let state = out.expect("강제 Waiting 복귀");
    assert_eq!(state.phase, Phase::Waiting);
    assert_eq!(state.pinned_fields.hand, "Ah Kd");
}

#[test]
fn watcher_edges_drive_auxiliary_transitions() {
    use hunsu_vision::watcher::{ControlEdge, ControlWatcher};

    let mut session = make_session();
    let mut watcher = ControlWatcher::new();
    let now = Utc::now();

    // 캡처 루프 한 틱: 신호 갱신 + 엣지 이벤트
    let present = PixelSignal::graded(true, false, 0.2);
    session.handle(
        SessionEvent::PixelUpdate { signal: present },
        now,
    );
    assert_eq!(watcher.observe(&present), Some(ControlEdge::Appeared));
    session.handle(SessionEvent::ControlAppeared, now);

    session.handle(completed("ACTION: RAISE 120\nPOT: 80"), now);
    assert!(session.current().phase.is_acting());

    // 컨트롤이 사라진 다음 틱
    let absent = PixelSignal::absent();
    session.handle(SessionEvent::PixelUpdate { signal: absent }, now);
    assert_eq!(watcher.observe(&absent), Some(ControlEdge::Disappeared));
    let out = session.handle(SessionEvent::ControlDisappeared, now);
    assert_eq!(out.expect("소멸 엣지 복귀").phase, Phase::Waiting);
}

#[tokio::test]
async fn event_loop_round_trip() {
    let (state_tx, mut state_rx) = mpsc::channel(16);
    let session = AdvisorSession::new(EngineConfig::default(), state_tx);
    let (event_tx, event_rx) = mpsc::channel(16);

    let handle = tokio::spawn(session.run(event_rx));

    event_tx.send(pixel(true)).await.unwrap();
    event_tx
        .send(completed("ACTION: RAISE 120\nPOT: 80"))
        .await
        .unwrap();

    let state = state_rx.recv().await.expect("전이 방출");
    assert_eq!(state.phase, Phase::Acting(ActingKind::Raise));
    assert_eq!(state.display, "Raise 120");

    drop(event_tx);
    handle.await.unwrap();
}
