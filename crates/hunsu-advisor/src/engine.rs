//! 신호 조정 엔진.
//!
//! 텍스트 분류와 픽셀 신호라는 두 비동기·오류 유발 센서를
//! 히스테리시스/확인/무시 규칙으로 융합해, 깜빡임 없는 단일
//! 표시 상태를 만든다. 상태는 이 엔진이 독점 소유하며
//! 밖으로는 스냅샷 값만 내보낸다.
//!
//! 가드 순서 (응답 하나당):
//! Skip 가드 → 스트릭 갱신 → Acting 이탈 가드 → 픽셀 모순 가드 →
//! Acting 진입 가드 → 중복 제거 → 커밋.
//! 이탈 가드가 판정한 사이클은 픽셀 모순 가드를 건너뛴다
//! (이탈 수용 조건과 모순 기각 조건이 서로를 잠그지 않도록).

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use hunsu_core::config::EngineConfig;
use hunsu_core::models::action::{ActionKind, ClassifiedResponse, HandFields};
use hunsu_core::models::signal::{PixelConfidence, PixelSignal};
use hunsu_core::models::ui::{Phase, UiState};

/// 엔진 진단 스냅샷 (읽기 전용, 로깅용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineDiagnostics {
    /// 연속 waiting 계열 분류 수
    pub waiting_streak: u32,
    /// 연속 acting 계열 분류 수
    pub acting_streak: u32,
    /// 연속 픽셀 모순 수
    pub pixel_override_streak: u32,
}

/// 신호 조정 엔진 — 세션당 하나, 단일 작성자 규율
pub struct ReconcileEngine {
    cfg: EngineConfig,
    state: UiState,
    waiting_streak: u32,
    acting_streak: u32,
    last_acting_at: Option<DateTime<Utc>>,
    pixel_override_streak: u32,
    last_emitted: Option<(ActionKind, String)>,
}

impl ReconcileEngine {
    /// 새 엔진 생성 (초기 상태 Waiting)
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            state: UiState::initial(),
            waiting_streak: 0,
            acting_streak: 0,
            last_acting_at: None,
            pixel_override_streak: 0,
            last_emitted: None,
        }
    }

    /// 현재 표시 상태 (스냅샷)
    pub fn current(&self) -> &UiState {
        &self.state
    }

    /// 진단 카운터 스냅샷
    pub fn diagnostics(&self) -> EngineDiagnostics {
        EngineDiagnostics {
            waiting_streak: self.waiting_streak,
            acting_streak: self.acting_streak,
            pixel_override_streak: self.pixel_override_streak,
        }
    }

    /// 분류된 응답 하나와 최신 픽셀 신호를 융합한다.
    ///
    /// 상태 전이가 일어나면 새 `UiState` 스냅샷을 반환하고,
    /// 억제/중복이면 `None` (필드 갱신은 일어날 수 있다).
    pub fn apply(
        &mut self,
        response: &ClassifiedResponse,
        pixel: &PixelSignal,
        now: DateTime<Utc>,
    ) -> Option<UiState> {
        // 1. Skip 가드 — 어떤 상태도 건드리지 않는다
        if response.action_kind == ActionKind::Skip {
            return None;
        }

        // 2. 스트릭 갱신 (상호 배타)
        let waiting_like = response.action_kind.is_waiting_like();
        if waiting_like {
            self.waiting_streak += 1;
            self.acting_streak = 0;
        } else {
            self.acting_streak += 1;
            self.waiting_streak = 0;
        }

        // 3. Acting 이탈 가드 (깜빡임 방지)
        let mut exit_adjudicated = false;
        if self.state.phase.is_acting() && waiting_like {
            let window_passed = self.last_acting_at.map_or(true, |entered| {
                now - entered > Duration::milliseconds(self.cfg.flicker_window_ms as i64)
            });
            let accept = !pixel.primary_present
                || window_passed
                || self.waiting_streak >= self.cfg.waiting_confirmations;
            if !accept {
                debug!("Acting 이탈 억제 (streak {})", self.waiting_streak);
                self.refresh_fields(&response.fields);
                return None;
            }
            exit_adjudicated = true;
        }

        // 4. 픽셀 모순 가드 — 텍스트는 waiting인데 1차 컨트롤이 보인다
        if waiting_like && pixel.primary_present && !exit_adjudicated {
            self.pixel_override_streak += 1;
            if self.pixel_override_streak < self.cfg.pixel_override_escape {
                debug!(
                    "waiting 분류 기각 — 픽셀 모순 {}회",
                    self.pixel_override_streak
                );
                self.refresh_fields(&response.fields);
                return None;
            }
            // 탈출 임계 도달 — 픽셀 센서 오탐/지연으로 보고 waiting 수용
            debug!("픽셀 모순 탈출 임계 도달, waiting 수용");
            self.pixel_override_streak = 0;
        } else {
            self.pixel_override_streak = 0;
        }

        // 5. Acting 진입 가드 (오판 방지) — 픽셀 신뢰도에 따라 확인 수 조정
        if !waiting_like && !self.state.phase.is_acting() {
            let required = match pixel.confidence {
                PixelConfidence::High | PixelConfidence::Medium => self.cfg.acting_confirmations,
                PixelConfidence::Low => self.cfg.acting_confirmations_low,
            };
            if self.acting_streak < required {
                debug!("Acting 진입 대기 ({}/{})", self.acting_streak, required);
                self.refresh_fields(&response.fields);
                return None;
            }
        }

        // 6. 중복 제거 — 같은 (종류, 라벨)은 필드만 갱신하고 재방출하지 않는다
        let candidate = (response.action_kind, response.display_text.clone());
        if self.last_emitted.as_ref() == Some(&candidate) {
            self.refresh_fields(&response.fields);
            return None;
        }

        // 7. 커밋
        let phase = match response.action_kind {
            ActionKind::Waiting => Phase::Waiting,
            ActionKind::Ready => Phase::Ready,
            other => match other.acting_kind() {
                Some(kind) => Phase::Acting(kind),
                // 구체 액션이 없는 분류(Unrecognized)는 위상을 확정할 수 없다
                None => {
                    self.refresh_fields(&response.fields);
                    return None;
                }
            },
        };
        if phase.is_acting() && !self.state.phase.is_acting() {
            self.last_acting_at = Some(now);
        }
        self.refresh_fields(&response.fields);
        self.state.phase = phase;
        self.state.display = response.display_text.clone();
        self.last_emitted = Some(candidate);
        Some(self.state.clone())
    }

    /// 보조 전이 — 1차 컨트롤 등장.
    ///
    /// acting 스트릭을 1 이상으로 선점해 바로 다음 응답의 확인 지연을 줄인다.
    pub fn control_appeared(&mut self) {
        if self.acting_streak == 0 {
            self.acting_streak = 1;
            debug!("컨트롤 등장 — acting 스트릭 선점");
        }
    }

    /// 보조 전이 — 1차 컨트롤 소멸.
    ///
    /// 사용자가 이미 행동했다는 뜻이므로 묵은 조언을 무효화하고
    /// 대기 중인 텍스트 신호와 무관하게 Waiting으로 복귀한다.
    /// 고정 필드는 유지된다.
    pub fn control_disappeared(&mut self) -> Option<UiState> {
        self.waiting_streak = 0;
        self.acting_streak = 0;
        self.pixel_override_streak = 0;
        self.last_acting_at = None;

        let changed = self.state.phase != Phase::Waiting;
        self.state.phase = Phase::Waiting;
        self.state.display = "Waiting".to_string();
        self.last_emitted = Some((ActionKind::Waiting, "Waiting".to_string()));

        if changed {
            debug!("컨트롤 소멸 — Waiting 강제 복귀");
            Some(self.state.clone())
        } else {
            None
        }
    }

    /// 세션 리셋 — 엔진 상태 전체 폐기 (고정 필드 포함)
    pub fn reset(&mut self) {
        self.state = UiState::initial();
        self.waiting_streak = 0;
        self.acting_streak = 0;
        self.last_acting_at = None;
        self.pixel_override_streak = 0;
        self.last_emitted = None;
    }

    /// 고정 필드 갱신 — 비어 있지 않은 새 값만 반영
    fn refresh_fields(&mut self, fields: &HandFields) {
        self.state.pinned_fields.merge_from(fields);
    }
}
