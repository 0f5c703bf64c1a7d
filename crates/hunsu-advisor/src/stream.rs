//! 스트리밍 응답 누적기.
//!
//! 응답은 조각으로 도착할 수 있다. 누적 프리픽스를 조각마다 재분류하되:
//! - waiting 계열 조기 분류는 즉시 표면화한다 (나중에 뒤집힐 위험이 낮다)
//! - acting 계열 조기 분류는 근거 필드가 도착하기 시작할 때까지 보류한다
//!   (전문이 뒤집을 수 있는 액션을 먼저 깜빡이지 않기 위해)
//! - 한 응답 안에서 Fold 분류는 종결적이다: 같은 응답의 더 긴 프리픽스를
//!   재해석해도 Fold에서 벗어나지 않는다.

use hunsu_core::models::action::{ActionKind, ClassifiedResponse};

use crate::classifier::classify;

/// 응답 하나의 성장 프리픽스를 누적·재분류하는 상태
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    /// 현재 응답의 누적 텍스트
    text: String,
    /// 현재 응답에서 Fold가 확정되었는지
    fold_latched: bool,
}

impl ResponseAccumulator {
    /// 새 누적기 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 조각 추가 후 누적 프리픽스 재분류.
    ///
    /// 보류 조건에 걸리면 `None` — 엔진에 아무것도 전달하지 않는다.
    pub fn on_delta(&mut self, delta: &str) -> Option<ClassifiedResponse> {
        self.text.push_str(delta);
        let response = self.latched(classify(&self.text));

        // acting 계열 조기 분류는 근거 서술이 시작되기 전까지 보류
        if response.action_kind.is_acting_like() && response.fields.rationale.is_empty() {
            return None;
        }
        Some(response)
    }

    /// 응답 완결 처리 — 전문을 분류하고 다음 응답을 위해 초기화한다.
    ///
    /// 전문은 같은 응답이므로 스트리밍 중 확정된 Fold 래치가 여전히 적용된다.
    pub fn on_completed(&mut self, full_text: &str) -> ClassifiedResponse {
        let response = self.latched(classify(full_text));
        self.text.clear();
        self.fold_latched = false;
        response
    }

    /// 진행 중인 응답 폐기 (세션 리셋)
    pub fn reset(&mut self) {
        self.text.clear();
        self.fold_latched = false;
    }

    /// Fold 래치 적용: 한 번 Fold로 읽힌 응답은 Fold로 남는다
    fn latched(&mut self, mut response: ClassifiedResponse) -> ClassifiedResponse {
        if self.fold_latched && response.action_kind != ActionKind::Fold {
            response.action_kind = ActionKind::Fold;
            response.display_text = "Fold".to_string();
        }
        if response.action_kind == ActionKind::Fold {
            self.fold_latched = true;
        }
        response
    }
}
