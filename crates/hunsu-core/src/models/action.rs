//! 모델 응답 분류 모델.
//!
//! 필드 파서가 응답 텍스트 하나(완결 또는 누적 프리픽스)를 분류한 결과.
//! `ActionKind`는 닫힌 분류 체계이며, 인식 불가 텍스트도 항상
//! `Unrecognized`로 흡수된다 — 분류는 전역(total) 연산이다.

use serde::{Deserialize, Serialize};

use super::ui::ActingKind;

/// 응답에서 분류된 액션 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// 폴드 — 단일 응답 내에서 종결적(재해석으로 바뀌지 않음)
    Fold,
    /// 레이즈/벳
    Raise,
    /// 콜
    Call,
    /// 체크
    Check,
    /// 올인
    AllIn,
    /// 곧 차례 (예측 액션 보유 가능)
    Ready,
    /// 차례 아님
    Waiting,
    /// 게임 화면 아님 — 어떤 상태도 갱신하지 않음
    Skip,
    /// 분류 불가
    Unrecognized,
}

impl ActionKind {
    /// "차례 아님" 계열 여부 (Waiting 또는 Ready)
    pub fn is_waiting_like(&self) -> bool {
        matches!(self, ActionKind::Waiting | ActionKind::Ready)
    }

    /// "행동 차례" 계열 여부 (Skip 제외 나머지)
    pub fn is_acting_like(&self) -> bool {
        !self.is_waiting_like() && *self != ActionKind::Skip
    }

    /// Acting 위상에 실을 수 있는 구체 액션 종류
    pub fn acting_kind(&self) -> Option<ActingKind> {
        match self {
            ActionKind::Fold => Some(ActingKind::Fold),
            ActionKind::Raise => Some(ActingKind::Raise),
            ActionKind::Call => Some(ActingKind::Call),
            ActionKind::Check => Some(ActingKind::Check),
            ActionKind::AllIn => Some(ActingKind::AllIn),
            _ => None,
        }
    }
}

/// 응답에서 추출한 라벨 필드 집합
///
/// 모든 필드는 문자열이며 부재는 빈 문자열로 표현한다
/// (null과 missing의 구분 없음).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandFields {
    /// 홀 카드 (예: "Ah Kd")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hand: String,
    /// 보드 카드
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub board: String,
    /// 스트리트 (preflop/flop/turn/river)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stage: String,
    /// 포지션
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub position: String,
    /// 팟 크기
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pot: String,
    /// 콜 금액
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub amount_to_call: String,
    /// 팟 오즈
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pot_odds: String,
    /// 스택 대비 팟 비율
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stack_to_pot_ratio: String,
    /// 근거 자유 서술
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rationale: String,
    /// 레이즈 크기
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raise_size: String,
    /// 예측 액션 (Waiting 응답 보조 필드)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub predicted_action: String,
    /// 예측 레이즈 크기
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub predicted_raise_size: String,
    /// 모델 자기 신뢰도
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub confidence: String,
    /// 일관성 검사 소견
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub issue: String,
}

impl HandFields {
    /// 모든 필드가 비어 있는지
    pub fn is_empty(&self) -> bool {
        self == &HandFields::default()
    }

    /// 비어 있지 않은 필드만 덮어쓴다 (빈 값은 기존 유지)
    pub fn merge_from(&mut self, other: &HandFields) {
        fn merge(dst: &mut String, src: &str) {
            if !src.is_empty() {
                *dst = src.to_string();
            }
        }
        merge(&mut self.hand, &other.hand);
        merge(&mut self.board, &other.board);
        merge(&mut self.stage, &other.stage);
        merge(&mut self.position, &other.position);
        merge(&mut self.pot, &other.pot);
        merge(&mut self.amount_to_call, &other.amount_to_call);
        merge(&mut self.pot_odds, &other.pot_odds);
        merge(&mut self.stack_to_pot_ratio, &other.stack_to_pot_ratio);
        merge(&mut self.rationale, &other.rationale);
        merge(&mut self.raise_size, &other.raise_size);
        merge(&mut self.predicted_action, &other.predicted_action);
        merge(&mut self.predicted_raise_size, &other.predicted_raise_size);
        merge(&mut self.confidence, &other.confidence);
        merge(&mut self.issue, &other.issue);
    }
}

/// 필드 파서의 출력 — 응답 하나의 분류 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedResponse {
    /// 분류된 액션 종류
    pub action_kind: ActionKind,
    /// 표시용 짧은 라벨 (예: "Raise 120")
    pub display_text: String,
    /// 추출된 라벨 필드
    pub fields: HandFields,
}

impl ClassifiedResponse {
    /// 필드 없는 단순 분류 생성
    pub fn bare(action_kind: ActionKind, display_text: impl Into<String>) -> Self {
        Self {
            action_kind,
            display_text: display_text.into(),
            fields: HandFields::default(),
        }
    }
}
