//! 화면 표시 상태 모델.
//!
//! 엔진이 내보내는 단 하나의 외부 가시 결정. 스냅샷 값이며,
//! 반환 후에 변하는 참조를 밖으로 내주지 않는다.

use serde::{Deserialize, Serialize};

use super::action::HandFields;

/// Acting 위상이 싣는 구체 액션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActingKind {
    Raise,
    Call,
    Check,
    Fold,
    AllIn,
}

/// 표시 위상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// 차례 아님
    Waiting,
    /// 곧 차례
    Ready,
    /// 행동 차례 — 구체 액션 포함
    Acting(ActingKind),
}

impl Phase {
    /// Acting 위상 여부
    pub fn is_acting(&self) -> bool {
        matches!(self, Phase::Acting(_))
    }
}

/// 외부로 내보내는 표시 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    /// 현재 위상
    pub phase: Phase,
    /// 사용자에게 보여줄 라벨
    pub display: String,
    /// 마지막으로 확보한 유효 필드 — Waiting 전이에도 지워지지 않는다
    pub pinned_fields: HandFields,
}

impl UiState {
    /// 세션 시작 시 초기 상태
    pub fn initial() -> Self {
        Self {
            phase: Phase::Waiting,
            display: "Waiting".to_string(),
            pinned_fields: HandFields::default(),
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::initial()
    }
}
