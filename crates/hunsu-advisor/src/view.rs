//! 오버레이 뷰.
//!
//! `UiState` → 표시용 데이터 변환. 헤드라인은 엔진이 만든 라벨
//! 그대로, 상세 줄은 고정 필드에서 구성한다.

use hunsu_core::models::ui::{Phase, UiState};

/// 표시용 오버레이 데이터
#[derive(Debug, Clone)]
pub struct OverlayView {
    /// 헤드라인 (엔진 표시 라벨)
    pub headline: String,
    /// 위상 라벨
    pub phase_label: String,
    /// 위상 강조 색상 (#RRGGBB)
    pub accent_color: String,
    /// 고정 필드 상세 줄
    pub detail_lines: Vec<String>,
    /// 행동 차례 여부 (오버레이 강조 스위치)
    pub is_acting: bool,
}

/// UiState → OverlayView 변환
pub fn present(state: &UiState) -> OverlayView {
    OverlayView {
        headline: state.display.clone(),
        phase_label: phase_to_label(&state.phase),
        accent_color: phase_to_color(&state.phase),
        detail_lines: detail_lines(state),
        is_acting: state.phase.is_acting(),
    }
}

fn phase_to_label(phase: &Phase) -> String {
    match phase {
        Phase::Waiting => "대기".to_string(),
        Phase::Ready => "준비".to_string(),
        Phase::Acting(_) => "행동".to_string(),
    }
}

fn phase_to_color(phase: &Phase) -> String {
    match phase {
        Phase::Waiting => "#6B7280".to_string(),   // gray-500
        Phase::Ready => "#F97316".to_string(),     // orange-500
        Phase::Acting(_) => "#EF4444".to_string(), // red-500
    }
}

fn detail_lines(state: &UiState) -> Vec<String> {
    let fields = &state.pinned_fields;
    let mut lines = Vec::new();
    if !fields.hand.is_empty() {
        lines.push(format!("핸드: {}", fields.hand));
    }
    if !fields.board.is_empty() {
        lines.push(format!("보드: {}", fields.board));
    }
    if !fields.pot.is_empty() {
        lines.push(format!("팟: {}", fields.pot));
    }
    if !fields.amount_to_call.is_empty() {
        lines.push(format!("콜 금액: {}", fields.amount_to_call));
    }
    if !fields.pot_odds.is_empty() {
        lines.push(format!("팟 오즈: {}", fields.pot_odds));
    }
    if !fields.rationale.is_empty() {
        lines.push(format!("근거: {}", fields.rationale));
    }
    if !fields.issue.is_empty() {
        lines.push(format!("소견: {}", fields.issue));
    }
    lines
}
