//! 픽셀 신호 모델.
//!
//! 비전 감지기가 프레임마다 산출하는 "내 차례 컨트롤 보임" 신호.

use serde::{Deserialize, Serialize};

/// 픽셀 신호 신뢰도
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PixelConfidence {
    Low,
    Medium,
    High,
}

/// 프레임별 픽셀 감지 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSignal {
    /// 1차 컨트롤(차례를 단독으로 가리키는 버튼) 감지 여부
    pub primary_present: bool,
    /// 보조 컨트롤(방증용, 단독으로는 불충분) 감지 여부
    pub secondary_present: bool,
    /// 1차 서브밴드 색상 밀도 (진단용)
    pub density: f32,
    /// 신호 신뢰도
    pub confidence: PixelConfidence,
}

impl PixelSignal {
    /// 감지 결과로부터 신호 생성 (신뢰도는 두 불리언에서 유도)
    pub fn graded(primary_present: bool, secondary_present: bool, density: f32) -> Self {
        let confidence = match (primary_present, secondary_present) {
            (true, true) => PixelConfidence::High,
            (true, false) => PixelConfidence::Medium,
            _ => PixelConfidence::Low,
        };
        Self {
            primary_present,
            secondary_present,
            density,
            confidence,
        }
    }

    /// 기본(부재) 신호 — 퇴화 입력에도 실패 대신 이 값을 반환한다
    pub fn absent() -> Self {
        Self {
            primary_present: false,
            secondary_present: false,
            density: 0.0,
            confidence: PixelConfidence::Low,
        }
    }
}

impl Default for PixelSignal {
    fn default() -> Self {
        Self::absent()
    }
}
