//! 라벨 필드 스캐너.
//!
//! 정규식 없이 명시적 경계 탐색으로 라벨 값을 추출한다.
//! 알려진 라벨을 길이 내림차순으로 정렬해 두고, 각 값의 끝을
//! 다음 인식 라벨의 시작으로 잡는다 — 개행이 생략된 텍스트에서
//! 인접 필드가 서로 번지는 것을 막는다.

use hunsu_core::models::action::HandFields;
use once_cell::sync::Lazy;

/// 인식하는 필드 키
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Action,
    Hand,
    Board,
    Stage,
    Position,
    Pot,
    AmountToCall,
    PotOdds,
    StackToPotRatio,
    Rationale,
    RaiseSize,
    PredictedAction,
    PredictedRaiseSize,
    Confidence,
}

impl FieldKey {
    const ALL: [FieldKey; 14] = [
        FieldKey::Action,
        FieldKey::Hand,
        FieldKey::Board,
        FieldKey::Stage,
        FieldKey::Position,
        FieldKey::Pot,
        FieldKey::AmountToCall,
        FieldKey::PotOdds,
        FieldKey::StackToPotRatio,
        FieldKey::Rationale,
        FieldKey::RaiseSize,
        FieldKey::PredictedAction,
        FieldKey::PredictedRaiseSize,
        FieldKey::Confidence,
    ];

    /// 라벨 별칭 (대문자). 모델 응답 포맷의 변형을 흡수한다.
    fn labels(&self) -> &'static [&'static str] {
        match self {
            FieldKey::Action => &["ACTION", "DECISION", "MOVE"],
            FieldKey::Hand => &["HAND", "HOLE CARDS"],
            FieldKey::Board => &["BOARD", "COMMUNITY CARDS"],
            FieldKey::Stage => &["STAGE", "STREET"],
            FieldKey::Position => &["POSITION"],
            FieldKey::Pot => &["POT", "POT SIZE"],
            FieldKey::AmountToCall => &["AMOUNT TO CALL", "TO CALL", "TO_CALL"],
            FieldKey::PotOdds => &["POT ODDS", "POT_ODDS"],
            FieldKey::StackToPotRatio => &["STACK TO POT RATIO", "SPR"],
            FieldKey::Rationale => &["RATIONALE", "REASONING", "REASON", "ANALYSIS", "WHY"],
            FieldKey::RaiseSize => &["RAISE SIZE", "RAISE_SIZE", "BET SIZE"],
            FieldKey::PredictedAction => &["PREDICTED ACTION", "PREDICTED_ACTION", "NEXT ACTION"],
            FieldKey::PredictedRaiseSize => &[
                "PREDICTED RAISE SIZE",
                "PREDICTED_RAISE_SIZE",
                "PREDICTED RAISE",
            ],
            FieldKey::Confidence => &["CONFIDENCE"],
        }
    }
}

/// (라벨, 키) 테이블 — 라벨 길이 내림차순
static LABEL_TABLE: Lazy<Vec<(&'static str, FieldKey)>> = Lazy::new(|| {
    let mut table: Vec<(&'static str, FieldKey)> = FieldKey::ALL
        .iter()
        .flat_map(|key| key.labels().iter().map(move |label| (*label, *key)))
        .collect();
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
});

/// 라벨 적중 위치
#[derive(Debug, Clone, Copy)]
struct LabelHit {
    /// 라벨 시작 오프셋
    start: usize,
    /// 값 시작 오프셋 (구분자 뒤)
    value_start: usize,
    /// 라벨 테이블 인덱스
    label_idx: usize,
}

/// 주어진 라벨 집합으로 텍스트를 스캔해 (라벨 인덱스, 값) 목록을 돌려준다.
///
/// 라벨은 대소문자를 무시하고, 뒤따르는 `:` 구분자가 있어야 적중이다.
/// 값은 구분자 직후부터 다음 인식 라벨 직전(또는 텍스트 끝)까지.
/// 겹치는 적중은 더 긴 라벨이 이긴다.
pub fn scan_labels(text: &str, labels: &[&str]) -> Vec<(usize, String)> {
    let upper = text.to_ascii_uppercase();
    let bytes = upper.as_bytes();

    let mut hits: Vec<LabelHit> = Vec::new();
    for (label_idx, label) in labels.iter().enumerate() {
        let needle = label.to_ascii_uppercase();
        if needle.is_empty() {
            continue;
        }
        let mut from = 0;
        while let Some(rel) = upper[from..].find(&needle) {
            let start = from + rel;
            from = start + 1;

            // 라벨 앞은 행 시작 또는 비단어 문자
            if start > 0 {
                let prev = bytes[start - 1];
                if prev.is_ascii_alphanumeric() || prev == b'_' {
                    continue;
                }
            }

            // 라벨 뒤는 공백(선택) + ':' 구분자
            let mut after = start + needle.len();
            while after < bytes.len() && bytes[after] == b' ' {
                after += 1;
            }
            if after >= bytes.len() || bytes[after] != b':' {
                continue;
            }

            hits.push(LabelHit {
                start,
                value_start: after + 1,
                label_idx,
            });
        }
    }

    // 시작 위치 오름차순, 같은 자리면 긴 라벨 우선
    hits.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| (b.value_start - b.start).cmp(&(a.value_start - a.start)))
    });

    // 앞선 라벨 스팬과 겹치는 적중 제거 ("PREDICTED ACTION" 속의 "ACTION")
    let mut kept: Vec<LabelHit> = Vec::new();
    for hit in hits {
        if let Some(prev) = kept.last() {
            if hit.start < prev.value_start {
                continue;
            }
        }
        kept.push(hit);
    }

    // 값 경계: 다음 인식 라벨 시작 직전 또는 텍스트 끝
    let mut out = Vec::with_capacity(kept.len());
    for (i, hit) in kept.iter().enumerate() {
        let end = kept.get(i + 1).map_or(text.len(), |next| next.start);
        let value = text[hit.value_start..end].trim().to_string();
        out.push((hit.label_idx, value));
    }
    out
}

/// 도메인 필드 스캔 결과
#[derive(Debug, Clone, Default)]
pub struct ScannedFields {
    /// 추출된 라벨 필드
    pub fields: HandFields,
    /// 명시 액션 라벨 값 목록 (등장 순)
    pub action_values: Vec<String>,
    /// 라벨이 하나라도 인식되었는지
    pub any_label: bool,
}

/// 응답 텍스트에서 알려진 필드를 전부 추출한다.
///
/// 같은 필드가 여러 번 나오면 첫 값을 유지한다. 액션 라벨만은
/// 모든 등장 값을 순서대로 모은다 (분류기가 줄 단위로 평가).
pub fn scan_fields(text: &str) -> ScannedFields {
    let labels: Vec<&str> = LABEL_TABLE.iter().map(|(label, _)| *label).collect();
    let hits = scan_labels(text, &labels);

    let mut scanned = ScannedFields {
        any_label: !hits.is_empty(),
        ..ScannedFields::default()
    };

    for (label_idx, value) in hits {
        let (_, key) = LABEL_TABLE[label_idx];
        if key == FieldKey::Action {
            scanned.action_values.push(value);
            continue;
        }
        if value.is_empty() {
            continue;
        }
        if let Some(slot) = field_slot(&mut scanned.fields, key) {
            if slot.is_empty() {
                *slot = value;
            }
        }
    }
    scanned
}

/// 키 → `HandFields` 슬롯 매핑 (Action은 필드가 아니다)
fn field_slot(fields: &mut HandFields, key: FieldKey) -> Option<&mut String> {
    Some(match key {
        FieldKey::Hand => &mut fields.hand,
        FieldKey::Board => &mut fields.board,
        FieldKey::Stage => &mut fields.stage,
        FieldKey::Position => &mut fields.position,
        FieldKey::Pot => &mut fields.pot,
        FieldKey::AmountToCall => &mut fields.amount_to_call,
        FieldKey::PotOdds => &mut fields.pot_odds,
        FieldKey::StackToPotRatio => &mut fields.stack_to_pot_ratio,
        FieldKey::Rationale => &mut fields.rationale,
        FieldKey::RaiseSize => &mut fields.raise_size,
        FieldKey::PredictedAction => &mut fields.predicted_action,
        FieldKey::PredictedRaiseSize => &mut fields.predicted_raise_size,
        FieldKey::Confidence => &mut fields.confidence,
        FieldKey::Action => return None,
    })
}
