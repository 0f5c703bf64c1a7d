//! 응답 분류기.
//!
//! 자유 텍스트 응답에서 액션 키워드를 탐지하고 닫힌 분류 체계로
//! 사상한다. 어떤 입력에도 실패하지 않는다 — 인식 불가 텍스트는
//! `Unrecognized`, 빈 입력은 `Waiting`으로 흡수된다.
//!
//! 탐지 우선순위 (후보 텍스트마다):
//! AllIn > Raise/Bet > Call > Check > Fold > Ready > Waiting > Skip.
//! 후보는 명시 액션 라벨 값(등장 순) → 첫 줄 → 전문 순으로 평가한다.

use hunsu_core::models::action::{ActionKind, ClassifiedResponse, HandFields};

use crate::fields::scan_fields;

/// 올인 표현
const ALL_IN_MARKERS: &[&str] = &["ALL IN", "ALL-IN", "ALLIN", "SHOVE", "JAM"];

/// "곧 차례" 표현
const READY_MARKERS: &[&str] = &[
    "YOUR TURN",
    "MY TURN",
    "ABOUT TO ACT",
    "TO ACT",
    "ACT NOW",
    "READY",
];

/// "차례 아님" 표현
const WAITING_MARKERS: &[&str] = &[
    "WAIT",
    "NOT MY TURN",
    "OPPONENT",
    "WATCHING",
    "IDLE",
    "NO ACTION",
];

/// "게임 화면 아님" 표현
const SKIP_MARKERS: &[&str] = &[
    "SKIP",
    "NOT A GAME",
    "NO GAME",
    "NO TABLE",
    "LOBBY",
    "MENU",
];

/// 근거 서술 안의 추천 동사
const RECOMMEND_MARKERS: &[&str] = &[
    "RECOMMEND",
    "BETTER TO",
    "BEST TO",
    "CORRECT PLAY IS",
    "SHOULD",
    "MUST",
];

/// 추천 동사 뒤에서 액션 키워드를 찾는 범위 (바이트)
const RECOMMEND_WINDOW: usize = 40;

/// 키워드 탐지 결과
#[derive(Debug, Clone, Copy)]
struct Detected {
    kind: ActionKind,
    /// 키워드 바로 뒤에서 읽어낸 금액 (Raise 계열만)
    inline_amount: Option<u64>,
}

/// 응답 텍스트 하나(완결 또는 누적 프리픽스)를 분류한다.
pub fn classify(text: &str) -> ClassifiedResponse {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ClassifiedResponse::bare(ActionKind::Waiting, "Waiting");
    }

    let mut scanned = scan_fields(text);
    // 라벨이 전혀 없으면 전문을 근거 서술로 취급한다
    if !scanned.any_label {
        scanned.fields.rationale = trimmed.to_string();
    }

    // 액션 탐지: 명시 액션 라벨 값 → 첫 줄 → 전문
    let mut detected: Option<Detected> = None;
    for value in &scanned.action_values {
        if let Some(found) = detect_action(value) {
            detected = Some(found);
            break;
        }
    }
    if detected.is_none() {
        detected = detect_action(trimmed.lines().next().unwrap_or(""));
    }
    if detected.is_none() {
        detected = detect_action(trimmed);
    }

    let (mut kind, inline_amount) = match detected {
        Some(found) => (found.kind, found.inline_amount),
        None => (ActionKind::Unrecognized, None),
    };

    // Waiting 응답의 예측 액션 승격 → Ready("predicted: ...")
    let mut predicted_display: Option<String> = None;
    if kind == ActionKind::Waiting && !scanned.fields.predicted_action.is_empty() {
        if let Some(predicted) = detect_action(&scanned.fields.predicted_action) {
            if predicted.kind.acting_kind().is_some() {
                let label = if predicted.kind == ActionKind::Raise {
                    let amount = trailing_number(&scanned.fields.predicted_raise_size)
                        .or(predicted.inline_amount)
                        .or_else(|| pot_fraction(&scanned.fields));
                    display_for(ActionKind::Raise, amount)
                } else {
                    display_for(predicted.kind, None)
                };
                kind = ActionKind::Ready;
                predicted_display = Some(format!("predicted: {label}"));
            }
        }
    }

    // 모순 조정 — 근거 서술의 명시 추천이 선언 액션을 이긴다.
    // 단 Fold 선언은 종결적이라 번복되지 않는다.
    if matches!(
        kind,
        ActionKind::Raise | ActionKind::Call | ActionKind::Check | ActionKind::AllIn
    ) {
        if let Some(recommended) = recommended_in_rationale(&scanned.fields.rationale) {
            if recommended != kind {
                kind = recommended;
            }
        }
    }

    // 일관성 검사 — 자문용. 분류는 바꾸지 않는다.
    check_hand_consistency(&mut scanned.fields);

    let display_text = match predicted_display {
        Some(display) => display,
        None => {
            let amount = if kind == ActionKind::Raise {
                resolve_raise_amount(&scanned.fields, inline_amount)
            } else {
                None
            };
            display_for(kind, amount)
        }
    };

    ClassifiedResponse {
        action_kind: kind,
        display_text,
        fields: scanned.fields,
    }
}

/// 후보 텍스트 하나에서 우선순위대로 키워드를 탐지한다.
fn detect_action(candidate: &str) -> Option<Detected> {
    let upper = candidate.to_ascii_uppercase();
    if upper.trim().is_empty() {
        return None;
    }

    if find_any(&upper, ALL_IN_MARKERS).is_some() {
        return Some(Detected {
            kind: ActionKind::AllIn,
            inline_amount: None,
        });
    }
    if let Some((pos, len)) = find_any(&upper, &["RAISE", "BET"]) {
        return Some(Detected {
            kind: ActionKind::Raise,
            inline_amount: number_after(&upper, pos + len),
        });
    }
    if find_any(&upper, &["CALL"]).is_some() {
        return Some(Detected {
            kind: ActionKind::Call,
            inline_amount: None,
        });
    }
    if find_any(&upper, &["CHECK"]).is_some() {
        return Some(Detected {
            kind: ActionKind::Check,
            inline_amount: None,
        });
    }
    if find_any(&upper, &["FOLD"]).is_some() {
        return Some(Detected {
            kind: ActionKind::Fold,
            inline_amount: None,
        });
    }
    if find_any(&upper, READY_MARKERS).is_some() {
        return Some(Detected {
            kind: ActionKind::Ready,
            inline_amount: None,
        });
    }
    if find_any(&upper, WAITING_MARKERS).is_some() {
        return Some(Detected {
            kind: ActionKind::Waiting,
            inline_amount: None,
        });
    }
    if find_any(&upper, SKIP_MARKERS).is_some() {
        return Some(Detected {
            kind: ActionKind::Skip,
            inline_amount: None,
        });
    }
    None
}

/// 여러 마커 중 가장 앞에서 나오는 것의 (위치, 길이)
fn find_any(upper: &str, markers: &[&str]) -> Option<(usize, usize)> {
    markers
        .iter()
        .filter_map(|marker| upper.find(marker).map(|pos| (pos, marker.len())))
        .min_by_key(|(pos, _)| *pos)
}

/// 키워드 직후의 금액 읽기 ("RAISE 120", "RAISE TO 120", "BET $80")
fn number_after(upper: &str, from: usize) -> Option<u64> {
    let bytes = upper.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'$' | b':' | b'=' => i += 1,
            b'T' if upper[i..].starts_with("TO ") => i += 3,
            _ => break,
        }
    }

    let mut value: u64 = 0;
    let mut any_digit = false;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_digit() {
            value = value.saturating_mul(10).saturating_add(u64::from(b - b'0'));
            any_digit = true;
            i += 1;
        } else if b == b',' && any_digit {
            i += 1;
        } else {
            break;
        }
    }
    any_digit.then_some(value)
}

/// 문자열 끝쪽의 숫자 ("120 chips" → 120)
fn trailing_number(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && !bytes[end - 1].is_ascii_digit() {
        end -= 1;
    }
    if end == 0 {
        return None;
    }
    let mut start = end;
    while start > 0 && (bytes[start - 1].is_ascii_digit() || bytes[start - 1] == b',') {
        start -= 1;
    }
    s[start..end]
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()
}

/// 문자열 앞쪽의 숫자 ("80 BB" → 80)
fn first_number(s: &str) -> Option<u64> {
    let upper = s.to_ascii_uppercase();
    let pos = upper.bytes().position(|b| b.is_ascii_digit())?;
    number_after(&upper, pos)
}

/// 팟 크기 필드로부터 2/3 팟 추정치
fn pot_fraction(fields: &HandFields) -> Option<u64> {
    first_number(&fields.pot).map(|pot| pot * 2 / 3)
}

/// 레이즈 금액 결정: 크기 필드 → 키워드 옆 숫자 → 2/3 팟 → 없음
fn resolve_raise_amount(fields: &HandFields, inline: Option<u64>) -> Option<u64> {
    trailing_number(&fields.raise_size)
        .or(inline)
        .or_else(|| pot_fraction(fields))
}

/// 표시 라벨 생성
fn display_for(kind: ActionKind, amount: Option<u64>) -> String {
    match kind {
        ActionKind::Fold => "Fold".to_string(),
        ActionKind::Raise => match amount {
            Some(amount) => format!("Raise {amount}"),
            None => "Raise".to_string(),
        },
        ActionKind::Call => "Call".to_string(),
        ActionKind::Check => "Check".to_string(),
        ActionKind::AllIn => "All In".to_string(),
        ActionKind::Ready => "Ready".to_string(),
        ActionKind::Waiting => "Waiting".to_string(),
        ActionKind::Skip => "Skip".to_string(),
        ActionKind::Unrecognized => "Unrecognized".to_string(),
    }
}

/// 근거 서술에서 명시 추천을 찾는다.
///
/// 추천 동사 직후 고정 범위 안의 가장 가까운 액션 키워드를 읽는다.
/// 부정형("should not fold")은 추천으로 보지 않는다.
fn recommended_in_rationale(rationale: &str) -> Option<ActionKind> {
    let upper = rationale.to_ascii_uppercase();
    for marker in RECOMMEND_MARKERS {
        let mut from = 0;
        while let Some(rel) = upper[from..].find(marker) {
            let window_start = from + rel + marker.len();
            from = window_start;

            let mut window_end = (window_start + RECOMMEND_WINDOW).min(upper.len());
            while !upper.is_char_boundary(window_end) {
                window_end -= 1;
            }
            let window = &upper[window_start..window_end];

            let lead = window.trim_start();
            if lead.starts_with("NOT ") || lead.starts_with("N'T ") || lead.starts_with("NEVER ") {
                continue;
            }
            if let Some(kind) = nearest_action_keyword(window) {
                return Some(kind);
            }
        }
    }
    None
}

/// 범위 안에서 위치가 가장 빠른 액션 키워드
fn nearest_action_keyword(window: &str) -> Option<ActionKind> {
    const KEYWORDS: &[(&str, ActionKind)] = &[
        ("ALL IN", ActionKind::AllIn),
        ("ALL-IN", ActionKind::AllIn),
        ("RAISE", ActionKind::Raise),
        ("BET", ActionKind::Raise),
        ("CALL", ActionKind::Call),
        ("CHECK", ActionKind::Check),
        ("FOLD", ActionKind::Fold),
    ];
    KEYWORDS
        .iter()
        .filter_map(|(keyword, kind)| window.find(keyword).map(|pos| (pos, *kind)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, kind)| kind)
}

/// 랭크 문자 → 수치 (2~14)
fn rank_value(c: char) -> Option<u8> {
    match c {
        'A' => Some(14),
        'K' => Some(13),
        'Q' => Some(12),
        'J' => Some(11),
        'T' => Some(10),
        '2'..='9' => Some(c as u8 - b'0'),
        _ => None,
    }
}

/// 카드 문자열에서 랭크만 추출 ("Ah Kd" → [14, 13])
fn parse_ranks(cards: &str) -> Vec<u8> {
    let upper = cards.to_ascii_uppercase();
    let mut out = Vec::new();
    let mut chars = upper.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '1' {
            if chars.peek() == Some(&'0') {
                chars.next();
                out.push(10);
            }
            continue;
        }
        if let Some(value) = rank_value(c) {
            out.push(value);
        }
    }
    out
}

/// 핸드 강도 주장 교차 검증.
///
/// 근거 서술이 톱페어를 주장하면 홀/보드 랭크와 대조하고,
/// 불일치 시 신뢰도 필드를 낮추고 소견을 남긴다.
fn check_hand_consistency(fields: &mut HandFields) {
    if !fields.rationale.to_ascii_uppercase().contains("TOP PAIR") {
        return;
    }
    let hand = parse_ranks(&fields.hand);
    let board = parse_ranks(&fields.board);
    if hand.is_empty() || board.is_empty() {
        return;
    }
    let top = board.iter().copied().max().unwrap_or(0);
    if !hand.contains(&top) {
        fields.confidence = "low".to_string();
        fields.issue = "top pair claim does not match board".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_raise_with_amount() {
        let resp = classify("ACTION: RAISE 120\nPOT: 80\nHAND: Ah Kd");
        assert_eq!(resp.action_kind, ActionKind::Raise);
        assert_eq!(resp.display_text, "Raise 120");
        assert_eq!(resp.fields.pot, "80");
        assert_eq!(resp.fields.hand, "Ah Kd");
    }

    #[test]
    fn empty_input_is_waiting() {
        let resp = classify("   \n  ");
        assert_eq!(resp.action_kind, ActionKind::Waiting);
        assert_eq!(resp.display_text, "Waiting");
        assert!(resp.fields.is_empty());
    }

    #[test]
    fn no_labels_whole_text_is_rationale() {
        let resp = classify("screen shows something unrelated");
        assert_eq!(resp.action_kind, ActionKind::Unrecognized);
        assert_eq!(resp.fields.rationale, "screen shows something unrelated");
    }

    #[test]
    fn all_in_beats_raise_in_same_line() {
        let resp = classify("ACTION: RAISE ALL IN");
        assert_eq!(resp.action_kind, ActionKind::AllIn);
        assert_eq!(resp.display_text, "All In");
    }

    #[test]
    fn raise_size_field_has_priority() {
        let resp = classify("ACTION: RAISE 100\nRAISE SIZE: 150");
        assert_eq!(resp.display_text, "Raise 150");
    }

    #[test]
    fn raise_amount_from_keyword() {
        let resp = classify("ACTION: RAISE TO 240");
        assert_eq!(resp.display_text, "Raise 240");
    }

    #[test]
    fn raise_estimated_from_pot() {
        // 명시 금액이 없으면 2/3 팟
        let resp = classify("ACTION: RAISE\nPOT: 90");
        assert_eq!(resp.display_text, "Raise 60");
    }

    #[test]
    fn raise_without_any_amount() {
        let resp = classify("ACTION: RAISE");
        assert_eq!(resp.display_text, "Raise");
    }

    #[test]
    fn waiting_with_predicted_action_becomes_ready() {
        let resp = classify("ACTION: WAITING\nPREDICTED ACTION: RAISE\nPOT: 90");
        assert_eq!(resp.action_kind, ActionKind::Ready);
        assert_eq!(resp.display_text, "predicted: Raise 60");
        // 필드는 그대로 유지
        assert_eq!(resp.fields.pot, "90");
    }

    #[test]
    fn predicted_raise_size_field_used() {
        let resp =
            classify("ACTION: WAITING\nPREDICTED ACTION: RAISE\nPREDICTED RAISE SIZE: 75");
        assert_eq!(resp.action_kind, ActionKind::Ready);
        assert_eq!(resp.display_text, "predicted: Raise 75");
    }

    #[test]
    fn predicted_waiting_is_not_promoted() {
        let resp = classify("ACTION: WAITING\nPREDICTED ACTION: WAITING");
        assert_eq!(resp.action_kind, ActionKind::Waiting);
    }

    #[test]
    fn rationale_recommendation_overrides_declared_action() {
        let resp = classify("ACTION: RAISE 100\nRATIONALE: the kicker is weak, we should fold here");
        assert_eq!(resp.action_kind, ActionKind::Fold);
        assert_eq!(resp.display_text, "Fold");
    }

    #[test]
    fn fold_is_never_overridden() {
        let resp = classify("ACTION: FOLD\nRATIONALE: we should raise for value");
        assert_eq!(resp.action_kind, ActionKind::Fold);
        assert_eq!(resp.display_text, "Fold");
    }

    #[test]
    fn negated_recommendation_is_ignored() {
        let resp = classify("ACTION: CALL\nRATIONALE: we should not fold here");
        assert_eq!(resp.action_kind, ActionKind::Call);
    }

    #[test]
    fn consistency_check_downgrades_confidence() {
        let resp = classify(
            "ACTION: CALL\nHAND: Ah 5d\nBOARD: Kc 9h 2s\nRATIONALE: we hold top pair so calling is fine",
        );
        assert_eq!(resp.action_kind, ActionKind::Call);
        assert_eq!(resp.fields.confidence, "low");
        assert!(!resp.fields.issue.is_empty());
    }

    #[test]
    fn consistency_check_passes_on_real_top_pair() {
        let resp = classify(
            "ACTION: CALL\nHAND: Kh 8d\nBOARD: Kc 9h 2s\nRATIONALE: we hold top pair so calling is fine",
        );
        assert!(resp.fields.confidence.is_empty());
        assert!(resp.fields.issue.is_empty());
    }

    #[test]
    fn skip_scene_detection() {
        let resp = classify("SKIP: not a poker table, lobby screen visible");
        // 라벨 없는 텍스트 — 전문 스캔에서 Skip 마커 적중
        assert_eq!(resp.action_kind, ActionKind::Skip);
    }

    #[test]
    fn waiting_detection() {
        let resp = classify("ACTION: WAITING\nRATIONALE: opponent is thinking");
        assert_eq!(resp.action_kind, ActionKind::Waiting);
        assert_eq!(resp.display_text, "Waiting");
    }

    #[test]
    fn ready_turn_language() {
        let resp = classify("It is your turn now");
        assert_eq!(resp.action_kind, ActionKind::Ready);
    }

    #[test]
    fn unrecognized_action_value_falls_through() {
        // 액션 라벨 값이 무의미하면 첫 줄/전문 스캔으로 넘어간다
        let resp = classify("ACTION: banana\nRATIONALE: nothing useful");
        assert_eq!(resp.action_kind, ActionKind::Unrecognized);
    }

    #[test]
    fn comma_separated_amount() {
        let resp = classify("ACTION: RAISE 1,200");
        assert_eq!(resp.display_text, "Raise 1200");
    }

    #[test]
    fn number_helpers() {
        assert_eq!(trailing_number("150 chips"), Some(150));
        assert_eq!(trailing_number("bet 2,500"), Some(2500));
        assert_eq!(trailing_number("no number"), None);
        assert_eq!(first_number("80 BB"), Some(80));
        assert_eq!(first_number("pot"), None);
    }
}
