//! 차례 신호 감지기.
//!
//! 프레임 하단 밴드만 검사한다. 밴드는 좌/우로 갈라 좌측에서
//! 1차 컨트롤(붉은 액션 버튼), 우측에서 보조 컨트롤(황색 버튼)을
//! 찾는다 — 카드 무늬나 장식 아이콘이 있는 영역을 배제하기 위해서다.
//!
//! 1차 컨트롤은 두 게이트를 모두 통과해야 한다:
//! 1. 전체 밀도 게이트 — 서브밴드 내 1차 색 샘플 비율
//! 2. 군집 게이트 — 격자 셀 중 연속 2×2 블록이 전부 국소 임계값 초과.
//!    고립된 작은 붉은 영역(카드 수트 글리프)이 전체 밀도만으로
//!    통과하는 것을 막는다.

use image::RgbaImage;
use tracing::debug;

use hunsu_core::config::VisionConfig;
use hunsu_core::models::signal::PixelSignal;

/// 차례 신호 감지기 — 프레임의 순수 함수, 재진입 가능
pub struct TurnSignalDetector {
    cfg: VisionConfig,
}

impl TurnSignalDetector {
    /// 새 감지기 생성
    pub fn new(cfg: VisionConfig) -> Self {
        Self { cfg }
    }

    /// 프레임 하나를 감지한다.
    ///
    /// 퇴화 입력(0 크기)은 실패 대신 기본 부재 신호를 돌려준다.
    pub fn detect(&self, frame: &RgbaImage) -> PixelSignal {
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 {
            return PixelSignal::absent();
        }

        let band_h = ((h as f32 * self.cfg.band_ratio) as u32).clamp(1, h);
        let band_y0 = h - band_h;
        let split_x = ((w as f32 * self.cfg.primary_split) as u32).min(w);
        let step = self.cfg.sample_step.max(1) as usize;

        let raw = frame.as_raw();
        let stride = w as usize * 4;

        // 1차 서브밴드 (좌측): 밀도 + 격자 셀 카운트
        let grid_cols = self.cfg.grid_cols.max(1) as usize;
        let grid_rows = self.cfg.grid_rows.max(1) as usize;
        let mut cell_hits = vec![0u32; grid_cols * grid_rows];
        let mut cell_samples = vec![0u32; grid_cols * grid_rows];
        let mut primary_hits = 0u32;
        let mut primary_samples = 0u32;

        for y in (band_y0..h).step_by(step) {
            let row = y as usize * stride;
            for x in (0..split_x).step_by(step) {
                let off = row + x as usize * 4;
                let (r, g, b) = (raw[off], raw[off + 1], raw[off + 2]);

                primary_samples += 1;
                let cx = (x as u64 * grid_cols as u64 / u64::from(split_x.max(1))) as usize;
                let cy = (u64::from(y - band_y0) * grid_rows as u64 / u64::from(band_h)) as usize;
                let idx = cy.min(grid_rows - 1) * grid_cols + cx.min(grid_cols - 1);
                cell_samples[idx] += 1;

                if is_primary_colored(r, g, b) {
                    primary_hits += 1;
                    cell_hits[idx] += 1;
                }
            }
        }

        let density = if primary_samples == 0 {
            0.0
        } else {
            primary_hits as f32 / primary_samples as f32
        };
        let density_gate = density > self.cfg.primary_density_threshold;
        let primary_present = density_gate
            && self.has_dense_cluster(&cell_hits, &cell_samples, grid_cols, grid_rows);

        // 보조 서브밴드 (우측): 밀도 게이트만 — 방증용이라 문턱이 낮다
        let mut secondary_hits = 0u32;
        let mut secondary_samples = 0u32;
        for y in (band_y0..h).step_by(step) {
            let row = y as usize * stride;
            for x in (split_x..w).step_by(step) {
                let off = row + x as usize * 4;
                let (r, g, b) = (raw[off], raw[off + 1], raw[off + 2]);
                secondary_samples += 1;
                if is_secondary_colored(r, g, b) {
                    secondary_hits += 1;
                }
            }
        }
        let secondary_density = if secondary_samples == 0 {
            0.0
        } else {
            secondary_hits as f32 / secondary_samples as f32
        };
        let secondary_present = secondary_density > self.cfg.secondary_density_threshold;

        debug!(
            "픽셀 신호: primary={} (밀도 {:.3}), secondary={} (밀도 {:.3})",
            primary_present, density, secondary_present, secondary_density
        );

        PixelSignal::graded(primary_present, secondary_present, density)
    }

    /// 연속 2×2 셀 블록이 전부 국소 임계값을 넘는지
    fn has_dense_cluster(
        &self,
        hits: &[u32],
        samples: &[u32],
        cols: usize,
        rows: usize,
    ) -> bool {
        let dense = |idx: usize| {
            samples[idx] > 0 && hits[idx] as f32 / samples[idx] as f32 > self.cfg.cell_density_threshold
        };

        // 격자가 2×2보다 작으면 블록 요건을 적용할 수 없다 — 단일 셀로 판정
        if cols < 2 || rows < 2 {
            return (0..hits.len()).any(dense);
        }

        for cy in 0..rows - 1 {
            for cx in 0..cols - 1 {
                let idx = cy * cols + cx;
                if dense(idx) && dense(idx + 1) && dense(idx + cols) && dense(idx + cols + 1) {
                    return true;
                }
            }
        }
        false
    }
}

/// 1차 컨트롤(붉은 액션 버튼) 색 판정 — 고정 채널 임계값
fn is_primary_colored(r: u8, g: u8, b: u8) -> bool {
    r >= 180 && g <= 90 && b <= 90
}

/// 보조 컨트롤(황색 버튼) 색 판정
fn is_secondary_colored(r: u8, g: u8, b: u8) -> bool {
    r >= 170 && g >= 130 && b <= 110
}

#[cfg(test)]
mod tests {
    use super::*;
    use hunsu_core::models::signal::PixelConfidence;
    use image::Rgba;

    const W: u32 = 640;
    const H: u32 = 400;

    /// 기본 설정: 밴드 y 300..400, 1차 서브밴드 x 0..320
    fn detector() -> TurnSignalDetector {
        TurnSignalDetector::new(VisionConfig::default())
    }

    fn blank_frame() -> RgbaImage {
        RgbaImage::from_pixel(W, H, Rgba([30, 60, 30, 255]))
    }

    fn fill_rect(frame: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: [u8; 4]) {
        for y in y0..y1 {
            for x in x0..x1 {
                frame.put_pixel(x, y, Rgba(color));
            }
        }
    }

    #[test]
    fn solid_button_passes_both_gates() {
        let mut frame = blank_frame();
        // 좌측 하단 밴드에 붉은 버튼
        fill_rect(&mut frame, 40, 310, 200, 390, [220, 40, 40, 255]);

        let signal = detector().detect(&frame);
        assert!(signal.primary_present);
        assert!(!signal.secondary_present);
        assert_eq!(signal.confidence, PixelConfidence::Medium);
        assert!(signal.density > 0.1);
    }

    #[test]
    fn secondary_control_raises_confidence_to_high() {
        let mut frame = blank_frame();
        fill_rect(&mut frame, 40, 310, 200, 390, [220, 40, 40, 255]);
        // 우측 서브밴드에 황색 보조 버튼
        fill_rect(&mut frame, 400, 310, 560, 390, [230, 170, 60, 255]);

        let signal = detector().detect(&frame);
        assert!(signal.primary_present);
        assert!(signal.secondary_present);
        assert_eq!(signal.confidence, PixelConfidence::High);
    }

    #[test]
    fn secondary_alone_is_not_primary() {
        let mut frame = blank_frame();
        fill_rect(&mut frame, 400, 310, 560, 390, [230, 170, 60, 255]);

        let signal = detector().detect(&frame);
        assert!(!signal.primary_present);
        assert!(signal.secondary_present);
        assert_eq!(signal.confidence, PixelConfidence::Low);
    }

    #[test]
    fn scattered_speckle_fails_cluster_gate() {
        let mut frame = blank_frame();
        // 샘플 격자 위에 붉은 점을 대각선으로 흩뿌린다: 전체 밀도는
        // 1/16 ≈ 0.0625로 밀도 게이트를 넘지만 어느 셀도 국소
        // 임계값(0.12)을 못 넘는다
        for y in (300..H).step_by(4) {
            for x in (0..320u32).step_by(4) {
                if (x / 4 + y / 4) % 16 == 0 {
                    frame.put_pixel(x, y, Rgba([220, 40, 40, 255]));
                }
            }
        }

        let signal = detector().detect(&frame);
        assert!(signal.density > VisionConfig::default().primary_density_threshold);
        assert!(!signal.primary_present);
    }

    #[test]
    fn red_outside_band_is_ignored() {
        let mut frame = blank_frame();
        // 밴드 위쪽(카드 영역)의 붉은 덩어리는 보지 않는다
        fill_rect(&mut frame, 40, 100, 200, 200, [220, 40, 40, 255]);

        let signal = detector().detect(&frame);
        assert!(!signal.primary_present);
        assert_eq!(signal.density, 0.0);
    }

    #[test]
    fn red_in_secondary_subband_is_ignored() {
        let mut frame = blank_frame();
        // 우측 서브밴드의 붉은 덩어리는 1차 판정에 들어가지 않고,
        // 보조 색 규칙(황색)도 만족하지 않는다
        fill_rect(&mut frame, 400, 310, 560, 390, [220, 40, 40, 255]);

        let signal = detector().detect(&frame);
        assert!(!signal.primary_present);
        assert!(!signal.secondary_present);
    }

    #[test]
    fn degenerate_frame_yields_absent_signal() {
        let empty = RgbaImage::new(0, 0);
        let signal = detector().detect(&empty);
        assert_eq!(signal, PixelSignal::absent());
    }

    #[test]
    fn tiny_frame_does_not_panic() {
        let tiny = RgbaImage::from_pixel(3, 3, Rgba([220, 40, 40, 255]));
        let signal = detector().detect(&tiny);
        // 3×3 전체가 붉어도 신호는 유효한 값이어야 한다
        assert!(signal.density >= 0.0);
    }
}
