//! 스크린 캡처.
//!
//! xcap 기반. 게임 클라이언트가 떠 있는 모니터 하나를 주기적으로 찍는다.

use image::RgbaImage;
use tracing::debug;
use xcap::Monitor;

use hunsu_core::error::CoreError;

/// 테이블 캡처 — 설정된 모니터를 프레임 소스로 쓴다
pub struct TableCapture {
    monitor_index: usize,
}

impl TableCapture {
    /// 새 캡처 인스턴스 생성
    pub fn new(monitor_index: usize) -> Self {
        Self { monitor_index }
    }

    /// 프레임 하나 캡처.
    ///
    /// 설정된 인덱스의 모니터가 없으면 주 모니터로 폴백한다.
    pub fn capture(&self) -> Result<RgbaImage, CoreError> {
        let monitors = Monitor::all()
            .map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))?;

        let monitor = monitors
            .into_iter()
            .nth(self.monitor_index)
            .or_else(|| {
                Monitor::all()
                    .ok()?
                    .into_iter()
                    .find(|m| m.is_primary().unwrap_or(false))
            })
            .ok_or_else(|| CoreError::Capture("사용할 모니터를 찾을 수 없음".to_string()))?;

        let frame = monitor
            .capture_image()
            .map_err(|e| CoreError::Capture(format!("스크린 캡처 실패: {e}")))?;

        debug!("프레임 캡처: {}x{}", frame.width(), frame.height());
        Ok(frame)
    }

    /// 사용 가능한 모니터 수
    pub fn monitor_count() -> Result<usize, CoreError> {
        Monitor::all()
            .map(|monitors| monitors.len())
            .map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))
    }
}
