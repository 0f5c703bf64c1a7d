//! 콘솔 프레젠터.
//!
//! `OverlayPresenter` 포트 구현. 전이마다 오버레이 뷰를 터미널에 찍는다.

use async_trait::async_trait;
use tracing::info;

use hunsu_advisor::view;
use hunsu_core::error::CoreError;
use hunsu_core::models::ui::UiState;
use hunsu_core::ports::presenter::OverlayPresenter;

/// 콘솔 프레젠터 — GUI 셸 없이 표시 상태를 보여주는 기본 구현
pub struct ConsolePresenter;

impl ConsolePresenter {
    /// 새 프레젠터 생성
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OverlayPresenter for ConsolePresenter {
    async fn present(&self, state: &UiState) -> Result<(), CoreError> {
        let view = view::present(state);

        if view.is_acting {
            println!("▶ [{}] {}", view.phase_label, view.headline);
        } else {
            println!("  [{}] {}", view.phase_label, view.headline);
        }
        for line in &view.detail_lines {
            println!("    {line}");
        }

        info!("표시 갱신: {}", view.headline);
        Ok(())
    }
}
