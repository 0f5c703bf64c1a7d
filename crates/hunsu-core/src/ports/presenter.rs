//! 표시 상태 출력 포트.
//!
//! 구현: `hunsu-app`의 콘솔 프레젠터. GUI 셸은 범위 밖이다.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::ui::UiState;

/// 오버레이 프레젠터 — `UiState` 스냅샷을 사용자에게 표시
#[async_trait]
pub trait OverlayPresenter: Send + Sync {
    /// 새 표시 상태 출력
    async fn present(&self, state: &UiState) -> Result<(), CoreError>;
}
