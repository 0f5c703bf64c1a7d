//! 애플리케이션 설정 구조체.
//!
//! 서버 URL, 샘플링 주기, 비전 감지 임계값, 엔진 히스테리시스 상수 등
//! 런타임 설정을 정의한다. 임계값은 전부 튜닝 가능한 설정값이며
//! 기본값은 실측으로 맞춘 최신 변형을 따른다.

use serde::{Deserialize, Serialize};

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 연결 설정
    pub server: ServerConfig,
    /// 세션(프레임 샘플링) 설정
    pub session: SessionConfig,
    /// 비전(픽셀 신호 감지) 설정
    pub vision: VisionConfig,
    /// 판단 엔진 설정
    pub engine: EngineConfig,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            vision: VisionConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 서버 설정
// ============================================================

/// 응답 수신 전송 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    /// HTTP POST 업로드 + SSE 스트림 수신
    #[default]
    Sse,
    /// WebSocket 양방향 단일 소켓
    WebSocket,
}

/// 서버 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 서버 기본 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 응답 수신 전송 방식
    #[serde(default)]
    pub transport: TransportMode,
    /// API 토큰 (빈 문자열이면 미인증)
    #[serde(default)]
    pub api_token: String,
    /// 재연결 backoff 상한 (초)
    #[serde(default = "default_max_retry_secs")]
    pub max_retry_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            transport: TransportMode::default(),
            api_token: String::new(),
            max_retry_secs: default_max_retry_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_max_retry_secs() -> u64 {
    30
}

// ============================================================
// 세션 설정
// ============================================================

/// 세션(프레임 샘플링) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 프레임 샘플링 주기 (밀리초)
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// 캡처할 모니터 인덱스
    #[serde(default)]
    pub monitor_index: usize,
    /// 프레임 서버 업로드 활성화 (false면 로컬 감지만 수행)
    #[serde(default = "default_true")]
    pub upload_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            monitor_index: 0,
            upload_enabled: true,
        }
    }
}

fn default_sample_interval_ms() -> u64 {
    1_000
}

// ============================================================
// 비전 설정
// ============================================================

/// 비전(픽셀 신호 감지) 설정
///
/// 감지는 프레임 하단 밴드에서만 수행한다. 밴드는 좌/우로 나뉘어
/// 좌측이 1차 컨트롤, 우측이 보조 컨트롤 담당이다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// 하단 밴드 높이 비율 (프레임 높이 대비)
    #[serde(default = "default_band_ratio")]
    pub band_ratio: f32,
    /// 1차/보조 서브밴드 분할 비율 (좌측이 1차)
    #[serde(default = "default_primary_split")]
    pub primary_split: f32,
    /// 픽셀 샘플링 간격 (픽셀)
    #[serde(default = "default_sample_step")]
    pub sample_step: u32,
    /// 1차 컨트롤 전체 밀도 임계값
    #[serde(default = "default_primary_density_threshold")]
    pub primary_density_threshold: f32,
    /// 군집 격자 셀 밀도 임계값 (전체 임계값보다 낮음)
    #[serde(default = "default_cell_density_threshold")]
    pub cell_density_threshold: f32,
    /// 군집 격자 가로 셀 수
    #[serde(default = "default_grid_cols")]
    pub grid_cols: u32,
    /// 군집 격자 세로 셀 수
    #[serde(default = "default_grid_rows")]
    pub grid_rows: u32,
    /// 보조 컨트롤 밀도 임계값
    #[serde(default = "default_secondary_density_threshold")]
    pub secondary_density_threshold: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            band_ratio: default_band_ratio(),
            primary_split: default_primary_split(),
            sample_step: default_sample_step(),
            primary_density_threshold: default_primary_density_threshold(),
            cell_density_threshold: default_cell_density_threshold(),
            grid_cols: default_grid_cols(),
            grid_rows: default_grid_rows(),
            secondary_density_threshold: default_secondary_density_threshold(),
        }
    }
}

fn default_band_ratio() -> f32 {
    0.25
}

fn default_primary_split() -> f32 {
    0.5
}

fn default_sample_step() -> u32 {
    4
}

fn default_primary_density_threshold() -> f32 {
    0.04
}

fn default_cell_density_threshold() -> f32 {
    0.12
}

fn default_grid_cols() -> u32 {
    8
}

fn default_grid_rows() -> u32 {
    4
}

fn default_secondary_density_threshold() -> f32 {
    0.05
}

// ============================================================
// 엔진 설정
// ============================================================

/// 판단 엔진 설정 — 히스테리시스/확인 카운트 상수
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Acting 진입 후 이탈 억제 시간창 (밀리초)
    #[serde(default = "default_flicker_window_ms")]
    pub flicker_window_ms: u64,
    /// Acting 이탈에 필요한 연속 waiting 분류 수
    #[serde(default = "default_waiting_confirmations")]
    pub waiting_confirmations: u32,
    /// Acting 진입 확인 수 (픽셀 신뢰도 High/Medium)
    #[serde(default = "default_acting_confirmations")]
    pub acting_confirmations: u32,
    /// Acting 진입 확인 수 (픽셀 신뢰도 Low)
    #[serde(default = "default_acting_confirmations_low")]
    pub acting_confirmations_low: u32,
    /// 픽셀 모순 탈출 임계값 (연속 모순 수)
    #[serde(default = "default_pixel_override_escape")]
    pub pixel_override_escape: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flicker_window_ms: default_flicker_window_ms(),
            waiting_confirmations: default_waiting_confirmations(),
            acting_confirmations: default_acting_confirmations(),
            acting_confirmations_low: default_acting_confirmations_low(),
            pixel_override_escape: default_pixel_override_escape(),
        }
    }
}

fn default_flicker_window_ms() -> u64 {
    3_000
}

fn default_waiting_confirmations() -> u32 {
    2
}

fn default_acting_confirmations() -> u32 {
    1
}

fn default_acting_confirmations_low() -> u32 {
    2
}

fn default_pixel_override_escape() -> u32 {
    5
}

fn default_true() -> bool {
    true
}
