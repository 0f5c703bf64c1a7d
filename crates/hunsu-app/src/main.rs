//! HUNSU 클라이언트 진입점.
//!
//! 구성 요소 배선과 라이프사이클:
//! 캡처 틱 → 감지 → 픽셀 이벤트 + 프레임 업로드,
//! 응답 스트림 → 세션 이벤트, 세션 루프 → 콘솔 프레젠터.

mod presenter;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use hunsu_advisor::session::AdvisorSession;
use hunsu_core::config::{AppConfig, TransportMode};
use hunsu_core::config_manager::ConfigManager;
use hunsu_core::models::event::SessionEvent;
use hunsu_core::ports::advice::{AdviceEvent, AdviceTransport};
use hunsu_core::ports::presenter::OverlayPresenter;
use hunsu_network::stream_client::AdviceStreamClient;
use hunsu_network::ws_client::AdviceWsClient;
use hunsu_vision::capture::TableCapture;
use hunsu_vision::detector::TurnSignalDetector;
use hunsu_vision::encoder::{build_frame_upload, WebPQuality};
use hunsu_vision::watcher::{ControlEdge, ControlWatcher};

use presenter::ConsolePresenter;

/// HUNSU — 실시간 카드게임 훈수 오버레이 클라이언트
#[derive(Debug, Parser)]
#[command(name = "hunsu", version, about)]
struct Cli {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 캡처할 모니터 인덱스 (설정값보다 우선)
    #[arg(long)]
    monitor: Option<usize>,

    /// 프레임 업로드 없이 로컬 감지만 수행
    #[arg(long)]
    detect_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone())?,
        None => ConfigManager::new()?,
    };
    let mut config = manager.get();
    if let Some(monitor) = cli.monitor {
        config.session.monitor_index = monitor;
    }
    if cli.detect_only {
        config.session.upload_enabled = false;
    }

    let session_id = Uuid::new_v4().to_string();
    info!("세션 시작: {session_id}");

    run(config, session_id).await
}

async fn run(config: AppConfig, session_id: String) -> Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(64);
    let (state_tx, mut state_rx) = mpsc::channel(16);

    // 세션 루프 — 판단의 단일 작성자
    let session = AdvisorSession::new(config.engine.clone(), state_tx);
    let session_task = tokio::spawn(session.run(event_rx));

    // 전송 어댑터 선택
    let transport: Arc<dyn AdviceTransport> = match config.server.transport {
        TransportMode::Sse => Arc::new(AdviceStreamClient::new(
            &config.server.base_url,
            &config.server.api_token,
            config.server.max_retry_secs,
        )),
        TransportMode::WebSocket => Arc::new(AdviceWsClient::new(
            &config.server.base_url,
            &config.server.api_token,
            config.server.max_retry_secs,
        )),
    };

    // 응답 스트림 연결
    let (advice_tx, mut advice_rx) = mpsc::channel::<AdviceEvent>(64);
    let stream_task = {
        let transport = transport.clone();
        let session_id = session_id.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.connect(&session_id, advice_tx).await {
                error!("응답 스트림 연결 에러: {e}");
            }
        })
    };

    // 스트림 이벤트 → 세션 이벤트 변환
    let relay_task = {
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = advice_rx.recv().await {
                let mapped = match event {
                    AdviceEvent::Connected { session_id } => {
                        info!("응답 스트림 연결 수립: {session_id}");
                        None
                    }
                    AdviceEvent::Delta { text } => Some(SessionEvent::ResponseDelta { text }),
                    AdviceEvent::Completed { text } => {
                        Some(SessionEvent::ResponseCompleted { text })
                    }
                    AdviceEvent::Error(message) => {
                        warn!("응답 스트림 에러: {message}");
                        None
                    }
                    AdviceEvent::Closed => {
                        info!("응답 스트림 종료");
                        None
                    }
                };
                if let Some(event) = mapped {
                    if event_tx.send(event).await.is_err() {
                        break;
                    }
                }
            }
        })
    };

    // 캡처 루프: 프레임 → 픽셀 신호 + (옵션) 업로드
    let capture_task = {
        let event_tx = event_tx.clone();
        let transport = transport.clone();
        let vision_cfg = config.vision.clone();
        let session_cfg = config.session.clone();
        let session_id = session_id.clone();
        tokio::spawn(async move {
            let capture = TableCapture::new(session_cfg.monitor_index);
            let detector = TurnSignalDetector::new(vision_cfg);
            let mut watcher = ControlWatcher::new();
            let mut ticker = tokio::time::interval(Duration::from_millis(
                session_cfg.sample_interval_ms.max(100),
            ));

            loop {
                ticker.tick().await;

                let frame = match capture.capture() {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("캡처 실패: {e}");
                        continue;
                    }
                };

                let signal = detector.detect(&frame);
                if event_tx
                    .send(SessionEvent::PixelUpdate { signal })
                    .await
                    .is_err()
                {
                    break;
                }

                // 등장/소멸 엣지는 이산 이벤트로 따로 전달
                let edge_event = watcher.observe(&signal).map(|edge| match edge {
                    ControlEdge::Appeared => SessionEvent::ControlAppeared,
                    ControlEdge::Disappeared => SessionEvent::ControlDisappeared,
                });
                if let Some(event) = edge_event {
                    if event_tx.send(event).await.is_err() {
                        break;
                    }
                }

                if session_cfg.upload_enabled {
                    match build_frame_upload(&session_id, &frame, WebPQuality::Medium) {
                        Ok(upload) => {
                            if let Err(e) = transport.send_frame(&upload).await {
                                warn!("프레임 업로드 실패: {e}");
                            }
                        }
                        Err(e) => warn!("프레임 인코딩 실패: {e}"),
                    }
                }
            }
        })
    };

    // 표시 상태 출력
    let present_task = tokio::spawn(async move {
        let presenter = ConsolePresenter::new();
        while let Some(state) = state_rx.recv().await {
            if let Err(e) = presenter.present(&state).await {
                warn!("표시 실패: {e}");
            }
        }
    });

    // Ctrl-C → 세션 리셋 후 정리
    tokio::signal::ctrl_c().await?;
    info!("종료 신호 수신, 세션 정리");
    let _ = event_tx.send(SessionEvent::Reset).await;

    capture_task.abort();
    relay_task.abort();
    stream_task.abort();
    drop(event_tx);

    let _ = session_task.await;
    present_task.abort();

    info!("종료 완료");
    Ok(())
}
