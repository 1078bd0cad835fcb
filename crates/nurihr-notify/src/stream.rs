//! 푸시 스트림 감독자.
//!
//! 현재 사용자의 단방향 푸시 구독 생명주기를 소유한다:
//! 상태 기계(disconnected → connecting → {connected | error}),
//! 연결 지연 경고 타이머, 에러 후 재연결 진단 확인, 수신 이벤트의
//! 핸들러 전달. 전송 계층 에러는 치명적이지 않다 — 앱은 degraded
//! 상태로 계속 동작하고, 재연결은 전송 계층의 몫이다.

use nurihr_core::models::notification::Notification;
use nurihr_core::ports::notification_api::{NotificationApi, PushEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use nurihr_core::config::NotifyConfig;

/// 푸시 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// 연결 안 됨 (초기/종료 후)
    Disconnected,
    /// 연결 수립 중
    Connecting,
    /// 연결됨
    Connected,
    /// 전송 계층 에러 (비치명적, degraded)
    Error,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Error => write!(f, "Error"),
        }
    }
}

/// 새 알림 핸들러 — 안정된 슬롯에 보관되어 재구독 없이 교체 가능
pub type NotificationHandler = Arc<dyn Fn(Notification) + Send + Sync>;

/// 감독자 타이머 설정
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// 연결 지연 경고 타이머 (진단 로그만)
    pub stall_timeout: Duration,
    /// 에러 후 재연결 진단 확인 지연
    pub error_probe_delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            stall_timeout: Duration::from_secs(10),
            error_probe_delay: Duration::from_secs(1),
        }
    }
}

impl From<&NotifyConfig> for StreamConfig {
    fn from(config: &NotifyConfig) -> Self {
        Self {
            stall_timeout: config.stall_timeout(),
            error_probe_delay: config.error_probe_delay(),
        }
    }
}

/// 구독 1회분의 리소스 묶음
struct ActiveStream {
    user_id: String,
    /// stop 이후 도착한 이벤트 폐기용 생존 플래그
    live: Arc<AtomicBool>,
    channel: Arc<dyn nurihr_core::ports::notification_api::PushChannel>,
    connect_task: JoinHandle<()>,
    event_task: JoinHandle<()>,
    stall_timer: Arc<parking_lot::Mutex<Option<JoinHandle<()>>>>,
}

/// 푸시 스트림 감독자
pub struct StreamSupervisor {
    api: Arc<dyn NotificationApi>,
    config: StreamConfig,
    state_tx: watch::Sender<ConnectionState>,
    handler: Arc<parking_lot::Mutex<Option<NotificationHandler>>>,
    active: tokio::sync::Mutex<Option<ActiveStream>>,
}

impl StreamSupervisor {
    /// 새 감독자 생성 (초기 상태: Disconnected)
    pub fn new(api: Arc<dyn NotificationApi>, config: StreamConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            api,
            config,
            state_tx,
            handler: Arc::new(parking_lot::Mutex::new(None)),
            active: tokio::sync::Mutex::new(None),
        }
    }

    /// 현재 연결 상태
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// 상태 변경 수신기 생성
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// 새 알림 핸들러 등록/교체.
    ///
    /// 슬롯 간접 참조라 기존 구독을 끊지 않고 교체된다.
    pub fn set_handler(&self, handler: NotificationHandler) {
        *self.handler.lock() = Some(handler);
    }

    /// 사용자 푸시 구독 시작.
    ///
    /// 사용자 ID가 없거나 백엔드가 푸시를 지원하지 않으면 no-op.
    /// 이전 구독이 있으면 먼저 정리한다.
    pub async fn start(&self, user_id: &str) {
        if user_id.is_empty() {
            debug!("사용자 없음 — 푸시 구독 생략");
            return;
        }
        let Some(channel) = self.api.push_channel() else {
            info!("백엔드가 푸시를 지원하지 않음 — 수동 재조회만 동작");
            return;
        };

        self.stop().await;

        info!("푸시 구독 시작: user_id={user_id}");
        let _ = self.state_tx.send(ConnectionState::Connecting);

        let live = Arc::new(AtomicBool::new(true));
        let (tx, mut rx) = mpsc::channel::<PushEvent>(64);

        // 전송 연결 태스크 — 재연결 포함 전송 계층이 알아서 돈다
        let connect_task = tokio::spawn({
            let channel = channel.clone();
            let user_id = user_id.to_string();
            async move {
                if let Err(e) = channel.connect(&user_id, tx).await {
                    warn!("푸시 연결 에러: {e}");
                }
            }
        });

        // 연결 지연 경고 타이머 — one-shot, 상태는 바꾸지 않는다
        let stall_timer = Arc::new(parking_lot::Mutex::new(Some(tokio::spawn({
            let state_rx = self.state_tx.subscribe();
            let timeout = self.config.stall_timeout;
            async move {
                tokio::time::sleep(timeout).await;
                if *state_rx.borrow() == ConnectionState::Connecting {
                    warn!("푸시 연결이 {timeout:?} 동안 수립되지 않음 (전송 계층 진행 대기 중)");
                }
            }
        }))));

        // 이벤트 루프
        let event_task = tokio::spawn({
            let live = live.clone();
            let handler = self.handler.clone();
            let state_tx = self.state_tx.clone();
            let channel = channel.clone();
            let stall_timer = stall_timer.clone();
            let probe_delay = self.config.error_probe_delay;
            async move {
                while let Some(event) = rx.recv().await {
                    // stop 이후 큐에 남은 이벤트는 폐기한다
                    if !live.load(Ordering::SeqCst) {
                        break;
                    }
                    match event {
                        PushEvent::Open => {
                            debug!("푸시 연결 수립됨");
                            let _ = state_tx.send(ConnectionState::Connected);
                            if let Some(timer) = stall_timer.lock().take() {
                                timer.abort();
                            }
                        }
                        PushEvent::Notification(notification) => {
                            let handler = handler.lock().clone();
                            match handler {
                                Some(handler) => handler(notification),
                                None => debug!("핸들러 미등록 — 알림 {} 폐기", notification.id),
                            }
                        }
                        PushEvent::Error(cause) => {
                            warn!("푸시 전송 에러: {cause}");
                            let _ = state_tx.send(ConnectionState::Error);

                            // 진단 확인 — 전송 계층이 재연결 중이라고 보고하면
                            // 표시 상태만 connecting으로 옮긴다 (재연결 자체는 안 한다)
                            let live = live.clone();
                            let channel = channel.clone();
                            let state_tx = state_tx.clone();
                            tokio::spawn(async move {
                                tokio::time::sleep(probe_delay).await;
                                if live.load(Ordering::SeqCst) && channel.is_reconnecting() {
                                    let _ = state_tx.send(ConnectionState::Connecting);
                                }
                            });
                        }
                    }
                }
                debug!("푸시 이벤트 루프 종료");
            }
        });

        *self.active.lock().await = Some(ActiveStream {
            user_id: user_id.to_string(),
            live,
            channel,
            connect_task,
            event_task,
            stall_timer,
        });
    }

    /// 구독 종료 (멱등).
    ///
    /// 생존 플래그를 내리고 타이머/태스크를 정리한 뒤 전송 계층
    /// disconnect를 호출하고 상태를 Disconnected로 강제한다.
    /// 언마운트/사용자 변경 teardown 경로에서 안전하게 재호출 가능하다.
    pub async fn stop(&self) {
        let previous = self.active.lock().await.take();
        if let Some(stream) = previous {
            stream.live.store(false, Ordering::SeqCst);
            if let Some(timer) = stream.stall_timer.lock().take() {
                timer.abort();
            }
            stream.event_task.abort();
            stream.connect_task.abort();
            stream.channel.disconnect().await;
            info!("푸시 구독 종료: user_id={}", stream.user_id);
        }
        let _ = self.state_tx.send(ConnectionState::Disconnected);
    }
}
