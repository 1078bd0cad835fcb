//! 알림 센터 — 오케스트레이터.
//!
//! 질의 저장소, 목록 동기화기, 푸시 스트림 감독자를 한 사용자 기준으로
//! 조립한다. UI 레이어에 노출되는 유일한 표면이며, UI는 스냅샷을 읽고
//! 연산을 호출할 뿐 내부 상태를 직접 바꾸지 않는다.
//!
//! 푸시 이벤트는 목록을 직접 고치지 않는다 — 항상 권위 있는 페이지를
//! 다시 조회한다 (push-invalidates-pull).

use nurihr_core::config::NotifyConfig;
use nurihr_core::models::notification::{Notification, NotificationFilter};
use nurihr_core::models::user::AuthUser;
use nurihr_core::ports::alert::AlertSink;
use nurihr_core::ports::notification_api::NotificationApi;
use nurihr_core::session::SessionStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::list_sync::{ListState, ListSynchronizer};
use crate::query::{QueryPatch, QueryStore};
use crate::stream::{ConnectionState, StreamConfig, StreamSupervisor};

/// UI에 노출되는 받은함 스냅샷.
///
/// `unread_count`는 **현재 로드된 페이지에 대한** 미읽음 수다 — 마지막
/// 성공 조회의 뷰일 뿐 전역 합계가 아니다 (알려진 제약).
#[derive(Debug, Clone, PartialEq)]
pub struct InboxSnapshot {
    /// 현재 페이지의 알림들
    pub items: Vec<Notification>,
    /// 현재 페이지 기준 미읽음 수
    pub unread_count: usize,
    /// 푸시 연결 상태
    pub connection_state: ConnectionState,
    /// 조회 진행 중 여부
    pub is_fetching: bool,
    /// 마지막 조회 실패 사유
    pub error: Option<String>,
}

/// 알림 센터
pub struct NotificationCenter {
    api: Arc<dyn NotificationApi>,
    alerts: Arc<dyn AlertSink>,
    session: Arc<SessionStore>,
    query: QueryStore,
    list: Arc<ListSynchronizer>,
    stream: StreamSupervisor,
    coalesce_window: Option<Duration>,
    refetch_pending: Arc<AtomicBool>,
}

impl NotificationCenter {
    /// 새 알림 센터 조립.
    ///
    /// 푸시 핸들러를 감독자의 안정 슬롯에 1회 등록한다 — 이후 사용자
    /// 변경으로 `start`가 다시 돌아도 핸들러는 재등록되지 않는다.
    pub fn new(
        api: Arc<dyn NotificationApi>,
        alerts: Arc<dyn AlertSink>,
        session: Arc<SessionStore>,
        config: &NotifyConfig,
    ) -> Self {
        let query = QueryStore::new(NotificationFilter::for_recipient("", config.page_size));
        let list = Arc::new(ListSynchronizer::new(
            api.clone(),
            query.current(),
            config.sequence_guard,
        ));
        let stream = StreamSupervisor::new(api.clone(), StreamConfig::from(config));

        let coalesce_window = config.coalesce_window();
        let refetch_pending = Arc::new(AtomicBool::new(false));

        stream.set_handler({
            let alerts = alerts.clone();
            let list = list.clone();
            let pending = refetch_pending.clone();
            Arc::new(move |notification| {
                let alerts = alerts.clone();
                let list = list.clone();
                let pending = pending.clone();
                tokio::spawn(async move {
                    apply_push(alerts, list, pending, coalesce_window, notification).await;
                });
            })
        });

        Self {
            api,
            alerts,
            session,
            query,
            list,
            stream,
            coalesce_window,
            refetch_pending,
        }
    }

    /// 사용자 식별 변경 반영.
    ///
    /// 이전 구독을 먼저 내리고, 질의 저장소의 수신자를 갱신해 목록을
    /// 재조회시킨 뒤, 새 사용자로 푸시 구독을 올린다.
    pub async fn bind_user(&self, user: Option<&AuthUser>) {
        self.stream.stop().await;

        match user {
            Some(user) => {
                debug!("알림 센터 사용자 바인딩: {}", user.user_id);
                let filter = self.query.update(QueryPatch {
                    recipient_id: Some(user.user_id.clone()),
                    current_page: Some(0),
                    ..QueryPatch::default()
                });
                self.list.set_filter(filter).await;
                self.stream.start(&user.user_id).await;
            }
            None => {
                debug!("알림 센터 사용자 해제");
                let filter = self.query.update(QueryPatch {
                    recipient_id: Some(String::new()),
                    current_page: Some(0),
                    ..QueryPatch::default()
                });
                self.list.reset(filter);
            }
        }
    }

    /// 수신 푸시 알림 처리 — 일시 알림 표시 + 권위 페이지 재조회.
    pub async fn handle_new_notification(&self, notification: Notification) {
        apply_push(
            self.alerts.clone(),
            self.list.clone(),
            self.refetch_pending.clone(),
            self.coalesce_window,
            notification,
        )
        .await;
    }

    /// 단건 읽음 처리.
    ///
    /// 낙관적 갱신은 하지 않는다 — 성공 후의 재조회가 UI에 반영한다.
    /// 실패는 일시 에러 알림으로만 표면화하고 상태는 건드리지 않는다.
    pub async fn mark_as_read(&self, id: &str) {
        match self.api.mark_as_read(id).await {
            Ok(outcome) if outcome.success => {
                self.list.refetch().await;
            }
            Ok(outcome) => {
                let message = outcome
                    .message
                    .unwrap_or_else(|| "읽음 처리에 실패했습니다".to_string());
                self.show_error(&message).await;
            }
            Err(fault) => {
                self.show_error(&fault.to_string()).await;
            }
        }
    }

    /// 전체 읽음 처리.
    ///
    /// 로그인 사용자가 없으면 원격 호출도 알림도 없이 조용히 끝난다.
    pub async fn mark_all_as_read(&self) {
        let Some(recipient_id) = self.session.user_id() else {
            debug!("사용자 없음 — 전체 읽음 처리 생략");
            return;
        };

        match self.api.mark_all_as_read(&recipient_id).await {
            Ok(outcome) if outcome.success => {
                self.list.refetch().await;
                if let Err(e) = self.alerts.success("모든 알림을 읽음 처리했습니다").await {
                    warn!("성공 알림 표시 실패: {e}");
                }
            }
            Ok(outcome) => {
                let message = outcome
                    .message
                    .unwrap_or_else(|| "전체 읽음 처리에 실패했습니다".to_string());
                self.show_error(&message).await;
            }
            Err(fault) => {
                self.show_error(&fault.to_string()).await;
            }
        }
    }

    /// 질의 변경 (페이지 이동, 읽음 필터 등) — 값이 바뀌면 재조회된다.
    pub async fn update_query(&self, patch: QueryPatch) {
        let filter = self.query.update(patch);
        self.list.set_filter(filter).await;
    }

    /// 수동 재조회
    pub async fn refetch(&self) {
        self.list.refetch().await;
    }

    /// 현재 페이지 기준 미읽음 수
    pub fn unread_count(&self) -> usize {
        self.list
            .snapshot()
            .items
            .iter()
            .filter(|n| !n.is_read)
            .count()
    }

    /// UI 소비용 스냅샷
    pub fn snapshot(&self) -> InboxSnapshot {
        let list = self.list.snapshot();
        let unread_count = list.items.iter().filter(|n| !n.is_read).count();
        InboxSnapshot {
            items: list.items,
            unread_count,
            connection_state: self.stream.state(),
            is_fetching: list.is_fetching,
            error: list.error,
        }
    }

    /// 목록 상태 변경 수신기
    pub fn subscribe_list(&self) -> watch::Receiver<ListState> {
        self.list.subscribe()
    }

    /// 연결 상태 변경 수신기
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.stream.subscribe()
    }

    /// 앱 종료 경로 — 푸시 구독 정리
    pub async fn shutdown(&self) {
        self.stream.stop().await;
    }

    async fn show_error(&self, message: &str) {
        warn!("뮤테이션 실패: {message}");
        if let Err(e) = self.alerts.error(message).await {
            warn!("에러 알림 표시 실패: {e}");
        }
    }
}

/// 푸시 무효화 공통 경로: 알림 표시 후 재조회.
///
/// 병합 창이 없으면(기본) 이벤트마다 즉시 재조회한다 — 폭주 병합이
/// 없는 것이 문서화된 기본 동작이다. 창이 설정되면 첫 이벤트만
/// 타이머를 걸고 창 안의 나머지는 그 재조회에 합류한다.
async fn apply_push(
    alerts: Arc<dyn AlertSink>,
    list: Arc<ListSynchronizer>,
    pending: Arc<AtomicBool>,
    window: Option<Duration>,
    notification: Notification,
) {
    if let Err(e) = alerts.info(&notification.title, &notification.message).await {
        warn!("알림 표시 실패: {e}");
    }

    match window {
        None => list.refetch().await,
        Some(window) => {
            if !pending.swap(true, Ordering::SeqCst) {
                tokio::time::sleep(window).await;
                pending.store(false, Ordering::SeqCst);
                list.refetch().await;
            }
        }
    }
}
