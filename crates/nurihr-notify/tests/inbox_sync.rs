//! 받은함 동기화 통합 테스트.
//!
//! mock 백엔드와 가짜 푸시 채널로 오케스트레이터 전체 흐름을 검증한다:
//! 사용자 바인딩 → 목록 조회 → 푸시 무효화 → 읽음 처리 → 해제.

use async_trait::async_trait;
use chrono::Utc;
use nurihr_core::config::NotifyConfig;
use nurihr_core::error::CoreError;
use nurihr_core::models::api::{ApiOutcome, Page};
use nurihr_core::models::notification::{
    Notification, NotificationFilter, NotificationType, ReferenceType,
};
use nurihr_core::models::user::AuthUser;
use nurihr_core::ports::alert::AlertSink;
use nurihr_core::ports::notification_api::{NotificationApi, PushChannel, PushEvent};
use nurihr_core::session::SessionStore;
use nurihr_network::mock_api::MockNotificationApi;
use nurihr_notify::{ConnectionState, NotificationCenter, QueryPatch};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn notification(id: &str, recipient: &str, is_read: bool, hours_ago: i64) -> Notification {
    Notification {
        id: id.to_string(),
        title: format!("알림 {id}"),
        message: "본문".to_string(),
        notification_type: NotificationType::Created,
        reference_type: ReferenceType::Request,
        reference_id: "ref".to_string(),
        is_read,
        created_at: Utc::now() - chrono::Duration::hours(hours_ago),
        recipient_id: recipient.to_string(),
    }
}

fn user(id: &str) -> AuthUser {
    AuthUser {
        user_id: id.to_string(),
        employee_id: "2024-0001".to_string(),
        name: "김누리".to_string(),
        role: "EMPLOYEE".to_string(),
    }
}

/// 표시된 알림을 기록하는 가짜 토스트
#[derive(Default)]
struct RecordingAlerts {
    infos: Mutex<Vec<String>>,
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

#[async_trait]
impl AlertSink for RecordingAlerts {
    async fn info(&self, title: &str, _body: &str) -> Result<(), CoreError> {
        self.infos.lock().push(title.to_string());
        Ok(())
    }

    async fn success(&self, message: &str) -> Result<(), CoreError> {
        self.successes.lock().push(message.to_string());
        Ok(())
    }

    async fn error(&self, message: &str) -> Result<(), CoreError> {
        self.errors.lock().push(message.to_string());
        Ok(())
    }
}

/// 이벤트 송신단을 테스트에 노출하는 가짜 푸시 채널
struct FakeChannel {
    tx_slot: Mutex<Option<mpsc::Sender<PushEvent>>>,
    reconnecting: AtomicBool,
}

impl FakeChannel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            tx_slot: Mutex::new(None),
            reconnecting: AtomicBool::new(false),
        })
    }

    async fn emit(&self, event: PushEvent) {
        let sender = loop {
            if let Some(tx) = self.tx_slot.lock().clone() {
                break tx;
            }
            tokio::task::yield_now().await;
        };
        let _ = sender.send(event).await;
    }
}

#[async_trait]
impl PushChannel for FakeChannel {
    async fn connect(&self, _user_id: &str, tx: mpsc::Sender<PushEvent>) -> Result<(), CoreError> {
        *self.tx_slot.lock() = Some(tx.clone());
        tx.closed().await;
        Ok(())
    }

    async fn disconnect(&self) {
        *self.tx_slot.lock() = None;
    }

    fn is_reconnecting(&self) -> bool {
        self.reconnecting.load(Ordering::SeqCst)
    }
}

/// mock 백엔드에 푸시 기능을 덧붙인 조합 백엔드
struct PushyMockApi {
    inner: MockNotificationApi,
    channel: Arc<FakeChannel>,
}

#[async_trait]
impl NotificationApi for PushyMockApi {
    async fn get_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> Result<ApiOutcome<Page<Notification>>, CoreError> {
        self.inner.get_notifications(filter).await
    }

    async fn mark_as_read(&self, id: &str) -> Result<ApiOutcome<()>, CoreError> {
        self.inner.mark_as_read(id).await
    }

    async fn mark_all_as_read(&self, recipient_id: &str) -> Result<ApiOutcome<()>, CoreError> {
        self.inner.mark_all_as_read(recipient_id).await
    }

    fn push_channel(&self) -> Option<Arc<dyn PushChannel>> {
        Some(self.channel.clone())
    }
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("조건이 제시간에 충족되지 않음");
}

#[tokio::test]
async fn pull_only_flow_with_mock_backend() {
    let api = Arc::new(MockNotificationApi::with_notifications(vec![
        notification("a", "emp_1", false, 1),
        notification("b", "emp_1", true, 2),
        notification("c", "emp_1", false, 3),
    ]));
    let alerts = Arc::new(RecordingAlerts::default());
    let session = Arc::new(SessionStore::new());
    session.init(user("emp_1"));

    let center = NotificationCenter::new(
        api,
        alerts.clone(),
        session,
        &NotifyConfig::default(),
    );

    center.bind_user(Some(&user("emp_1"))).await;

    let snapshot = center.snapshot();
    assert_eq!(snapshot.items.len(), 3);
    assert_eq!(snapshot.unread_count, 2);
    // mock은 푸시 미지원 — 연결 없음이 정상
    assert_eq!(snapshot.connection_state, ConnectionState::Disconnected);

    // 읽음 필터로 질의 변경 → 재조회
    center
        .update_query(QueryPatch {
            is_read: Some(Some(false)),
            ..QueryPatch::default()
        })
        .await;
    assert_eq!(center.snapshot().items.len(), 2);

    // 전체 읽음 처리 → 미읽음 0 + 성공 알림
    center
        .update_query(QueryPatch {
            is_read: Some(None),
            ..QueryPatch::default()
        })
        .await;
    center.mark_all_as_read().await;
    assert_eq!(center.unread_count(), 0);
    assert_eq!(alerts.successes.lock().len(), 1);
    assert!(alerts.errors.lock().is_empty());
}

#[tokio::test]
async fn push_invalidates_pull_end_to_end() {
    let channel = FakeChannel::new();
    let mock = MockNotificationApi::with_notifications(vec![notification(
        "a", "emp_1", false, 1,
    )]);
    let api = Arc::new(PushyMockApi {
        inner: mock,
        channel: channel.clone(),
    });
    let alerts = Arc::new(RecordingAlerts::default());
    let session = Arc::new(SessionStore::new());
    session.init(user("emp_1"));

    let center = Arc::new(NotificationCenter::new(
        api.clone(),
        alerts.clone(),
        session,
        &NotifyConfig::default(),
    ));

    center.bind_user(Some(&user("emp_1"))).await;
    assert_eq!(center.snapshot().items.len(), 1);
    assert_eq!(center.snapshot().connection_state, ConnectionState::Connecting);

    channel.emit(PushEvent::Open).await;
    {
        let center = center.clone();
        wait_until(move || center.snapshot().connection_state == ConnectionState::Connected).await;
    }

    // 서버에 새 알림 생성 + 푸시 → 센터는 목록을 직접 고치지 않고 재조회
    let pushed = notification("pushed", "emp_1", false, 0);
    api.inner.insert(pushed.clone());
    channel.emit(PushEvent::Notification(pushed)).await;

    {
        let center = center.clone();
        wait_until(move || center.snapshot().items.len() == 2).await;
    }
    assert_eq!(center.unread_count(), 2);
    assert_eq!(alerts.infos.lock().len(), 1);

    // 단건 읽음 처리 → 재조회로 반영
    center.mark_as_read("pushed").await;
    {
        let center = center.clone();
        wait_until(move || center.unread_count() == 1).await;
    }

    // 해제 — 구독 정리 + 목록 초기화
    center.bind_user(None).await;
    let snapshot = center.snapshot();
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.connection_state, ConnectionState::Disconnected);
}

#[tokio::test]
async fn transport_error_degrades_without_breaking_pull() {
    let channel = FakeChannel::new();
    let mock =
        MockNotificationApi::with_notifications(vec![notification("a", "emp_1", false, 1)]);
    let api = Arc::new(PushyMockApi {
        inner: mock,
        channel: channel.clone(),
    });
    let alerts = Arc::new(RecordingAlerts::default());
    let session = Arc::new(SessionStore::new());
    session.init(user("emp_1"));

    let center = Arc::new(NotificationCenter::new(
        api,
        alerts,
        session,
        &NotifyConfig::default(),
    ));
    center.bind_user(Some(&user("emp_1"))).await;

    channel.emit(PushEvent::Error("프록시 끊김".to_string())).await;
    {
        let center = center.clone();
        wait_until(move || center.snapshot().connection_state == ConnectionState::Error).await;
    }

    // degraded 상태에서도 수동 재조회는 계속 동작한다
    center.refetch().await;
    let snapshot = center.snapshot();
    assert_eq!(snapshot.items.len(), 1);
    assert!(snapshot.error.is_none());
}
