//! SSE(Server-Sent Events) 푸시 채널.
//!
//! `PushChannel` 포트 구현. 자동 재연결 + exponential backoff.
//! 재연결은 이 계층의 책임이며, 상위 컴포넌트는 `is_reconnecting()`으로
//! 진행 상황을 진단만 한다.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use nurihr_core::error::CoreError;
use nurihr_core::models::notification::Notification;
use nurihr_core::ports::notification_api::{PushChannel, PushEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};

use crate::auth::TokenManager;

/// SSE 푸시 채널 — `PushChannel` 포트 구현
pub struct SsePushChannel {
    base_url: String,
    token_manager: Arc<TokenManager>,
    max_retry_secs: u64,
    http_client: reqwest::Client,
    reconnecting: AtomicBool,
    closed: AtomicBool,
    shutdown: Notify,
}

impl SsePushChannel {
    /// 새 SSE 푸시 채널 생성
    pub fn new(base_url: &str, token_manager: Arc<TokenManager>, max_retry_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token_manager,
            max_retry_secs,
            http_client: reqwest::Client::new(),
            reconnecting: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            shutdown: Notify::new(),
        }
    }

    /// SSE 이벤트를 PushEvent로 파싱
    ///
    /// 푸시된 알림 이벤트의 데이터는 `Notification`으로 그대로 역직렬화된다.
    fn parse_event(event_type: &str, data: &str) -> Option<PushEvent> {
        match event_type {
            "notification" | "message" | "" => match serde_json::from_str::<Notification>(data) {
                Ok(notification) => Some(PushEvent::Notification(notification)),
                Err(e) => {
                    debug!("알림 이벤트 파싱 실패: {e}");
                    None
                }
            },
            "connect" => {
                debug!("연결 인사 수신: {data}");
                None
            }
            "heartbeat" => {
                debug!("하트비트 수신");
                None
            }
            _ => {
                debug!("알 수 없는 SSE 이벤트 타입: {event_type}");
                None
            }
        }
    }
}

#[async_trait]
impl PushChannel for SsePushChannel {
    async fn connect(&self, user_id: &str, tx: mpsc::Sender<PushEvent>) -> Result<(), CoreError> {
        let url = format!("{}/api/notifications/stream", self.base_url);
        let mut retry_delay = 1u64;

        // 이전 disconnect 이후 재시작을 허용한다
        self.closed.store(false, Ordering::SeqCst);
        info!("SSE 연결 시작: {url} (userId={user_id})");

        loop {
            if self.closed.load(Ordering::SeqCst) {
                return Ok(());
            }

            let token = self.token_manager.get_token().await?;
            let resp = self
                .http_client
                .get(&url)
                .query(&[("userId", user_id)])
                .bearer_auth(token)
                .header("Accept", "text/event-stream")
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match resp {
                Ok(resp) => {
                    self.reconnecting.store(false, Ordering::SeqCst);
                    retry_delay = 1;

                    if tx.send(PushEvent::Open).await.is_err() {
                        info!("푸시 이벤트 채널 닫힘, 연결 종료");
                        return Ok(());
                    }

                    let mut stream = resp.bytes_stream().eventsource();
                    loop {
                        tokio::select! {
                            _ = self.shutdown.notified() => {
                                info!("SSE 연결 종료 요청 수신");
                                return Ok(());
                            }
                            item = stream.next() => match item {
                                Some(Ok(event)) => {
                                    if let Some(push_event) =
                                        Self::parse_event(&event.event, &event.data)
                                    {
                                        if tx.send(push_event).await.is_err() {
                                            info!("푸시 이벤트 채널 닫힘, 연결 종료");
                                            return Ok(());
                                        }
                                    }
                                }
                                Some(Err(e)) => {
                                    warn!("SSE 스트림 에러: {e}");
                                    let _ = tx.send(PushEvent::Error(e.to_string())).await;
                                    break;
                                }
                                None => {
                                    warn!("SSE 스트림이 서버에 의해 종료됨");
                                    let _ = tx
                                        .send(PushEvent::Error("스트림 종료됨".to_string()))
                                        .await;
                                    break;
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!("SSE 연결 실패: {e}");
                    if tx.send(PushEvent::Error(e.to_string())).await.is_err() {
                        return Ok(());
                    }
                }
            }

            if tx.is_closed() || self.closed.load(Ordering::SeqCst) {
                return Ok(());
            }

            // exponential backoff 재연결
            self.reconnecting.store(true, Ordering::SeqCst);
            warn!("SSE 재연결 대기: {retry_delay}초");
            tokio::select! {
                _ = self.shutdown.notified() => return Ok(()),
                _ = tokio::time::sleep(Duration::from_secs(retry_delay)) => {}
            }
            retry_delay = (retry_delay * 2).min(self.max_retry_secs);
        }
    }

    async fn disconnect(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("SSE 연결 해제");
        }
        self.reconnecting.store(false, Ordering::SeqCst);
        self.shutdown.notify_waiters();
    }

    fn is_reconnecting(&self) -> bool {
        self.reconnecting.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification_data() -> String {
        serde_json::json!({
            "id": "ntf_001",
            "title": "활동 등록",
            "message": "사내 동호회 활동이 등록되었습니다",
            "type": "CREATED",
            "referenceType": "ACTIVITY",
            "referenceId": "act_3",
            "isRead": false,
            "createdAt": "2026-02-10T09:00:00Z",
            "recipientId": "emp_42"
        })
        .to_string()
    }

    #[test]
    fn parse_notification_event() {
        let event = SsePushChannel::parse_event("notification", &notification_data());
        assert!(matches!(
            event,
            Some(PushEvent::Notification(n)) if n.id == "ntf_001"
        ));
    }

    #[test]
    fn parse_default_message_event() {
        // 이벤트 이름이 비어 있어도 알림 페이로드면 수신한다
        let event = SsePushChannel::parse_event("", &notification_data());
        assert!(matches!(event, Some(PushEvent::Notification(_))));
    }

    #[test]
    fn parse_heartbeat_event_is_silent() {
        let event = SsePushChannel::parse_event("heartbeat", r#"{"ts": 1}"#);
        assert!(event.is_none());
    }

    #[test]
    fn parse_connect_event_is_silent() {
        let event = SsePushChannel::parse_event("connect", "connected");
        assert!(event.is_none());
    }

    #[test]
    fn parse_unknown_event() {
        let event = SsePushChannel::parse_event("unknown_type", "data");
        assert!(event.is_none());
    }

    #[test]
    fn parse_malformed_notification() {
        let event = SsePushChannel::parse_event("notification", "not json");
        assert!(event.is_none());
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let session = Arc::new(nurihr_core::session::SessionStore::new());
        let tm = Arc::new(TokenManager::with_static_token("jwt", session));
        let channel = SsePushChannel::new("http://localhost:1", tm, 30);

        channel.disconnect().await;
        channel.disconnect().await;
        assert!(!channel.is_reconnecting());
    }
}
