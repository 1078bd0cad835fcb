//! 인메모리 mock 백엔드.
//!
//! `NotificationApi` 포트의 로컬 구현. 개발/데모 모드와
//! 오케스트레이터 테스트에서 사용한다. 푸시 채널은 지원하지 않으며
//! (기능 부재는 합법), 이 경우 수동 재조회만 동작한다.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use nurihr_core::error::CoreError;
use nurihr_core::models::api::{ApiOutcome, Page};
use nurihr_core::models::notification::{
    Notification, NotificationFilter, NotificationType, ReferenceType, SortDirection,
};
use nurihr_core::ports::notification_api::NotificationApi;
use parking_lot::Mutex;
use tracing::debug;

/// 인메모리 mock 백엔드 — `NotificationApi` 포트 구현
#[derive(Default)]
pub struct MockNotificationApi {
    store: Mutex<Vec<Notification>>,
}

impl MockNotificationApi {
    /// 빈 저장소로 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 알림 목록으로 생성
    pub fn with_notifications(notifications: Vec<Notification>) -> Self {
        Self {
            store: Mutex::new(notifications),
        }
    }

    /// 데모용 시드 데이터로 생성
    pub fn with_demo_data(recipient_id: &str) -> Self {
        let now = Utc::now();
        let seed = vec![
            demo_notification(
                recipient_id,
                "휴가 승인",
                "연차 요청이 승인되었습니다",
                NotificationType::Approved,
                ReferenceType::Request,
                now,
            ),
            demo_notification(
                recipient_id,
                "리워드 적립",
                "분기 우수사원 포인트가 적립되었습니다",
                NotificationType::Created,
                ReferenceType::Reward,
                now - Duration::hours(2),
            ),
            demo_notification(
                recipient_id,
                "활동 마감",
                "독서 동호회 모집이 마감되었습니다",
                NotificationType::Expired,
                ReferenceType::Activity,
                now - Duration::days(1),
            ),
        ];
        Self::with_notifications(seed)
    }

    /// 알림 추가 (테스트/데모용)
    pub fn insert(&self, notification: Notification) {
        self.store.lock().push(notification);
    }
}

fn demo_notification(
    recipient_id: &str,
    title: &str,
    message: &str,
    notification_type: NotificationType,
    reference_type: ReferenceType,
    created_at: chrono::DateTime<Utc>,
) -> Notification {
    Notification {
        id: uuid::Uuid::new_v4().to_string(),
        title: title.to_string(),
        message: message.to_string(),
        notification_type,
        reference_type,
        reference_id: uuid::Uuid::new_v4().to_string(),
        is_read: false,
        created_at,
        recipient_id: recipient_id.to_string(),
    }
}

#[async_trait]
impl NotificationApi for MockNotificationApi {
    async fn get_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> Result<ApiOutcome<Page<Notification>>, CoreError> {
        if filter.page_size == 0 {
            return Ok(ApiOutcome::fail("페이지 크기는 0일 수 없습니다"));
        }

        let mut matched: Vec<Notification> = self
            .store
            .lock()
            .iter()
            .filter(|n| n.recipient_id == filter.recipient_id)
            .filter(|n| filter.is_read.map_or(true, |read| n.is_read == read))
            .cloned()
            .collect();

        // createdAt 정렬만 지원 (기본: 최신순)
        let ascending = matches!(filter.sort_direction, Some(SortDirection::Asc));
        matched.sort_by(|a, b| {
            if ascending {
                a.created_at.cmp(&b.created_at)
            } else {
                b.created_at.cmp(&a.created_at)
            }
        });

        let total_elements = matched.len() as u64;
        let total_pages = total_elements.div_ceil(filter.page_size as u64) as u32;
        let start = (filter.current_page as usize) * (filter.page_size as usize);
        let content: Vec<Notification> = matched
            .into_iter()
            .skip(start)
            .take(filter.page_size as usize)
            .collect();

        debug!(
            "mock 알림 조회: recipient={}, page={}, 반환 {}건",
            filter.recipient_id,
            filter.current_page,
            content.len()
        );

        Ok(ApiOutcome::ok(Page {
            content,
            total_elements,
            total_pages,
            page: filter.current_page,
        }))
    }

    async fn mark_as_read(&self, id: &str) -> Result<ApiOutcome<()>, CoreError> {
        let mut store = self.store.lock();
        match store.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                // is_read는 단방향 — true에서 되돌리지 않는다
                notification.is_read = true;
                Ok(ApiOutcome::ok(()))
            }
            None => Ok(ApiOutcome::fail(format!("알림을 찾을 수 없습니다: {id}"))),
        }
    }

    async fn mark_all_as_read(&self, recipient_id: &str) -> Result<ApiOutcome<()>, CoreError> {
        let mut store = self.store.lock();
        for notification in store.iter_mut().filter(|n| n.recipient_id == recipient_id) {
            notification.is_read = true;
        }
        Ok(ApiOutcome::ok(()))
    }
}
