//! 알림 모델.
//!
//! REST 목록 조회와 SSE 푸시가 공유하는 알림 구조체와
//! 목록 질의 필터를 정의한다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 알림 (서버 생성, 클라이언트는 읽기와 `is_read` 전환만 수행)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// 알림 고유 ID (불변)
    pub id: String,
    /// 알림 제목
    pub title: String,
    /// 본문 메시지
    pub message: String,
    /// 알림 유형
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// 참조 대상 종류 (요청/리워드/활동)
    pub reference_type: ReferenceType,
    /// 참조 대상 ID
    pub reference_id: String,
    /// 읽음 여부 — false → true 단방향, 되돌아가지 않는다
    pub is_read: bool,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 수신자 ID
    pub recipient_id: String,
}

/// 알림 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// 요청 승인됨
    Approved,
    /// 요청 반려됨
    Rejected,
    /// 신규 생성됨
    Created,
    /// 기한 만료됨
    Expired,
}

/// 알림 참조 대상 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    /// 휴가/근태 요청
    Request,
    /// 리워드 포인트
    Reward,
    /// 사내 활동
    Activity,
}

/// 정렬 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// 알림 목록 질의 필터.
///
/// 값 객체 — 값 동등성(`PartialEq`)이 재조회 트리거 기준이다.
/// 의미가 같은 필터는 반드시 값이 같아야 불필요한 재조회가 없다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    /// 수신자 ID
    pub recipient_id: String,
    /// 현재 페이지 (0부터 시작)
    pub current_page: u32,
    /// 페이지 크기
    pub page_size: u32,
    /// 정렬 기준 필드 (None이면 서버 기본값)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// 정렬 방향
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    /// 읽음 여부 필터 (None이면 전체)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
}

impl NotificationFilter {
    /// 수신자 기준 기본 필터 생성 (첫 페이지, 최신순)
    pub fn for_recipient(recipient_id: &str, page_size: u32) -> Self {
        Self {
            recipient_id: recipient_id.to_string(),
            current_page: 0,
            page_size,
            sort_by: Some("createdAt".to_string()),
            sort_direction: Some(SortDirection::Desc),
            is_read: None,
        }
    }
}
