//! 질의 상태 저장소.
//!
//! 알림 목록의 필터/페이지 파라미터를 보관한다. `update`는 부분 변경을
//! 병합해 항상 **새 필터 값**을 만들어낸다 — 하위의 값 동등성 기반
//! 변경 감지가 동작하려면 제자리 변경이 없어야 한다.

use nurihr_core::models::notification::{NotificationFilter, SortDirection};
use parking_lot::RwLock;

/// 필터 부분 변경.
///
/// `None`인 필드는 건드리지 않는다. `is_read`는 삼중 상태라
/// `Some(None)`이 "필터 해제"를 뜻한다.
#[derive(Debug, Clone, Default)]
pub struct QueryPatch {
    /// 수신자 변경
    pub recipient_id: Option<String>,
    /// 페이지 이동
    pub current_page: Option<u32>,
    /// 페이지 크기 변경
    pub page_size: Option<u32>,
    /// 정렬 기준 변경
    pub sort_by: Option<String>,
    /// 정렬 방향 변경
    pub sort_direction: Option<SortDirection>,
    /// 읽음 필터 변경 (`Some(None)` = 전체 보기)
    pub is_read: Option<Option<bool>>,
}

/// 질의 상태 저장소 — 쓰기는 오케스트레이터 한 곳에서만
pub struct QueryStore {
    filter: RwLock<NotificationFilter>,
}

impl QueryStore {
    /// 초기 필터로 생성
    pub fn new(initial: NotificationFilter) -> Self {
        Self {
            filter: RwLock::new(initial),
        }
    }

    /// 현재 필터 조회 (복사본)
    pub fn current(&self) -> NotificationFilter {
        self.filter.read().clone()
    }

    /// 부분 변경 병합 → 새 필터 값 생성/보관/반환.
    ///
    /// 페이지 리셋은 호출자의 몫이다 — patch에 적힌 것만 바꾼다.
    pub fn update(&self, patch: QueryPatch) -> NotificationFilter {
        let mut next = self.filter.read().clone();

        if let Some(recipient_id) = patch.recipient_id {
            next.recipient_id = recipient_id;
        }
        if let Some(current_page) = patch.current_page {
            next.current_page = current_page;
        }
        if let Some(page_size) = patch.page_size {
            next.page_size = page_size;
        }
        if let Some(sort_by) = patch.sort_by {
            next.sort_by = Some(sort_by);
        }
        if let Some(sort_direction) = patch.sort_direction {
            next.sort_direction = Some(sort_direction);
        }
        if let Some(is_read) = patch.is_read {
            next.is_read = is_read;
        }

        *self.filter.write() = next.clone();
        next
    }
}
