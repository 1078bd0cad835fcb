//! 목록 동기화기.
//!
//! 조회 협력자와 필터 값을 받아 `{items, is_fetching, error}` 상태를
//! 유지하는 페이지 단위 fetch 엔진. 필터 값이 바뀌면 자동으로 한 번
//! 재조회하고, 푸시 무효화를 위한 수동 `refetch`도 노출한다.
//!
//! 기본 모드에서는 요청 순서 보장이 없다 — 먼저 발행된 조회가 나중에
//! 완료되면 그 결과가 최신 결과를 덮어쓴다(마지막 **완료** 승리).
//! `sequence_guard`를 켜면 발행 순번보다 오래된 응답을 폐기한다.

use nurihr_core::models::notification::{Notification, NotificationFilter};
use nurihr_core::ports::notification_api::NotificationApi;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// 페이지 메타데이터 (마지막 성공 조회 기준)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    /// 전체 항목 수
    pub total_elements: u64,
    /// 전체 페이지 수
    pub total_pages: u32,
    /// 현재 페이지 번호
    pub page: u32,
}

/// 목록 상태 — 매 조회마다 통째로 교체된다
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    /// 현재 페이지의 알림들
    pub items: Vec<Notification>,
    /// 페이지 메타 (실패 시 None)
    pub page: Option<PageMeta>,
    /// 조회 진행 중 여부
    pub is_fetching: bool,
    /// 마지막 실패 사유 (성공 시 None)
    pub error: Option<String>,
}

/// 목록 동기화기
pub struct ListSynchronizer {
    api: Arc<dyn NotificationApi>,
    filter: parking_lot::Mutex<NotificationFilter>,
    state_tx: watch::Sender<ListState>,
    sequence_guard: bool,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl ListSynchronizer {
    /// 새 동기화기 생성 (조회는 아직 하지 않는다)
    pub fn new(
        api: Arc<dyn NotificationApi>,
        initial_filter: NotificationFilter,
        sequence_guard: bool,
    ) -> Self {
        let (state_tx, _) = watch::channel(ListState::default());
        Self {
            api,
            filter: parking_lot::Mutex::new(initial_filter),
            state_tx,
            sequence_guard,
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// 현재 상태 스냅샷
    pub fn snapshot(&self) -> ListState {
        self.state_tx.borrow().clone()
    }

    /// 상태 변경 수신기 생성
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state_tx.subscribe()
    }

    /// 필터 교체 — 값이 같으면 아무것도 하지 않는다.
    ///
    /// 값이 다르면 보관 후 한 번 재조회한다. 동시 진행 중인 조회를
    /// 취소하거나 줄 세우지 않는다.
    pub async fn set_filter(&self, filter: NotificationFilter) {
        {
            let mut current = self.filter.lock();
            if *current == filter {
                debug!("필터 값 동일 — 재조회 생략");
                return;
            }
            *current = filter;
        }
        self.refetch().await;
    }

    /// 필터 보관 + 상태 초기화 (조회 없음 — 로그아웃 경로용)
    pub fn reset(&self, filter: NotificationFilter) {
        *self.filter.lock() = filter;
        let _ = self.state_tx.send(ListState::default());
    }

    /// 현재 필터로 재조회.
    ///
    /// 실패(논리/장애 모두)는 `error` 문자열로 표면화하고 이전 항목을
    /// 비운다 — 낡은 내용을 조용히 보여주지 않는다. 재시도는 없다.
    pub async fn refetch(&self) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        self.state_tx.send_modify(|state| {
            state.is_fetching = true;
            state.error = None;
        });

        let filter = self.filter.lock().clone();
        let result = self.api.get_notifications(&filter).await;

        if self.sequence_guard && seq < self.applied.load(Ordering::SeqCst) {
            // is_fetching은 건드리지 않는다 — 폐기 시점에는 항상 더 새로운
            // 조회가 반영됐거나 진행 중이고, 플래그는 최신 조회가 정리한다
            warn!("순번 {seq} 응답 폐기 — 더 새로운 조회가 이미 반영됨");
            return;
        }
        self.applied.fetch_max(seq, Ordering::SeqCst);

        self.state_tx.send_modify(|state| {
            match result {
                Ok(outcome) => match (outcome.success, outcome.data) {
                    (true, Some(envelope)) => {
                        debug!("알림 {}건 수신 (page={})", envelope.content.len(), envelope.page);
                        state.items = envelope.content;
                        state.page = Some(PageMeta {
                            total_elements: envelope.total_elements,
                            total_pages: envelope.total_pages,
                            page: envelope.page,
                        });
                        state.error = None;
                    }
                    (_, _) => {
                        // 논리적 실패 — 봉투의 메시지를 그대로 노출
                        let message = outcome
                            .message
                            .unwrap_or_else(|| "알림 조회 실패".to_string());
                        warn!("알림 조회 논리적 실패: {message}");
                        state.items = Vec::new();
                        state.page = None;
                        state.error = Some(message);
                    }
                },
                Err(fault) => {
                    warn!("알림 조회 장애: {fault}");
                    state.items = Vec::new();
                    state.page = None;
                    state.error = Some(fault.to_string());
                }
            }
            state.is_fetching = false;
        });
    }
}
