//! 알림 API 포트.
//!
//! 구현: `nurihr-network` crate (reqwest REST 어댑터, mock 어댑터)

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::CoreError;
use crate::models::api::{ApiOutcome, Page};
use crate::models::notification::{Notification, NotificationFilter};

/// 알림 백엔드 인터페이스.
///
/// 목록 조회와 읽음 처리 뮤테이션은 필수, 실시간 푸시는 선택 기능이다.
/// `push_channel()`이 `None`이면 라이브 푸시 없이 수동 재조회만 가능하며
/// 이는 정상 동작 모드다.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// 알림 목록 조회 (페이지 단위)
    ///
    /// `Ok(outcome)`에서 `outcome.success == false`는 논리적 실패,
    /// `Err(_)`는 전송/파싱 장애다. 둘은 호출자에게 다르게 표면화된다.
    async fn get_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> Result<ApiOutcome<Page<Notification>>, CoreError>;

    /// 단건 읽음 처리
    async fn mark_as_read(&self, id: &str) -> Result<ApiOutcome<()>, CoreError>;

    /// 수신자 전체 읽음 처리
    async fn mark_all_as_read(&self, recipient_id: &str) -> Result<ApiOutcome<()>, CoreError>;

    /// 푸시 채널 기능 조회 (기본: 미지원)
    fn push_channel(&self) -> Option<Arc<dyn PushChannel>> {
        None
    }
}

/// 푸시 채널에서 수신하는 이벤트
#[derive(Debug, Clone)]
pub enum PushEvent {
    /// 연결 수립됨
    Open,
    /// 새 알림 수신
    Notification(Notification),
    /// 전송 계층 에러 (비치명적)
    Error(String),
}

/// 단방향 서버 푸시 채널.
///
/// 재연결은 전적으로 전송 계층의 책임이다. 상위 컴포넌트는
/// `is_reconnecting()`으로 진행 상황을 진단만 할 수 있다.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// 푸시 스트림 연결 및 이벤트 수신.
    ///
    /// 수신된 이벤트를 `tx` 채널로 전송한다. `tx`가 닫히면 종료한다.
    async fn connect(
        &self,
        user_id: &str,
        tx: mpsc::Sender<PushEvent>,
    ) -> Result<(), CoreError>;

    /// 연결 종료 (멱등)
    async fn disconnect(&self);

    /// 전송 계층이 재연결을 시도 중인지 자가 보고
    fn is_reconnecting(&self) -> bool;
}
