//! 사용자 알림(토스트) 포트.
//!
//! 구현: UI 레이어 (토스트/스낵바). 테스트에서는 기록용 fake를 사용한다.

use async_trait::async_trait;

use crate::error::CoreError;

/// 일시적 사용자 알림 인터페이스 — 비차단, 상태 없음
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// 정보 알림 표시 (제목 + 본문)
    async fn info(&self, title: &str, body: &str) -> Result<(), CoreError>;

    /// 성공 알림 표시
    async fn success(&self, message: &str) -> Result<(), CoreError>;

    /// 에러 알림 표시
    async fn error(&self, message: &str) -> Result<(), CoreError>;
}
