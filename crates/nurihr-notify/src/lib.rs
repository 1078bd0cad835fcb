//! # nurihr-notify
//!
//! 알림 동기화 코어.
//! 푸시 스트림(SSE)과 페이지 단위 목록 조회, 읽음 처리 뮤테이션을
//! 한 사용자 기준으로 일관되게 맞춘다. 푸시 이벤트는 목록을 직접
//! 고치지 않고 권위 있는 페이지 재조회를 트리거한다
//! (push-invalidates-pull).
//!
//! - [`query`] — 필터/페이지 질의 상태 저장소
//! - [`list_sync`] — 페이지 단위 fetch 엔진 (`{items, is_fetching, error}`)
//! - [`stream`] — 푸시 구독 생명주기 감독자 (상태 기계 + 타이머)
//! - [`center`] — 오케스트레이터, UI에 노출되는 유일한 표면

pub mod center;
pub mod list_sync;
pub mod query;
pub mod stream;

pub use center::{InboxSnapshot, NotificationCenter};
pub use list_sync::{ListState, ListSynchronizer, PageMeta};
pub use query::{QueryPatch, QueryStore};
pub use stream::{ConnectionState, StreamConfig, StreamSupervisor};
