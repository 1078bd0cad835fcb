//! 세션 저장소.
//!
//! 현재 로그인 사용자를 보관하는 명시적 세션 범위 상태.
//! 전역 가변 저장소 대신 필요한 컴포넌트에 주입한다.
//! 쓰기는 인증 플로우 한 곳에서만 일어난다.

use parking_lot::RwLock;
use tracing::debug;

use crate::models::user::AuthUser;

/// 세션 저장소 — `init`/`clear` 생명주기를 가진 현재 사용자 보관함
#[derive(Default)]
pub struct SessionStore {
    user: RwLock<Option<AuthUser>>,
}

impl SessionStore {
    /// 빈 세션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 로그인 성공 시 세션 초기화
    pub fn init(&self, user: AuthUser) {
        debug!("세션 초기화: user_id={}", user.user_id);
        *self.user.write() = Some(user);
    }

    /// 로그아웃/만료 시 세션 정리 (멱등)
    pub fn clear(&self) {
        if self.user.write().take().is_some() {
            debug!("세션 정리됨");
        }
    }

    /// 현재 사용자 조회
    pub fn current(&self) -> Option<AuthUser> {
        self.user.read().clone()
    }

    /// 현재 사용자 ID 조회
    pub fn user_id(&self) -> Option<String> {
        self.user.read().as_ref().map(|u| u.user_id.clone())
    }

    /// 인증 여부
    pub fn is_authenticated(&self) -> bool {
        self.user.read().is_some()
    }
}
