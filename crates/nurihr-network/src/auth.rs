//! 인증 토큰 관리.
//!
//! 서버 로그인, 토큰 보관, 세션 저장소 연동을 담당한다.

use nurihr_core::error::CoreError;
use nurihr_core::models::api::ApiOutcome;
use nurihr_core::models::user::AuthUser;
use nurihr_core::session::SessionStore;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// 서버 응답 — 로그인 페이로드
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    token: String,
    user: AuthUser,
}

/// 토큰 매니저 — 로그인/로그아웃과 토큰 보관
#[derive(Clone)]
pub struct TokenManager {
    base_url: String,
    client: reqwest::Client,
    token: Arc<RwLock<Option<String>>>,
    session: Arc<SessionStore>,
}

impl TokenManager {
    /// 새 토큰 매니저 생성
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            token: Arc::new(RwLock::new(None)),
            session,
        }
    }

    /// 고정 토큰으로 생성 (mock 모드/테스트용 — 서버 왕복 없음)
    pub fn with_static_token(token: &str, session: Arc<SessionStore>) -> Self {
        Self {
            base_url: String::new(),
            client: reqwest::Client::new(),
            token: Arc::new(RwLock::new(Some(token.to_string()))),
            session,
        }
    }

    /// 이메일/비밀번호 로그인 → 토큰 획득 + 세션 초기화
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        let url = format!("{}/api/auth/login", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::Auth(format!("로그인 요청 실패: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(CoreError::Auth(format!("로그인 실패 ({status}): {text}")));
        }

        let outcome: ApiOutcome<LoginData> = resp
            .json()
            .await
            .map_err(|e| CoreError::Auth(format!("로그인 응답 파싱 실패: {e}")))?;

        if !outcome.success {
            let message = outcome.message.unwrap_or_else(|| "로그인 거부됨".to_string());
            return Err(CoreError::Auth(message));
        }

        let data = outcome
            .data
            .ok_or_else(|| CoreError::Auth("로그인 응답에 데이터 없음".to_string()))?;

        *self.token.write().await = Some(data.token);
        self.session.init(data.user.clone());

        debug!("로그인 성공: user_id={}", data.user.user_id);
        Ok(data.user)
    }

    /// 현재 토큰 조회 (미인증 시 에러)
    pub async fn get_token(&self) -> Result<String, CoreError> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| CoreError::Auth("인증되지 않음".to_string()))
    }

    /// 로그아웃 — 토큰 폐기 + 세션 정리 (멱등)
    pub async fn logout(&self) {
        *self.token.write().await = None;
        self.session.clear();
        debug!("로그아웃 완료");
    }
}
