//! HTTP REST API 클라이언트.
//!
//! `NotificationApi` 포트 구현. 토큰 헤더 자동 주입 + 상태 코드 에러 매핑.
//! 재시도는 하지 않는다 — 실패 시 재조회는 호출자의 명시적 책임이다.

use async_trait::async_trait;
use nurihr_core::config::ApiConfig;
use nurihr_core::error::CoreError;
use nurihr_core::models::api::{ApiOutcome, Page};
use nurihr_core::models::notification::{Notification, NotificationFilter, SortDirection};
use nurihr_core::ports::notification_api::{NotificationApi, PushChannel};
use std::sync::Arc;
use tracing::debug;

use crate::auth::TokenManager;
use crate::sse_client::SsePushChannel;

/// REST API 클라이언트 — `NotificationApi` 포트 구현
pub struct HttpNotificationApi {
    client: reqwest::Client,
    base_url: String,
    token_manager: Arc<TokenManager>,
    push: Arc<SsePushChannel>,
}

impl HttpNotificationApi {
    /// 새 HTTP API 클라이언트 생성
    pub fn new(config: &ApiConfig, token_manager: Arc<TokenManager>) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        let push = Arc::new(SsePushChannel::new(
            &config.base_url,
            token_manager.clone(),
            config.sse_max_retry_secs,
        ));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_manager,
            push,
        })
    }

    /// Authorization 헤더가 포함된 요청 빌더 반환
    async fn authorized_request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, CoreError> {
        let token = self.token_manager.get_token().await?;
        let url = format!("{}{}", self.base_url, path);
        Ok(self.client.request(method, &url).bearer_auth(token))
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_else(|e| {
            tracing::warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status.as_u16() {
            401 => Err(CoreError::Auth(format!("인증 실패: {text}"))),
            404 => Err(CoreError::NotFound {
                resource_type: "API".to_string(),
                id: text,
            }),
            _ => Err(CoreError::Internal(format!("API 에러 ({status}): {text}"))),
        }
    }

    /// 필터를 쿼리 스트링 파라미터로 변환
    fn filter_params(filter: &NotificationFilter) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("recipientId", filter.recipient_id.clone()),
            ("page", filter.current_page.to_string()),
            ("size", filter.page_size.to_string()),
        ];
        if let Some(sort_by) = &filter.sort_by {
            params.push(("sortBy", sort_by.clone()));
        }
        if let Some(direction) = filter.sort_direction {
            let value = match direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            params.push(("sortDirection", value.to_string()));
        }
        if let Some(is_read) = filter.is_read {
            params.push(("isRead", is_read.to_string()));
        }
        params
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn get_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> Result<ApiOutcome<Page<Notification>>, CoreError> {
        debug!(
            "알림 목록 조회: recipient={}, page={}",
            filter.recipient_id, filter.current_page
        );

        let req = self
            .authorized_request(reqwest::Method::GET, "/api/notifications")
            .await?
            .query(&Self::filter_params(filter));

        let resp = req
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("알림 조회 요청 실패: {e}")))?;

        let resp = self.check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| CoreError::Internal(format!("알림 목록 파싱 실패: {e}")))
    }

    async fn mark_as_read(&self, id: &str) -> Result<ApiOutcome<()>, CoreError> {
        debug!("알림 읽음 처리: id={id}");

        let req = self
            .authorized_request(reqwest::Method::PUT, &format!("/api/notifications/{id}/read"))
            .await?;

        let resp = req
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("읽음 처리 요청 실패: {e}")))?;

        let resp = self.check_response(resp).await?;
        let outcome: ApiOutcome<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| CoreError::Internal(format!("읽음 처리 응답 파싱 실패: {e}")))?;
        Ok(outcome.into_unit())
    }

    async fn mark_all_as_read(&self, recipient_id: &str) -> Result<ApiOutcome<()>, CoreError> {
        debug!("전체 읽음 처리: recipient={recipient_id}");

        let req = self
            .authorized_request(reqwest::Method::PUT, "/api/notifications/read-all")
            .await?
            .query(&[("recipientId", recipient_id)]);

        let resp = req
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("전체 읽음 처리 요청 실패: {e}")))?;

        let resp = self.check_response(resp).await?;
        let outcome: ApiOutcome<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| CoreError::Internal(format!("전체 읽음 처리 응답 파싱 실패: {e}")))?;
        Ok(outcome.into_unit())
    }

    fn push_channel(&self) -> Option<Arc<dyn PushChannel>> {
        Some(self.push.clone())
    }
}
