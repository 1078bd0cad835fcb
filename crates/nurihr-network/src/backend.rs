//! 백엔드 팩토리.
//!
//! mock/원격 백엔드를 설정에 따라 조립 시점에 한 번 선택한다.
//! 비즈니스 로직은 `NotificationApi` trait만 보고, 어떤 구현이
//! 주입됐는지 분기하지 않는다.

use nurihr_core::config::ApiConfig;
use nurihr_core::error::CoreError;
use nurihr_core::ports::notification_api::NotificationApi;
use std::sync::Arc;
use tracing::info;

use crate::auth::TokenManager;
use crate::http_client::HttpNotificationApi;
use crate::mock_api::MockNotificationApi;

/// 설정 기반으로 알림 백엔드 생성
pub fn make_notification_api(
    config: &ApiConfig,
    token_manager: Arc<TokenManager>,
) -> Result<Arc<dyn NotificationApi>, CoreError> {
    if config.mock_mode {
        info!("mock 알림 백엔드 사용 (라이브 푸시 없음)");
        Ok(Arc::new(MockNotificationApi::new()))
    } else {
        info!("원격 알림 백엔드 사용: {}", config.base_url);
        Ok(Arc::new(HttpNotificationApi::new(config, token_manager)?))
    }
}
