//! 인증 사용자 모델.

use serde::{Deserialize, Serialize};

/// 로그인한 사용자 (세션 범위)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// 사용자 고유 ID — 알림 수신자 ID로 사용
    pub user_id: String,
    /// 사번
    pub employee_id: String,
    /// 표시 이름
    pub name: String,
    /// 역할 (예: "EMPLOYEE", "MANAGER", "ADMIN")
    pub role: String,
}
