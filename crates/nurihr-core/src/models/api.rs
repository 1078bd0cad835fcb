//! API 응답 봉투 모델.
//!
//! 서버의 모든 REST 응답은 `{success, data, message}` 봉투로 감싸져 온다.
//! `success == false`는 논리적 실패이며 전송 에러(`CoreError`)와 구분된다.

use serde::{Deserialize, Serialize};

/// 서버 응답 봉투
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiOutcome<T> {
    /// 논리적 성공 여부
    pub success: bool,
    /// 성공 시 페이로드
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 실패 사유 또는 안내 메시지
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiOutcome<T> {
    /// 성공 봉투 생성
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// 논리적 실패 봉투 생성
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// 페이로드를 버린 봉투로 변환 (뮤테이션 응답용)
    pub fn into_unit(self) -> ApiOutcome<()> {
        ApiOutcome {
            success: self.success,
            data: self.success.then_some(()),
            message: self.message,
        }
    }
}

/// 페이지 봉투 — 목록 질의 결과.
///
/// 성공 조회마다 통째로 교체되며 증분 병합은 없다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// 현재 페이지 내용
    pub content: Vec<T>,
    /// 전체 항목 수
    pub total_elements: u64,
    /// 전체 페이지 수
    pub total_pages: u32,
    /// 현재 페이지 번호 (0부터 시작)
    #[serde(default)]
    pub page: u32,
}
