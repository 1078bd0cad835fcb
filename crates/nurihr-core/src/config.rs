//! 애플리케이션 설정 구조체.
//!
//! 서버 URL, 페이지 크기, 스트림 타이머 등 런타임 설정을 정의한다.
//! `config` crate를 통해 파일/환경변수(`NURIHR_*`)에서 로드.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 API 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 알림 동기화 설정
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// 서버 API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 서버 base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// mock 백엔드 사용 여부 (개발/데모용)
    #[serde(default)]
    pub mock_mode: bool,
    /// SSE 재연결 backoff 상한 (초)
    #[serde(default = "default_sse_max_retry_secs")]
    pub sse_max_retry_secs: u64,
}

/// 알림 동기화 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// 목록 페이지 크기
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// 연결 지연 경고 타이머 (초) — 진단 로그만 남긴다
    #[serde(default = "default_stall_timeout_secs")]
    pub stall_timeout_secs: u64,
    /// 에러 후 재연결 진단 확인 지연 (초)
    #[serde(default = "default_error_probe_delay_secs")]
    pub error_probe_delay_secs: u64,
    /// 조회 순서 보장 — 늦게 도착한 과거 응답을 폐기한다.
    /// false(기본)면 마지막에 도착한 응답이 이긴다 (원래 동작).
    #[serde(default)]
    pub sequence_guard: bool,
    /// 푸시 폭주 시 재조회 병합 창 (밀리초, 0이면 비활성)
    #[serde(default)]
    pub coalesce_window_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_sse_max_retry_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    10
}

fn default_stall_timeout_secs() -> u64 {
    10
}

fn default_error_probe_delay_secs() -> u64 {
    1
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            mock_mode: false,
            sse_max_retry_secs: default_sse_max_retry_secs(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            stall_timeout_secs: default_stall_timeout_secs(),
            error_probe_delay_secs: default_error_probe_delay_secs(),
            sequence_guard: false,
            coalesce_window_ms: 0,
        }
    }
}

impl ApiConfig {
    /// 요청 타임아웃을 `Duration`으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl NotifyConfig {
    /// 연결 지연 경고 타이머
    pub fn stall_timeout(&self) -> Duration {
        Duration::from_secs(self.stall_timeout_secs)
    }

    /// 에러 후 진단 확인 지연
    pub fn error_probe_delay(&self) -> Duration {
        Duration::from_secs(self.error_probe_delay_secs)
    }

    /// 재조회 병합 창 (비활성 시 None)
    pub fn coalesce_window(&self) -> Option<Duration> {
        (self.coalesce_window_ms > 0).then(|| Duration::from_millis(self.coalesce_window_ms))
    }
}

impl AppConfig {
    /// 기본값 설정 생성 (테스트/데모용)
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 설정 로드 — 파일(선택) + `NURIHR_` 환경변수 오버라이드
    ///
    /// 예: `NURIHR_API__BASE_URL`, `NURIHR_NOTIFY__PAGE_SIZE`
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder
            .add_source(config::Environment::with_prefix("NURIHR").separator("__"))
            .build()
            .map_err(|e| CoreError::Config(format!("설정 로드 실패: {e}")))?
            .try_deserialize()
            .map_err(|e| CoreError::Config(format!("설정 역직렬화 실패: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = AppConfig::default_config();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert!(!config.api.mock_mode);
        assert_eq!(config.notify.page_size, 10);
        assert_eq!(config.notify.stall_timeout(), Duration::from_secs(10));
        assert_eq!(config.notify.error_probe_delay(), Duration::from_secs(1));
        assert!(!config.notify.sequence_guard);
        assert!(config.notify.coalesce_window().is_none());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://hr.nuri.example\"\nmock_mode = true\n\n\
             [notify]\npage_size = 25\nsequence_guard = true\ncoalesce_window_ms = 200"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "https://hr.nuri.example");
        assert!(config.api.mock_mode);
        assert_eq!(config.notify.page_size, 25);
        assert!(config.notify.sequence_guard);
        assert_eq!(
            config.notify.coalesce_window(),
            Some(Duration::from_millis(200))
        );
    }
}
