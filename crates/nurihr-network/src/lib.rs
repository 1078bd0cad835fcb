//! # nurihr-network
//!
//! `nurihr-core` 포트의 네트워크 어댑터 구현.
//!
//! - [`auth`] — JWT 토큰 매니저 (로그인/로그아웃, 세션 저장소 연동)
//! - [`http_client`] — `NotificationApi` 포트의 reqwest REST 구현
//! - [`sse_client`] — `PushChannel` 포트의 SSE 구현 (자동 재연결)
//! - [`mock_api`] — 인메모리 mock 백엔드 (개발/데모/테스트)
//! - [`backend`] — 설정 기반 백엔드 팩토리 (조립 시점 1회 선택)

pub mod auth;
pub mod backend;
pub mod http_client;
pub mod mock_api;
pub mod sse_client;
