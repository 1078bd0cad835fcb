//! Hexagonal Architecture 포트 인터페이스.
//!
//! 비즈니스 로직은 이 trait들에만 의존하고, 구체 구현(mock/원격)은
//! 조립 시점에 한 번 선택되어 주입된다.

pub mod alert;
pub mod notification_api;
