//! 마켓 대시보드 API 서버 라이브러리.
//!
//! Axum 기반 REST API의 상태, 라우트, OpenAPI 문서를 제공합니다.
//! 서버 기동은 `main.rs`에서 이루어집니다.

pub mod openapi;
pub mod routes;
pub mod state;
