//! 대시보드 페이지 endpoint.
//!
//! 빌드 시점에 포함한 HTML 템플릿에 기본 심볼을 치환하여 반환합니다.
//! 차트/검색 스크립트는 `/static` 경로에서 별도로 서빙됩니다.

use axum::{response::Html, routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

/// 대시보드 템플릿 (빌드 시점 포함).
const INDEX_TEMPLATE: &str = include_str!("../../assets/index.html");

/// 초기 로드 시 표시할 심볼.
const DEFAULT_SYMBOL: &str = "AAPL";

/// 대시보드 페이지.
///
/// GET /
pub async fn index_page() -> Html<String> {
    Html(INDEX_TEMPLATE.replace("{{default_symbol}}", DEFAULT_SYMBOL))
}

/// 대시보드 라우터 생성.
pub fn index_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index_page))
}
