//! 심볼 검색 endpoint.
//!
//! 정적 인기 종목 목록에 대한 부분 일치 검색. 외부 API를 호출하지
//! 않으므로 항상 즉시 응답합니다.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::state::AppState;

/// 검색 쿼리 파라미터.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// 검색어 (심볼 또는 회사명의 부분 문자열)
    #[serde(default)]
    pub q: String,
}

/// 검색 결과 항목.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
}

/// 심볼 검색.
///
/// GET /search?q=app
#[utoipa::path(
    get,
    path = "/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "일치하는 종목 목록 (최대 5개)", body = [SearchResult])
    ),
    tag = "search"
)]
pub async fn search_symbols(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let results = state
        .symbols
        .search(&query.q)
        .into_iter()
        .map(|entry| SearchResult {
            symbol: entry.symbol,
            name: entry.name,
        })
        .collect();

    Json(results)
}

/// 검색 라우터 생성.
pub fn search_router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search_symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn get_results(uri: &str) -> (StatusCode, Vec<SearchResult>) {
        let app = search_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_search_by_symbol_prefix() {
        let (status, results) = get_results("/search?q=aap").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "AAPL");
    }

    #[tokio::test]
    async fn test_search_empty_query_returns_empty() {
        let (status, results) = get_results("/search?q=").await;

        assert_eq!(status, StatusCode::OK);
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_missing_query_param() {
        // q 자체가 없어도 빈 목록으로 응답
        let (status, results) = get_results("/search").await;

        assert_eq!(status, StatusCode::OK);
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_result_cap() {
        let (_, results) = get_results("/search?q=a").await;

        assert!(results.len() <= 5);
    }
}
