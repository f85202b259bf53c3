//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/` - 대시보드 페이지 (기본 심볼 포함)
//! - `/static/*` - 정적 자산
//! - `/predict` - 종가 예측 (form POST)
//! - `/stock_data/{symbol}` - 시세 스냅샷 + 히스토리
//! - `/search` - 심볼 검색
//! - `/exchange_rate` - USD/INR 환율 (캐시)
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)

pub mod exchange_rate;
pub mod health;
pub mod index;
pub mod predict;
pub mod search;
pub mod stocks;

pub use exchange_rate::{exchange_rate_router, ExchangeRateResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use index::index_router;
pub use predict::{predict_router, PredictRequest, PredictResponse};
pub use search::{search_router, SearchResult};
pub use stocks::{stocks_router, CurrentQuoteDto, HistoricalSeriesDto, StockDataResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .merge(index_router())
        .merge(predict_router())
        .merge(stocks_router())
        .merge(search_router())
        .merge(exchange_rate_router())
}
