//! USD/INR 환율 endpoint.
//!
//! 캐시 계층(RateCache)이 TTL과 키 순환을 처리하므로 핸들러는 결과
//! 유무만 응답 형태로 변환합니다.

use axum::{extract::State, routing::get, Json, Router};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use crate::state::AppState;

/// 환율 조회 실패 시 공통 메시지.
const FAILURE_MESSAGE: &str = "Failed to fetch exchange rate";

/// 환율 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateResponse {
    pub success: bool,
    /// USD/INR 환율 (소수점 2자리, 성공 시)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    /// 실패 메시지 (실패 시)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// USD/INR 환율 조회.
///
/// GET /exchange_rate
#[utoipa::path(
    get,
    path = "/exchange_rate",
    responses(
        (status = 200, description = "캐시 또는 신규 조회 환율", body = ExchangeRateResponse)
    ),
    tag = "exchange_rate"
)]
pub async fn get_exchange_rate(State(state): State<Arc<AppState>>) -> Json<ExchangeRateResponse> {
    match state.rate_cache.get_rate().await {
        Some(rate) => Json(ExchangeRateResponse {
            success: true,
            rate: Some(rate.to_f64().unwrap_or_default()),
            message: None,
        }),
        None => {
            warn!("Exchange rate unavailable from all providers");
            Json(ExchangeRateResponse {
                success: false,
                rate: None,
                message: Some(FAILURE_MESSAGE.to_string()),
            })
        }
    }
}

/// 환율 라우터 생성.
pub fn exchange_rate_router() -> Router<Arc<AppState>> {
    Router::new().route("/exchange_rate", get(get_exchange_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{create_test_state, FixedRateFetcher, StaticQuoteProvider};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use marketview_data::exchange_rate::{RateCache, SystemClock};
    use marketview_ml::PredictionService;
    use tower::ServiceExt;

    async fn get_rate_response(state: Arc<AppState>) -> (StatusCode, ExchangeRateResponse) {
        let app = exchange_rate_router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/exchange_rate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_exchange_rate_success() {
        let state = Arc::new(create_test_state());

        let (status, body) = get_rate_response(state).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.rate, Some(83.25));
        assert!(body.message.is_none());
    }

    #[tokio::test]
    async fn test_exchange_rate_all_providers_fail() {
        let rate_cache = RateCache::new(
            Arc::new(FixedRateFetcher { rate: None }),
            Arc::new(SystemClock),
            vec!["key-a".to_string(), "key-b".to_string()],
        );
        let state = Arc::new(AppState::new(
            Arc::new(StaticQuoteProvider::with_sample_series()),
            Arc::new(rate_cache),
            Arc::new(PredictionService::disabled()),
        ));

        let (status, body) = get_rate_response(state).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.success);
        assert!(body.rate.is_none());
        assert_eq!(body.message.as_deref(), Some(FAILURE_MESSAGE));
    }
}
